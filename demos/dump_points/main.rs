//! Reads a whitespace-separated point stream from stdin, builds a 3D
//! Delaunay triangulation and its Voronoi dual, and writes the stable
//! line formats of spec.md §6 to stdout. Plays the same illustrative role
//! as the teacher's `examples/2d_voronoi/main.rs`, minus any rendering
//! dependency (out of scope per the Non-goals) and driven from `clap`
//! instead of `bevy`, since there is no app loop here to hang options off.

use std::io::Read;
use std::io::Write;

use clap::Parser;
use log::LevelFilter;
use simplelog::ColorChoice;
use simplelog::Config as LogConfig;
use simplelog::TermLogger;
use simplelog::TerminalMode;

use voronoi::config::BoundingBox;
use voronoi::delaunay::DelaunayTriangulation;
use voronoi::dump;
use voronoi::geometry::Point;
use voronoi::voronoi::extract;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Anchor (minimum corner) and side lengths of the bounding box, as
    /// six floats: anchor_x anchor_y anchor_z side_x side_y side_z.
    #[clap(long, num_args = 6, default_values_t = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0])]
    bbox: Vec<f64>,
    /// Verbosity, repeatable (-v, -vv, -vvv).
    #[clap(short, action = clap::ArgAction::Count)]
    verbosity: u8,
    /// Emit the `C` cell lines with the trailing face-count column.
    #[clap(long)]
    with_nface: bool,
    /// Store each face's ordered dual vertices for the `F` line.
    #[clap(long)]
    with_face_vertices: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbosity);

    let bbox = BoundingBox::new(
        Point::new(args.bbox[0], args.bbox[1], args.bbox[2]),
        Point::new(args.bbox[3], args.bbox[4], args.bbox[5]),
    );

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .expect("failed to read points from stdin");
    let coords: Vec<f64> = input
        .split_whitespace()
        .map(|tok| tok.parse().expect("expected a float per whitespace-separated token"))
        .collect();
    if coords.len() % 3 != 0 {
        eprintln!("expected a multiple of 3 floats (x y z per point), got {}", coords.len());
        std::process::exit(1);
    }

    let mut tri = DelaunayTriangulation::init(&bbox);
    for chunk in coords.chunks(3) {
        let p = Point::new(chunk[0], chunk[1], chunk[2]);
        if let Err(e) = tri.add_vertex(p) {
            eprintln!("failed to insert point {:?}: {e}", chunk);
            std::process::exit(1);
        }
    }
    tri.consolidate();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dump::write_mesh(&mut out, tri.mesh()).expect("failed to write mesh dump");

    match extract(&tri, args.with_face_vertices) {
        Ok(grid) => {
            dump::write_grid(&mut out, &grid, args.with_nface).expect("failed to write grid dump");
        }
        Err(e) => {
            eprintln!("voronoi extraction failed: {e}");
            std::process::exit(1);
        }
    }
    out.flush().expect("failed to flush stdout");
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("failed to initialize terminal logger");
}
