//! halfedit CLI - runs the editing kernel's global algorithms on built-in
//! shapes and reports what happened.
//!
//! Usage: halfedit <COMMAND> [OPTIONS]
//!
//! Run `halfedit --help` for available commands. Set `RUST_LOG=debug` to see
//! per-round statistics from the algorithms.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};

use halfedit::algo::remesh::{isotropic_remesh_with_progress, RemeshOptions};
use halfedit::algo::simplify::{simplify_with_progress, SimplifyOptions};
use halfedit::algo::subdivide::{loop_subdivide_with_progress, subdivide_with_progress, SubdivideOptions, SubdivisionScheme};
use halfedit::algo::{triangulate::triangulate, Progress};
use halfedit::mesh::{primitives, HalfEdgeMesh};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "halfedit")]
#[command(author, version, about = "Half-edge mesh editing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct ShapeArgs {
    /// Built-in shape to start from
    #[arg(short, long, value_enum, default_value = "icosahedron")]
    shape: Shape,

    /// Cells per side for the grid shapes
    #[arg(long, default_value = "8")]
    size: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        #[command(flatten)]
        shape: ShapeArgs,
    },

    /// Subdivide a mesh
    Subdivide {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Subdivision method
        #[arg(short, long, value_enum, default_value = "loop")]
        method: SubdivideMethod,

        /// Number of subdivision iterations
        #[arg(short, long, default_value = "1")]
        iterations: usize,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Simplify a triangle mesh with quadric error metrics
    Simplify {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Number of edge collapses (default: a quarter of the faces)
        #[arg(short, long)]
        deletions: Option<usize>,

        /// Stop once the cheapest collapse exceeds this error
        #[arg(long)]
        max_error: Option<f64>,

        /// Allow boundary vertices to move
        #[arg(long)]
        collapse_boundary: bool,
    },

    /// Remesh towards a uniform edge length
    Remesh {
        #[command(flatten)]
        shape: ShapeArgs,

        /// Target edge length (default: average edge length)
        #[arg(short = 'l', long)]
        target_length: Option<f64>,

        /// Number of iterations
        #[arg(short, long, default_value = "5")]
        iterations: usize,

        /// Allow boundary edges to be split and collapsed
        #[arg(long)]
        move_boundary: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Split every polygon into triangles
    Triangulate {
        #[command(flatten)]
        shape: ShapeArgs,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Shape {
    Tetrahedron,
    Cube,
    Icosahedron,
    /// Flat triangle grid with one boundary loop
    Grid,
    /// Flat quad grid with one boundary loop
    QuadGrid,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SubdivideMethod {
    /// Loop subdivision (triangle meshes)
    Loop,
    /// Catmull-Clark subdivision (closed meshes)
    CatmullClark,
    /// Linear subdivision into quads
    Linear,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult {
    match cli.command {
        Commands::Info { shape } => cmd_info(shape),
        Commands::Subdivide {
            shape,
            method,
            iterations,
            sequential,
        } => cmd_subdivide(shape, method, iterations, sequential),
        Commands::Simplify {
            shape,
            deletions,
            max_error,
            collapse_boundary,
        } => cmd_simplify(shape, deletions, max_error, collapse_boundary),
        Commands::Remesh {
            shape,
            target_length,
            iterations,
            move_boundary,
            sequential,
        } => cmd_remesh(shape, target_length, iterations, move_boundary, sequential),
        Commands::Triangulate { shape } => cmd_triangulate(shape),
    }
}

fn build(args: ShapeArgs) -> Result<HalfEdgeMesh, halfedit::error::MeshError> {
    match args.shape {
        Shape::Tetrahedron => primitives::tetrahedron(),
        Shape::Cube => primitives::cube(),
        Shape::Icosahedron => primitives::icosahedron(),
        Shape::Grid => primitives::triangle_grid(args.size),
        Shape::QuadGrid => primitives::quad_grid(args.size),
    }
}

/// Create a progress reporter that draws a bar on stderr.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }
        let percent = if current >= total {
            100
        } else {
            (current * 100 + total / 2) / total
        };

        // Sub-step updates may arrive out of order; only ever move forward.
        let previous = max_percent.fetch_max(percent, Ordering::Relaxed);
        if percent <= previous && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = percent * bar_width / 100;
        eprint!("\r[{}{}] {:3}% {}", "=".repeat(filled), " ".repeat(bar_width - filled), percent, message);
        let _ = std::io::stderr().flush();
        if current >= total {
            eprintln!();
        }
    })
}

fn summary(label: &str, mesh: &HalfEdgeMesh) {
    println!(
        "{label}: {} vertices, {} edges, {} faces, {} boundary loop(s)",
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_faces(),
        mesh.num_boundary_loops()
    );
}

fn report_validity(mesh: &mut HalfEdgeMesh) {
    match mesh.validate() {
        Ok(()) => println!("Validation: ok"),
        Err(e) => println!("Validation: FAILED ({e})"),
    }
}

fn cmd_info(args: ShapeArgs) -> CliResult {
    let mut mesh = build(args)?;

    summary("Mesh", &mesh);
    println!("Half-edges: {}", mesh.num_halfedges());
    println!("Euler characteristic: {}", mesh.euler_characteristic());
    println!("Surface area: {:.6}", mesh.surface_area());
    println!("Average edge length: {:.6}", mesh.mean_edge_length());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    match mesh.first_non_triangle() {
        None => println!("Mesh type: Triangle mesh"),
        Some((face, degree)) => println!("Mesh type: Polygon mesh (first non-triangle {face} has {degree} sides)"),
    }

    report_validity(&mut mesh);
    Ok(())
}

fn cmd_subdivide(args: ShapeArgs, method: SubdivideMethod, iterations: usize, sequential: bool) -> CliResult {
    let mut mesh = build(args)?;
    summary("Loaded", &mesh);

    let options = SubdivideOptions::new(iterations).with_parallel(!sequential);
    let mode = if sequential { "sequential" } else { "parallel" };
    let progress = create_progress();

    let start = Instant::now();
    match method {
        SubdivideMethod::Loop => {
            println!("Applying Loop subdivision ({} iterations, {})...", iterations, mode);
            loop_subdivide_with_progress(&mut mesh, &options, &progress)?;
        }
        SubdivideMethod::CatmullClark => {
            println!("Applying Catmull-Clark subdivision ({} iterations, {})...", iterations, mode);
            subdivide_with_progress(&mut mesh, SubdivisionScheme::CatmullClark, &options, &progress)?;
        }
        SubdivideMethod::Linear => {
            println!("Applying linear subdivision ({} iterations, {})...", iterations, mode);
            subdivide_with_progress(&mut mesh, SubdivisionScheme::Linear, &options, &progress)?;
        }
    }
    let elapsed = start.elapsed();

    summary("Result", &mesh);
    println!("Time: {:.2?}", elapsed);
    report_validity(&mut mesh);
    Ok(())
}

fn cmd_simplify(args: ShapeArgs, deletions: Option<usize>, max_error: Option<f64>, collapse_boundary: bool) -> CliResult {
    let mut mesh = build(args)?;
    summary("Loaded", &mesh);

    let mut options = SimplifyOptions {
        deletions,
        ..SimplifyOptions::default()
    }
    .with_preserve_boundary(!collapse_boundary);
    if let Some(max_error) = max_error {
        options = options.with_max_error(max_error);
    }
    println!(
        "Simplifying with {} collapses...",
        options.compute_deletions(mesh.num_faces())
    );

    let progress = create_progress();
    let start = Instant::now();
    let collapsed = simplify_with_progress(&mut mesh, &options, &progress)?;
    let elapsed = start.elapsed();

    println!("Collapsed {} edges", collapsed);
    summary("Result", &mesh);
    println!("Time: {:.2?}", elapsed);
    report_validity(&mut mesh);
    Ok(())
}

fn cmd_remesh(
    args: ShapeArgs,
    target_length: Option<f64>,
    iterations: usize,
    move_boundary: bool,
    sequential: bool,
) -> CliResult {
    let mut mesh = build(args)?;
    summary("Loaded", &mesh);

    let avg_edge = mesh.mean_edge_length();
    let target = target_length.unwrap_or(avg_edge);
    println!("Current average edge length: {:.6}", avg_edge);
    println!("Target edge length: {:.6}", target);

    let mode = if sequential { "sequential" } else { "parallel" };
    let options = RemeshOptions::with_target_length(target)
        .with_iterations(iterations)
        .with_preserve_boundary(!move_boundary)
        .with_parallel(!sequential);
    let progress = create_progress();

    println!("Applying isotropic remeshing ({} iterations, {})...", iterations, mode);
    let start = Instant::now();
    isotropic_remesh_with_progress(&mut mesh, &options, &progress)?;
    let elapsed = start.elapsed();

    summary("Result", &mesh);
    println!("Average edge length: {:.6}", mesh.mean_edge_length());
    println!("Time: {:.2?}", elapsed);
    report_validity(&mut mesh);
    Ok(())
}

fn cmd_triangulate(args: ShapeArgs) -> CliResult {
    let mut mesh = build(args)?;
    summary("Loaded", &mesh);

    let added = triangulate(&mut mesh);

    println!("Added {} faces", added);
    summary("Result", &mesh);
    report_validity(&mut mesh);
    Ok(())
}
