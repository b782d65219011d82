//! Simulation binary: drips water drops through a rock model.
//!
//! Usage: cargo run --release --bin simulate -- --input <FILE> [OPTIONS]
//!
//! Options:
//!   --input <FILE>       Model file to read (required)
//!   --output <FILE>      Model file to write (default: <input>.out.dtm)
//!   --config <FILE>      JSON simulation config; flags below override it
//!   --rounds <N>         Rounds to simulate (default: 1000)
//!   --frequency <N>      Spawn a drop every N rounds (default: 10)
//!   --drop-size <N>      Atoms per drop (default: 10)
//!   --seed <SEED>        Random seed (default: 24301)
//!   --slice <PLANE>      Plane to export, x:N, y:N or z:N (default: y at the middle)
//!   --progress <DIR>     Write a slice PNG into DIR every --every rounds
//!   --every <N>          Progress interval in rounds (default: 100)
//!   --stats <FILE>       Write the run statistics as JSON

use std::path::PathBuf;
use std::time::Instant;

use drop_tracer::core::{logging, Error, Result};
use drop_tracer::export::{check_plane, plane_to_text, write_plane_png, ProgressSnapshots};
use drop_tracer::simulation::{simulate, ProgressSink, SimulationConfig};
use drop_tracer::voxel::{read_model, write_model, Plane};

fn main() {
    logging::init_with_timestamps();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("simulate: {e}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let input = parse_str_arg(args, "--input")
        .map(PathBuf::from)
        .ok_or_else(|| Error::Config("--input <FILE> is required".into()))?;
    let output = parse_str_arg(args, "--output")
        .map(PathBuf::from)
        .unwrap_or_else(|| input.with_extension("out.dtm"));

    let mut config = match parse_str_arg(args, "--config") {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };
    config.rounds = parse_u32_arg(args, "--rounds").unwrap_or(config.rounds);
    config.drop_frequency = parse_u32_arg(args, "--frequency").unwrap_or(config.drop_frequency);
    config.drop_size = parse_u32_arg(args, "--drop-size").unwrap_or(config.drop_size);
    config.seed = parse_u64_arg(args, "--seed").unwrap_or(config.seed);

    let mut model = read_model(&input)?;
    let plane = match parse_str_arg(args, "--slice") {
        Some(s) => s.parse()?,
        None => Plane::Y(model.y_size() / 2),
    };
    check_plane(&model, plane)?;
    let mut snapshots = match parse_str_arg(args, "--progress") {
        Some(dir) => {
            let every = parse_u32_arg(args, "--every").unwrap_or(100);
            let template = PathBuf::from(dir).join("round_{round}.png");
            Some(ProgressSnapshots::new(every, plane, template.to_string_lossy())?)
        }
        None => None,
    };

    println!("=== Drop Tracer Simulation ===");
    println!("Model:  {} ({}x{}x{}, unit 1/{} m)", input.display(),
        model.x_size(), model.y_size(), model.z_size(), model.unit());
    println!("Rounds: {}, drop of {} every {} rounds", config.rounds, config.drop_size, config.drop_frequency);
    println!("Seed:   {}", config.seed);
    println!("Output: {}", output.display());
    println!();

    let start = Instant::now();
    let progress = snapshots.as_mut().map(|s| s as &mut dyn ProgressSink);
    let stats = simulate(&mut model, &config, progress)?;
    let elapsed = start.elapsed().as_secs_f64();

    write_model(&model, &output)?;
    write_plane_png(&model, plane, output.with_extension("png"))?;
    if log::log_enabled!(log::Level::Debug) {
        log::debug!("Final {:?} slice:\n{}", plane, plane_to_text(&model, plane));
    }

    let json = serde_json::to_string_pretty(&stats)?;
    if let Some(path) = parse_str_arg(args, "--stats") {
        std::fs::write(&path, &json)?;
        println!("Stats:  {}", path);
    }
    println!("{json}");
    println!("Done: {} rounds in {:.2}s ({:.0} rounds/sec)",
        stats.rounds, elapsed, stats.rounds as f64 / elapsed.max(1e-9));
    Ok(())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
