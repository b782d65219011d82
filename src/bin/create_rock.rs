//! Rock generator binary: writes a cracked rock slab model to disk.
//!
//! Usage: cargo run --release --bin create_rock -- [OPTIONS]
//!
//! Options:
//!   --config <FILE>     JSON rock config; flags below override it
//!   --style <STYLE>     simple | fractal (default: simple)
//!   --direction <D>     y | x, axis the main crack runs along (default: y)
//!   --width <N>         Crack width in cells (default: 4)
//!   --growth <N>        Narrowing steps of a non-uniform crack (default: 5)
//!   --non-uniform       Let the crack narrow towards its ends
//!   --cave              Carve a cave tunnel below the slab
//!   --unit <N>          Units per meter (default: 1000)
//!   --x/--y/--z <N>     Model size in cells (default: 64)
//!   --seed <SEED>       Random seed (default: 1)
//!   --slice <PLANE>     Also write a PNG of x:N, y:N or z:N next to the model
//!   --output <FILE>     Model file (default: rock.dtm)

use std::path::PathBuf;
use std::time::Instant;

use drop_tracer::core::{logging, Error, Result};
use drop_tracer::export::write_plane_png;
use drop_tracer::generation::{generate_rock, RockConfig};
use drop_tracer::voxel::{write_model, Plane};

fn main() {
    logging::init_with_timestamps();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("create_rock: {e}");
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let mut config = match parse_str_arg(args, "--config") {
        Some(path) => RockConfig::from_json_file(path)?,
        None => RockConfig::default(),
    };
    if let Some(style) = parse_str_arg(args, "--style") {
        config.style = parse_enum(&style, "style")?;
    }
    if let Some(direction) = parse_str_arg(args, "--direction") {
        config.direction = parse_enum(&direction, "direction")?;
    }
    config.crack_width = parse_u32_arg(args, "--width").unwrap_or(config.crack_width);
    config.crack_growth_steps = parse_u32_arg(args, "--growth").unwrap_or(config.crack_growth_steps);
    config.unit = parse_u32_arg(args, "--unit").unwrap_or(config.unit);
    config.x_size = parse_u32_arg(args, "--x").unwrap_or(config.x_size);
    config.y_size = parse_u32_arg(args, "--y").unwrap_or(config.y_size);
    config.z_size = parse_u32_arg(args, "--z").unwrap_or(config.z_size);
    config.seed = parse_u64_arg(args, "--seed").unwrap_or(config.seed);
    if has_flag(args, "--non-uniform") {
        config.uniform = false;
    }
    if has_flag(args, "--cave") {
        config.cave = true;
    }
    let slice: Option<Plane> = parse_str_arg(args, "--slice").map(|s| s.parse()).transpose()?;
    let output = PathBuf::from(parse_str_arg(args, "--output").unwrap_or_else(|| "rock.dtm".to_string()));

    println!("=== Drop Tracer Rock Generator ===");
    println!("Size:   {}x{}x{} cells, unit 1/{} m", config.x_size, config.y_size, config.z_size, config.unit);
    println!("Crack:  {:?} along {:?}, width {}{}", config.style, config.direction, config.crack_width,
        if config.uniform { "" } else { " (narrowing)" });
    println!("Cave:   {}", if config.cave { "yes" } else { "no" });
    println!("Seed:   {}", config.seed);
    println!("Output: {}", output.display());
    println!();

    let start = Instant::now();
    let model = generate_rock(&config)?;
    write_model(&model, &output)?;

    if let Some(plane) = slice {
        let png = output.with_extension("png");
        write_plane_png(&model, plane, &png)?;
        println!("Slice:  {}", png.display());
    }

    println!("Done in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn parse_enum<T: serde::de::DeserializeOwned>(value: &str, what: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| Error::Config(format!("unknown {what} {value:?}")))
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
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

