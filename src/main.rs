//! tsdf_mesher - Streaming isosurface extraction
//!
//! Reads a raw TSDF volume front to back and extracts its zero-level
//! surface as a triangle soup.

use std::path::PathBuf;
use std::process::ExitCode;

use tsdf_core::{Extractor, Mesh, RawScalarReader};
use tsdf_mesher::config::AppConfig;

fn print_usage(config: &AppConfig) {
    println!("Usage: tsdf_mesher [SOURCE_DIRECTORY]");
    println!(
        "  Reads {} from SOURCE_DIRECTORY (default: {})",
        config.input.file_name,
        config.input.source_directory.display()
    );
}

fn main() -> ExitCode {
    let loaded = AppConfig::load();
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    };

    // Initialize logging; RUST_LOG overrides the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();
    if let Err(e) = loaded {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }

    // Exactly one argument names the source directory; anything else falls
    // back to the configured one
    let args: Vec<String> = std::env::args().skip(1).collect();
    let explicit_source = args.len() == 1;
    match args.as_slice() {
        [dir] => config.input.source_directory = PathBuf::from(dir),
        _ => print_usage(&config),
    }

    let path = config.input.volume_path();
    let reader = match RawScalarReader::open(&path, config.input.byte_order) {
        Ok(reader) => reader,
        Err(e) if explicit_source => {
            log::error!("Cannot open {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            log::info!("No volume at {} ({}), nothing to do", path.display(), e);
            return ExitCode::SUCCESS;
        }
    };
    log::info!("Reading {}", path.display());

    let extractor = match Extractor::new(reader, config.extraction.to_settings()) {
        Ok(extractor) => extractor,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut mesh = Mesh::new();
    let stats = extractor.run(&mut mesh);

    println!("A total of {} cubes are processed", stats.cells_processed);
    println!("{} triangles", stats.triangles);
    if stats.missing_scalars > 0 {
        println!("{} samples missing from a short volume", stats.missing_scalars);
    }
    if let Some(bounds) = mesh.bounds() {
        println!(
            "Bounds: [{}, {}, {}] - [{}, {}, {}]",
            bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
        );
    }

    ExitCode::SUCCESS
}
