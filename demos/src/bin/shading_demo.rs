//! # Shading Demo
//!
//! Renders one sandbox program and writes it as a PNG:
//! - `blob-uniforms` / `blob-block` - radial blob on a full-screen quad
//! - `rotating-triangle` - vertex-colored triangle rotated about Z
//! - `diffuse` - torus or sphere with per-vertex diffuse lighting

use std::process::ExitCode;

use clap::Parser;
use glsandbox_demos::DemoArgs;
use glsandbox_demos::scene::{render, resolved_sources};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    glsandbox_core::init();
    glsandbox_graphics::init();

    let args = DemoArgs::parse();

    if args.print_source || args.shader_dir.is_some() {
        match resolved_sources(&args) {
            Ok(stages) if args.print_source => {
                for (path, source) in stages {
                    println!("// ---- {path} ----\n{source}");
                }
            }
            Ok(_) => log::info!("Stage files match the {} interface", args.program_id().name()),
            Err(e) => {
                log::error!("Failed to load shader sources: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let output = args.output_path();
    let result = render(&args).and_then(|(fb, _)| fb.save_png(&output));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Failed to render {}: {e}", args.program_id().name());
            ExitCode::FAILURE
        }
    }
}
