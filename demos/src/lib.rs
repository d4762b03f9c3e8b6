//! # GLSL Sandbox Demos
//!
//! Command-line renders of the sandbox programs.
//!
//! ## Available Demos
//!
//! - `shading_demo` - Render any program to a PNG with the CPU reference renderer

pub mod args;
pub mod scene;

pub use args::{CliMesh, CliProgram, DemoArgs};

/// Demos library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
