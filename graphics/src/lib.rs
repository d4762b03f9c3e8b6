//! # GLSL Sandbox Graphics
//!
//! Shader programs, their interface contracts and a CPU reference renderer.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`shader`] - GLSL stage sources, include composition and naga reflection
//! - [`program`] - Interface contracts, uniform values and std140 block layouts
//! - [`shading`] - CPU implementations of every vertex and fragment stage
//! - [`raster`] - Software rasterizer that runs a program into an image
//!
//! ## Example
//!
//! ```ignore
//! use glsandbox_graphics::{BlobParams, BlobProgram, Framebuffer, ProgramId};
//! use glsandbox_core::mesh::generators::generate_blob_quad;
//!
//! let program = BlobProgram::new(ProgramId::BlobBlock, BlobParams::default())?;
//! let mut fb = Framebuffer::new(512, 512, Vec4::new(0.0, 0.0, 0.0, 1.0))?;
//! fb.draw(&program, &generate_blob_quad())?;
//! fb.save_png("blob.png")?;
//! ```

pub mod error;
pub mod program;
pub mod raster;
pub mod shader;
pub mod shading;

// Re-export main types for convenience
pub use error::GraphicsError;
pub use program::{
    GlslType, ProgramContract, ProgramId, StageContract, UniformBlockLayout, UniformSet,
    UniformValue,
};
pub use raster::{DrawStats, Framebuffer};
pub use shader::{
    LoadedStage, ShaderComposer, ShaderLibrary, ShaderReflection, StageRegistry, StageSource,
};
pub use shading::{
    BlobParams, BlobProgram, Camera, DiffuseProgram, DiffuseUniforms, Light, RotationProgram,
    ShadingProgram,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// Logs the crate version and the interface of every program.
pub fn init() {
    log::info!("GLSL Sandbox Graphics v{} initialized", VERSION);
    for id in ProgramId::ALL {
        id.contract().log_interface();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_every_program_links() {
        for id in ProgramId::ALL {
            id.contract().validate_linkage().unwrap();
        }
    }
}
