//! Command-line arguments for `shading_demo`.

use std::path::PathBuf;

use clap::Parser;
use glsandbox_graphics::ProgramId;

/// Program to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliProgram {
    /// Radial blob, parameters bound as loose uniforms.
    BlobUniforms,
    /// Radial blob, parameters bound as a std140 block.
    #[default]
    BlobBlock,
    /// Vertex-colored triangle rotated about Z.
    RotatingTriangle,
    /// Per-vertex diffuse lighting.
    Diffuse,
}

impl From<CliProgram> for ProgramId {
    fn from(program: CliProgram) -> Self {
        match program {
            CliProgram::BlobUniforms => ProgramId::BlobUniforms,
            CliProgram::BlobBlock => ProgramId::BlobBlock,
            CliProgram::RotatingTriangle => ProgramId::RotatingTriangle,
            CliProgram::Diffuse => ProgramId::Diffuse,
        }
    }
}

/// Mesh lit by the diffuse program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliMesh {
    #[default]
    Torus,
    Sphere,
}

/// Render one sandbox program to a PNG file.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "shading_demo",
    about = "Render a GLSL sandbox program with the CPU reference renderer",
    long_about = "Runs the CPU implementation of a shader program over its mesh and \
        writes the result as a PNG.\n\n\
        EXAMPLES:\n\
          # Blob through the uniform block path\n\
          ./shading_demo --program blob-block\n\
        \n\
          # Triangle rotated by 30 degrees\n\
          ./shading_demo --program rotating-triangle --angle 30\n\
        \n\
          # Lit torus, printing the GLSL a GL driver would receive\n\
          ./shading_demo --program diffuse --print-source\n\
        \n\
          # Check edited stage files before handing them to a driver\n\
          ./shading_demo --program blob-block --shader-dir ./shaders",
    version
)]
pub struct DemoArgs {
    /// Program to render.
    #[arg(long, default_value = "blob-block", value_enum)]
    pub program: CliProgram,

    /// Mesh for the diffuse program.
    #[arg(long, default_value = "torus", value_enum)]
    pub mesh: CliMesh,

    /// Image width in pixels.
    #[arg(long, default_value = "1024")]
    pub width: u32,

    /// Image height in pixels.
    #[arg(long, default_value = "768")]
    pub height: u32,

    /// Triangle rotation about Z, in degrees.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub angle: f32,

    /// Model rotation about X for the diffuse program, in degrees.
    #[arg(long, default_value_t = -35.0, allow_negative_numbers = true)]
    pub angle_x: f32,

    /// Model rotation about Y for the diffuse program, in degrees.
    #[arg(long, default_value_t = 35.0, allow_negative_numbers = true)]
    pub angle_y: f32,

    /// Output file. Defaults to `<program>.png`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print both stages with includes resolved.
    #[arg(long)]
    pub print_source: bool,

    /// Load the program's stage files from this directory instead of the
    /// built-in copies and check them against the program interface.
    #[arg(long, value_name = "DIR")]
    pub shader_dir: Option<PathBuf>,
}

impl DemoArgs {
    pub fn program_id(&self) -> ProgramId {
        self.program.into()
    }

    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.png", self.program_id().name())))
    }
}
