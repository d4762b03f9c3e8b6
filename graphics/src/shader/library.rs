//! Built-in GLSL sources.
//!
//! Include modules and stage files live under `shaders/` at the workspace
//! root and are embedded at compile time.
//!
//! | Include path             | Provides                 |
//! |--------------------------|--------------------------|
//! | `sandbox/blob.glsl`      | `blob_color(...)`        |
//! | `sandbox/lighting.glsl`  | `diffuse_intensity(...)` |

use crate::program::ShaderStage;

// =============================================================================
// Include modules
// =============================================================================

/// Radial blob gradient shared by both blob fragment stages.
const BLOB_MODULE: &str = include_str!("../../../shaders/library/blob.glsl");

/// Lambertian diffuse term.
const LIGHTING_MODULE: &str = include_str!("../../../shaders/library/lighting.glsl");

// =============================================================================
// Stage files
// =============================================================================

const PASSTHROUGH_VERT: &str = include_str!("../../../shaders/passthrough.vert");
const ROTATION_VERT: &str = include_str!("../../../shaders/rotation.vert");
const VERTEX_COLOR_FRAG: &str = include_str!("../../../shaders/vertex_color.frag");
const BLOB_UNIFORMS_FRAG: &str = include_str!("../../../shaders/blob_uniforms.frag");
const BLOB_BLOCK_FRAG: &str = include_str!("../../../shaders/blob_block.frag");
const DIFFUSE_VERT: &str = include_str!("../../../shaders/diffuse.vert");
const DIFFUSE_FRAG: &str = include_str!("../../../shaders/diffuse.frag");

/// One of the embedded shader stage files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageSource {
    /// Forwards position and texture coordinate.
    PassthroughVert,
    /// Rotates position, forwards vertex color.
    RotationVert,
    /// Writes the interpolated color.
    VertexColorFrag,
    /// Blob gradient from four loose uniforms.
    BlobUniformsFrag,
    /// Blob gradient from the `BlobSettings` block.
    BlobBlockFrag,
    /// Per-vertex diffuse lighting.
    DiffuseVert,
    /// Writes the interpolated light intensity.
    DiffuseFrag,
}

impl StageSource {
    /// Every stage file.
    pub const ALL: [StageSource; 7] = [
        Self::PassthroughVert,
        Self::RotationVert,
        Self::VertexColorFrag,
        Self::BlobUniformsFrag,
        Self::BlobBlockFrag,
        Self::DiffuseVert,
        Self::DiffuseFrag,
    ];

    /// File path relative to `shaders/`.
    pub fn path(self) -> &'static str {
        match self {
            Self::PassthroughVert => "passthrough.vert",
            Self::RotationVert => "rotation.vert",
            Self::VertexColorFrag => "vertex_color.frag",
            Self::BlobUniformsFrag => "blob_uniforms.frag",
            Self::BlobBlockFrag => "blob_block.frag",
            Self::DiffuseVert => "diffuse.vert",
            Self::DiffuseFrag => "diffuse.frag",
        }
    }

    /// Pipeline stage this file is compiled for.
    pub fn stage(self) -> ShaderStage {
        match self {
            Self::PassthroughVert | Self::RotationVert | Self::DiffuseVert => ShaderStage::Vertex,
            Self::VertexColorFrag
            | Self::BlobUniformsFrag
            | Self::BlobBlockFrag
            | Self::DiffuseFrag => ShaderStage::Fragment,
        }
    }

    /// GLSL source text, with `#include` directives unresolved.
    pub fn source(self) -> &'static str {
        match self {
            Self::PassthroughVert => PASSTHROUGH_VERT,
            Self::RotationVert => ROTATION_VERT,
            Self::VertexColorFrag => VERTEX_COLOR_FRAG,
            Self::BlobUniformsFrag => BLOB_UNIFORMS_FRAG,
            Self::BlobBlockFrag => BLOB_BLOCK_FRAG,
            Self::DiffuseVert => DIFFUSE_VERT,
            Self::DiffuseFrag => DIFFUSE_FRAG,
        }
    }

    /// Whether naga's GLSL front end can parse this stage.
    ///
    /// Loose non-opaque uniforms are an OpenGL-only feature that naga does
    /// not accept, so the loose-uniform blob stage is checked textually.
    pub fn naga_compatible(self) -> bool {
        !matches!(self, Self::BlobUniformsFrag)
    }
}

// =============================================================================
// ShaderLibrary
// =============================================================================

/// Collection of shader modules that can be included.
pub struct ShaderLibrary {
    modules: Vec<(&'static str, &'static str)>,
}

impl ShaderLibrary {
    /// Create the standard sandbox library.
    ///
    /// - `sandbox/blob.glsl` - radial blob gradient
    /// - `sandbox/lighting.glsl` - diffuse lighting term
    pub fn standard() -> Self {
        Self {
            modules: vec![
                ("sandbox/blob.glsl", BLOB_MODULE),
                ("sandbox/lighting.glsl", LIGHTING_MODULE),
            ],
        }
    }

    /// Create an empty library.
    pub fn empty() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    /// Iterate over `(include path, source)` pairs.
    pub fn modules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.modules.iter().copied()
    }

    /// Add a custom module.
    pub fn with_module(mut self, name: &'static str, source: &'static str) -> Self {
        self.modules.push((name, source));
        self
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::standard()
    }
}
