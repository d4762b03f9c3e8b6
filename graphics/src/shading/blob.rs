//! Pass-through vertex stage and radial blob fragment stage.
//!
//! Both blob binding variants run the same [`blob_color`]; they differ only in
//! how the parameters reach the program (loose uniforms or a std140 block).

use glsandbox_core::math::{Vec2, Vec3, Vec4};
use glsandbox_core::mesh::{CpuMesh, VertexAttributeSemantic};

use crate::error::GraphicsError;
use crate::program::{GlslType, ProgramId, UniformSet, blob_settings_layout};

use super::builtins::{mix_vec4, smoothstep};
use super::{ShadingProgram, VertexOutput, fetch_vec3};

/// Blob gradient parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobParams {
    /// Color at the center (`InnerColor`).
    pub inner_color: Vec4,
    /// Color outside the outer radius (`OuterColor`).
    pub outer_color: Vec4,
    /// Distance where the fade starts (`RadiusInner`).
    pub radius_inner: f32,
    /// Distance where the fade ends (`RadiusOuter`).
    pub radius_outer: f32,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            inner_color: Vec4::new(1.0, 1.0, 0.75, 1.0),
            outer_color: Vec4::new(0.0, 0.0, 0.0, 0.0),
            radius_inner: 0.25,
            radius_outer: 0.45,
        }
    }
}

impl BlobParams {
    /// Read the four blob uniforms from a set.
    pub fn from_uniforms(uniforms: &UniformSet) -> Result<Self, GraphicsError> {
        let vec4 = |name: &str| -> Result<Vec4, GraphicsError> {
            let value = uniforms.require_typed(name, GlslType::Vec4)?;
            value
                .as_vec4()
                .ok_or_else(|| GraphicsError::Internal(format!("{name} is not a vec4")))
        };
        let float = |name: &str| -> Result<f32, GraphicsError> {
            let value = uniforms.require_typed(name, GlslType::Float)?;
            value
                .as_float()
                .ok_or_else(|| GraphicsError::Internal(format!("{name} is not a float")))
        };
        Ok(Self {
            inner_color: vec4("InnerColor")?,
            outer_color: vec4("OuterColor")?,
            radius_inner: float("RadiusInner")?,
            radius_outer: float("RadiusOuter")?,
        })
    }

    /// Write the four blob uniforms into a set.
    pub fn write_uniforms(&self, uniforms: &mut UniformSet) -> Result<(), GraphicsError> {
        uniforms.set("InnerColor", self.inner_color)?;
        uniforms.set("OuterColor", self.outer_color)?;
        uniforms.set("RadiusInner", self.radius_inner)?;
        uniforms.set("RadiusOuter", self.radius_outer)
    }

    /// Typed std140 mirror of the parameters.
    pub fn settings(&self) -> BlobSettings {
        BlobSettings {
            inner_color: self.inner_color.into(),
            outer_color: self.outer_color.into(),
            radius_inner: self.radius_inner,
            radius_outer: self.radius_outer,
            _padding: [0.0; 2],
        }
    }
}

/// std140 layout of the `BlobSettings` uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlobSettings {
    pub inner_color: [f32; 4],
    pub outer_color: [f32; 4],
    pub radius_inner: f32,
    pub radius_outer: f32,
    pub _padding: [f32; 2],
}

static_assertions::const_assert_eq!(std::mem::size_of::<BlobSettings>(), 48);

impl From<BlobSettings> for BlobParams {
    fn from(s: BlobSettings) -> Self {
        Self {
            inner_color: s.inner_color.into(),
            outer_color: s.outer_color.into(),
            radius_inner: s.radius_inner,
            radius_outer: s.radius_outer,
        }
    }
}

/// Radial blob color at a texture coordinate.
///
/// Distance is measured from (0.5, 0.5); the color fades from inner to outer
/// between the two radii.
pub fn blob_color(uv: Vec2, params: &BlobParams) -> Vec4 {
    let dx = uv.x - 0.5;
    let dy = uv.y - 0.5;
    let dist = (dx * dx + dy * dy).sqrt();
    mix_vec4(
        &params.inner_color,
        &params.outer_color,
        smoothstep(params.radius_inner, params.radius_outer, dist),
    )
}

/// Attributes read by `passthrough.vert`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassthroughVertex {
    pub position: Vec3,
    pub tex_coord: Vec3,
}

/// Pass-through vertex stage.
pub fn passthrough(vertex: &PassthroughVertex) -> VertexOutput<Vec3> {
    VertexOutput {
        position: vertex.position.push(1.0),
        varying: vertex.tex_coord,
    }
}

/// `passthrough.vert` + one of the blob fragment stages.
#[derive(Debug, Clone)]
pub struct BlobProgram {
    id: ProgramId,
    params: BlobParams,
}

static_assertions::assert_impl_all!(BlobProgram: Send, Sync);

impl BlobProgram {
    /// Build from already-decoded parameters.
    pub fn new(id: ProgramId, params: BlobParams) -> Result<Self, GraphicsError> {
        if !matches!(id, ProgramId::BlobUniforms | ProgramId::BlobBlock) {
            return Err(GraphicsError::InvalidParameter(format!(
                "{} is not a blob program",
                id.name()
            )));
        }
        if params.radius_outer <= params.radius_inner {
            log::warn!(
                "Blob radii are degenerate (inner {}, outer {}), gradient becomes a hard edge or inverts",
                params.radius_inner,
                params.radius_outer
            );
        }
        Ok(Self { id, params })
    }

    /// Loose-uniform variant, parameters from individually bound uniforms.
    pub fn from_uniforms(uniforms: &UniformSet) -> Result<Self, GraphicsError> {
        Self::new(ProgramId::BlobUniforms, BlobParams::from_uniforms(uniforms)?)
    }

    /// Block variant, parameters from packed `BlobSettings` bytes.
    pub fn from_block(bytes: &[u8]) -> Result<Self, GraphicsError> {
        let uniforms = blob_settings_layout().unpack(bytes)?;
        Self::new(ProgramId::BlobBlock, BlobParams::from_uniforms(&uniforms)?)
    }

    pub fn params(&self) -> &BlobParams {
        &self.params
    }
}

impl ShadingProgram for BlobProgram {
    type Vertex = PassthroughVertex;
    type Varying = Vec3;

    fn id(&self) -> ProgramId {
        self.id
    }

    fn fetch(&self, mesh: &CpuMesh) -> Result<Vec<PassthroughVertex>, GraphicsError> {
        let positions = fetch_vec3(mesh, VertexAttributeSemantic::Position)?;
        let tex_coords = fetch_vec3(mesh, VertexAttributeSemantic::TexCoord0)?;
        Ok(positions
            .into_iter()
            .zip(tex_coords)
            .map(|(position, tex_coord)| PassthroughVertex {
                position,
                tex_coord,
            })
            .collect())
    }

    fn vertex(&self, vertex: &PassthroughVertex) -> VertexOutput<Vec3> {
        passthrough(vertex)
    }

    fn fragment(&self, tex_coord: &Vec3) -> Vec4 {
        blob_color(tex_coord.xy(), &self.params)
    }
}
