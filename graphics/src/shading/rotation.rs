//! Rotation vertex stage and vertex-color fragment stage.

use glsandbox_core::math::{Mat4, Vec3, Vec4, mat4_to_cols_array_2d, rotation_z};
use glsandbox_core::mesh::{CpuMesh, VertexAttributeSemantic};

use crate::error::GraphicsError;
use crate::program::{GlslType, ProgramId, UniformSet, rotation_block_layout};

use super::{ShadingProgram, VertexOutput, fetch_vec3};

/// std140 layout of the `RotationBlock` uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RotationBlock {
    pub rotation_matrix: [[f32; 4]; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<RotationBlock>(), 64);

/// Attributes read by `rotation.vert`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorVertex {
    pub position: Vec3,
    pub color: Vec3,
}

/// `rotation.vert` + `vertex_color.frag`.
#[derive(Debug, Clone)]
pub struct RotationProgram {
    rotation: Mat4,
}

static_assertions::assert_impl_all!(RotationProgram: Send, Sync);

impl RotationProgram {
    pub fn new(rotation: Mat4) -> Self {
        Self { rotation }
    }

    /// Rotation about the Z axis by `angle_deg` degrees.
    pub fn with_angle(angle_deg: f32) -> Self {
        Self::new(rotation_z(angle_deg))
    }

    /// Read `RotationMatrix` from a uniform set.
    pub fn from_uniforms(uniforms: &UniformSet) -> Result<Self, GraphicsError> {
        let value = uniforms.require_typed("RotationMatrix", GlslType::Mat4)?;
        value
            .as_mat4()
            .map(Self::new)
            .ok_or_else(|| GraphicsError::Internal("RotationMatrix is not a mat4".to_string()))
    }

    /// Read `RotationMatrix` from packed `RotationBlock` bytes.
    pub fn from_block(bytes: &[u8]) -> Result<Self, GraphicsError> {
        Self::from_uniforms(&rotation_block_layout().unpack(bytes)?)
    }

    pub fn rotation(&self) -> &Mat4 {
        &self.rotation
    }

    /// Typed std140 mirror of the rotation.
    pub fn block(&self) -> RotationBlock {
        RotationBlock {
            rotation_matrix: mat4_to_cols_array_2d(&self.rotation),
        }
    }
}

impl ShadingProgram for RotationProgram {
    type Vertex = ColorVertex;
    type Varying = Vec3;

    fn id(&self) -> ProgramId {
        ProgramId::RotatingTriangle
    }

    fn fetch(&self, mesh: &CpuMesh) -> Result<Vec<ColorVertex>, GraphicsError> {
        let positions = fetch_vec3(mesh, VertexAttributeSemantic::Position)?;
        let colors = fetch_vec3(mesh, VertexAttributeSemantic::Color)?;
        Ok(positions
            .into_iter()
            .zip(colors)
            .map(|(position, color)| ColorVertex { position, color })
            .collect())
    }

    fn vertex(&self, vertex: &ColorVertex) -> VertexOutput<Vec3> {
        VertexOutput {
            position: self.rotation * vertex.position.push(1.0),
            varying: vertex.color,
        }
    }

    fn fragment(&self, color: &Vec3) -> Vec4 {
        color.push(1.0)
    }
}
