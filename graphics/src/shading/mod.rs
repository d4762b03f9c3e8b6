//! CPU reference implementations of the shader stages.
//!
//! Each program mirrors one [`ProgramId`](crate::program::ProgramId): it
//! fetches the attributes its vertex stage reads from a [`CpuMesh`], runs the
//! vertex stage per vertex and the fragment stage per interpolated varying.
//! The [`Framebuffer`](crate::raster::Framebuffer) drives them.

pub mod blob;
pub mod builtins;
pub mod diffuse;
pub mod rotation;

use glsandbox_core::math::{Vec2, Vec3, Vec4};
use glsandbox_core::mesh::{CpuMesh, VertexAttributeSemantic};

use crate::error::GraphicsError;
use crate::program::ProgramId;

pub use blob::{BlobParams, BlobProgram, BlobSettings, PassthroughVertex};
pub use diffuse::{
    Camera, DiffuseProgram, DiffuseUniforms, Light, LightInfo, Matrices, NormalVertex,
};
pub use rotation::{ColorVertex, RotationBlock, RotationProgram};

/// A value interpolated across a triangle.
pub trait Varying: Copy {
    /// Blend three values with barycentric weights summing to 1.
    fn blend(a: &Self, b: &Self, c: &Self, weights: [f32; 3]) -> Self;
}

impl Varying for f32 {
    fn blend(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self {
        a * w[0] + b * w[1] + c * w[2]
    }
}

macro_rules! impl_vector_varying {
    ($($ty:ty),*) => {
        $(
            impl Varying for $ty {
                fn blend(a: &Self, b: &Self, c: &Self, w: [f32; 3]) -> Self {
                    a * w[0] + b * w[1] + c * w[2]
                }
            }
        )*
    };
}

impl_vector_varying!(Vec2, Vec3, Vec4);

/// Result of the vertex stage for one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput<V> {
    /// Clip-space position (`gl_Position`).
    pub position: Vec4,
    /// Outputs passed to the fragment stage.
    pub varying: V,
}

/// A vertex + fragment stage pair executable on the CPU.
pub trait ShadingProgram {
    /// Attributes the vertex stage reads.
    type Vertex;
    /// Outputs interpolated between the stages.
    type Varying: Varying;

    /// The program this implementation mirrors.
    fn id(&self) -> ProgramId;

    /// Read the vertex stage's attributes from a mesh.
    fn fetch(&self, mesh: &CpuMesh) -> Result<Vec<Self::Vertex>, GraphicsError>;

    /// Run the vertex stage.
    fn vertex(&self, vertex: &Self::Vertex) -> VertexOutput<Self::Varying>;

    /// Run the fragment stage, returning `FragColor`.
    fn fragment(&self, varying: &Self::Varying) -> Vec4;
}

/// Read a float3 attribute, failing when the mesh does not provide it.
pub(crate) fn fetch_vec3(
    mesh: &CpuMesh,
    semantic: VertexAttributeSemantic,
) -> Result<Vec<Vec3>, GraphicsError> {
    let values = mesh.read_attribute::<3>(semantic).ok_or_else(|| {
        GraphicsError::InvalidParameter(format!(
            "mesh {:?} has no float3 {semantic:?} attribute",
            mesh.label().unwrap_or("<unnamed>")
        ))
    })?;
    Ok(values.into_iter().map(Vec3::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_vertex_weights() {
        let a = Vec3::new(1.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 1.0, 0.0);
        let c = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(Vec3::blend(&a, &b, &c, [1.0, 0.0, 0.0]), a);
        assert_eq!(Vec3::blend(&a, &b, &c, [0.0, 0.0, 1.0]), c);
        assert_eq!(f32::blend(&2.0, &4.0, &6.0, [0.5, 0.5, 0.0]), 3.0);
    }

    #[test]
    fn test_fetch_missing_attribute() {
        let mesh = glsandbox_core::mesh::generators::generate_blob_quad();
        let err = fetch_vec3(&mesh, VertexAttributeSemantic::Normal).unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidParameter(msg) if msg.contains("blob_quad")));
    }
}
