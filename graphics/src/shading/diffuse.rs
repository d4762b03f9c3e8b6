//! Per-vertex diffuse lighting.
//!
//! The vertex stage computes a Lambertian intensity in eye space and the
//! fragment stage writes the interpolated intensity as an opaque color.

use glsandbox_core::math::{
    Mat3, Mat4, Vec3, Vec4, look_at_rh, mat3_to_std140_cols, mat4_to_cols_array_2d, normal_matrix,
    perspective_gl,
};
use glsandbox_core::mesh::{CpuMesh, VertexAttributeSemantic};

use crate::error::GraphicsError;
use crate::program::{GlslType, ProgramId, UniformSet, light_info_layout, matrices_layout};

use super::{ShadingProgram, VertexOutput, fetch_vec3};

/// Point light and surface reflectivity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Light position in eye coordinates.
    pub position: Vec4,
    /// Diffuse reflectivity.
    pub kd: Vec3,
    /// Light intensity.
    pub ld: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec4::new(5.0, 5.0, 2.0, 1.0),
            kd: Vec3::new(0.9, 0.5, 0.3),
            ld: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Perspective camera looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 2.0),
            target: Vec3::zeros(),
            up: Vec3::y(),
            fov_y_deg: 70.0,
            near: 0.3,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        look_at_rh(&self.eye, &self.target, &self.up)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        perspective_gl(self.fov_y_deg.to_radians(), aspect, self.near, self.far)
    }
}

/// Every uniform `diffuse.vert` reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffuseUniforms {
    pub model_view: Mat4,
    pub normal_matrix: Mat3,
    /// Declared by the stage, not used by its math.
    pub projection: Mat4,
    pub mvp: Mat4,
    pub light: Light,
}

impl DiffuseUniforms {
    /// Derive model-view, normal matrix and MVP from separate transforms.
    ///
    /// Fails when the model-view matrix has a singular upper 3x3, because no
    /// normal matrix exists for it.
    pub fn from_transforms(
        model: &Mat4,
        view: &Mat4,
        projection: &Mat4,
        light: Light,
    ) -> Result<Self, GraphicsError> {
        let model_view = view * model;
        let normal_matrix = normal_matrix(&model_view).ok_or_else(|| {
            GraphicsError::InvalidParameter(
                "model-view matrix is singular, no normal matrix exists".to_string(),
            )
        })?;
        Ok(Self {
            model_view,
            normal_matrix,
            projection: *projection,
            mvp: projection * model_view,
            light,
        })
    }

    /// Read every field from a uniform set.
    pub fn from_uniforms(uniforms: &UniformSet) -> Result<Self, GraphicsError> {
        let get = |name: &str, ty: GlslType| uniforms.require_typed(name, ty);
        let mat4 = |name: &str| -> Result<Mat4, GraphicsError> {
            get(name, GlslType::Mat4)?
                .as_mat4()
                .ok_or_else(|| GraphicsError::Internal(format!("{name} is not a mat4")))
        };
        let vec3 = |name: &str| -> Result<Vec3, GraphicsError> {
            get(name, GlslType::Vec3)?
                .as_vec3()
                .ok_or_else(|| GraphicsError::Internal(format!("{name} is not a vec3")))
        };

        Ok(Self {
            model_view: mat4("ModelViewMatrix")?,
            normal_matrix: get("NormalMatrix", GlslType::Mat3)?
                .as_mat3()
                .ok_or_else(|| GraphicsError::Internal("NormalMatrix is not a mat3".to_string()))?,
            projection: mat4("ProjectionMatrix")?,
            mvp: mat4("MVP")?,
            light: Light {
                position: get("LightPosition", GlslType::Vec4)?
                    .as_vec4()
                    .ok_or_else(|| {
                        GraphicsError::Internal("LightPosition is not a vec4".to_string())
                    })?,
                kd: vec3("Kd")?,
                ld: vec3("Ld")?,
            },
        })
    }

    /// Read both blocks from packed bytes.
    pub fn from_blocks(matrices: &[u8], light_info: &[u8]) -> Result<Self, GraphicsError> {
        let mut uniforms = UniformSet::new();
        for block in [
            matrices_layout().unpack(matrices)?,
            light_info_layout().unpack(light_info)?,
        ] {
            for (name, value) in block.iter() {
                uniforms.set(name, *value)?;
            }
        }
        Self::from_uniforms(&uniforms)
    }

    /// Write every field into a uniform set.
    pub fn write_uniforms(&self, uniforms: &mut UniformSet) -> Result<(), GraphicsError> {
        uniforms.set("ModelViewMatrix", self.model_view)?;
        uniforms.set("NormalMatrix", self.normal_matrix)?;
        uniforms.set("ProjectionMatrix", self.projection)?;
        uniforms.set("MVP", self.mvp)?;
        uniforms.set("LightPosition", self.light.position)?;
        uniforms.set("Kd", self.light.kd)?;
        uniforms.set("Ld", self.light.ld)
    }

    /// Typed std140 mirror of the `Matrices` block.
    pub fn matrices(&self) -> Matrices {
        Matrices {
            model_view: mat4_to_cols_array_2d(&self.model_view),
            normal_matrix: mat3_to_std140_cols(&self.normal_matrix),
            projection: mat4_to_cols_array_2d(&self.projection),
            mvp: mat4_to_cols_array_2d(&self.mvp),
        }
    }

    /// Typed std140 mirror of the `LightInfo` block.
    pub fn light_info(&self) -> LightInfo {
        LightInfo {
            light_position: self.light.position.into(),
            kd: self.light.kd.into(),
            _padding0: 0.0,
            ld: self.light.ld.into(),
            _padding1: 0.0,
        }
    }
}

/// std140 layout of the `Matrices` uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrices {
    pub model_view: [[f32; 4]; 4],
    /// mat3 columns, each padded to a vec4.
    pub normal_matrix: [[f32; 4]; 3],
    pub projection: [[f32; 4]; 4],
    pub mvp: [[f32; 4]; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<Matrices>(), 240);

/// std140 layout of the `LightInfo` uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightInfo {
    pub light_position: [f32; 4],
    pub kd: [f32; 3],
    pub _padding0: f32,
    pub ld: [f32; 3],
    pub _padding1: f32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<LightInfo>(), 48);

/// Lambertian term: `ld * kd * max(dot(s, normal), 0)` with `s` pointing
/// from the surface to the light. A light with `w = 0` is treated like any
/// other position.
pub fn diffuse_intensity(
    light_position: &Vec4,
    eye_coords: &Vec4,
    normal: &Vec3,
    kd: &Vec3,
    ld: &Vec3,
) -> Vec3 {
    let s = (light_position - eye_coords).xyz().normalize();
    ld.component_mul(kd) * s.dot(normal).max(0.0)
}

/// Attributes read by `diffuse.vert`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalVertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// `diffuse.vert` + `diffuse.frag`.
#[derive(Debug, Clone)]
pub struct DiffuseProgram {
    uniforms: DiffuseUniforms,
}

static_assertions::assert_impl_all!(DiffuseProgram: Send, Sync);

impl DiffuseProgram {
    pub fn new(uniforms: DiffuseUniforms) -> Self {
        Self { uniforms }
    }

    pub fn uniforms(&self) -> &DiffuseUniforms {
        &self.uniforms
    }
}

impl ShadingProgram for DiffuseProgram {
    type Vertex = NormalVertex;
    type Varying = Vec3;

    fn id(&self) -> ProgramId {
        ProgramId::Diffuse
    }

    fn fetch(&self, mesh: &CpuMesh) -> Result<Vec<NormalVertex>, GraphicsError> {
        let positions = fetch_vec3(mesh, VertexAttributeSemantic::Position)?;
        let normals = fetch_vec3(mesh, VertexAttributeSemantic::Normal)?;
        Ok(positions
            .into_iter()
            .zip(normals)
            .map(|(position, normal)| NormalVertex { position, normal })
            .collect())
    }

    fn vertex(&self, vertex: &NormalVertex) -> VertexOutput<Vec3> {
        let u = &self.uniforms;
        let position = vertex.position.push(1.0);
        let tnorm = (u.normal_matrix * vertex.normal).normalize();
        let eye_coords = u.model_view * position;
        let light = &u.light;
        VertexOutput {
            position: u.mvp * position,
            varying: diffuse_intensity(&light.position, &eye_coords, &tnorm, &light.kd, &light.ld),
        }
    }

    fn fragment(&self, intensity: &Vec3) -> Vec4 {
        intensity.push(1.0)
    }
}
