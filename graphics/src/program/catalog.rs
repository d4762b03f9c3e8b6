//! The sandbox's shading programs and their contracts.

use glsandbox_core::mesh::VertexAttributeSemantic;

use crate::shader::StageSource;

use super::block::UniformBlockLayout;
use super::contract::{InterfaceVariable, ProgramContract, StageContract};
use super::uniforms::GlslType;

/// Attribute location of the vertex position in every vertex stage.
pub const POSITION_LOCATION: u32 = 0;
/// Attribute location of the second attribute (texcoord, color or normal).
pub const SECONDARY_LOCATION: u32 = 1;

/// Identifies one of the linkable programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramId {
    /// Pass-through quad + blob gradient from loose uniforms.
    BlobUniforms,
    /// Pass-through quad + blob gradient from a uniform block.
    BlobBlock,
    /// Rotated triangle with interpolated vertex colors.
    RotatingTriangle,
    /// Per-vertex diffuse lighting.
    Diffuse,
}

impl ProgramId {
    /// Every program.
    pub const ALL: [ProgramId; 4] = [
        Self::BlobUniforms,
        Self::BlobBlock,
        Self::RotatingTriangle,
        Self::Diffuse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::BlobUniforms => "blob_uniforms",
            Self::BlobBlock => "blob_block",
            Self::RotatingTriangle => "rotating_triangle",
            Self::Diffuse => "diffuse",
        }
    }

    /// Build the program's contract.
    pub fn contract(self) -> ProgramContract {
        let (vertex, fragment) = match self {
            Self::BlobUniforms => (passthrough_vertex(), blob_uniforms_fragment()),
            Self::BlobBlock => (passthrough_vertex(), blob_block_fragment()),
            Self::RotatingTriangle => (rotation_vertex(), vertex_color_fragment()),
            Self::Diffuse => (diffuse_vertex(), diffuse_fragment()),
        };
        ProgramContract {
            name: self.name(),
            vertex,
            fragment,
        }
    }
}

// ============================================================================
// Uniform blocks
// ============================================================================

/// `BlobSettings` block read by `blob_block.frag`.
pub fn blob_settings_layout() -> UniformBlockLayout {
    UniformBlockLayout::new("BlobSettings", 0)
        .with_field("InnerColor", GlslType::Vec4)
        .with_field("OuterColor", GlslType::Vec4)
        .with_field("RadiusInner", GlslType::Float)
        .with_field("RadiusOuter", GlslType::Float)
}

/// `RotationBlock` block read by `rotation.vert`.
pub fn rotation_block_layout() -> UniformBlockLayout {
    UniformBlockLayout::new("RotationBlock", 0).with_field("RotationMatrix", GlslType::Mat4)
}

/// `Matrices` block read by `diffuse.vert`.
pub fn matrices_layout() -> UniformBlockLayout {
    UniformBlockLayout::new("Matrices", 0)
        .with_field("ModelViewMatrix", GlslType::Mat4)
        .with_field("NormalMatrix", GlslType::Mat3)
        .with_field("ProjectionMatrix", GlslType::Mat4)
        .with_field("MVP", GlslType::Mat4)
}

/// `LightInfo` block read by `diffuse.vert`.
pub fn light_info_layout() -> UniformBlockLayout {
    UniformBlockLayout::new("LightInfo", 1)
        .with_field("LightPosition", GlslType::Vec4)
        .with_field("Kd", GlslType::Vec3)
        .with_field("Ld", GlslType::Vec3)
}

// ============================================================================
// Stages
// ============================================================================

fn position_attribute() -> InterfaceVariable {
    InterfaceVariable::attribute(
        POSITION_LOCATION,
        "VertexPosition",
        GlslType::Vec3,
        VertexAttributeSemantic::Position,
    )
}

fn frag_color() -> InterfaceVariable {
    InterfaceVariable::new(0, "FragColor", GlslType::Vec4)
}

fn tex_coord_varying() -> InterfaceVariable {
    InterfaceVariable::new(0, "TexCoord", GlslType::Vec3)
}

fn passthrough_vertex() -> StageContract {
    StageContract::new(StageSource::PassthroughVert)
        .with_input(position_attribute())
        .with_input(InterfaceVariable::attribute(
            SECONDARY_LOCATION,
            "VertexTexCoord",
            GlslType::Vec3,
            VertexAttributeSemantic::TexCoord0,
        ))
        .with_output(tex_coord_varying())
}

fn blob_uniforms_fragment() -> StageContract {
    StageContract::new(StageSource::BlobUniformsFrag)
        .with_input(tex_coord_varying())
        .with_output(frag_color())
        .with_uniform(0, "InnerColor", GlslType::Vec4)
        .with_uniform(1, "OuterColor", GlslType::Vec4)
        .with_uniform(2, "RadiusInner", GlslType::Float)
        .with_uniform(3, "RadiusOuter", GlslType::Float)
}

fn blob_block_fragment() -> StageContract {
    StageContract::new(StageSource::BlobBlockFrag)
        .with_input(tex_coord_varying())
        .with_output(frag_color())
        .with_block(blob_settings_layout())
}

fn rotation_vertex() -> StageContract {
    StageContract::new(StageSource::RotationVert)
        .with_input(position_attribute())
        .with_input(InterfaceVariable::attribute(
            SECONDARY_LOCATION,
            "VertexColor",
            GlslType::Vec3,
            VertexAttributeSemantic::Color,
        ))
        .with_output(InterfaceVariable::new(0, "Color", GlslType::Vec3))
        .with_block(rotation_block_layout())
}

fn vertex_color_fragment() -> StageContract {
    StageContract::new(StageSource::VertexColorFrag)
        .with_input(InterfaceVariable::new(0, "Color", GlslType::Vec3))
        .with_output(frag_color())
}

fn diffuse_vertex() -> StageContract {
    StageContract::new(StageSource::DiffuseVert)
        .with_input(position_attribute())
        .with_input(InterfaceVariable::attribute(
            SECONDARY_LOCATION,
            "VertexNormal",
            GlslType::Vec3,
            VertexAttributeSemantic::Normal,
        ))
        .with_output(InterfaceVariable::new(0, "LightIntensity", GlslType::Vec3))
        .with_block(matrices_layout())
        .with_block(light_info_layout())
}

fn diffuse_fragment() -> StageContract {
    StageContract::new(StageSource::DiffuseFrag)
        .with_input(InterfaceVariable::new(0, "LightIntensity", GlslType::Vec3))
        .with_output(frag_color())
}

#[cfg(test)]
mod tests {
    use glsandbox_core::mesh::generators::{
        generate_blob_quad, generate_color_triangle, generate_torus,
    };

    use super::*;

    #[test]
    fn test_every_program_links() {
        for id in ProgramId::ALL {
            let contract = id.contract();
            assert!(contract.validate_linkage().is_ok(), "{} fails to link", id.name());
        }
    }

    #[test]
    fn test_every_stage_matches_source_text() {
        for id in ProgramId::ALL {
            let contract = id.contract();
            contract.vertex.check_source().unwrap();
            contract.fragment.check_source().unwrap();
        }
    }

    #[test]
    fn test_blob_variants_declare_same_parameters() {
        let loose = ProgramId::BlobUniforms.contract().uniform_set();
        let block = ProgramId::BlobBlock.contract().uniform_set();
        for name in ["InnerColor", "OuterColor", "RadiusInner", "RadiusOuter"] {
            assert!(loose.accepts(name));
            assert!(block.accepts(name));
        }
        assert!(!loose.accepts("RotationMatrix"));
    }

    #[test]
    fn test_programs_accept_their_meshes() {
        assert!(ProgramId::BlobBlock.contract().accepts_mesh(&generate_blob_quad()));
        assert!(
            ProgramId::RotatingTriangle
                .contract()
                .accepts_mesh(&generate_color_triangle())
        );
        assert!(
            ProgramId::Diffuse
                .contract()
                .accepts_mesh(&generate_torus(0.7, 0.3, 8, 8))
        );
        assert!(!ProgramId::Diffuse.contract().accepts_mesh(&generate_blob_quad()));
    }

    #[test]
    fn test_diffuse_vertex_layout() {
        let layout = ProgramId::Diffuse.contract().vertex_layout();
        assert_eq!(layout.buffer_stride(0), 24);
        assert_eq!(
            layout
                .get_attribute(VertexAttributeSemantic::Normal)
                .unwrap()
                .offset,
            12
        );
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_diffuse_binding_layout() {
        let layout = ProgramId::Diffuse.contract().binding_layout();
        let bindings: Vec<_> = layout.entries.iter().map(|e| e.binding).collect();
        assert_eq!(bindings, vec![0, 1]);
    }
}
