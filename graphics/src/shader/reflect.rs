//! Reflection of a parsed naga module.
//!
//! Extracts the entry point's located inputs and outputs and the uniform
//! blocks with their member offsets, so that hand-written program contracts
//! can be checked against what the GLSL actually declares.

use naga::{AddressSpace, Binding, ScalarKind, TypeInner, VectorSize};

use crate::program::{GlslType, ShaderStage};

/// A located stage input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedVariable {
    /// `layout(location = N)`.
    pub location: u32,
    /// Name, when naga kept it.
    pub name: Option<String>,
    /// GLSL type, `None` for types the sandbox does not model.
    pub ty: Option<GlslType>,
}

/// One member of a reflected uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedMember {
    pub name: Option<String>,
    pub ty: Option<GlslType>,
    pub offset: u32,
}

/// A uniform block as laid out by naga.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedBlock {
    /// Block type name (`uniform Name { ... }`).
    pub name: String,
    /// Binding index, if declared.
    pub binding: Option<u32>,
    /// Members in declaration order.
    pub members: Vec<ReflectedMember>,
    /// Struct span in bytes.
    pub span: u32,
}

impl ReflectedBlock {
    /// Look up a member by name.
    pub fn member(&self, name: &str) -> Option<&ReflectedMember> {
        self.members
            .iter()
            .find(|m| m.name.as_deref() == Some(name))
    }
}

/// Interface of one parsed shader stage.
#[derive(Debug, Clone, Default)]
pub struct ShaderReflection {
    /// Stage of the first entry point, if any.
    pub stage: Option<ShaderStage>,
    /// Located inputs, sorted by location.
    pub inputs: Vec<ReflectedVariable>,
    /// Located outputs, sorted by location. Built-ins are skipped.
    pub outputs: Vec<ReflectedVariable>,
    /// Uniform blocks in declaration order.
    pub blocks: Vec<ReflectedBlock>,
}

impl ShaderReflection {
    /// Reflect the first entry point and all uniform blocks of a module.
    pub fn from_module(module: &naga::Module) -> Self {
        let mut reflection = Self::default();

        if let Some(entry) = module.entry_points.first() {
            reflection.stage = Some(match entry.stage {
                naga::ShaderStage::Vertex => ShaderStage::Vertex,
                naga::ShaderStage::Fragment => ShaderStage::Fragment,
                naga::ShaderStage::Compute => ShaderStage::Compute,
            });

            for arg in &entry.function.arguments {
                collect_located(
                    module,
                    arg.binding.as_ref(),
                    arg.name.clone(),
                    arg.ty,
                    &mut reflection.inputs,
                );
            }

            if let Some(result) = &entry.function.result {
                match (&result.binding, &module.types[result.ty].inner) {
                    (None, TypeInner::Struct { members, .. }) => {
                        for member in members {
                            collect_located(
                                module,
                                member.binding.as_ref(),
                                member.name.clone(),
                                member.ty,
                                &mut reflection.outputs,
                            );
                        }
                    }
                    (binding, _) => collect_located(
                        module,
                        binding.as_ref(),
                        None,
                        result.ty,
                        &mut reflection.outputs,
                    ),
                }
            }
        }

        reflection.inputs.sort_by_key(|v| v.location);
        reflection.outputs.sort_by_key(|v| v.location);

        for (_, global) in module.global_variables.iter() {
            if global.space != AddressSpace::Uniform {
                continue;
            }
            let ty = &module.types[global.ty];
            let TypeInner::Struct { members, span } = &ty.inner else {
                continue;
            };
            let Some(name) = ty.name.clone().or_else(|| global.name.clone()) else {
                continue;
            };
            reflection.blocks.push(ReflectedBlock {
                name,
                binding: global.binding.as_ref().map(|b| b.binding),
                members: members
                    .iter()
                    .map(|m| ReflectedMember {
                        name: m.name.clone(),
                        ty: glsl_type_of(&module.types[m.ty].inner),
                        offset: m.offset,
                    })
                    .collect(),
                span: *span,
            });
        }

        reflection
    }

    /// Find a block by name.
    pub fn block(&self, name: &str) -> Option<&ReflectedBlock> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// Find an input by location.
    pub fn input(&self, location: u32) -> Option<&ReflectedVariable> {
        self.inputs.iter().find(|v| v.location == location)
    }

    /// Find an output by location.
    pub fn output(&self, location: u32) -> Option<&ReflectedVariable> {
        self.outputs.iter().find(|v| v.location == location)
    }
}

fn collect_located(
    module: &naga::Module,
    binding: Option<&Binding>,
    name: Option<String>,
    ty: naga::Handle<naga::Type>,
    out: &mut Vec<ReflectedVariable>,
) {
    if let Some(Binding::Location { location, .. }) = binding {
        out.push(ReflectedVariable {
            location: *location,
            name,
            ty: glsl_type_of(&module.types[ty].inner),
        });
    }
}

/// Map a naga type to the sandbox's GLSL type model.
pub fn glsl_type_of(inner: &TypeInner) -> Option<GlslType> {
    match *inner {
        TypeInner::Scalar(scalar) => match scalar.kind {
            ScalarKind::Float => Some(GlslType::Float),
            ScalarKind::Sint => Some(GlslType::Int),
            ScalarKind::Uint => Some(GlslType::UInt),
            ScalarKind::Bool => Some(GlslType::Bool),
            _ => None,
        },
        TypeInner::Vector { size, scalar } if scalar.kind == ScalarKind::Float => match size {
            VectorSize::Bi => Some(GlslType::Vec2),
            VectorSize::Tri => Some(GlslType::Vec3),
            VectorSize::Quad => Some(GlslType::Vec4),
        },
        TypeInner::Matrix { columns, rows, .. } => match (columns, rows) {
            (VectorSize::Bi, VectorSize::Bi) => Some(GlslType::Mat2),
            (VectorSize::Tri, VectorSize::Tri) => Some(GlslType::Mat3),
            (VectorSize::Quad, VectorSize::Quad) => Some(GlslType::Mat4),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderComposer;

    #[test]
    fn test_reflect_fragment_interface() {
        let source = r#"#version 450
layout(location = 0) in vec3 TexCoord;
layout(location = 0) out vec4 FragColor;
void main() {
    FragColor = vec4(TexCoord, 1.0);
}
"#;
        let module = ShaderComposer::new()
            .compose_to_naga(source, ShaderStage::Fragment, &[])
            .unwrap();
        let reflection = ShaderReflection::from_module(&module);

        assert_eq!(reflection.stage, Some(ShaderStage::Fragment));
        assert_eq!(reflection.input(0).unwrap().ty, Some(GlslType::Vec3));
        assert_eq!(reflection.output(0).unwrap().ty, Some(GlslType::Vec4));
        assert!(reflection.blocks.is_empty());
    }

    #[test]
    fn test_reflect_vertex_skips_builtins() {
        let source = r#"#version 450
layout(location = 0) in vec3 Position;
layout(location = 1) in vec2 Uv;
layout(location = 0) out vec2 OutUv;
void main() {
    OutUv = Uv;
    gl_Position = vec4(Position, 1.0);
}
"#;
        let module = ShaderComposer::new()
            .compose_to_naga(source, ShaderStage::Vertex, &[])
            .unwrap();
        let reflection = ShaderReflection::from_module(&module);

        assert_eq!(reflection.inputs.len(), 2);
        assert_eq!(reflection.input(1).unwrap().ty, Some(GlslType::Vec2));
        assert_eq!(reflection.outputs.len(), 1);
        assert_eq!(reflection.outputs[0].location, 0);
    }

    #[test]
    fn test_reflect_block_offsets() {
        let source = r#"#version 450
layout(location = 0) out vec4 FragColor;
layout(std140, binding = 3) uniform Params {
    vec3 Tint;
    float Strength;
    mat3 Basis;
};
void main() {
    FragColor = vec4(Basis * Tint * Strength, 1.0);
}
"#;
        let module = ShaderComposer::new()
            .compose_to_naga(source, ShaderStage::Fragment, &[])
            .unwrap();
        let reflection = ShaderReflection::from_module(&module);

        let block = reflection.block("Params").unwrap();
        assert_eq!(block.binding, Some(3));
        let offsets: Vec<u32> = block.members.iter().map(|m| m.offset).collect();
        assert_eq!(offsets, vec![0, 12, 16]);
        assert_eq!(block.member("Basis").unwrap().ty, Some(GlslType::Mat3));
    }

    #[test]
    fn test_glsl_type_of_unmodelled() {
        let inner = TypeInner::Vector {
            size: VectorSize::Tri,
            scalar: naga::Scalar::I32,
        };
        assert_eq!(glsl_type_of(&inner), None);
    }
}
