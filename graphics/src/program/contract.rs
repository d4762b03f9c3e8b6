//! Program contracts.
//!
//! A [`ProgramContract`] is the host-side description of a linked vertex and
//! fragment stage pair: which attribute goes to which location, which
//! uniforms and uniform blocks each stage reads, and which varyings connect
//! the two stages. Contracts are checked three ways:
//!
//! - against each other ([`ProgramContract::validate_linkage`]),
//! - against the GLSL text ([`StageContract::check_source`], or
//!   [`StageContract::check_loaded`] for a stage read from disk),
//! - against naga's parse of the GLSL ([`StageContract::reflect_check`]).

use std::sync::Arc;

use glsandbox_core::mesh::{
    CpuMesh, VertexAttribute, VertexAttributeFormat, VertexAttributeSemantic, VertexBufferLayout,
    VertexLayout,
};

use crate::error::GraphicsError;
use crate::shader::{LoadedStage, ShaderComposer, ShaderReflection, StageSource};

use super::bindings::{BindingLayout, BindingLayoutEntry, BindingType, ShaderStage};
use super::block::UniformBlockLayout;
use super::uniforms::{GlslType, UniformSet};

/// A located stage input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceVariable {
    /// `layout(location = N)`.
    pub location: u32,
    /// Variable name; varyings must match by name across stages.
    pub name: String,
    /// GLSL type.
    pub ty: GlslType,
    /// Mesh attribute feeding this input (vertex stage inputs only).
    pub semantic: Option<VertexAttributeSemantic>,
}

impl InterfaceVariable {
    pub fn new(location: u32, name: impl Into<String>, ty: GlslType) -> Self {
        Self {
            location,
            name: name.into(),
            ty,
            semantic: None,
        }
    }

    /// Vertex attribute input fed from a mesh semantic.
    pub fn attribute(
        location: u32,
        name: impl Into<String>,
        ty: GlslType,
        semantic: VertexAttributeSemantic,
    ) -> Self {
        Self {
            semantic: Some(semantic),
            ..Self::new(location, name, ty)
        }
    }
}

/// A loose `layout(location = N) uniform T Name;` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformDecl {
    pub name: String,
    pub ty: GlslType,
    pub location: u32,
}

/// Interface of a single shader stage.
#[derive(Debug, Clone)]
pub struct StageContract {
    /// Stage file.
    pub source: StageSource,
    /// Pipeline stage.
    pub stage: ShaderStage,
    /// Located inputs (attributes for vertex stages, varyings otherwise).
    pub inputs: Vec<InterfaceVariable>,
    /// Located outputs, built-ins excluded.
    pub outputs: Vec<InterfaceVariable>,
    /// Loose uniforms.
    pub uniforms: Vec<UniformDecl>,
    /// std140 uniform blocks.
    pub blocks: Vec<UniformBlockLayout>,
}

impl StageContract {
    /// Start a contract for a stage file.
    pub fn new(source: StageSource) -> Self {
        Self {
            source,
            stage: source.stage(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            uniforms: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn with_input(mut self, input: InterfaceVariable) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, output: InterfaceVariable) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn with_uniform(mut self, location: u32, name: impl Into<String>, ty: GlslType) -> Self {
        self.uniforms.push(UniformDecl {
            name: name.into(),
            ty,
            location,
        });
        self
    }

    pub fn with_block(mut self, block: UniformBlockLayout) -> Self {
        self.blocks.push(block);
        self
    }

    /// Find a block by name.
    pub fn block(&self, name: &str) -> Option<&UniformBlockLayout> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// Every uniform name this stage reads, loose or block member.
    pub fn uniform_declarations(&self) -> impl Iterator<Item = (&str, GlslType)> {
        self.uniforms
            .iter()
            .map(|u| (u.name.as_str(), u.ty))
            .chain(self.blocks.iter().flat_map(|b| b.declarations()))
    }

    /// Empty uniform set restricted to this stage's declarations.
    pub fn uniform_set(&self) -> UniformSet {
        UniformSet::for_declarations(self.uniform_declarations())
    }

    /// Bindings formed by this stage's uniforms.
    pub fn binding_layout(&self) -> BindingLayout {
        let visibility = self.stage.flags();
        let loose = self.uniforms.iter().map(|u| {
            BindingLayoutEntry::new(u.location, BindingType::LooseUniform)
                .with_visibility(visibility)
                .with_label(u.name.clone())
        });
        let blocks = self.blocks.iter().map(|b| {
            BindingLayoutEntry::new(b.binding, BindingType::UniformBuffer)
                .with_visibility(visibility)
                .with_label(b.name.clone())
        });
        loose
            .chain(blocks)
            .fold(BindingLayout::new(), BindingLayout::with_entry)
            .with_label(self.source.path())
    }

    /// Check the declared interface against the GLSL text.
    ///
    /// Every declaration must appear verbatim in the canonical form the stage
    /// files use, e.g. `layout(location = 1) in vec3 VertexNormal;`. This is
    /// the only check available for stages naga cannot parse.
    pub fn check_source(&self) -> Result<(), GraphicsError> {
        self.check_text(self.source.source(), self.source.path())
    }

    /// Check a stage loaded at runtime in place of the embedded file.
    ///
    /// The stage kind and the textual declarations must match; when the
    /// embedded file is one naga parses, the loaded text is parsed and
    /// reflected too.
    pub fn check_loaded(
        &self,
        composer: &ShaderComposer,
        loaded: &LoadedStage,
    ) -> Result<(), GraphicsError> {
        let path = loaded.path.display().to_string();
        if loaded.stage != self.stage {
            return Err(GraphicsError::InterfaceMismatch(format!(
                "{path}: loaded as {:?}, {} is a {:?} stage",
                loaded.stage,
                self.source.path(),
                self.stage
            )));
        }
        self.check_text(&loaded.source, &path)?;
        if self.source.naga_compatible() {
            let reflection = composer.reflect_source(&loaded.source, loaded.stage)?;
            self.reflect_check(&reflection)?;
        }
        Ok(())
    }

    fn check_text(&self, source: &str, path: &str) -> Result<(), GraphicsError> {
        let mut expected = Vec::new();
        for v in &self.inputs {
            expected.push(format!("layout(location = {}) in {} {};", v.location, v.ty, v.name));
        }
        for v in &self.outputs {
            expected.push(format!("layout(location = {}) out {} {};", v.location, v.ty, v.name));
        }
        for u in &self.uniforms {
            expected.push(format!("layout(location = {}) uniform {} {};", u.location, u.ty, u.name));
        }
        for b in &self.blocks {
            expected.push(format!("layout(std140, binding = {}) uniform {} {{", b.binding, b.name));
            for f in b.fields() {
                expected.push(format!("{} {};", f.ty, f.name));
            }
        }

        match expected.iter().find(|line| !source.contains(line.as_str())) {
            Some(line) => Err(GraphicsError::InterfaceMismatch(format!(
                "{path}: declaration `{line}` not found in source"
            ))),
            None => Ok(()),
        }
    }

    /// Compare the declared interface with naga's reflection of the stage.
    pub fn reflect_check(&self, reflection: &ShaderReflection) -> Result<(), GraphicsError> {
        let path = self.source.path();
        let mismatch = |msg: String| GraphicsError::InterfaceMismatch(format!("{path}: {msg}"));

        if let Some(stage) = reflection.stage
            && stage != self.stage
        {
            return Err(mismatch(format!("expected {:?} stage, parsed {stage:?}", self.stage)));
        }

        for (kind, declared, reflected) in [
            ("input", &self.inputs, &reflection.inputs),
            ("output", &self.outputs, &reflection.outputs),
        ] {
            if declared.len() != reflected.len() {
                return Err(mismatch(format!(
                    "{} {kind}s declared, {} parsed",
                    declared.len(),
                    reflected.len()
                )));
            }
            for var in declared {
                let Some(found) = reflected.iter().find(|r| r.location == var.location) else {
                    return Err(mismatch(format!(
                        "{kind} {} missing at location {}",
                        var.name, var.location
                    )));
                };
                if found.ty != Some(var.ty) {
                    return Err(mismatch(format!(
                        "{kind} {} is {} but parsed as {:?}",
                        var.name, var.ty, found.ty
                    )));
                }
                if let Some(name) = &found.name
                    && *name != var.name
                {
                    return Err(mismatch(format!(
                        "{kind} at location {} is {} but parsed as {name}",
                        var.location, var.name
                    )));
                }
            }
        }

        for block in &self.blocks {
            let Some(found) = reflection.block(&block.name) else {
                return Err(mismatch(format!("uniform block {} not found", block.name)));
            };
            if found.binding != Some(block.binding) {
                return Err(mismatch(format!(
                    "block {} expected at binding {}, parsed {:?}",
                    block.name, block.binding, found.binding
                )));
            }
            if found.members.len() != block.fields().len() {
                return Err(mismatch(format!(
                    "block {} has {} fields, parsed {}",
                    block.name,
                    block.fields().len(),
                    found.members.len()
                )));
            }
            for (field, member) in block.fields().iter().zip(&found.members) {
                if member.offset != field.offset || member.ty != Some(field.ty) {
                    return Err(mismatch(format!(
                        "{}.{} declared as {} at offset {}, parsed as {:?} at offset {}",
                        block.name, field.name, field.ty, field.offset, member.ty, member.offset
                    )));
                }
            }
            if found.span != block.size() {
                return Err(mismatch(format!(
                    "block {} is {} bytes, parsed {} bytes",
                    block.name,
                    block.size(),
                    found.span
                )));
            }
        }

        Ok(())
    }
}

/// Interface of a linked vertex + fragment program.
#[derive(Debug, Clone)]
pub struct ProgramContract {
    /// Program name.
    pub name: &'static str,
    /// Vertex stage.
    pub vertex: StageContract,
    /// Fragment stage.
    pub fragment: StageContract,
}

impl ProgramContract {
    /// Check that the stages link.
    ///
    /// Every fragment input needs a vertex output with the same location,
    /// name and type. Unconsumed vertex outputs are allowed.
    pub fn validate_linkage(&self) -> Result<(), GraphicsError> {
        if self.vertex.stage != ShaderStage::Vertex || self.fragment.stage != ShaderStage::Fragment {
            return Err(GraphicsError::InterfaceMismatch(format!(
                "{}: stages are {:?} and {:?}",
                self.name, self.vertex.stage, self.fragment.stage
            )));
        }

        for input in &self.fragment.inputs {
            let Some(output) = self
                .vertex
                .outputs
                .iter()
                .find(|o| o.location == input.location)
            else {
                return Err(GraphicsError::InterfaceMismatch(format!(
                    "{}: fragment input {} at location {} has no vertex output",
                    self.name, input.name, input.location
                )));
            };
            if output.name != input.name || output.ty != input.ty {
                return Err(GraphicsError::InterfaceMismatch(format!(
                    "{}: location {} is `{} {}` in {} but `{} {}` in {}",
                    self.name,
                    input.location,
                    output.ty,
                    output.name,
                    self.vertex.source.path(),
                    input.ty,
                    input.name,
                    self.fragment.source.path()
                )));
            }
        }

        self.binding_layout()
            .validate()
            .map_err(|e| GraphicsError::InterfaceMismatch(format!("{}: {e}", self.name)))
    }

    /// Interleaved single-buffer layout carrying exactly the attributes the
    /// vertex stage reads, in location order.
    pub fn vertex_layout(&self) -> Arc<VertexLayout> {
        let mut attributes: Vec<_> = self
            .vertex
            .inputs
            .iter()
            .filter_map(|input| Some((input.location, input.semantic?, input.ty)))
            .collect();
        attributes.sort_by_key(|(location, ..)| *location);

        let mut layout = VertexLayout::new().with_label(self.name);
        let mut offset = 0;
        for (_, semantic, ty) in attributes {
            let format = match ty.components() {
                1 => VertexAttributeFormat::Float,
                2 => VertexAttributeFormat::Float2,
                3 => VertexAttributeFormat::Float3,
                _ => VertexAttributeFormat::Float4,
            };
            layout = layout.with_attribute(VertexAttribute::new(semantic, format, offset, 0));
            offset += format.size() as u32;
        }
        Arc::new(layout.with_buffer(VertexBufferLayout::new(offset)))
    }

    /// Whether a mesh provides every attribute the vertex stage reads.
    pub fn accepts_mesh(&self, mesh: &CpuMesh) -> bool {
        self.vertex_layout().is_compatible_with(mesh.layout())
    }

    /// Empty uniform set restricted to the names either stage declares.
    pub fn uniform_set(&self) -> UniformSet {
        UniformSet::for_declarations(
            self.vertex
                .uniform_declarations()
                .chain(self.fragment.uniform_declarations()),
        )
    }

    /// Combined bindings of both stages.
    ///
    /// A binding used by both stages appears once with both visibility flags.
    pub fn binding_layout(&self) -> BindingLayout {
        let mut merged = BindingLayout::new().with_label(self.name);
        for entry in self
            .vertex
            .binding_layout()
            .entries
            .into_iter()
            .chain(self.fragment.binding_layout().entries)
        {
            match merged
                .entries
                .iter_mut()
                .find(|e| {
                    e.binding_type == entry.binding_type
                        && e.binding == entry.binding
                        && e.label == entry.label
                })
            {
                Some(existing) => existing.visibility |= entry.visibility,
                None => merged.entries.push(entry),
            }
        }
        merged
    }

    /// Log the program's attributes, uniforms and varyings at debug level.
    pub fn log_interface(&self) {
        for input in &self.vertex.inputs {
            log::debug!("[ATTRIB] #{} {} {}", input.location, input.ty, input.name);
        }
        for stage in [&self.vertex, &self.fragment] {
            for u in &stage.uniforms {
                log::debug!("[UNIFORM] #{} {} {}", u.location, u.ty, u.name);
            }
            for b in &stage.blocks {
                log::debug!("[BLOCK] binding {} {} ({} bytes)", b.binding, b.name, b.size());
                for f in b.fields() {
                    log::debug!("[BLOCK]   +{} {} {}", f.offset, f.ty, f.name);
                }
            }
        }
        for output in &self.vertex.outputs {
            log::debug!("[VARYING] #{} {} {}", output.location, output.ty, output.name);
        }
    }
}
