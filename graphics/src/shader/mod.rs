//! Shader composition, library and reflection.
//!
//! - [`ShaderComposer`] - Composes GLSL shaders with include resolution
//! - [`ShaderLibrary`] - Include modules shared by the stage files
//! - [`StageSource`] - The embedded stage files
//! - [`StageRegistry`] - Stage files loaded from disk by name
//! - [`ShaderReflection`] - Interface and uniform blocks parsed by naga
//!
//! # Example
//!
//! ```ignore
//! use glsandbox_graphics::shader::{ShaderComposer, StageSource};
//!
//! let composer = ShaderComposer::with_standard_library();
//! let wgsl = composer.compose_stage(StageSource::BlobBlockFrag, &[])?;
//! ```

pub mod library;
pub mod reflect;
pub mod registry;

use std::collections::{HashMap, HashSet};

use crate::error::GraphicsError;
use crate::program::ShaderStage;
use glsandbox_core::profiling::profile_scope;

pub use library::{ShaderLibrary, StageSource};
pub use reflect::{ReflectedBlock, ReflectedVariable, ShaderReflection};
pub use registry::{LoadedStage, StageRegistry};

/// Shader composer for resolving includes and composing final GLSL shaders.
///
/// The composer maintains a set of includable shader modules and composes
/// shaders by resolving `#include` directives, then parsing the resulting
/// GLSL through naga. The parsed module can be validated and written out as
/// WGSL, or reflected to check it against a program contract.
///
/// # Include Syntax
///
/// ```glsl
/// #include "sandbox/blob.glsl"
/// ```
///
/// # Shader Definitions
///
/// ```glsl
/// #ifdef SHOW_RINGS
///     t = fract(t * 4.0);
/// #endif
/// ```
///
/// The stage macro (`VERTEX`, `FRAGMENT` or `COMPUTE`) is always defined.
pub struct ShaderComposer {
    /// Registered include sources: path -> source text.
    includes: HashMap<String, String>,
}

impl Default for ShaderComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderComposer {
    /// Create a new empty shader composer.
    pub fn new() -> Self {
        Self {
            includes: HashMap::new(),
        }
    }

    /// Create a shader composer with the standard library pre-loaded.
    pub fn with_standard_library() -> Self {
        let mut composer = Self::new();
        composer.add_library(&ShaderLibrary::standard());
        composer
    }

    /// Add a shader library to the composer.
    ///
    /// All modules in the library become available for `#include`.
    pub fn add_library(&mut self, library: &ShaderLibrary) {
        for (path, source) in library.modules() {
            self.register_include(path, source);
        }
    }

    /// Register a single include source.
    ///
    /// The path is what appears in `#include "path"` directives.
    pub fn register_include(&mut self, path: &str, source: &str) {
        self.includes.insert(path.to_string(), source.to_string());
    }

    /// Resolve `#include` directives in a GLSL source.
    ///
    /// Returns the GLSL with all includes expanded and no further processing.
    /// This is what a host hands to the driver's own GLSL compiler.
    pub fn resolve_glsl(&self, source: &str) -> Result<String, GraphicsError> {
        let mut included = HashSet::new();
        self.resolve_includes(source, &mut included)
    }

    /// Build the defines list for a given stage and user shader defs.
    ///
    /// The stage define (VERTEX, FRAGMENT, COMPUTE) comes first. `Bool(false)`
    /// definitions are omitted.
    pub fn build_defines(
        stage: ShaderStage,
        shader_defs: &[(&str, ShaderDef)],
    ) -> Vec<(String, String)> {
        let mut defines = vec![(stage.define().to_string(), String::new())];

        for (name, def) in shader_defs {
            match def {
                ShaderDef::Bool(true) => defines.push((name.to_string(), String::new())),
                ShaderDef::Bool(false) => {}
                ShaderDef::Int(v) => defines.push((name.to_string(), v.to_string())),
                ShaderDef::UInt(v) => defines.push((name.to_string(), v.to_string())),
            }
        }

        defines
    }

    /// Compose a GLSL shader into validated WGSL.
    ///
    /// ```ignore
    /// let wgsl = composer.compose(
    ///     source,
    ///     ShaderStage::Fragment,
    ///     &[("SHOW_RINGS", ShaderDef::Bool(true))],
    /// )?;
    /// ```
    pub fn compose(
        &self,
        source: &str,
        stage: ShaderStage,
        shader_defs: &[(&str, ShaderDef)],
    ) -> Result<String, GraphicsError> {
        profile_scope!("shader_compose");

        let naga_module = self.compose_to_naga(source, stage, shader_defs)?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        let module_info = validator.validate(&naga_module).map_err(|e| {
            GraphicsError::ShaderCompilationFailed(format!("Validation error: {e}"))
        })?;

        let wgsl = naga::back::wgsl::write_string(
            &naga_module,
            &module_info,
            naga::back::wgsl::WriterFlags::empty(),
        )
        .map_err(|e| {
            GraphicsError::ShaderCompilationFailed(format!("WGSL generation error: {e}"))
        })?;

        Ok(wgsl)
    }

    /// Compose a GLSL shader and return the raw naga module.
    pub fn compose_to_naga(
        &self,
        source: &str,
        stage: ShaderStage,
        shader_defs: &[(&str, ShaderDef)],
    ) -> Result<naga::Module, GraphicsError> {
        profile_scope!("shader_compose_to_naga");

        let resolved = self.resolve_glsl(source)?;

        let mut defines = naga::FastHashMap::default();
        for (name, value) in Self::build_defines(stage, shader_defs) {
            defines.insert(name, value);
        }

        let options = naga::front::glsl::Options {
            stage: stage.to_naga(),
            defines,
        };

        let mut frontend = naga::front::glsl::Frontend::default();
        let module = frontend.parse(&options, &resolved).map_err(|errors| {
            GraphicsError::ShaderCompilationFailed(format!("GLSL parse error:\n{errors}"))
        })?;

        log::debug!(
            "Parsed {:?} shader: {} globals, {} functions",
            stage,
            module.global_variables.len(),
            module.functions.len()
        );

        Ok(module)
    }

    /// Compose one of the embedded stage files into WGSL.
    pub fn compose_stage(
        &self,
        stage: StageSource,
        shader_defs: &[(&str, ShaderDef)],
    ) -> Result<String, GraphicsError> {
        self.check_naga_compatible(stage)?;
        self.compose(stage.source(), stage.stage(), shader_defs)
    }

    /// Parse one of the embedded stage files and reflect its interface.
    pub fn reflect_stage(&self, stage: StageSource) -> Result<ShaderReflection, GraphicsError> {
        self.check_naga_compatible(stage)?;
        self.reflect_source(stage.source(), stage.stage())
    }

    /// Parse a GLSL source and reflect its interface.
    pub fn reflect_source(
        &self,
        source: &str,
        stage: ShaderStage,
    ) -> Result<ShaderReflection, GraphicsError> {
        let module = self.compose_to_naga(source, stage, &[])?;
        Ok(ShaderReflection::from_module(&module))
    }

    fn check_naga_compatible(&self, stage: StageSource) -> Result<(), GraphicsError> {
        if stage.naga_compatible() {
            Ok(())
        } else {
            Err(GraphicsError::ShaderCompilationFailed(format!(
                "{} uses loose uniforms, which only a GL driver compiles",
                stage.path()
            )))
        }
    }

    /// Resolve `#include "path"` directives recursively.
    fn resolve_includes(
        &self,
        source: &str,
        included: &mut HashSet<String>,
    ) -> Result<String, GraphicsError> {
        let mut result = String::with_capacity(source.len());

        for line in source.lines() {
            let trimmed = line.trim();
            if let Some(path) = parse_include_directive(trimmed) {
                // Each path is expanded at most once.
                if !included.insert(path.to_string()) {
                    continue;
                }

                let include_source = self.includes.get(path).ok_or_else(|| {
                    GraphicsError::ShaderCompilationFailed(format!("Include not found: \"{path}\""))
                })?;

                let resolved = self.resolve_includes(include_source, included)?;
                result.push_str(&resolved);
                result.push('\n');
            } else {
                result.push_str(line);
                result.push('\n');
            }
        }

        Ok(result)
    }
}

/// Parse a `#include "path"` directive, returning the path if found.
fn parse_include_directive(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("#include")?;
    let rest = rest.trim();
    if let Some(inner) = rest.strip_prefix('"') {
        inner.strip_suffix('"')
    } else if let Some(inner) = rest.strip_prefix('<') {
        inner.strip_suffix('>')
    } else {
        None
    }
}

/// Shader definition value for compile-time conditionals.
#[derive(Debug, Clone)]
pub enum ShaderDef {
    /// Boolean definition (`#ifdef`, `#ifndef`).
    Bool(bool),
    /// Integer definition (`#if VAR == 5`).
    Int(i32),
    /// Unsigned integer definition.
    UInt(u32),
}

impl From<bool> for ShaderDef {
    fn from(v: bool) -> Self {
        ShaderDef::Bool(v)
    }
}

impl From<i32> for ShaderDef {
    fn from(v: i32) -> Self {
        ShaderDef::Int(v)
    }
}

impl From<u32> for ShaderDef {
    fn from(v: u32) -> Self {
        ShaderDef::UInt(v)
    }
}
