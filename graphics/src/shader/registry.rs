//! Named stage sources loaded at runtime.
//!
//! The embedded [`StageSource`] files cover the stock programs. A host that
//! wants to try an edited stage loads it from disk into a [`StageRegistry`]
//! under a key, then checks it against the program contract before use:
//!
//! ```ignore
//! let mut registry = StageRegistry::new();
//! registry.load_stage("blob", "shaders/blob_block.frag", ShaderStage::Fragment)?;
//!
//! let contract = ProgramId::BlobBlock.contract();
//! let stage = registry.get_stage("blob").unwrap();
//! contract.fragment.check_loaded(&composer, stage)?;
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::GraphicsError;
use crate::program::ShaderStage;

use super::StageSource;

/// GLSL text of one stage together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedStage {
    /// File the source was read from; the relative `shaders/` path for
    /// embedded stages.
    pub path: PathBuf,
    /// Pipeline stage the source is compiled for.
    pub stage: ShaderStage,
    /// Source text, `#include` directives unresolved.
    pub source: String,
}

impl LoadedStage {
    /// One of the embedded stage files.
    pub fn builtin(source: StageSource) -> Self {
        Self {
            path: PathBuf::from(source.path()),
            stage: source.stage(),
            source: source.source().to_string(),
        }
    }
}

/// Stage sources keyed by name.
#[derive(Debug, Default)]
pub struct StageRegistry {
    stages: HashMap<String, LoadedStage>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every embedded stage, keyed by its file path.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for source in StageSource::ALL {
            registry.insert(source.path(), LoadedStage::builtin(source));
        }
        registry
    }

    /// Read a stage file from disk and register it under `key`.
    ///
    /// The file must start with a `#version` line. An existing entry with
    /// the same key is replaced.
    pub fn load_stage(
        &mut self,
        key: impl Into<String>,
        path: impl AsRef<Path>,
        stage: ShaderStage,
    ) -> Result<(), GraphicsError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            GraphicsError::ShaderCompilationFailed(format!(
                "failed to read {}: {e}",
                path.display()
            ))
        })?;
        if !source.trim_start().starts_with("#version") {
            return Err(GraphicsError::ShaderCompilationFailed(format!(
                "{} does not start with a #version line",
                path.display()
            )));
        }

        let key = key.into();
        log::info!("Loaded {stage:?} stage {key:?} from {}", path.display());
        self.insert(
            key,
            LoadedStage {
                path: path.to_path_buf(),
                stage,
                source,
            },
        );
        Ok(())
    }

    /// Register a stage directly.
    pub fn insert(&mut self, key: impl Into<String>, stage: LoadedStage) {
        let key = key.into();
        if self.stages.insert(key.clone(), stage).is_some() {
            log::debug!("Replaced stage {key:?}");
        }
    }

    pub fn has_stage(&self, key: &str) -> bool {
        self.stages.contains_key(key)
    }

    pub fn get_stage(&self, key: &str) -> Option<&LoadedStage> {
        self.stages.get(key)
    }

    /// Remove a stage, returning it if it was registered.
    pub fn unload_stage(&mut self, key: &str) -> Option<LoadedStage> {
        self.stages.remove(key)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("glsandbox-registry-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_builtin_registry_has_every_stage() {
        let registry = StageRegistry::builtin();
        assert_eq!(registry.len(), StageSource::ALL.len());
        let diffuse = registry.get_stage("diffuse.vert").unwrap();
        assert_eq!(diffuse.stage, ShaderStage::Vertex);
        assert_eq!(diffuse.source, StageSource::DiffuseVert.source());
    }

    #[test]
    fn test_load_get_unload() {
        let path = temp_file(
            "solid.frag",
            "#version 450\nlayout(location = 0) out vec4 FragColor;\nvoid main() { FragColor = vec4(1.0); }\n",
        );
        let mut registry = StageRegistry::new();
        registry
            .load_stage("solid", &path, ShaderStage::Fragment)
            .unwrap();

        assert!(registry.has_stage("solid"));
        let stage = registry.get_stage("solid").unwrap();
        assert_eq!(stage.path, path);
        assert!(stage.source.contains("FragColor = vec4(1.0);"));

        assert!(registry.unload_stage("solid").is_some());
        assert!(!registry.has_stage("solid"));
        assert!(registry.unload_stage("solid").is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut registry = StageRegistry::new();
        let err = registry
            .load_stage("nope", "/nonexistent/nope.vert", ShaderStage::Vertex)
            .unwrap_err();
        assert!(matches!(err, GraphicsError::ShaderCompilationFailed(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_file_without_version_rejected() {
        let path = temp_file("bare.vert", "void main() {}\n");
        let mut registry = StageRegistry::new();
        assert!(registry.load_stage("bare", &path, ShaderStage::Vertex).is_err());
        assert!(!registry.has_stage("bare"));
    }
}
