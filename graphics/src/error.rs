//! Graphics error types.

use std::fmt;

/// Errors that can occur while composing shaders, checking program contracts
/// or binding uniform values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// GLSL composition, parsing or validation failed.
    ShaderCompilationFailed(String),
    /// Two stages (or a stage and its declaration) disagree on an interface.
    InterfaceMismatch(String),
    /// A uniform value does not have the declared GLSL type.
    UniformTypeMismatch {
        /// Uniform or block field name.
        name: String,
        /// Declared GLSL type keyword.
        expected: &'static str,
        /// Supplied GLSL type keyword.
        found: &'static str,
    },
    /// A uniform required for packing or drawing has no value.
    MissingUniform(String),
    /// An invalid parameter was provided.
    InvalidParameter(String),
    /// An internal error occurred.
    Internal(String),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShaderCompilationFailed(msg) => write!(f, "shader compilation failed: {msg}"),
            Self::InterfaceMismatch(msg) => write!(f, "interface mismatch: {msg}"),
            Self::UniformTypeMismatch {
                name,
                expected,
                found,
            } => write!(
                f,
                "uniform type mismatch for '{name}': expected {expected}, found {found}"
            ),
            Self::MissingUniform(name) => write!(f, "missing uniform: {name}"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for GraphicsError {}
