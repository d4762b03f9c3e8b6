//! # GLSL Sandbox Core
//!
//! Math aliases, CPU mesh data and profiling hooks shared by the shading
//! programs and the demo binary.

pub mod math;
pub mod mesh;
pub mod profiling;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core version once at startup.
pub fn init() {
    log::info!("GLSL Sandbox Core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
