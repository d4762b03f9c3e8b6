//! Profiling support via Tracy.
//!
//! Instrumentation uses the [Tracy profiler](https://github.com/wolfpld/tracy)
//! and is enabled through the `profiling` Cargo feature:
//!
//! ```bash
//! cargo run -p glsandbox-demos --bin shading_demo --features profiling
//! ```
//!
//! # CPU Profiling
//!
//! ```ignore
//! use glsandbox_core::profiling::{profile_plot, profile_scope};
//!
//! fn shade_tile() {
//!     profile_scope!("shade_tile");
//!     let fragments = 0u64;
//!     // ... per-pixel work ...
//!     profile_plot!("tile_fragments", fragments);
//! }
//! ```
//!
//! When profiling is disabled (the default), all macros compile to no-ops.

#[cfg(feature = "profiling")]
pub use tracy_client::{self, plot as tracy_plot, span};

/// Create a profiling span for the current scope.
///
/// The span ends when the scope exits.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Plot a value over time in Tracy.
///
/// ```ignore
/// profile_plot!("raster_fragments", stats.fragments);
/// ```
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        $crate::profiling::tracy_plot!($name, $value as f64)
    };
}

/// Plot a value (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_plot {
    ($name:expr, $value:expr) => {
        let _ = $value;
    };
}

pub use profile_plot;
pub use profile_scope;

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_compile() {
        profile_scope!("test_scope");
        profile_plot!("test_value", 42.0);
    }
}
