//! CPU-side mesh types and generators.
//!
//! - [`VertexLayout`] - Describes vertex attributes across multiple buffers
//! - [`CpuMesh`] - CPU-side mesh data (vertex bytes, index bytes, layout)
//! - Generators for the sandbox shapes (blob quad, color triangle, torus, sphere)
//!
//! These types are re-exported by `glsandbox-graphics` for convenience.

mod data;
pub mod generators;
mod layout;

pub use data::{CpuMesh, IndexFormat, PrimitiveTopology};
pub use layout::{
    VertexAttribute, VertexAttributeFormat, VertexAttributeSemantic, VertexBufferLayout,
    VertexLayout,
};
