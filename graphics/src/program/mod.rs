//! Shading program contracts and host-side uniform data.
//!
//! - [`ProgramId`] / [`ProgramContract`] - what each program expects
//! - [`UniformValue`] / [`UniformSet`] - values supplied per draw call
//! - [`UniformBlockLayout`] - std140 packing of uniform blocks
//! - [`BindingLayout`] - bindings a program's uniforms occupy

mod bindings;
mod block;
mod catalog;
mod contract;
mod uniforms;

pub use bindings::{BindingLayout, BindingLayoutEntry, BindingType, ShaderStage, ShaderStageFlags};
pub use block::{BlockField, UniformBlockLayout};
pub use catalog::{
    POSITION_LOCATION, ProgramId, SECONDARY_LOCATION, blob_settings_layout, light_info_layout,
    matrices_layout, rotation_block_layout,
};
pub use contract::{InterfaceVariable, ProgramContract, StageContract, UniformDecl};
pub use uniforms::{GlslType, UniformSet, UniformValue};
