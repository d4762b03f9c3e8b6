//! Vertex layout definitions for meshes.
//!
//! Vertex layouts describe the structure of vertex data across one or more
//! buffers. Program contracts derive the layout they require from their
//! attribute bindings, and a mesh can be drawn by a program when its layout
//! provides every required semantic with a matching format.
//!
//! # Example
//!
//! ```ignore
//! // Interleaved position + rgb color
//! let layout = Arc::new(VertexLayout::new()
//!     .with_buffer(VertexBufferLayout::new(24))
//!     .with_attribute(VertexAttribute::position(0))
//!     .with_attribute(VertexAttribute::color_rgb(12)));
//! ```

use std::sync::Arc;

/// Semantic meaning of a vertex attribute.
///
/// Semantics are used to match mesh attributes with shader inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeSemantic {
    /// Vertex position (typically float3).
    Position,
    /// Vertex normal (typically float3).
    Normal,
    /// Texture coordinates set 0 (float2 or float3).
    TexCoord0,
    /// Vertex color (float3 or float4).
    Color,
}

/// Format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// Single 32-bit float.
    Float,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
}

impl VertexAttributeFormat {
    /// Get the size in bytes of this format.
    pub fn size(&self) -> usize {
        self.components() * 4
    }

    /// Number of float components.
    pub fn components(&self) -> usize {
        match self {
            Self::Float => 1,
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::Float4 => 4,
        }
    }
}

/// Describes a single vertex buffer binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferLayout {
    /// Stride in bytes between consecutive vertices.
    pub stride: u32,
}

impl VertexBufferLayout {
    /// Create a new vertex buffer layout with the given stride.
    pub fn new(stride: u32) -> Self {
        Self { stride }
    }
}

/// A single vertex attribute description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Semantic meaning of this attribute.
    pub semantic: VertexAttributeSemantic,
    /// Data format of this attribute.
    pub format: VertexAttributeFormat,
    /// Byte offset within the vertex buffer.
    pub offset: u32,
    /// Index of the vertex buffer this attribute reads from.
    pub buffer_index: u32,
}

impl VertexAttribute {
    /// Create a new vertex attribute.
    pub fn new(
        semantic: VertexAttributeSemantic,
        format: VertexAttributeFormat,
        offset: u32,
        buffer_index: u32,
    ) -> Self {
        Self {
            semantic,
            format,
            offset,
            buffer_index,
        }
    }

    /// Create a position attribute (float3) at buffer 0.
    pub fn position(offset: u32) -> Self {
        Self::new(
            VertexAttributeSemantic::Position,
            VertexAttributeFormat::Float3,
            offset,
            0,
        )
    }

    /// Create a normal attribute (float3) at buffer 0.
    pub fn normal(offset: u32) -> Self {
        Self::new(
            VertexAttributeSemantic::Normal,
            VertexAttributeFormat::Float3,
            offset,
            0,
        )
    }

    /// Create a texcoord0 attribute (float2) at buffer 0.
    pub fn texcoord0(offset: u32) -> Self {
        Self::new(
            VertexAttributeSemantic::TexCoord0,
            VertexAttributeFormat::Float2,
            offset,
            0,
        )
    }

    /// Create a three-component texcoord0 attribute (float3) at buffer 0.
    pub fn texcoord0_3d(offset: u32) -> Self {
        Self::new(
            VertexAttributeSemantic::TexCoord0,
            VertexAttributeFormat::Float3,
            offset,
            0,
        )
    }

    /// Create an RGB color attribute (float3) at buffer 0.
    pub fn color_rgb(offset: u32) -> Self {
        Self::new(
            VertexAttributeSemantic::Color,
            VertexAttributeFormat::Float3,
            offset,
            0,
        )
    }
}

/// Describes the layout of vertex data across one or more buffers.
///
/// Layouts are typically wrapped in `Arc` and shared between meshes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexLayout {
    /// Descriptions of each vertex buffer binding.
    pub buffers: Vec<VertexBufferLayout>,
    /// The vertex attributes, each referencing a buffer by index.
    pub attributes: Vec<VertexAttribute>,
    /// Optional label for debugging.
    pub label: Option<String>,
}

impl VertexLayout {
    /// Create a new empty vertex layout.
    pub fn new() -> Self {
        Self {
            buffers: Vec::new(),
            attributes: Vec::new(),
            label: None,
        }
    }

    /// Add a vertex buffer binding.
    pub fn with_buffer(mut self, buffer: VertexBufferLayout) -> Self {
        self.buffers.push(buffer);
        self
    }

    /// Add a vertex attribute.
    pub fn with_attribute(mut self, attribute: VertexAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the number of vertex buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Get the stride for a specific buffer.
    pub fn buffer_stride(&self, buffer_index: usize) -> u32 {
        self.buffers
            .get(buffer_index)
            .map(|b| b.stride)
            .unwrap_or(0)
    }

    /// Get an attribute by semantic.
    pub fn get_attribute(&self, semantic: VertexAttributeSemantic) -> Option<&VertexAttribute> {
        self.attributes
            .iter()
            .find(|attr| attr.semantic == semantic)
    }

    /// Check if this layout is compatible with another layout.
    ///
    /// A layout is compatible if the other layout has all the semantics this one has,
    /// with matching formats. Buffer indices don't need to match.
    pub fn is_compatible_with(&self, other: &VertexLayout) -> bool {
        self.attributes.iter().all(|attr| {
            other.attributes.iter().any(|other_attr| {
                other_attr.semantic == attr.semantic && other_attr.format == attr.format
            })
        })
    }

    /// Validate the layout.
    ///
    /// Every attribute must reference a defined buffer and fit inside that
    /// buffer's stride.
    pub fn validate(&self) -> Result<(), String> {
        for attr in &self.attributes {
            let Some(buffer) = self.buffers.get(attr.buffer_index as usize) else {
                return Err(format!(
                    "Attribute {:?} references buffer {} but only {} buffers defined",
                    attr.semantic,
                    attr.buffer_index,
                    self.buffers.len()
                ));
            };
            let end = attr.offset as usize + attr.format.size();
            if end > buffer.stride as usize {
                return Err(format!(
                    "Attribute {:?} ends at byte {} past the stride {} of buffer {}",
                    attr.semantic, end, buffer.stride, attr.buffer_index
                ));
            }
        }
        Ok(())
    }
}

impl Default for VertexLayout {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Common Layouts (Single Buffer)
// ============================================================================

impl VertexLayout {
    /// Position-only layout (12 bytes per vertex, single buffer).
    pub fn position_only() -> Arc<Self> {
        Arc::new(
            Self::new()
                .with_buffer(VertexBufferLayout::new(12))
                .with_attribute(VertexAttribute::position(0))
                .with_label("position_only"),
        )
    }

    /// Position + normal + texcoord layout (32 bytes per vertex, single buffer).
    pub fn position_normal_uv() -> Arc<Self> {
        Arc::new(
            Self::new()
                .with_buffer(VertexBufferLayout::new(32))
                .with_attribute(VertexAttribute::position(0))
                .with_attribute(VertexAttribute::normal(12))
                .with_attribute(VertexAttribute::texcoord0(24))
                .with_label("position_normal_uv"),
        )
    }

    /// Position + three-component texcoord (24 bytes per vertex, single buffer).
    pub fn position_texcoord3() -> Arc<Self> {
        Arc::new(
            Self::new()
                .with_buffer(VertexBufferLayout::new(24))
                .with_attribute(VertexAttribute::position(0))
                .with_attribute(VertexAttribute::texcoord0_3d(12))
                .with_label("position_texcoord3"),
        )
    }

    /// Position + RGB color (24 bytes per vertex, single buffer).
    pub fn position_color() -> Arc<Self> {
        Arc::new(
            Self::new()
                .with_buffer(VertexBufferLayout::new(24))
                .with_attribute(VertexAttribute::position(0))
                .with_attribute(VertexAttribute::color_rgb(12))
                .with_label("position_color"),
        )
    }
}
