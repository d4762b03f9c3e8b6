//! CPU-side mesh data structures.
//!
//! This module provides:
//! - [`PrimitiveTopology`] - How vertices are assembled into primitives
//! - [`IndexFormat`] - Index data format (u16 or u32)
//! - [`CpuMesh`] - CPU-side mesh holding raw vertex and index data

use std::sync::Arc;

use super::layout::{VertexAttributeSemantic, VertexLayout};

/// Primitive topology describing how vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
}

/// Index format for indexed drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 16-bit unsigned integers (max 65535 vertices).
    #[default]
    Uint16,
    /// 32-bit unsigned integers (max ~4 billion vertices).
    Uint32,
}

impl IndexFormat {
    /// Get the size in bytes of each index.
    pub fn size(&self) -> usize {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }
}

/// A CPU-side mesh holding raw vertex and index data.
///
/// Meshes come from the generators and are consumed by the rasterizer,
/// which fetches vertices through the layout's attribute offsets.
///
/// Each vertex buffer slot of the layout stores its own raw bytes; attribute
/// reads go through the slot named by the attribute.
#[derive(Clone)]
pub struct CpuMesh {
    layout: Arc<VertexLayout>,
    topology: PrimitiveTopology,
    vertex_buffers: Vec<Vec<u8>>,
    vertex_count: u32,
    index_data: Option<Vec<u8>>,
    index_format: Option<IndexFormat>,
    index_count: u32,
    label: Option<String>,
}

impl CpuMesh {
    /// Create a new empty CpuMesh with the given layout.
    ///
    /// Vertex buffers are initialized as empty vectors matching
    /// the layout's buffer count.
    pub fn new(layout: Arc<VertexLayout>) -> Self {
        let buffer_count = layout.buffer_count();
        Self {
            layout,
            topology: PrimitiveTopology::TriangleList,
            vertex_buffers: vec![Vec::new(); buffer_count],
            vertex_count: 0,
            index_data: None,
            index_format: None,
            index_count: 0,
            label: None,
        }
    }

    /// Set raw vertex data for a specific buffer slot.
    ///
    /// Vertex count is inferred from the data length and stride.
    pub fn with_vertex_data(mut self, buffer_index: usize, data: Vec<u8>) -> Self {
        let stride = self.layout.buffer_stride(buffer_index) as usize;
        if stride > 0 {
            self.vertex_count = (data.len() / stride) as u32;
        }
        if buffer_index < self.vertex_buffers.len() {
            self.vertex_buffers[buffer_index] = data;
        }
        self
    }

    /// Set index data as u16 indices.
    pub fn with_indices_u16(mut self, indices: &[u16]) -> Self {
        self.index_data = Some(bytemuck::cast_slice(indices).to_vec());
        self.index_format = Some(IndexFormat::Uint16);
        self.index_count = indices.len() as u32;
        self
    }

    /// Set index data as u32 indices.
    pub fn with_indices_u32(mut self, indices: &[u32]) -> Self {
        self.index_data = Some(bytemuck::cast_slice(indices).to_vec());
        self.index_format = Some(IndexFormat::Uint32);
        self.index_count = indices.len() as u32;
        self
    }

    /// Set the primitive topology.
    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the vertex layout.
    pub fn layout(&self) -> &Arc<VertexLayout> {
        &self.layout
    }

    /// Get the primitive topology.
    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Get raw vertex data for a specific buffer slot.
    pub fn vertex_buffer_data(&self, index: usize) -> Option<&[u8]> {
        self.vertex_buffers.get(index).map(|v| v.as_slice())
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Get the index format.
    pub fn index_format(&self) -> Option<IndexFormat> {
        self.index_format
    }

    /// Get the number of indices.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Check if this mesh uses indexed drawing.
    pub fn is_indexed(&self) -> bool {
        self.index_data.is_some()
    }

    /// Decode the indices as `u32`, whatever their stored format.
    pub fn indices(&self) -> Option<Vec<u32>> {
        let data = self.index_data.as_deref()?;
        match self.index_format? {
            IndexFormat::Uint16 => Some(
                data.chunks_exact(2)
                    .map(|c| u16::from_ne_bytes([c[0], c[1]]) as u32)
                    .collect(),
            ),
            IndexFormat::Uint32 => Some(
                data.chunks_exact(4)
                    .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
        }
    }

    /// Read every vertex's value for one attribute as `[f32; N]`.
    ///
    /// Returns `None` if the layout lacks the semantic, its format does not
    /// have exactly `N` components, or the buffer is too short.
    pub fn read_attribute<const N: usize>(
        &self,
        semantic: VertexAttributeSemantic,
    ) -> Option<Vec<[f32; N]>> {
        let attr = self.layout.get_attribute(semantic)?;
        if attr.format.components() != N {
            return None;
        }
        let stride = self.layout.buffer_stride(attr.buffer_index as usize) as usize;
        let data = self.vertex_buffers.get(attr.buffer_index as usize)?;
        let size = attr.format.size();

        (0..self.vertex_count as usize)
            .map(|i| {
                let start = i * stride + attr.offset as usize;
                let bytes = data.get(start..start + size)?;
                Some(bytemuck::pod_read_unaligned::<[f32; N]>(bytes))
            })
            .collect()
    }

    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl std::fmt::Debug for CpuMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuMesh")
            .field("label", &self.label)
            .field("topology", &self.topology)
            .field("vertex_count", &self.vertex_count)
            .field("buffer_count", &self.vertex_buffers.len())
            .field("index_count", &self.index_count)
            .field("layout", &self.layout.label)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_format_size() {
        assert_eq!(IndexFormat::Uint16.size(), 2);
        assert_eq!(IndexFormat::Uint32.size(), 4);
    }

    #[test]
    fn test_cpu_mesh_basic() {
        let layout = VertexLayout::position_only();
        // 3 vertices * 12 bytes = 36 bytes
        let vertex_data = vec![0u8; 36];
        let mesh = CpuMesh::new(layout)
            .with_vertex_data(0, vertex_data)
            .with_label("test");

        assert_eq!(mesh.vertex_count(), 3);
        assert!(!mesh.is_indexed());
        assert_eq!(mesh.vertex_buffer_data(0).map(<[u8]>::len), Some(36));
        assert_eq!(mesh.label(), Some("test"));
    }

    #[test]
    fn test_cpu_mesh_indexed() {
        let layout = VertexLayout::position_only();
        let vertex_data = vec![0u8; 48]; // 4 vertices
        let indices: [u32; 6] = [0, 1, 2, 2, 3, 0];
        let mesh = CpuMesh::new(layout)
            .with_vertex_data(0, vertex_data)
            .with_indices_u32(&indices);

        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.is_indexed());
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.index_format(), Some(IndexFormat::Uint32));
    }

    #[test]
    fn test_cpu_mesh_read_attribute() {
        let vertices: [[f32; 6]; 2] = [
            [1.0, 2.0, 3.0, 0.1, 0.2, 0.3],
            [4.0, 5.0, 6.0, 0.4, 0.5, 0.6],
        ];
        let mesh = CpuMesh::new(VertexLayout::position_color())
            .with_vertex_data(0, bytemuck::cast_slice(&vertices).to_vec());

        let positions = mesh
            .read_attribute::<3>(VertexAttributeSemantic::Position)
            .unwrap();
        assert_eq!(positions, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);

        let colors = mesh
            .read_attribute::<3>(VertexAttributeSemantic::Color)
            .unwrap();
        assert_eq!(colors[1], [0.4, 0.5, 0.6]);

        // Wrong width and missing semantic
        assert!(mesh.read_attribute::<4>(VertexAttributeSemantic::Color).is_none());
        assert!(mesh.read_attribute::<3>(VertexAttributeSemantic::Normal).is_none());
    }

    #[test]
    fn test_cpu_mesh_strip_topology() {
        let mesh = CpuMesh::new(VertexLayout::position_only())
            .with_vertex_data(0, vec![0u8; 48])
            .with_indices_u16(&[0, 1, 3, 2])
            .with_topology(PrimitiveTopology::TriangleStrip);
        assert_eq!(mesh.topology(), PrimitiveTopology::TriangleStrip);
        assert_eq!(mesh.index_format(), Some(IndexFormat::Uint16));
        assert_eq!(mesh.indices(), Some(vec![0, 1, 3, 2]));
    }

    #[test]
    fn test_cpu_mesh_indices_decode() {
        let layout = VertexLayout::position_only();
        let mesh16 = CpuMesh::new(layout.clone()).with_indices_u16(&[0, 1, 2]);
        assert_eq!(mesh16.indices(), Some(vec![0, 1, 2]));

        let mesh32 = CpuMesh::new(layout.clone()).with_indices_u32(&[7, 70000]);
        assert_eq!(mesh32.indices(), Some(vec![7, 70000]));

        assert_eq!(CpuMesh::new(layout).indices(), None);
    }
}
