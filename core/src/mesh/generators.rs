//! Mesh generators for the shapes the sandbox programs are drawn with.
//!
//! Each generator produces a [`CpuMesh`] whose layout matches the attribute
//! bindings of one program:
//!
//! - [`generate_blob_quad`] - clip-space quad with vec3 texcoords (blob programs)
//! - [`generate_color_triangle`] - RGB triangle (rotation program)
//! - [`generate_torus`] / [`generate_sphere`] - lit surfaces (diffuse program)

use std::f32::consts::{PI, TAU};

use super::data::{CpuMesh, PrimitiveTopology};
use super::layout::VertexLayout;

/// Internal vertex type for lit surfaces (position + normal + uv).
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PnuVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

/// Internal vertex type for the textured quad (position + vec3 texcoord).
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PtVertex {
    position: [f32; 3],
    tex_coord: [f32; 3],
}

/// Internal vertex type for colored geometry (position + rgb).
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PcVertex {
    position: [f32; 3],
    color: [f32; 3],
}

/// Generate a UV sphere mesh.
///
/// Creates a sphere with the given radius, number of longitudinal segments,
/// and number of latitudinal rings. The mesh uses the `position_normal_uv`
/// layout (32 bytes per vertex) with u32 indices.
pub fn generate_sphere(radius: f32, segments: u32, rings: u32) -> CpuMesh {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for ring in 0..=rings {
        let theta = ring as f32 * PI / rings as f32;
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for segment in 0..=segments {
            let phi = segment as f32 * 2.0 * PI / segments as f32;
            let sin_phi = phi.sin();
            let cos_phi = phi.cos();

            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;

            vertices.push(PnuVertex {
                position: [x * radius, y * radius, z * radius],
                normal: [x, y, z],
                uv: [segment as f32 / segments as f32, ring as f32 / rings as f32],
            });
        }
    }

    for ring in 0..rings {
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            indices.push(current);
            indices.push(next);
            indices.push(current + 1);

            indices.push(current + 1);
            indices.push(next);
            indices.push(next + 1);
        }
    }

    let vertex_bytes = bytemuck::cast_slice(&vertices).to_vec();

    CpuMesh::new(VertexLayout::position_normal_uv())
        .with_vertex_data(0, vertex_bytes)
        .with_indices_u32(&indices)
        .with_label("sphere")
}

/// Generate a torus lying in the XY plane around the Z axis.
///
/// `outer_radius` is the distance from the center to the middle of the tube,
/// `inner_radius` the tube radius. One extra ring duplicates the first so the
/// texture seam closes. The mesh uses the `position_normal_uv` layout with
/// u32 indices, counter-clockwise when seen from outside.
pub fn generate_torus(outer_radius: f32, inner_radius: f32, sides: u32, rings: u32) -> CpuMesh {
    let ring_factor = TAU / rings as f32;
    let side_factor = TAU / sides as f32;

    let mut vertices = Vec::with_capacity(((rings + 1) * sides) as usize);
    for ring in 0..=rings {
        let u = ring_factor * ring as f32;
        let (su, cu) = u.sin_cos();
        for side in 0..sides {
            let v = side_factor * side as f32;
            let (sv, cv) = v.sin_cos();
            let r = outer_radius + inner_radius * cv;

            vertices.push(PnuVertex {
                position: [r * cu, r * su, inner_radius * sv],
                normal: [cv * cu, cv * su, sv],
                uv: [u / TAU, v / TAU],
            });
        }
    }

    let mut indices = Vec::with_capacity((rings * sides * 6) as usize);
    for ring in 0..rings {
        let ring_start = ring * sides;
        let next_ring_start = (ring + 1) * sides;
        for side in 0..sides {
            let next_side = (side + 1) % sides;
            indices.extend_from_slice(&[
                ring_start + side,
                next_ring_start + side,
                next_ring_start + next_side,
                ring_start + side,
                next_ring_start + next_side,
                ring_start + next_side,
            ]);
        }
    }

    CpuMesh::new(VertexLayout::position_normal_uv())
        .with_vertex_data(0, bytemuck::cast_slice(&vertices).to_vec())
        .with_indices_u32(&indices)
        .with_label("torus")
}

/// Generate a quad covering clip space, for the pass-through stage.
///
/// Positions span [-1, 1] on X and Y at z = 0. Texture coordinates go from
/// (0, 0) at bottom-left to (1, 1) at top-right with z = 0. Drawn as a
/// two-triangle strip with u16 indices.
pub fn generate_blob_quad() -> CpuMesh {
    let vertices = [
        PtVertex {
            position: [-1.0, -1.0, 0.0],
            tex_coord: [0.0, 0.0, 0.0],
        },
        PtVertex {
            position: [1.0, -1.0, 0.0],
            tex_coord: [1.0, 0.0, 0.0],
        },
        PtVertex {
            position: [1.0, 1.0, 0.0],
            tex_coord: [1.0, 1.0, 0.0],
        },
        PtVertex {
            position: [-1.0, 1.0, 0.0],
            tex_coord: [0.0, 1.0, 0.0],
        },
    ];

    let indices: [u16; 4] = [0, 1, 3, 2];
    let vertex_bytes = bytemuck::cast_slice(&vertices).to_vec();

    CpuMesh::new(VertexLayout::position_texcoord3())
        .with_vertex_data(0, vertex_bytes)
        .with_indices_u16(&indices)
        .with_topology(PrimitiveTopology::TriangleStrip)
        .with_label("blob_quad")
}

/// Generate the red/green/blue triangle used by the rotation program.
pub fn generate_color_triangle() -> CpuMesh {
    let vertices = [
        PcVertex {
            position: [-0.8, -0.8, 0.0],
            color: [1.0, 0.0, 0.0],
        },
        PcVertex {
            position: [0.8, -0.8, 0.0],
            color: [0.0, 1.0, 0.0],
        },
        PcVertex {
            position: [0.0, 0.8, 0.0],
            color: [0.0, 0.0, 1.0],
        },
    ];

    CpuMesh::new(VertexLayout::position_color())
        .with_vertex_data(0, bytemuck::cast_slice(&vertices).to_vec())
        .with_label("color_triangle")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexAttributeSemantic;

    #[test]
    fn test_generate_sphere() {
        let mesh = generate_sphere(1.0, 8, 4);
        assert!(mesh.is_indexed());
        // (rings+1) * (segments+1) = 5 * 9 = 45 vertices
        assert_eq!(mesh.vertex_count(), 45);
        // rings * segments * 6 = 4 * 8 * 6 = 192 indices
        assert_eq!(mesh.index_count(), 192);
    }

    #[test]
    fn test_generate_torus_counts() {
        let mesh = generate_torus(0.7, 0.3, 6, 4);
        // sides * (rings + 1)
        assert_eq!(mesh.vertex_count(), 30);
        assert_eq!(mesh.index_count(), 6 * 4 * 6);
        let max_index = mesh.indices().unwrap().into_iter().max().unwrap();
        assert!(max_index < mesh.vertex_count());
    }

    #[test]
    fn test_torus_normals_are_unit_and_outward() {
        let mesh = generate_torus(0.7, 0.3, 12, 8);
        let positions = mesh
            .read_attribute::<3>(VertexAttributeSemantic::Position)
            .unwrap();
        let normals = mesh
            .read_attribute::<3>(VertexAttributeSemantic::Normal)
            .unwrap();

        for (p, n) in positions.iter().zip(&normals) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);

            // Normal points away from the tube's center line.
            let ring_len = (p[0] * p[0] + p[1] * p[1]).sqrt();
            let center = [p[0] / ring_len * 0.7, p[1] / ring_len * 0.7, 0.0];
            let out = [p[0] - center[0], p[1] - center[1], p[2] - center[2]];
            let dot = out[0] * n[0] + out[1] * n[1] + out[2] * n[2];
            assert!(dot > 0.0);
        }
    }

    #[test]
    fn test_torus_seam_duplicates_first_ring() {
        let sides = 5;
        let mesh = generate_torus(1.0, 0.25, sides, 3);
        let positions = mesh
            .read_attribute::<3>(VertexAttributeSemantic::Position)
            .unwrap();
        let last_ring = (3 * sides) as usize;
        for side in 0..sides as usize {
            let a = positions[side];
            let b = positions[last_ring + side];
            for k in 0..3 {
                assert!((a[k] - b[k]).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_generate_blob_quad() {
        let mesh = generate_blob_quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.topology(), PrimitiveTopology::TriangleStrip);
        assert_eq!(mesh.indices(), Some(vec![0, 1, 3, 2]));
        let data = mesh.vertex_buffer_data(0).unwrap();
        // 4 vertices * 24 bytes
        assert_eq!(data.len(), 4 * 24);

        let uvs = mesh
            .read_attribute::<3>(VertexAttributeSemantic::TexCoord0)
            .unwrap();
        assert_eq!(uvs[2], [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_generate_color_triangle() {
        let mesh = generate_color_triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(!mesh.is_indexed());
        let colors = mesh
            .read_attribute::<3>(VertexAttributeSemantic::Color)
            .unwrap();
        assert_eq!(colors, vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    }
}
