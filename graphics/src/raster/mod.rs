//! Software rasterizer that executes a [`ShadingProgram`] into a color buffer.
//!
//! Follows the OpenGL conventions the stages are written against:
//! - clip space to NDC by perspective divide
//! - NDC `y` up, framebuffer row 0 at the top
//! - window depth `z * 0.5 + 0.5`, tested with `LESS` against a buffer cleared to 1.0
//! - top-left fill rule, so triangles sharing an edge never shade a pixel twice
//! - perspective-correct interpolation of varyings
//!
//! Primitives with a vertex at or behind the eye (`w <= 0`) are culled whole
//! rather than clipped. Face culling is off.

use glsandbox_core::math::{Vec2, Vec4};
use glsandbox_core::mesh::{CpuMesh, PrimitiveTopology};
use glsandbox_core::profiling::{profile_plot, profile_scope};

use crate::error::GraphicsError;
use crate::shading::{ShadingProgram, Varying, VertexOutput};

/// Counters for one [`Framebuffer::draw`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Triangles assembled from the mesh.
    pub triangles: u32,
    /// Triangles dropped before rasterization (behind the eye or zero area).
    pub culled: u32,
    /// Fragments that passed the depth test and were written.
    pub fragments: u64,
}

/// RGBA float color buffer with a depth buffer.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    clear_color: Vec4,
    color: Vec<Vec4>,
    depth: Vec<f32>,
}

/// A vertex after the perspective divide and viewport transform.
#[derive(Clone, Copy)]
struct ScreenVertex {
    position: Vec2,
    depth: f32,
    inv_w: f32,
}

impl Framebuffer {
    /// Create a framebuffer filled with `clear_color`.
    pub fn new(width: u32, height: u32, clear_color: Vec4) -> Result<Self, GraphicsError> {
        if width == 0 || height == 0 {
            return Err(GraphicsError::InvalidParameter(format!(
                "framebuffer size must be non-zero, got {width}x{height}"
            )));
        }
        let len = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            clear_color,
            color: vec![clear_color; len],
            depth: vec![1.0; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reset color to the clear color and depth to 1.0.
    pub fn clear(&mut self) {
        self.color.fill(self.clear_color);
        self.depth.fill(1.0);
    }

    /// Color at `(x, y)`, row 0 at the top.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        self.index(x, y).map(|i| self.color[i])
    }

    /// Depth at `(x, y)`.
    pub fn depth(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Run `program` over every triangle of `mesh`.
    ///
    /// Fails if the mesh lacks an attribute the vertex stage reads, if an
    /// index is out of range, or if the topology is not a triangle topology.
    pub fn draw<P: ShadingProgram>(
        &mut self,
        program: &P,
        mesh: &CpuMesh,
    ) -> Result<DrawStats, GraphicsError> {
        profile_scope!("Framebuffer::draw");

        let contract = program.id().contract();
        if !contract.accepts_mesh(mesh) {
            return Err(GraphicsError::InterfaceMismatch(format!(
                "mesh {:?} does not provide the attributes {} reads",
                mesh.label().unwrap_or("<unnamed>"),
                contract.name
            )));
        }

        let outputs: Vec<VertexOutput<P::Varying>> = {
            profile_scope!("vertex stage");
            program
                .fetch(mesh)?
                .iter()
                .map(|vertex| program.vertex(vertex))
                .collect()
        };

        let indices = mesh
            .indices()
            .unwrap_or_else(|| (0..mesh.vertex_count()).collect());
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= outputs.len()) {
            return Err(GraphicsError::InvalidParameter(format!(
                "index {bad} out of range for {} vertices",
                outputs.len()
            )));
        }

        let triangles: Vec<[usize; 3]> = match mesh.topology() {
            PrimitiveTopology::TriangleList => indices
                .chunks_exact(3)
                .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
                .collect(),
            PrimitiveTopology::TriangleStrip => indices
                .windows(3)
                .enumerate()
                .map(|(i, t)| {
                    if i % 2 == 0 {
                        [t[0] as usize, t[1] as usize, t[2] as usize]
                    } else {
                        [t[1] as usize, t[0] as usize, t[2] as usize]
                    }
                })
                .collect(),
        };

        let mut stats = DrawStats::default();
        {
            profile_scope!("fragment stage");
            for [a, b, c] in triangles {
                stats.triangles += 1;
                match self.rasterize(program, [&outputs[a], &outputs[b], &outputs[c]]) {
                    Some(fragments) => stats.fragments += fragments,
                    None => stats.culled += 1,
                }
            }
        }

        profile_plot!("raster_fragments", stats.fragments);
        log::debug!(
            "Drew {} with {}: {} triangles, {} culled, {} fragments",
            mesh.label().unwrap_or("<unnamed>"),
            contract.name,
            stats.triangles,
            stats.culled,
            stats.fragments
        );
        Ok(stats)
    }

    fn to_screen(&self, clip: &Vec4) -> Option<ScreenVertex> {
        if clip.w <= 0.0 {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        let ndc = clip.xyz() * inv_w;
        Some(ScreenVertex {
            position: Vec2::new(
                (ndc.x * 0.5 + 0.5) * self.width as f32,
                (0.5 - ndc.y * 0.5) * self.height as f32,
            ),
            depth: ndc.z * 0.5 + 0.5,
            inv_w,
        })
    }

    /// Rasterize one triangle. Returns `None` when it is culled, otherwise
    /// the number of fragments written.
    fn rasterize<P: ShadingProgram>(
        &mut self,
        program: &P,
        vertices: [&VertexOutput<P::Varying>; 3],
    ) -> Option<u64> {
        let mut screen = [
            self.to_screen(&vertices[0].position)?,
            self.to_screen(&vertices[1].position)?,
            self.to_screen(&vertices[2].position)?,
        ];
        let mut varyings = [vertices[0].varying, vertices[1].varying, vertices[2].varying];

        let mut area = edge(&screen[0].position, &screen[1].position, &screen[2].position);
        if area == 0.0 || !area.is_finite() {
            return None;
        }
        if area < 0.0 {
            screen.swap(1, 2);
            varyings.swap(1, 2);
            area = -area;
        }
        let [p0, p1, p2] = [screen[0].position, screen[1].position, screen[2].position];

        let min_x = p0.x.min(p1.x).min(p2.x).floor().max(0.0) as u32;
        let min_y = p0.y.min(p1.y).min(p2.y).floor().max(0.0) as u32;
        let max_x = (p0.x.max(p1.x).max(p2.x).ceil() as i64).min(self.width as i64 - 1);
        let max_y = (p0.y.max(p1.y).max(p2.y).ceil() as i64).min(self.height as i64 - 1);
        if max_x < 0 || max_y < 0 {
            return Some(0);
        }

        let edges = [(p1, p2), (p2, p0), (p0, p1)];
        let mut written = 0;
        for y in min_y..=max_y as u32 {
            for x in min_x..=max_x as u32 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let mut weights = [0.0; 3];
                let mut inside = true;
                for (i, (a, b)) in edges.iter().enumerate() {
                    let w = edge(a, b, &p);
                    if w < 0.0 || (w == 0.0 && !is_top_left(a, b)) {
                        inside = false;
                        break;
                    }
                    weights[i] = w / area;
                }
                if !inside {
                    continue;
                }

                let depth = weights[0] * screen[0].depth
                    + weights[1] * screen[1].depth
                    + weights[2] * screen[2].depth;
                if !(0.0..=1.0).contains(&depth) {
                    continue;
                }
                let index = y as usize * self.width as usize + x as usize;
                if depth >= self.depth[index] {
                    continue;
                }

                let mut perspective = [
                    weights[0] * screen[0].inv_w,
                    weights[1] * screen[1].inv_w,
                    weights[2] * screen[2].inv_w,
                ];
                let sum: f32 = perspective.iter().sum();
                perspective.iter_mut().for_each(|w| *w /= sum);

                let varying =
                    P::Varying::blend(&varyings[0], &varyings[1], &varyings[2], perspective);
                self.color[index] = program.fragment(&varying);
                self.depth[index] = depth;
                written += 1;
            }
        }
        Some(written)
    }

    /// Convert to 8-bit RGBA, clamping each channel to [0, 1].
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = self.color[y as usize * self.width as usize + x as usize];
            image::Rgba([to_u8(c.x), to_u8(c.y), to_u8(c.z), to_u8(c.w)])
        })
    }

    /// Write the color buffer as a PNG file.
    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> Result<(), GraphicsError> {
        let path = path.as_ref();
        self.to_image()
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| {
                GraphicsError::Internal(format!("failed to write {}: {e}", path.display()))
            })?;
        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Twice the signed area of `(a, b, p)`; positive when `p` is on the inner side
/// of `a -> b` for the winding the rasterizer normalizes to.
fn edge(a: &Vec2, b: &Vec2, p: &Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Top edges run horizontally to the right, left edges run upward.
fn is_top_left(a: &Vec2, b: &Vec2) -> bool {
    let dy = b.y - a.y;
    let dx = b.x - a.x;
    dy < 0.0 || (dy == 0.0 && dx > 0.0)
}

fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use glsandbox_core::math::Mat4;
    use glsandbox_core::mesh::generators::{generate_blob_quad, generate_color_triangle};

    use super::*;
    use crate::program::ProgramId;
    use crate::shading::{BlobParams, BlobProgram, RotationProgram};

    const BLACK: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

    #[test]
    fn test_zero_size_rejected() {
        assert!(Framebuffer::new(0, 4, BLACK).is_err());
    }

    #[test]
    fn test_full_screen_quad_covers_every_pixel_once() {
        let mut fb = Framebuffer::new(8, 8, BLACK).unwrap();
        let program = BlobProgram::new(ProgramId::BlobBlock, BlobParams::default()).unwrap();
        let stats = fb.draw(&program, &generate_blob_quad()).unwrap();
        assert_eq!(stats.triangles, 2);
        assert_eq!(stats.culled, 0);
        assert_eq!(stats.fragments, 64);
    }

    #[test]
    fn test_triangle_vertex_colors() {
        let mut fb = Framebuffer::new(64, 64, BLACK).unwrap();
        let stats = fb
            .draw(&RotationProgram::new(Mat4::identity()), &generate_color_triangle())
            .unwrap();
        assert_eq!(stats.triangles, 1);
        assert!(stats.fragments > 0);

        // Bottom-left corner of the triangle is red.
        let c = fb.pixel(7, 56).unwrap();
        assert!(c.x > 0.8 && c.y < 0.2 && c.z < 0.2);
        // Top-left corner of the framebuffer is outside.
        assert_eq!(fb.pixel(0, 0), Some(BLACK));
    }

    #[test]
    fn test_behind_eye_is_culled() {
        let mut fb = Framebuffer::new(4, 4, BLACK).unwrap();
        let mut behind = Mat4::identity();
        behind[(3, 3)] = -1.0;
        let stats = fb
            .draw(&RotationProgram::new(behind), &generate_color_triangle())
            .unwrap();
        assert_eq!(stats.culled, 1);
        assert_eq!(stats.fragments, 0);
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut fb = Framebuffer::new(8, 8, BLACK).unwrap();
        let program = BlobProgram::new(ProgramId::BlobBlock, BlobParams::default()).unwrap();
        let quad = generate_blob_quad();
        fb.draw(&program, &quad).unwrap();
        // Same depth again fails LESS.
        let stats = fb.draw(&program, &quad).unwrap();
        assert_eq!(stats.fragments, 0);
        assert_eq!(fb.depth(3, 3), Some(0.5));
    }

    #[test]
    fn test_mesh_without_attributes_rejected() {
        let mut fb = Framebuffer::new(4, 4, BLACK).unwrap();
        let err = fb
            .draw(&RotationProgram::new(Mat4::identity()), &generate_blob_quad())
            .unwrap_err();
        assert!(matches!(err, GraphicsError::InterfaceMismatch(_)));
    }

    #[test]
    fn test_to_image_clamps() {
        let fb = Framebuffer::new(2, 1, Vec4::new(2.0, -1.0, 0.5, 1.0)).unwrap();
        let img = fb.to_image();
        assert_eq!(img.get_pixel(1, 0).0, [255, 0, 128, 255]);
    }
}
