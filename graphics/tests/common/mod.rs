//! Shared helpers for the program integration tests.

use glsandbox_core::math::{Vec4, model_rotation};
use glsandbox_core::mesh::CpuMesh;
use glsandbox_graphics::{
    Camera, DiffuseUniforms, DrawStats, Framebuffer, Light, ProgramId, ShadingProgram,
    StageContract, StageSource,
};

/// Opaque black, the clear color every test renders over.
pub const CLEAR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The contract of a stage file, taken from the first program that uses it.
pub fn stage_contract(source: StageSource) -> StageContract {
    ProgramId::ALL
        .iter()
        .map(|id| id.contract())
        .flat_map(|contract| [contract.vertex, contract.fragment])
        .find(|stage| stage.source == source)
        .unwrap_or_else(|| panic!("no program uses {}", source.path()))
}

/// Render a mesh into a fresh framebuffer.
pub fn render<P: ShadingProgram>(
    program: &P,
    mesh: &CpuMesh,
    width: u32,
    height: u32,
) -> (Framebuffer, DrawStats) {
    let mut fb = Framebuffer::new(width, height, CLEAR).unwrap();
    let stats = fb.draw(program, mesh).unwrap();
    (fb, stats)
}

/// Uniforms for the lit torus scene: default camera and light, model tilted
/// so both the hole and the outer rim are visible.
pub fn torus_scene_uniforms(width: u32, height: u32) -> DiffuseUniforms {
    let camera = Camera::default();
    DiffuseUniforms::from_transforms(
        &model_rotation(-35.0, 35.0),
        &camera.view(),
        &camera.projection(width as f32 / height as f32),
        Light::default(),
    )
    .unwrap()
}

/// Write a stage file into a per-process scratch directory.
pub fn write_stage(name: &str, source: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("glsandbox-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();
    path
}

/// Component-wise comparison with a tolerance.
pub fn approx_eq(a: &Vec4, b: &Vec4, eps: f32) -> bool {
    (a - b).abs().max() <= eps
}
