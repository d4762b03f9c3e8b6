use criterion::{Criterion, black_box, criterion_group, criterion_main};

use glsandbox_core::math::{Vec4, model_rotation};
use glsandbox_core::mesh::generators::{generate_blob_quad, generate_torus};
use glsandbox_graphics::program::matrices_layout;
use glsandbox_graphics::{
    BlobParams, BlobProgram, Camera, DiffuseProgram, DiffuseUniforms, Framebuffer, Light,
    ProgramId, ShaderComposer, StageSource,
};

const CLEAR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

fn torus_uniforms(aspect: f32) -> DiffuseUniforms {
    let camera = Camera::default();
    DiffuseUniforms::from_transforms(
        &model_rotation(-35.0, 35.0),
        &camera.view(),
        &camera.projection(aspect),
        Light::default(),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Shader composition
// ---------------------------------------------------------------------------

fn bench_compose_diffuse_vert(c: &mut Criterion) {
    let composer = ShaderComposer::with_standard_library();
    c.bench_function("compose_diffuse_vert_to_wgsl", |b| {
        b.iter(|| {
            composer
                .compose_stage(black_box(StageSource::DiffuseVert), &[])
                .unwrap()
        });
    });
}

fn bench_reflect_blob_block(c: &mut Criterion) {
    let composer = ShaderComposer::with_standard_library();
    let contract = ProgramId::BlobBlock.contract();
    c.bench_function("reflect_and_check_blob_block", |b| {
        b.iter(|| {
            let reflection = composer.reflect_stage(StageSource::BlobBlockFrag).unwrap();
            contract.fragment.reflect_check(black_box(&reflection)).unwrap();
        });
    });
}

// ---------------------------------------------------------------------------
// Uniform packing
// ---------------------------------------------------------------------------

fn bench_pack_matrices(c: &mut Criterion) {
    let uniforms = torus_uniforms(4.0 / 3.0);
    let mut set = ProgramId::Diffuse.contract().uniform_set();
    uniforms.write_uniforms(&mut set).unwrap();
    let layout = matrices_layout();
    c.bench_function("pack_matrices_block", |b| {
        b.iter(|| layout.pack(black_box(&set)).unwrap());
    });
}

// ---------------------------------------------------------------------------
// Rasterization
// ---------------------------------------------------------------------------

fn bench_raster_blob_quad(c: &mut Criterion) {
    let program = BlobProgram::new(ProgramId::BlobBlock, BlobParams::default()).unwrap();
    let quad = generate_blob_quad();
    let mut fb = Framebuffer::new(256, 256, CLEAR).unwrap();
    c.bench_function("raster_blob_quad_256", |b| {
        b.iter(|| {
            fb.clear();
            fb.draw(&program, black_box(&quad)).unwrap()
        });
    });
}

fn bench_raster_diffuse_torus(c: &mut Criterion) {
    let program = DiffuseProgram::new(torus_uniforms(4.0 / 3.0));
    let torus = generate_torus(0.7, 0.3, 60, 60);
    let mut fb = Framebuffer::new(256, 192, CLEAR).unwrap();
    c.bench_function("raster_diffuse_torus_256x192", |b| {
        b.iter(|| {
            fb.clear();
            fb.draw(&program, black_box(&torus)).unwrap()
        });
    });
}

criterion_group!(
    shader_benches,
    bench_compose_diffuse_vert,
    bench_reflect_blob_block
);
criterion_group!(uniform_benches, bench_pack_matrices);
criterion_group!(raster_benches, bench_raster_blob_quad, bench_raster_diffuse_torus);
criterion_main!(shader_benches, uniform_benches, raster_benches);
