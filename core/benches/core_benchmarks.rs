use criterion::{Criterion, black_box, criterion_group, criterion_main};

use glsandbox_core::math::{model_rotation, normal_matrix};
use glsandbox_core::mesh::generators::{generate_blob_quad, generate_sphere, generate_torus};
use glsandbox_core::mesh::{VertexAttributeSemantic, VertexLayout};

// ---------------------------------------------------------------------------
// Mesh generation
// ---------------------------------------------------------------------------

fn bench_generate_torus(c: &mut Criterion) {
    c.bench_function("generate_torus_50x50", |b| {
        b.iter(|| generate_torus(black_box(0.7), black_box(0.3), black_box(50), black_box(50)));
    });
}

fn bench_generate_sphere(c: &mut Criterion) {
    c.bench_function("generate_sphere_64x32", |b| {
        b.iter(|| generate_sphere(black_box(1.0), black_box(64), black_box(32)));
    });
}

fn bench_generate_blob_quad(c: &mut Criterion) {
    c.bench_function("generate_blob_quad", |b| {
        b.iter(generate_blob_quad);
    });
}

// ---------------------------------------------------------------------------
// Attribute fetch
// ---------------------------------------------------------------------------

fn bench_read_torus_normals(c: &mut Criterion) {
    let mesh = generate_torus(0.7, 0.3, 50, 50);
    c.bench_function("read_attribute_torus_normals", |b| {
        b.iter(|| mesh.read_attribute::<3>(black_box(VertexAttributeSemantic::Normal)));
    });
}

fn bench_layout_compatibility(c: &mut Criterion) {
    let a = VertexLayout::position_normal_uv();
    let b_layout = VertexLayout::position_normal_uv();
    c.bench_function("vertex_layout_is_compatible", |b| {
        b.iter(|| black_box(&a).is_compatible_with(black_box(&b_layout)));
    });
}

// ---------------------------------------------------------------------------
// Math
// ---------------------------------------------------------------------------

fn bench_normal_matrix(c: &mut Criterion) {
    let m = model_rotation(30.0, 45.0);
    c.bench_function("normal_matrix", |b| {
        b.iter(|| normal_matrix(black_box(&m)));
    });
}

criterion_group!(
    mesh_benches,
    bench_generate_torus,
    bench_generate_sphere,
    bench_generate_blob_quad,
    bench_read_torus_normals,
    bench_layout_compatibility,
);
criterion_group!(math_benches, bench_normal_matrix);
criterion_main!(mesh_benches, math_benches);
