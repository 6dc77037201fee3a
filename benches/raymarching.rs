use criterion::{Criterion, black_box, criterion_group, criterion_main};
use nalgebra::{point, vector};
use nebula::{
    field::{FieldParameters, FieldSampling, generate_density_field},
    geometry::Ray,
    raymarch::{RaymarchingConfig, VolumeRaymarcher},
    rendering::{Camera, FrameRenderer, ObjectPose},
};

fn default_field() -> nebula::field::DensityField {
    generate_density_field(&FieldParameters::default()).unwrap()
}

pub fn bench_march_single_ray(c: &mut Criterion) {
    let field = default_field();
    let raymarcher = VolumeRaymarcher::new(&RaymarchingConfig::default());
    let ray = Ray::new(point![0.1, -0.05, -5.0], vector![0.0, 0.0, 1.0]);
    c.bench_function("march_single_ray_through_center", |b| {
        b.iter(|| black_box(raymarcher.march(&field, &ray, [400.5, 300.5])))
    });
}

pub fn bench_march_single_ray_trilinear(c: &mut Criterion) {
    let field = default_field();
    let raymarcher = VolumeRaymarcher::new(&RaymarchingConfig {
        sampling: FieldSampling::Trilinear,
        ..RaymarchingConfig::default()
    });
    let ray = Ray::new(point![0.1, -0.05, -5.0], vector![0.0, 0.0, 1.0]);
    c.bench_function("march_single_ray_through_center_trilinear", |b| {
        b.iter(|| black_box(raymarcher.march(&field, &ray, [400.5, 300.5])))
    });
}

pub fn bench_render_frame(c: &mut Criterion) {
    let field = default_field();
    let raymarcher = VolumeRaymarcher::new(&RaymarchingConfig::default());
    let renderer = FrameRenderer::new(
        320,
        240,
        Camera::default(),
        ObjectPose::spinning(nalgebra::Vector3::zeros(), 5000.0),
    )
    .unwrap();
    c.bench_function("render_frame_320x240", |b| {
        b.iter(|| black_box(renderer.render(&field, &raymarcher)))
    });
}

criterion_group!(
    benches,
    bench_march_single_ray,
    bench_march_single_ray_trilinear,
    bench_render_frame,
);
criterion_main!(benches);
