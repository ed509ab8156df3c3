use criterion::{Criterion, black_box, criterion_group, criterion_main};
use glam::DVec3;
use strata_terrain::*;

fn bench_noise_simplex(c: &mut Criterion) {
    let generator = NoiseGenerator::new(NoiseParams::default());
    let p = black_box(DVec3::new(12_345.6, 40_000.0, -7_890.1));
    c.bench_function("noise_simplex_10_octaves", |bencher| {
        bencher.iter(|| black_box(generator.get_vec(p)))
    });
}

fn bench_noise_perlin(c: &mut Criterion) {
    let generator = NoiseGenerator::new(NoiseParams {
        noise_type: NoiseType::Perlin,
        ..Default::default()
    });
    let p = black_box(DVec3::new(12_345.6, 40_000.0, -7_890.1));
    c.bench_function("noise_perlin_10_octaves", |bencher| {
        bencher.iter(|| black_box(generator.get_vec(p)))
    });
}

fn bench_height(c: &mut Criterion) {
    let generator = HeightGenerator::new(NoiseParams::default(), HeightRange::default());
    let p = black_box(DVec3::new(-3_000.0, 39_800.0, 512.0));
    c.bench_function("height_generator_get", |bencher| {
        bencher.iter(|| black_box(generator.get(p)))
    });
}

fn bench_splat(c: &mut Criterion) {
    let splatter = TextureSplatter::new(
        BiomeClassifier::default_params(1),
        TextureSplatter::default_colour_params(1),
        HeightRange::default(),
    );
    let p = black_box(DVec3::new(-3_000.0, 39_800.0, 512.0));
    let normal = black_box(DVec3::new(0.2, 0.95, 0.1).normalize());
    c.bench_function("splat_get_and_top4", |bencher| {
        bencher.iter(|| black_box(splatter.get_splat(p, normal, DVec3::Y, 640.0).top4()))
    });
}

criterion_group!(
    benches,
    bench_noise_simplex,
    bench_noise_perlin,
    bench_height,
    bench_splat,
);
criterion_main!(benches);
