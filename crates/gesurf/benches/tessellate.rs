use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gesurf::{
    DrawEngine, PatchData,
    color::Rgba8,
    config::{Config, Quality},
    knots::Boundary,
    modules::Modules,
    patch::PatchFlags,
    state::GpuState,
    vertex::{SimpleVertex, VertexType},
};
use glam::{Vec2, Vec3};
use strum::VariantArray;
use zerocopy::IntoBytes;

/// A wavy control grid in the canonical vertex layout.
fn control_grid(count: usize) -> Vec<SimpleVertex> {
    (0..count * count)
        .map(|i| {
            let (x, y) = ((i % count) as f32, (i / count) as f32);
            SimpleVertex {
                uv: Vec2::new(x, y) / count as f32,
                color: Rgba8::new((x * 16.0) as u8, (y * 16.0) as u8, 128, 255),
                normal: Vec3::Z,
                position: Vec3::new(x, y, (x * 0.7).sin() * (y * 0.3).cos()),
            }
        })
        .collect()
}

fn patch(bytes: &[u8], count: usize, tess: usize) -> PatchData<'_> {
    PatchData {
        control_points: bytes,
        indices: None,
        vertex_type: VertexType::canonical(),
        count_u: count,
        count_v: count,
        tess_u: tess,
        tess_v: tess,
        flags: PatchFlags {
            compute_normals: true,
            ..Default::default()
        },
    }
}

fn bezier(c: &mut Criterion) {
    let count = 13;
    let points = control_grid(count);
    let data = patch(points.as_bytes(), count, 16);

    let mut group = c.benchmark_group("Bezier");
    group.throughput(Throughput::Elements((count * count) as u64));

    for &quality in Quality::VARIANTS {
        let config = Config {
            quality,
            ..Default::default()
        };

        let mut engine = DrawEngine::new(config, Modules::default());
        let mut state = GpuState::default();
        group.bench_with_input(BenchmarkId::from_parameter(quality), &data, |b, data| {
            b.iter(|| engine.submit_bezier(&mut state, black_box(data)).unwrap())
        });
    }

    group.finish();
}

fn spline(c: &mut Criterion) {
    let count = 12;
    let points = control_grid(count);
    let data = patch(points.as_bytes(), count, 8);

    let mut group = c.benchmark_group("Spline");
    group.throughput(Throughput::Elements((count * count) as u64));

    for &quality in Quality::VARIANTS {
        let config = Config {
            quality,
            ..Default::default()
        };

        let mut engine = DrawEngine::new(config, Modules::default());
        let mut state = GpuState::default();
        group.bench_with_input(BenchmarkId::from_parameter(quality), &data, |b, data| {
            b.iter(|| {
                engine
                    .submit_spline(&mut state, black_box(data), Boundary::OPEN, Boundary::OPEN)
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bezier, spline);
criterion_main!(benches);
