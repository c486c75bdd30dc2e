use criterion::{black_box, criterion_group, criterion_main, Criterion};
use potts_core::connectivity::{is_connected, Window};
use potts_core::{Potts, SimulationConfig, Topology};
use potts_data::{TermKind, Voxel};

fn tissue(length: usize, width: usize, height: usize) -> Potts {
    let mut config = SimulationConfig::default();
    config.lattice.length = length;
    config.lattice.width = width;
    config.lattice.height = height;
    config.potts.seed = Some(42);
    config.potts.terms = vec![TermKind::Adhesion, TermKind::Volume, TermKind::Surface];

    let mut potts = Potts::new(&config).expect("valid config");
    let (z_lo, z_hi) = if height == 1 { (0, 0) } else { (1, height as i32) };
    for cx in (4..length as i32 - 2).step_by(6) {
        for cy in (4..width as i32 - 2).step_by(6) {
            let mut voxels = Vec::new();
            for x in cx - 1..=cx + 1 {
                for y in cy - 1..=cy + 1 {
                    for z in z_lo..=z_hi.min(z_lo + 2) {
                        voxels.push(Voxel::new(x, y, z));
                    }
                }
            }
            potts.add_cell(1, &voxels, &[]).expect("free voxels");
        }
    }
    potts
}

fn bench_step_planar(c: &mut Criterion) {
    let mut potts = tissue(64, 64, 1);
    c.bench_function("step_planar_64x64", |b| b.iter(|| black_box(potts.step())));
}

fn bench_step_volumetric(c: &mut Criterion) {
    let mut potts = tissue(24, 24, 8);
    c.bench_function("step_volumetric_24x24x8", |b| b.iter(|| black_box(potts.step())));
}

fn bench_connectivity(c: &mut Criterion) {
    let windows: Vec<Window> = (0u32..256)
        .map(|bits| {
            let mut i = 0;
            Window::from_fn(Topology::Volumetric, |_, _, _| {
                i += 1;
                bits.wrapping_mul(2_654_435_761).rotate_left(i) & 1 == 1
            })
        })
        .collect();

    c.bench_function("connectivity_volumetric_256", |b| {
        b.iter(|| {
            windows
                .iter()
                .filter(|w| is_connected(Topology::Volumetric, w, false))
                .count()
        })
    });
}

criterion_group!(
    benches,
    bench_step_planar,
    bench_step_volumetric,
    bench_connectivity
);
criterion_main!(benches);
