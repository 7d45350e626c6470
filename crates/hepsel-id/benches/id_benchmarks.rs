//! Per-object identification cost
//!
//! Run with: cargo bench -p hepsel-id

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use hepsel_core::{ChamberMatch, Muon, SegmentMatch, Track, Vec3, Vertex, ME0_DETECTOR_ID, P4};
use hepsel_id::{filter_muon_tiers, ntuple_muon_tiers, GeometryMap, PlanarChamber, StandardMuonSelectors};

fn forward_muon(n_matches: usize) -> Muon {
    let matches = (0..n_matches)
        .map(|i| ChamberMatch {
            detector: ME0_DETECTOR_ID,
            chamber_id: (i % 4) as u32,
            x: 1.0 + i as f64,
            y: -2.0,
            x_err: 0.5,
            y_err: 0.8,
            me0_matches: vec![
                SegmentMatch {
                    x: 1.2 + i as f64,
                    y: -2.1,
                    x_err: 0.3,
                    y_err: 0.4,
                    ..Default::default()
                };
                3
            ],
            ..Default::default()
        })
        .collect();
    Muon {
        p4: P4::massless(12.0, 2.7, 0.4),
        is_me0: true,
        inner_track: Some(Track {
            momentum: Vec3::new(4.0, 1.0, 30.0),
            valid_pixel_hits: 2,
            high_purity: true,
            ..Default::default()
        }),
        matches,
        ..Default::default()
    }
}

fn benchmark_muon_tiers(c: &mut Criterion) {
    let selectors = StandardMuonSelectors;
    let vertex = Vertex {
        position: Vec3::ORIGIN,
        ndof: 30.0,
        is_fake: false,
    };
    let mut geometry = GeometryMap::new();
    for id in 0..4 {
        geometry.insert(id, PlanarChamber::aligned(Vec3::new(0.0, 90.0, 540.0 + id as f64), 4.0));
    }

    let mut group = c.benchmark_group("Muon_Tiers");
    group.sample_size(100);

    for n in [1usize, 4, 16] {
        let muon = forward_muon(n);
        group.bench_with_input(BenchmarkId::new("ntuple_legacy", n), &muon, |b, muon| {
            b.iter(|| ntuple_muon_tiers(black_box(muon), &selectors, Some(&vertex)))
        });
        group.bench_with_input(BenchmarkId::new("filter_geometry", n), &muon, |b, muon| {
            b.iter(|| filter_muon_tiers(black_box(muon), &selectors, &geometry, Some(&vertex)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_muon_tiers);
criterion_main!(benches);
