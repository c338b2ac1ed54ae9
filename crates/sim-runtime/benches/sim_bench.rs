use criterion::{criterion_group, criterion_main, Criterion};
use sim_core::{ids, AssetTypeId, Catalog, FacilityId, Orientation, SimConfig};
use sim_econ::Action;

fn bench_ticks(c: &mut Criterion) {
    let mut config = SimConfig::default();
    config.start.cash = rust_decimal::Decimal::new(10_000_000, 0);
    let mut sim = sim_runtime::Simulation::new(Catalog::standard(), config).unwrap();
    let kinds = [
        ids::GPU_H100,
        ids::GPU_B200,
        ids::COOLING_IN_ROW,
        ids::POWER_BATTERY_PACK,
    ];
    for (n, kind) in kinds.iter().cycle().take(64).enumerate() {
        let x = (n % 8) as f64 - 3.5;
        let y = (n / 8) as f64 - 3.5;
        sim.apply(Action::PlaceAsset {
            facility: FacilityId::new(ids::LOC_GARAGE),
            asset_type: AssetTypeId::new(*kind),
            x,
            y,
            orientation: Orientation::ALL[n % 4],
        })
        .unwrap();
    }
    for _ in 0..5 {
        sim.apply(Action::HireEmployee).unwrap();
    }
    c.bench_function("sim_tick", |b| {
        b.iter(|| {
            let _ = sim.step();
        })
    });
}

criterion_group!(benches, bench_ticks);
criterion_main!(benches);
