use criterion::{criterion_group, criterion_main, Criterion};
use pcn_core::cell::CellParams;
use pcn_core::experiment::{Population, SurvivorPolicy, TransferProtocol};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;

fn bench_growth(c: &mut Criterion) {
    let params = CellParams {
        mutation_rate: 18e-7,
        max_plasmids: 100,
    };

    c.bench_function("grow_pcn100_single_lineage_24gen", |b| {
        let mut rng = StdRng::seed_from_u64(1);
        b.iter(|| {
            let mut pop = Population::founded(params, 1, SurvivorPolicy::FirstLineage, &mut rng);
            for _ in 0..24 {
                pop.grow(&mut rng);
            }
            pop
        })
    });

    c.bench_function("grow_pcn100_64cells_24gen", |b| {
        let mut rng = StdRng::seed_from_u64(2);
        b.iter(|| {
            let mut pop = Population::founded(params, 64, SurvivorPolicy::Uniform, &mut rng);
            for _ in 0..24 {
                pop.grow(&mut rng);
            }
            pop
        })
    });

    let protocol = TransferProtocol {
        num_days: 60,
        generations_per_day: 24,
        max_plasmids: 100,
        mutation_rate: 18e-7,
        max_cells: 1,
        survivor: SurvivorPolicy::FirstLineage,
    };
    c.bench_function("replicate_pcn100_60x24", |b| {
        let mut rng = StdRng::seed_from_u64(3);
        b.iter(|| protocol.run(&mut rng, &mut io::sink()))
    });
}

criterion_group!(benches, bench_growth);
criterion_main!(benches);
