use criterion::{criterion_group, criterion_main, Criterion};
use pbh_core::channels::{channel_for, ConstraintChannel};
use pbh_core::evolution::EvolutionModel;
use pbh_core::session::Session;
use pbh_types::config::{GridConfig, MatchingStrategy, NumericsConfig, SessionConfig};
use pbh_types::constants::PhysicalConstants;
use pbh_types::state::{ChannelKind, ReheatingScenario};
use std::hint::black_box;

fn coarse_config(parallel: bool) -> SessionConfig {
    SessionConfig {
        grid: GridConfig {
            delta_log10: 0.5,
            mass_min_g: 1.0,
            mass_max_g: 1e20,
        },
        parallel,
        ..SessionConfig::default()
    }
}

fn bench_single_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_point");
    for (kind, mass) in [(ChannelKind::Bbn, 1e15), (ChannelKind::Grb, 1e16), (ChannelKind::Lsp, 1e10)] {
        let channel = channel_for(kind);
        group.bench_function(kind.label(), |b| {
            // Fresh model each batch so the record cache is cold.
            b.iter_batched(
                || {
                    EvolutionModel::new(
                        PhysicalConstants::standard(),
                        ReheatingScenario::instantaneous(),
                        MatchingStrategy::default(),
                        NumericsConfig::default(),
                    )
                    .expect("model")
                },
                |model| black_box(channel.evaluate(mass, &model).expect("evaluate")),
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_full_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_envelope");
    group.sample_size(10);
    for (name, parallel) in [("serial", false), ("rayon", true)] {
        let session = Session::new(coarse_config(parallel)).expect("session");
        group.bench_function(name, |b| {
            b.iter(|| {
                let env = session
                    .get_betas_full(ReheatingScenario::with_efolds(10.0).expect("scenario"))
                    .expect("envelope");
                black_box(env.bounds.len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_point, bench_full_envelope);
criterion_main!(benches);
