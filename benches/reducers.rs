//! Reducer comparison on synthetic corpora.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{seq::SliceRandom, SeedableRng};

use deltamin::{reduce, Algorithm, ListInput, ReduceConfig, Verdict};

/// A corpus where `required` scattered atoms must all survive.
fn scattered_corpus(n: usize, required: usize, seed: u64) -> (ListInput<u32>, Vec<u32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut markers: Vec<u32> = (0..n as u32).collect();
    markers.shuffle(&mut rng);
    markers.truncate(required);
    markers.sort_unstable();
    (ListInput::new((0..n as u32).collect()), markers)
}

fn bench_sequence_reducers(c: &mut Criterion) {
    let mut group = c.benchmark_group("scattered-markers");
    for &n in &[64usize, 256] {
        let (input, markers) = scattered_corpus(n, 4, 7);
        for algorithm in [Algorithm::DdMin, Algorithm::TicTocMin, Algorithm::ProbDd] {
            group.bench_with_input(
                BenchmarkId::new(algorithm.name(), n),
                &n,
                |b, _| {
                    b.iter(|| {
                        let markers = markers.clone();
                        let oracle = move |items: &Vec<u32>| {
                            if markers.iter().all(|m| items.contains(m)) {
                                Verdict::Fail
                            } else {
                                Verdict::Pass
                            }
                        };
                        let result =
                            reduce(&input, oracle, algorithm, &ReduceConfig::default()).unwrap();
                        black_box(result.final_size)
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_cache_effect(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache-effect");
    let (input, markers) = scattered_corpus(128, 3, 11);
    for (label, config) in [
        ("cached", ReduceConfig::default()),
        ("uncached", ReduceConfig::default().without_cache()),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let markers = markers.clone();
                let oracle = move |items: &Vec<u32>| {
                    if markers.iter().all(|m| items.contains(m)) {
                        Verdict::Fail
                    } else {
                        Verdict::Pass
                    }
                };
                let result = reduce(&input, oracle, Algorithm::DdMin, &config).unwrap();
                black_box(result.counters.queries)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sequence_reducers, bench_cache_effect);
criterion_main!(benches);
