//! Benchmarks for the one-pole lowpass cascade.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use unitsynth::dsp::filter::{one_pole_coefficient, OnePoleCascade, MAX_STAGES};
use unitsynth::DEFAULT_SAMPLE_RATE;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let coef = one_pole_coefficient(1_200.0, DEFAULT_SAMPLE_RATE);
    // Full-scale square at roughly 250Hz
    let input: Vec<i32> = (0..512)
        .map(|i| if (i / 64) % 2 == 0 { 32_767 } else { -32_767 })
        .collect();

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0i32; size];

        for stages in 1..=MAX_STAGES {
            let mut cascade = OnePoleCascade::default();
            group.bench_with_input(
                BenchmarkId::new(format!("stages_{stages}"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        for (out, &x) in buffer.iter_mut().zip(&input) {
                            *out = cascade.process(black_box(x), coef, stages);
                        }
                    })
                },
            );
        }
    }

    group.finish();
}
