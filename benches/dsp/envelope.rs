//! Benchmarks for the fixed-point envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use unitsynth::dsp::envelope::{Envelope, EnvelopeTiming, ENV_ONE};

use crate::BLOCK_SIZES;

const TIMING: EnvelopeTiming = EnvelopeTiming {
    attack: 48_000,
    decay: 48_000,
    release: 48_000,
    sustain: ENV_ONE / 2,
    peak: ENV_ONE,
};

fn render(env: &mut Envelope, buffer: &mut [i32]) {
    for out in buffer.iter_mut() {
        *out = env.step();
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0i32; size];

        // Attack phase (interpolating)
        let mut env = Envelope::default();
        env.trigger(TIMING);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer)))
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::default();
        env.trigger(EnvelopeTiming {
            attack: 1,
            decay: 1,
            ..TIMING
        });
        for _ in 0..4 {
            env.step();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer)))
        });

        // Release phase
        let mut env = Envelope::default();
        env.trigger(TIMING);
        env.release();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| render(&mut env, black_box(&mut buffer)))
        });
    }

    group.finish();
}
