//! Benchmarks for unit processing and full-engine rendering.
//!
//! Run with: cargo bench
//!
//! The engine renders one sample per tick, so a block here is simply that
//! many consecutive ticks. Deadlines at the default 32kHz:
//!   - 64 samples  = 2.00ms
//!   - 128 samples = 4.00ms
//!   - 256 samples = 8.00ms
//!   - 512 samples = 16.00ms
//!
//! Benchmark groups:
//!   - dsp/*        Single units and primitives (oscillator, envelope, filter)
//!   - scenarios/*  Preset voices and the whole engine at full polyphony

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

criterion_group!(
    benches,
    dsp::bench_oscillator,
    dsp::bench_envelope,
    dsp::bench_filter,
    scenarios::bench_voices,
    scenarios::bench_polyphony,
);
criterion_main!(benches);
