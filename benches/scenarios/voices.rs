//! Benchmarks for complete unit chains.
//!
//! Each factory preset is rendered by a single voice, so the numbers show
//! what one sounding note costs per block.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use unitsynth::controls::NoControls;
use unitsynth::patch::presets;
use unitsynth::synth::Voice;
use unitsynth::units::NoteStart;
use unitsynth::DEFAULT_SAMPLE_RATE;

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let trigger = NoteStart {
        note: 45, // A2, typical bass note
        velocity: 100,
        voice: 0,
        sample_rate: DEFAULT_SAMPLE_RATE,
        controls: &NoControls,
    };

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0i32; size];

        for (name, patch) in presets::all() {
            let mut voice = Voice::new();
            voice.start(&patch, &trigger, 1);

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for out in buffer.iter_mut() {
                        *out = voice.render(black_box(&patch), 0);
                    }
                })
            });
        }

        // Empty patch: the cost of walking sixteen passthrough slots
        let patch = unitsynth::Patch::new();
        let mut voice = Voice::new();
        voice.start(&patch, &trigger, 1);
        group.bench_with_input(BenchmarkId::new("empty", size), &size, |b, _| {
            b.iter(|| {
                for out in buffer.iter_mut() {
                    *out = voice.render(black_box(&patch), 0);
                }
            })
        });
    }

    group.finish();
}
