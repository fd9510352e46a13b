//! Benchmarks for the engine facade with every voice busy.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use unitsynth::patch::presets;
use unitsynth::{EngineConfig, SynthEngine, MAX_POLYPHONY};

use crate::BLOCK_SIZES;

fn full_engine(patch: unitsynth::Patch) -> SynthEngine {
    let engine = SynthEngine::new(EngineConfig::default());
    engine.load_patch(patch).expect("presets are valid");
    for i in 0..MAX_POLYPHONY as u8 {
        engine.note_on(48 + 3 * i, 100);
    }
    engine
}

pub fn bench_polyphony(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/polyphony");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0i32; size];

        for (name, patch) in [("lead", presets::lead()), ("bass", presets::bass())] {
            let engine = full_engine(patch);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| engine.render_block(black_box(&mut buffer)))
            });
        }

        // A parameter write per block: copy-modify-publish on top of rendering
        let engine = full_engine(presets::lead());
        let mut knee = 0u32;
        group.bench_with_input(BenchmarkId::new("lead_param_writes", size), &size, |b, _| {
            b.iter(|| {
                knee = (knee + 250) % 16_000;
                engine
                    .set_parameter(1, "Knee", knee)
                    .expect("knee in range");
                engine.render_block(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
