//! Benchmarks for the VCO and noise units.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use unitsynth::controls::NoControls;
use unitsynth::dsp::wavetable::Waveform;
use unitsynth::units::{NoiseParams, NoteStart, UnitHeader, UnitIo, UnitParams, UnitState, VcoParams};
use unitsynth::DEFAULT_SAMPLE_RATE;

use crate::BLOCK_SIZES;

fn started(params: UnitParams) -> UnitState {
    let mut state = UnitState::for_type(params.unit_type());
    params.note_start(
        &mut state,
        &NoteStart {
            note: 57,
            velocity: 100,
            voice: 0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            controls: &NoControls,
        },
    );
    state
}

fn run(params: &UnitParams, state: &mut UnitState, buffer: &mut [i32], pitch_bend: i32) {
    for out in buffer.iter_mut() {
        let mut io = UnitIo {
            source: 0,
            control: 0,
            taps: &[],
            releasing: false,
            pitch_bend,
            finished: false,
        };
        *out = params.process(state, &mut io);
    }
}

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0i32; size];

        // Table lookup cost is the same for every waveform
        for waveform in Waveform::ALL {
            let params = UnitParams::from(VcoParams {
                osc_type: waveform as u8,
                ..VcoParams::new(UnitHeader::chained(0))
            });
            let mut state = started(params);
            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| run(black_box(&params), &mut state, black_box(&mut buffer), 0))
            });
        }

        // Bent pitch adds the increment multiply per sample
        let params = UnitParams::from(VcoParams::new(UnitHeader::chained(0)));
        let mut state = started(params);
        group.bench_with_input(BenchmarkId::new("bent", size), &size, |b, _| {
            b.iter(|| run(black_box(&params), &mut state, black_box(&mut buffer), 4096))
        });

        // Noise - LCG draw per grain
        let params = UnitParams::from(NoiseParams::new(UnitHeader::chained(0)));
        let mut state = started(params);
        group.bench_with_input(BenchmarkId::new("noise", size), &size, |b, _| {
            b.iter(|| run(black_box(&params), &mut state, black_box(&mut buffer), 0))
        });
    }

    group.finish();
}
