/*
Pitched Sample-and-Hold Noise
=============================

White noise has no pitch. Holding each random value for a while does: the
hold time sets a "grain rate", and grains at a few hundred Hz sound like a
buzzy, pitched hiss that tracks the keyboard.

A phase accumulator runs exactly like the VCO's (note + control + bend), and
a new value is drawn whenever the phase crosses into the next wavetable cell:

    grain rate = note_hz × 2^shift_up

    phase:  |----cell 41----|----cell 42----|----cell 43----|
    output: ══════ a ═══════╗═════ b ═══════╗═════ c ═══════
                            new draw        new draw

`ShiftUp` raises the grain rate in whole octaves. Past the sample rate every
sample is a fresh draw, which is plain white noise.

Each voice seeds its own generator from its index and note, so two voices
playing together never produce the same sequence.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::vco::CONTROL_SHIFT;
use super::{NoteStart, Unit, UnitHeader, UnitIo, ROUTING_MAX, ROUTING_MIN};
use crate::dsp::mix::scale;
use crate::dsp::noise::Lcg;
use crate::dsp::pitch::{bend_coefficient, bend_term, hz_to_increment, modulate_increment, note_to_hz};
use crate::dsp::wavetable::{cell, TABLE_SIZE};
use crate::params::{field, Field, ParamBlock};
use crate::{Sample, AMPLITUDE_UNITY};

pub const SHIFT_UP_MAX: u32 = 8;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseParams {
    pub header: UnitHeader,
    pub amplitude: u16,
    pub control_gain: u16,
    pub bend_range: u8,
    pub shift_up: u8,
}

impl NoiseParams {
    pub fn new(header: UnitHeader) -> Self {
        Self {
            header,
            amplitude: AMPLITUDE_UNITY as u16,
            control_gain: 0,
            bend_range: 2,
            shift_up: 4,
        }
    }

    /// Grains per second for `note`.
    pub fn grain_rate(&self, note: u8) -> f64 {
        note_to_hz(f64::from(note)) * f64::from(1u32 << self.shift_up.min(SHIFT_UP_MAX as u8))
    }
}

static FIELDS: [Field<NoiseParams>; 6] = [
    field!(NoiseParams, "SourceUnit", header.source_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(NoiseParams, "ControlUnit", header.control_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(NoiseParams, "Amplitude", amplitude: u16, 3, 0, AMPLITUDE_UNITY),
    field!(NoiseParams, "ControlGain", control_gain: u16, 3, 0, AMPLITUDE_UNITY),
    field!(NoiseParams, "BendRange", bend_range: u8, 2, 0, 12),
    field!(NoiseParams, "ShiftUp", shift_up: u8, 1, 0, SHIFT_UP_MAX),
];

impl ParamBlock for NoiseParams {
    fn fields() -> &'static [Field<Self>] {
        &FIELDS
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseState {
    phase: u32,
    base: u32,
    control_coef: i64,
    bend_coef: i64,
    lcg: Lcg,
    held: Sample,
}

impl NoiseState {
    pub fn held(&self) -> Sample {
        self.held
    }
}

fn seed(voice: usize, note: u8) -> u32 {
    (voice as u32 + 1)
        .wrapping_mul(0x9E37_79B9)
        ^ u32::from(note)
}

impl Unit for NoiseParams {
    type State = NoiseState;

    fn header(&self) -> &UnitHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut UnitHeader {
        &mut self.header
    }

    #[inline]
    fn process(&self, state: &mut NoiseState, io: &mut UnitIo<'_>) -> Sample {
        let control_term = (i64::from(io.control) * state.control_coef) >> CONTROL_SHIFT;
        let increment = modulate_increment(
            state.base,
            control_term,
            bend_term(io.pitch_bend, state.bend_coef),
        );
        let next = state.phase.wrapping_add(increment);
        if cell(next) != cell(state.phase) {
            state.held = state.lcg.next_sample();
        }
        state.phase = next;
        scale(state.held, u32::from(self.amplitude))
    }

    fn note_start(&self, state: &mut NoiseState, note: &NoteStart<'_>) {
        // One cell per grain, so the cycle rate is the grain rate / cells.
        let base = hz_to_increment(
            self.grain_rate(note.note) / TABLE_SIZE as f64,
            note.sample_rate,
        );
        let mut lcg = Lcg::new(seed(note.voice, note.note));
        *state = NoiseState {
            phase: 0,
            base,
            control_coef: i64::from(base) * i64::from(self.control_gain)
                / i64::from(AMPLITUDE_UNITY),
            bend_coef: bend_coefficient(base, u32::from(self.bend_range)),
            held: lcg.next_sample(),
            lcg,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::NoControls;

    fn trigger(params: &NoiseParams, voice: usize, note: u8) -> NoiseState {
        let mut state = NoiseState::default();
        params.note_start(
            &mut state,
            &NoteStart {
                note,
                velocity: 100,
                voice,
                sample_rate: 32_000,
                controls: &NoControls,
            },
        );
        state
    }

    fn render(params: &NoiseParams, state: &mut NoiseState, ticks: usize) -> Vec<Sample> {
        (0..ticks)
            .map(|_| {
                params.process(
                    state,
                    &mut UnitIo {
                        source: 0,
                        control: 0,
                        taps: &[],
                        releasing: false,
                        pitch_bend: 0,
                        finished: false,
                    },
                )
            })
            .collect()
    }

    fn changes(samples: &[Sample]) -> usize {
        samples.windows(2).filter(|w| w[0] != w[1]).count()
    }

    #[test]
    fn low_grain_rate_holds_values() {
        let mut params = NoiseParams::new(UnitHeader::chained(0));
        params.shift_up = 0;
        // A3 = 220 grains/s at 32 kHz: one draw every ~145 samples.
        let mut state = trigger(&params, 0, 57);
        let samples = render(&params, &mut state, 3_200);
        let count = changes(&samples);
        assert!((15..=25).contains(&count), "{count} changes");
    }

    #[test]
    fn shift_up_raises_grain_rate() {
        let mut params = NoiseParams::new(UnitHeader::chained(0));
        params.shift_up = 0;
        let mut state = trigger(&params, 0, 57);
        let slow = changes(&render(&params, &mut state, 3_200));
        params.shift_up = 3;
        let mut state = trigger(&params, 0, 57);
        let fast = changes(&render(&params, &mut state, 3_200));
        assert!(fast > slow * 6);
    }

    #[test]
    fn voices_get_distinct_sequences() {
        let params = NoiseParams::new(UnitHeader::chained(0));
        let a = trigger(&params, 0, 60);
        let b = trigger(&params, 1, 60);
        assert_ne!(a.held(), b.held());
    }
}
