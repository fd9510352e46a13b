/*
VCO: Wavetable Oscillator
=========================

The main pitched source. Each voice keeps its own phase accumulator; the
parameter block (waveform, level, modulation depths) is shared.

Per sample:

    out    = table[phase >> 22] × amplitude / 256
    phase += base + control_term + bend_term

where

    control_term = control × control_coef >> 15
    bend_term    = bend × bend_coef >> 13

Everything with a transcendental in it (`2^x`, frequency → increment) is
computed once in `note_start`:

    semitones    = note + harmonic_offset + (fine_tune - 100) / 100
    base         = increment(440 × 2^((semitones - 69) / 12))
    control_coef = base × control_gain / 256      full-scale control → +1 octave
    bend_coef    = base × (2^(bend_range / 12) - 1)

With `FixedFreq` set, the note is ignored and the base frequency is
`FixedFreq × 2^((harmonic_offset + fine) / 12)`; useful for drones and as a
fixed ring-mod carrier.

`AmpCtrl` names a live control channel that replaces `Amplitude` for the
life of the note. The control is read once, at the trigger.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{NoteStart, Unit, UnitHeader, UnitIo, ROUTING_MAX, ROUTING_MIN};
use crate::controls::{scale_control, CONTROL_CHANNELS};
use crate::dsp::mix::scale;
use crate::dsp::pitch::{
    bend_coefficient, bend_term, harmonic_offset, hz_to_increment, modulate_increment, note_to_hz,
    HARMONIC_OFFSETS,
};
use crate::dsp::wavetable::{self, Waveform};
use crate::params::{field, Field, ParamBlock};
use crate::{Sample, AMPLITUDE_UNITY};

/// Shift applied to `control × control_coef`.
pub(crate) const CONTROL_SHIFT: u32 = 15;

pub const FINE_TUNE_CENTER: u8 = 100;
pub const FIXED_FREQ_MAX: u32 = 16_000;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcoParams {
    pub header: UnitHeader,
    pub osc_type: u8,
    pub amplitude: u16,
    pub control_gain: u16,
    pub bend_range: u8,
    pub harmonic: u8,
    pub fine_tune: u8,
    pub fixed_freq: u16,
    pub amp_ctrl: u8,
}

impl VcoParams {
    pub fn new(header: UnitHeader) -> Self {
        Self {
            header,
            osc_type: Waveform::Sawtooth as u8,
            amplitude: AMPLITUDE_UNITY as u16,
            control_gain: 0,
            bend_range: 2,
            harmonic: 0,
            fine_tune: FINE_TUNE_CENTER,
            fixed_freq: 0,
            amp_ctrl: 0,
        }
    }

    /// Frequency in Hz that a trigger of `note` will produce.
    pub fn frequency(&self, note: u8) -> f64 {
        let cents = (f64::from(self.fine_tune) - f64::from(FINE_TUNE_CENTER)) / 100.0;
        let offset = f64::from(harmonic_offset(self.harmonic)) + cents;
        if self.fixed_freq > 0 {
            f64::from(self.fixed_freq) * 2f64.powf(offset / 12.0)
        } else {
            note_to_hz(f64::from(note) + offset)
        }
    }
}

static FIELDS: [Field<VcoParams>; 10] = [
    field!(VcoParams, "SourceUnit", header.source_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(VcoParams, "ControlUnit", header.control_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(VcoParams, "OscType", osc_type: u8, 1, 0, Waveform::MAX_INDEX),
    field!(VcoParams, "Amplitude", amplitude: u16, 3, 0, AMPLITUDE_UNITY),
    field!(VcoParams, "ControlGain", control_gain: u16, 3, 0, AMPLITUDE_UNITY),
    field!(VcoParams, "BendRange", bend_range: u8, 2, 0, 12),
    field!(VcoParams, "Harmonic", harmonic: u8, 2, 0, HARMONIC_OFFSETS.len() as u32 - 1),
    field!(VcoParams, "FineTune", fine_tune: u8, 3, 0, 200),
    field!(VcoParams, "FixedFreq", fixed_freq: u16, 5, 0, FIXED_FREQ_MAX),
    field!(VcoParams, "AmpCtrl", amp_ctrl: u8, 2, 0, CONTROL_CHANNELS as u32, control = "VcoAmp"),
];

impl ParamBlock for VcoParams {
    fn fields() -> &'static [Field<Self>] {
        &FIELDS
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VcoState {
    phase: u32,
    base: u32,
    control_coef: i64,
    bend_coef: i64,
    amplitude: Option<u32>,
}

impl VcoState {
    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn increment(&self) -> u32 {
        self.base
    }
}

impl Unit for VcoParams {
    type State = VcoState;

    fn header(&self) -> &UnitHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut UnitHeader {
        &mut self.header
    }

    #[inline]
    fn process(&self, state: &mut VcoState, io: &mut UnitIo<'_>) -> Sample {
        let waveform = Waveform::from_index(self.osc_type);
        let raw = wavetable::lookup(waveform, state.phase);

        let control_term = (i64::from(io.control) * state.control_coef) >> CONTROL_SHIFT;
        let increment = modulate_increment(
            state.base,
            control_term,
            bend_term(io.pitch_bend, state.bend_coef),
        );
        state.phase = state.phase.wrapping_add(increment);

        scale(raw, state.amplitude.unwrap_or(u32::from(self.amplitude)))
    }

    fn note_start(&self, state: &mut VcoState, note: &NoteStart<'_>) {
        let base = hz_to_increment(self.frequency(note.note), note.sample_rate);
        *state = VcoState {
            phase: 0,
            base,
            control_coef: i64::from(base) * i64::from(self.control_gain)
                / i64::from(AMPLITUDE_UNITY),
            bend_coef: bend_coefficient(base, u32::from(self.bend_range)),
            amplitude: note
                .control(self.amp_ctrl)
                .map(|value| scale_control(value, 0, AMPLITUDE_UNITY)),
        };
    }
}
