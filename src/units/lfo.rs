/*
LFO / Secondary Oscillator
==========================

Same table-and-phase engine as the VCO, but its rate has nothing to do with
the played note:

    hz   = 0.05 × 2^(rate / 24)          rate 0..=383, 24 steps per octave

so the low end is a slow sweep (20 s per cycle) and the top end is well into
audio range, where it works as a second oscillator for FM or ring effects.

The control tap frequency-modulates the increment directly:

    increment = base + (control × control_bend) << 8

At full control and `ControlBend = 256` that adds roughly half a cycle per
sample, which is as far as FM can go before aliasing turns it into noise.

`RateCtrl` assigns a live control to the rate, read once at trigger. Phase
restarts at 0 on every trigger, so the sweep is in step with the note.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{NoteStart, Unit, UnitHeader, UnitIo, ROUTING_MAX, ROUTING_MIN};
use crate::controls::{scale_control, CONTROL_CHANNELS};
use crate::dsp::mix::scale;
use crate::dsp::pitch::{hz_to_increment, lfo_rate_hz, modulate_increment, LFO_RATE_MAX};
use crate::dsp::wavetable::{self, Waveform};
use crate::params::{field, Field, ParamBlock};
use crate::{Sample, AMPLITUDE_UNITY};

const FM_SHIFT: u32 = 8;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LfoParams {
    pub header: UnitHeader,
    pub osc_type: u8,
    pub amplitude: u16,
    pub rate: u16,
    pub rate_ctrl: u8,
    pub control_bend: u16,
}

impl LfoParams {
    pub fn new(header: UnitHeader) -> Self {
        Self {
            header,
            osc_type: Waveform::Sine as u8,
            amplitude: AMPLITUDE_UNITY as u16,
            rate: 96,
            rate_ctrl: 0,
            control_bend: 0,
        }
    }
}

static FIELDS: [Field<LfoParams>; 7] = [
    field!(LfoParams, "SourceUnit", header.source_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(LfoParams, "ControlUnit", header.control_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(LfoParams, "OscType", osc_type: u8, 1, 0, Waveform::MAX_INDEX),
    field!(LfoParams, "Amplitude", amplitude: u16, 3, 0, AMPLITUDE_UNITY),
    field!(LfoParams, "Rate", rate: u16, 3, 0, LFO_RATE_MAX),
    field!(LfoParams, "RateCtrl", rate_ctrl: u8, 2, 0, CONTROL_CHANNELS as u32, control = "LfoRate"),
    field!(LfoParams, "ControlBend", control_bend: u16, 3, 0, AMPLITUDE_UNITY),
];

impl ParamBlock for LfoParams {
    fn fields() -> &'static [Field<Self>] {
        &FIELDS
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LfoState {
    phase: u32,
    increment: u32,
}

impl LfoState {
    pub fn increment(&self) -> u32 {
        self.increment
    }
}

impl Unit for LfoParams {
    type State = LfoState;

    fn header(&self) -> &UnitHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut UnitHeader {
        &mut self.header
    }

    #[inline]
    fn process(&self, state: &mut LfoState, io: &mut UnitIo<'_>) -> Sample {
        let raw = wavetable::lookup(Waveform::from_index(self.osc_type), state.phase);
        let fm = (i64::from(io.control) * i64::from(self.control_bend)) << FM_SHIFT;
        state.phase = state
            .phase
            .wrapping_add(modulate_increment(state.increment, fm, 0));
        scale(raw, u32::from(self.amplitude))
    }

    fn note_start(&self, state: &mut LfoState, note: &NoteStart<'_>) {
        let rate = note
            .control(self.rate_ctrl)
            .map(|value| scale_control(value, 0, LFO_RATE_MAX))
            .unwrap_or(u32::from(self.rate));
        *state = LfoState {
            phase: 0,
            increment: hz_to_increment(lfo_rate_hz(rate), note.sample_rate),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{ControlPanel, ControlInput, NoControls, CONTROL_MAX};

    fn trigger(params: &LfoParams, controls: &dyn ControlInput) -> LfoState {
        let mut state = LfoState::default();
        params.note_start(
            &mut state,
            &NoteStart {
                note: 60,
                velocity: 100,
                voice: 3,
                sample_rate: 32_000,
                controls,
            },
        );
        state
    }

    #[test]
    fn rate_maps_exponentially() {
        let mut params = LfoParams::new(UnitHeader::chained(0));
        params.rate = 0;
        let slow = trigger(&params, &NoControls).increment();
        params.rate = 24;
        let double = trigger(&params, &NoControls).increment();
        assert!((i64::from(double) - 2 * i64::from(slow)).abs() <= 1);
    }

    #[test]
    fn rate_control_overrides_parameter() {
        let panel = ControlPanel::new();
        panel.set(9, CONTROL_MAX);
        let mut params = LfoParams::new(UnitHeader::chained(0));
        params.rate = 0;
        params.rate_ctrl = 9;
        let state = trigger(&params, &panel);
        assert_eq!(
            state.increment(),
            hz_to_increment(lfo_rate_hz(LFO_RATE_MAX), 32_000)
        );
    }

    #[test]
    fn control_bend_speeds_up_the_phase() {
        let mut params = LfoParams::new(UnitHeader::chained(0));
        params.control_bend = 256;
        let mut plain = trigger(&params, &NoControls);
        let mut modulated = plain;
        let io = |control| UnitIo {
            source: 0,
            control,
            taps: &[],
            releasing: false,
            pitch_bend: 0,
            finished: false,
        };
        params.process(&mut plain, &mut io(0));
        params.process(&mut modulated, &mut io(1000));
        assert_eq!(modulated.phase - plain.phase, (1000 * 256) << 8);
    }
}
