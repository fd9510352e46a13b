//! Cascaded one-pole lowpass.
//!
//! The knee is fixed (`Knee` in Hz) or follows the played note
//! (`Knee = 0`, `TrackOffset` semitones above the note). The control tap
//! opens or closes the filter every sample:
//!
//! ```text
//! coef = base + control × control_gain × ONE / (32768 × 256)
//! ```
//!
//! and the result is clamped into `0..=ONE` so the filter can never go
//! unstable, however hard it is modulated.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{NoteStart, Unit, UnitHeader, UnitIo, ROUTING_MAX, ROUTING_MIN};
use crate::dsp::filter::{one_pole_coefficient, OnePoleCascade, COEF_ONE, MAX_STAGES};
use crate::dsp::mix::FULL_SCALE;
use crate::dsp::pitch::note_to_hz;
use crate::params::{field, Field, ParamBlock};
use crate::{Sample, AMPLITUDE_UNITY};

pub const KNEE_MAX: u32 = 16_000;
pub const TRACK_OFFSET_MAX: u32 = 48;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowpassParams {
    pub header: UnitHeader,
    pub stages: u8,
    pub knee: u16,
    pub track_offset: u8,
    pub control_gain: u16,
}

impl LowpassParams {
    pub fn new(header: UnitHeader) -> Self {
        Self {
            header,
            stages: 2,
            knee: 0,
            track_offset: 24,
            control_gain: 0,
        }
    }

    pub fn knee_hz(&self, note: u8) -> f64 {
        if self.knee > 0 {
            f64::from(self.knee)
        } else {
            note_to_hz(f64::from(note) + f64::from(self.track_offset))
        }
    }
}

static FIELDS: [Field<LowpassParams>; 6] = [
    field!(LowpassParams, "SourceUnit", header.source_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(LowpassParams, "ControlUnit", header.control_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(LowpassParams, "Stages", stages: u8, 1, 1, MAX_STAGES as u32),
    field!(LowpassParams, "Knee", knee: u16, 5, 0, KNEE_MAX),
    field!(LowpassParams, "TrackOffset", track_offset: u8, 2, 0, TRACK_OFFSET_MAX),
    field!(LowpassParams, "ControlGain", control_gain: u16, 3, 0, AMPLITUDE_UNITY),
];

impl ParamBlock for LowpassParams {
    fn fields() -> &'static [Field<Self>] {
        &FIELDS
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LowpassState {
    cascade: OnePoleCascade,
    base: i32,
}

impl LowpassState {
    pub fn coefficient(&self) -> i32 {
        self.base
    }
}

impl Unit for LowpassParams {
    type State = LowpassState;

    fn header(&self) -> &UnitHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut UnitHeader {
        &mut self.header
    }

    #[inline]
    fn process(&self, state: &mut LowpassState, io: &mut UnitIo<'_>) -> Sample {
        let modulation = i64::from(io.control) * i64::from(self.control_gain) * i64::from(COEF_ONE)
            / (FULL_SCALE * i64::from(AMPLITUDE_UNITY));
        let coef = (i64::from(state.base) + modulation).clamp(0, i64::from(COEF_ONE)) as i32;
        state
            .cascade
            .process(io.source, coef, usize::from(self.stages))
    }

    fn note_start(&self, state: &mut LowpassState, note: &NoteStart<'_>) {
        state.cascade.reset();
        state.base = one_pole_coefficient(self.knee_hz(note.note), note.sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::NoControls;
    use crate::SAMPLE_MAX;

    fn trigger(params: &LowpassParams, note: u8) -> LowpassState {
        let mut state = LowpassState::default();
        params.note_start(
            &mut state,
            &NoteStart {
                note,
                velocity: 100,
                voice: 0,
                sample_rate: 32_000,
                controls: &NoControls,
            },
        );
        state
    }

    fn step(params: &LowpassParams, state: &mut LowpassState, source: Sample, control: Sample) -> Sample {
        params.process(
            state,
            &mut UnitIo {
                source,
                control,
                taps: &[],
                releasing: false,
                pitch_bend: 0,
                finished: false,
            },
        )
    }

    #[test]
    fn tracking_knee_rises_with_the_note() {
        let params = LowpassParams::new(UnitHeader::chained(1));
        assert!(trigger(&params, 72).coefficient() > trigger(&params, 48).coefficient());
    }

    #[test]
    fn fixed_knee_ignores_the_note() {
        let mut params = LowpassParams::new(UnitHeader::chained(1));
        params.knee = 2_000;
        assert_eq!(
            trigger(&params, 30).coefficient(),
            trigger(&params, 90).coefficient()
        );
    }

    #[test]
    fn full_control_opens_the_filter_completely() {
        let mut params = LowpassParams::new(UnitHeader::chained(1));
        params.knee = 100;
        params.control_gain = 256;
        let mut state = trigger(&params, 60);
        assert_eq!(step(&params, &mut state, 12_000, SAMPLE_MAX * 2), 12_000);
    }

    #[test]
    fn negative_control_closes_but_never_inverts() {
        let mut params = LowpassParams::new(UnitHeader::chained(1));
        params.control_gain = 256;
        let mut state = trigger(&params, 60);
        assert_eq!(step(&params, &mut state, 12_000, -SAMPLE_MAX), 0);
    }
}
