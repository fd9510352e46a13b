//! Envelope unit.
//!
//! Wraps [`Envelope`] with the slot's parameters. The voice's releasing flag
//! drives the Release transition; the unit reports `finished` once its release
//! ramp has run out (or immediately, if the voice was released before the
//! envelope ever started), which is what frees a gracefully released voice.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{NoteStart, Unit, UnitHeader, UnitIo, ROUTING_MAX, ROUTING_MIN};
use crate::controls::{scale_control, CONTROL_CHANNELS};
use crate::dsp::envelope::{Envelope, EnvelopeTiming, ENV_ONE};
use crate::dsp::mix::clamp_sample;
use crate::params::{field, Field, ParamBlock};
use crate::{Sample, SAMPLE_BITS};

pub const STAGE_MIN: u32 = 1;
pub const STAGE_MAX: u32 = 480_000;
pub const SUSTAIN_MAX: u32 = 255;

/// Right shift from a Q24 level to sample scale.
const LEVEL_TO_SAMPLE: u32 = 24 - SAMPLE_BITS;

/// What the unit outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AdsrMode {
    /// Source tap multiplied by the envelope.
    Multiply = 0,
    /// The envelope itself, as a positive modulation signal.
    Envelope = 1,
    /// The envelope negated.
    Inverted = 2,
}

impl AdsrMode {
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => AdsrMode::Envelope,
            2 => AdsrMode::Inverted,
            _ => AdsrMode::Multiply,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdsrParams {
    pub header: UnitHeader,
    pub attack: u32,
    pub decay: u32,
    pub sustain: u8,
    pub release: u32,
    pub attack_ctrl: u8,
    pub decay_ctrl: u8,
    pub release_ctrl: u8,
    pub mode: u8,
    pub velocity: u8,
}

impl AdsrParams {
    pub fn new(header: UnitHeader) -> Self {
        Self {
            header,
            attack: 320,
            decay: 3_200,
            sustain: 192,
            release: 3_200,
            attack_ctrl: 0,
            decay_ctrl: 0,
            release_ctrl: 0,
            mode: AdsrMode::Multiply as u8,
            velocity: 0,
        }
    }

    /// Stage lengths and levels for a trigger, reading any assigned controls.
    pub fn timing(&self, note: &NoteStart<'_>) -> EnvelopeTiming {
        let stage = |fixed: u32, channel: u8| {
            note.control(channel)
                .map(|value| scale_control(value, STAGE_MIN, STAGE_MAX))
                .unwrap_or(fixed)
                .clamp(STAGE_MIN, STAGE_MAX)
        };

        let peak = if self.velocity != 0 {
            (i64::from(ENV_ONE) * i64::from(note.velocity.min(127)) / 127) as i32
        } else {
            ENV_ONE
        };
        let sustain =
            (i64::from(peak) * i64::from(self.sustain) / i64::from(SUSTAIN_MAX)) as i32;

        EnvelopeTiming {
            attack: stage(self.attack, self.attack_ctrl),
            decay: stage(self.decay, self.decay_ctrl),
            release: stage(self.release, self.release_ctrl),
            sustain,
            peak,
        }
    }
}

static FIELDS: [Field<AdsrParams>; 11] = [
    field!(AdsrParams, "SourceUnit", header.source_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(AdsrParams, "ControlUnit", header.control_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(AdsrParams, "Attack", attack: u32, 6, STAGE_MIN, STAGE_MAX),
    field!(AdsrParams, "Decay", decay: u32, 6, STAGE_MIN, STAGE_MAX),
    field!(AdsrParams, "Sustain", sustain: u8, 3, 0, SUSTAIN_MAX),
    field!(AdsrParams, "Release", release: u32, 6, STAGE_MIN, STAGE_MAX),
    field!(AdsrParams, "AttackCtrl", attack_ctrl: u8, 2, 0, CONTROL_CHANNELS as u32, control = "Attack"),
    field!(AdsrParams, "DecayCtrl", decay_ctrl: u8, 2, 0, CONTROL_CHANNELS as u32, control = "Decay"),
    field!(AdsrParams, "ReleaseCtrl", release_ctrl: u8, 2, 0, CONTROL_CHANNELS as u32, control = "Release"),
    field!(AdsrParams, "Mode", mode: u8, 1, 0, 2),
    field!(AdsrParams, "Velocity", velocity: u8, 1, 0, 1),
];

impl ParamBlock for AdsrParams {
    fn fields() -> &'static [Field<Self>] {
        &FIELDS
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AdsrState {
    envelope: Envelope,
}

impl AdsrState {
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

impl Unit for AdsrParams {
    type State = AdsrState;

    fn header(&self) -> &UnitHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut UnitHeader {
        &mut self.header
    }

    #[inline]
    fn process(&self, state: &mut AdsrState, io: &mut UnitIo<'_>) -> Sample {
        if io.releasing {
            state.envelope.release();
        }
        let level = state.envelope.step();
        if io.releasing && state.envelope.is_finished() {
            io.finished = true;
        }

        let raw = clamp_sample(i64::from(level >> LEVEL_TO_SAMPLE));
        match AdsrMode::from_index(self.mode) {
            AdsrMode::Multiply => {
                clamp_sample(i64::from(io.source) * i64::from(level) / i64::from(ENV_ONE))
            }
            AdsrMode::Envelope => raw,
            AdsrMode::Inverted => -raw,
        }
    }

    fn note_start(&self, state: &mut AdsrState, note: &NoteStart<'_>) {
        state.envelope = Envelope::default();
        state.envelope.trigger(self.timing(note));
    }
}
