//! The unit type library.
//!
//! A unit is one building block in a slot of the chain. Its parameter block
//! is shared by every voice; its state belongs to one voice. Each type
//! provides:
//!
//! - a static field table (see [`crate::params`]),
//! - `note_start`, run from the control context when a voice is triggered,
//! - `process`, run once per sample from the render context.
//!
//! `process` only sees its own parameters and state plus the voice's result
//! buffer (through [`UnitIo`]); it never reaches into another slot.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::controls::ControlInput;
use crate::error::{Error, ParamError};
use crate::params::{Field, ParamBlock, ParamDescriptor};
use crate::{Sample, MAX_SYNTH_UNITS};

pub mod adsr;
pub mod lfo;
pub mod lowpass;
pub mod mixer;
pub mod noise;
pub mod none;
pub mod ring;
pub mod vca;
pub mod vco;

pub use adsr::{AdsrMode, AdsrParams, AdsrState};
pub use lfo::{LfoParams, LfoState};
pub use lowpass::{LowpassParams, LowpassState};
pub use mixer::MixerParams;
pub use noise::{NoiseParams, NoiseState};
pub use none::NoneParams;
pub use ring::RingParams;
pub use vca::VcaParams;
pub use vco::{VcoParams, VcoState};

/// Tag identifying a unit kind. The discriminant is the stored type value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum UnitType {
    #[default]
    None = 0,
    Vco = 1,
    Adsr = 2,
    Lowpass = 3,
    Lfo = 4,
    Vca = 5,
    Mixer = 6,
    RingMod = 7,
    Noise = 8,
}

impl UnitType {
    pub const COUNT: usize = 9;

    pub const ALL: [UnitType; Self::COUNT] = [
        UnitType::None,
        UnitType::Vco,
        UnitType::Adsr,
        UnitType::Lowpass,
        UnitType::Lfo,
        UnitType::Vca,
        UnitType::Mixer,
        UnitType::RingMod,
        UnitType::Noise,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UnitType::None => "None",
            UnitType::Vco => "VCO",
            UnitType::Adsr => "ADSR",
            UnitType::Lowpass => "Lowpass",
            UnitType::Lfo => "LFO",
            UnitType::Vca => "VCA",
            UnitType::Mixer => "Mixer",
            UnitType::RingMod => "Ring",
            UnitType::Noise => "Noise",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.name().eq_ignore_ascii_case(name))
    }

    /// Fresh parameter block for this type placed at `slot`.
    pub fn default_params(self, slot: usize) -> UnitParams {
        let header = UnitHeader::chained(slot);
        match self {
            UnitType::None => UnitParams::None(NoneParams::new(header)),
            UnitType::Vco => UnitParams::Vco(VcoParams::new(header)),
            UnitType::Adsr => UnitParams::Adsr(AdsrParams::new(header)),
            UnitType::Lowpass => UnitParams::Lowpass(LowpassParams::new(header)),
            UnitType::Lfo => UnitParams::Lfo(LfoParams::new(header)),
            UnitType::Vca => UnitParams::Vca(VcaParams::new(header)),
            UnitType::Mixer => UnitParams::Mixer(MixerParams::new(header)),
            UnitType::RingMod => UnitParams::RingMod(RingParams::new(header)),
            UnitType::Noise => UnitParams::Noise(NoiseParams::new(header)),
        }
    }
}

impl TryFrom<u8> for UnitType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(Error::InvalidUnitType(value))
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Routing fields every parameter block starts with.
///
/// Both are 1-based: unit `k` reads result-buffer entry `k - 1`, where entry
/// 0 is the constant zero and entry `i + 1` is slot `i`'s output. A reference
/// to the own slot or a later one reads the previous tick's value.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitHeader {
    pub source_unit: u8,
    pub control_unit: u8,
}

impl UnitHeader {
    /// Header reading the previous slot's output on both inputs.
    pub fn chained(slot: usize) -> Self {
        let unit = routing_default(slot);
        Self {
            source_unit: unit,
            control_unit: unit,
        }
    }

    pub fn source_tap(&self) -> usize {
        tap_index(self.source_unit)
    }

    pub fn control_tap(&self) -> usize {
        tap_index(self.control_unit)
    }
}

/// Default 1-based routing value for a unit placed in `slot`.
pub fn routing_default(slot: usize) -> u8 {
    (slot.min(MAX_SYNTH_UNITS - 1) + 1) as u8
}

/// Result-buffer index read by a 1-based routing value.
#[inline]
pub fn tap_index(unit: u8) -> usize {
    usize::from(unit).clamp(1, MAX_SYNTH_UNITS) - 1
}

/// Bounds shared by every routing field.
pub const ROUTING_MIN: u32 = 1;
pub const ROUTING_MAX: u32 = MAX_SYNTH_UNITS as u32;

/// Inputs and outputs of one `process` call.
pub struct UnitIo<'a> {
    /// Value of the source tap.
    pub source: Sample,
    /// Value of the control tap.
    pub control: Sample,
    /// The whole result buffer, for units with extra inputs.
    pub taps: &'a [Sample],
    /// The voice has been released gracefully.
    pub releasing: bool,
    /// Global pitch bend, `-8192..=8191`.
    pub pitch_bend: i32,
    /// Set by a unit whose release has run to completion.
    pub finished: bool,
}

impl UnitIo<'_> {
    pub fn tap(&self, unit: u8) -> Sample {
        self.taps.get(tap_index(unit)).copied().unwrap_or(0)
    }
}

/// Everything `note_start` may look at.
pub struct NoteStart<'a> {
    pub note: u8,
    pub velocity: u8,
    pub voice: usize,
    pub sample_rate: u32,
    pub controls: &'a dyn ControlInput,
}

impl NoteStart<'_> {
    /// Read a live control channel; 0 means "not controlled" and yields
    /// `None`.
    pub fn control(&self, channel: u8) -> Option<u32> {
        (channel != 0).then(|| self.controls.read_control_input(channel))
    }
}

/// A typed unit: parameter block, voice state and the two entry points.
pub trait Unit: ParamBlock + Copy {
    type State: Default;

    fn header(&self) -> &UnitHeader;

    fn header_mut(&mut self) -> &mut UnitHeader;

    fn process(&self, state: &mut Self::State, io: &mut UnitIo<'_>) -> Sample;

    fn note_start(&self, _state: &mut Self::State, _note: &NoteStart<'_>) {}
}

/// Parameter block of one slot.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitParams {
    None(NoneParams),
    Vco(VcoParams),
    Adsr(AdsrParams),
    Lowpass(LowpassParams),
    Lfo(LfoParams),
    Vca(VcaParams),
    Mixer(MixerParams),
    RingMod(RingParams),
    Noise(NoiseParams),
}

macro_rules! unit_params_from {
    ($($variant:ident($block:ty)),* $(,)?) => {
        $(
            impl From<$block> for UnitParams {
                fn from(block: $block) -> Self {
                    UnitParams::$variant(block)
                }
            }
        )*
    };
}

unit_params_from!(
    None(NoneParams),
    Vco(VcoParams),
    Adsr(AdsrParams),
    Lowpass(LowpassParams),
    Lfo(LfoParams),
    Vca(VcaParams),
    Mixer(MixerParams),
    RingMod(RingParams),
    Noise(NoiseParams),
);

macro_rules! with_block {
    ($params:expr, $block:ident => $body:expr) => {
        match $params {
            UnitParams::None($block) => $body,
            UnitParams::Vco($block) => $body,
            UnitParams::Adsr($block) => $body,
            UnitParams::Lowpass($block) => $body,
            UnitParams::Lfo($block) => $body,
            UnitParams::Vca($block) => $body,
            UnitParams::Mixer($block) => $body,
            UnitParams::RingMod($block) => $body,
            UnitParams::Noise($block) => $body,
        }
    };
}

fn descriptors_of<P: ParamBlock>(_: &P) -> &'static [Field<P>] {
    P::fields()
}

impl UnitParams {
    pub fn unit_type(&self) -> UnitType {
        match self {
            UnitParams::None(_) => UnitType::None,
            UnitParams::Vco(_) => UnitType::Vco,
            UnitParams::Adsr(_) => UnitType::Adsr,
            UnitParams::Lowpass(_) => UnitType::Lowpass,
            UnitParams::Lfo(_) => UnitType::Lfo,
            UnitParams::Vca(_) => UnitType::Vca,
            UnitParams::Mixer(_) => UnitType::Mixer,
            UnitParams::RingMod(_) => UnitType::RingMod,
            UnitParams::Noise(_) => UnitType::Noise,
        }
    }

    pub fn header(&self) -> &UnitHeader {
        with_block!(self, block => block.header())
    }

    pub fn header_mut(&mut self) -> &mut UnitHeader {
        with_block!(self, block => block.header_mut())
    }

    /// Same block with its routing replaced.
    pub fn routed(mut self, source_unit: u8, control_unit: u8) -> Self {
        *self.header_mut() = UnitHeader {
            source_unit,
            control_unit,
        };
        self
    }

    pub fn get(&self, name: &str) -> Result<u32, ParamError> {
        with_block!(self, block => block.get(name))
    }

    pub fn set(&mut self, name: &str, value: u32) -> Result<(), ParamError> {
        with_block!(self, block => block.set(name, value))
    }

    pub fn descriptor_count(&self) -> usize {
        with_block!(self, block => descriptors_of(block).len())
    }

    pub fn descriptor(&self, index: usize) -> Option<ParamDescriptor> {
        with_block!(self, block => descriptors_of(block).get(index).map(|f| f.descriptor))
    }

    pub fn descriptors(&self) -> Vec<ParamDescriptor> {
        with_block!(self, block => descriptors_of(block).iter().map(|f| f.descriptor).collect())
    }

    /// Check every stored value against its descriptor's bounds.
    pub fn check(&self) -> Result<(), ParamError> {
        with_block!(self, block => descriptors_of(block)
            .iter()
            .try_for_each(|f| f.descriptor.check(f.read(block)).map(drop)))
    }

    /// Run `note_start` against the matching state, rebuilding the state
    /// first if it was made for another type.
    pub fn note_start(&self, state: &mut UnitState, note: &NoteStart<'_>) {
        if state.unit_type() != Some(self.unit_type()) {
            *state = UnitState::for_type(self.unit_type());
        }
        match (self, state) {
            (UnitParams::Vco(p), UnitState::Vco(s)) => p.note_start(s, note),
            (UnitParams::Adsr(p), UnitState::Adsr(s)) => p.note_start(s, note),
            (UnitParams::Lowpass(p), UnitState::Lowpass(s)) => p.note_start(s, note),
            (UnitParams::Lfo(p), UnitState::Lfo(s)) => p.note_start(s, note),
            (UnitParams::Noise(p), UnitState::Noise(s)) => p.note_start(s, note),
            _ => {}
        }
    }

    /// One sample of this slot. A state built for another type is replaced
    /// and the slot outputs silence for this tick.
    #[inline]
    pub fn process(&self, state: &mut UnitState, io: &mut UnitIo<'_>) -> Sample {
        match (self, state) {
            (UnitParams::None(p), _) => p.process(&mut (), io),
            (UnitParams::Vco(p), UnitState::Vco(s)) => p.process(s, io),
            (UnitParams::Adsr(p), UnitState::Adsr(s)) => p.process(s, io),
            (UnitParams::Lowpass(p), UnitState::Lowpass(s)) => p.process(s, io),
            (UnitParams::Lfo(p), UnitState::Lfo(s)) => p.process(s, io),
            (UnitParams::Vca(p), _) => p.process(&mut (), io),
            (UnitParams::Mixer(p), _) => p.process(&mut (), io),
            (UnitParams::RingMod(p), _) => p.process(&mut (), io),
            (UnitParams::Noise(p), UnitState::Noise(s)) => p.process(s, io),
            (params, state) => {
                *state = UnitState::for_type(params.unit_type());
                0
            }
        }
    }
}

/// Per-voice state of one slot.
#[derive(Debug, Clone, Copy, Default)]
pub enum UnitState {
    #[default]
    Stateless,
    Vco(VcoState),
    Adsr(AdsrState),
    Lowpass(LowpassState),
    Lfo(LfoState),
    Noise(NoiseState),
}

impl UnitState {
    pub fn for_type(unit_type: UnitType) -> Self {
        match unit_type {
            UnitType::Vco => UnitState::Vco(VcoState::default()),
            UnitType::Adsr => UnitState::Adsr(AdsrState::default()),
            UnitType::Lowpass => UnitState::Lowpass(LowpassState::default()),
            UnitType::Lfo => UnitState::Lfo(LfoState::default()),
            UnitType::Noise => UnitState::Noise(NoiseState::default()),
            UnitType::None | UnitType::Vca | UnitType::Mixer | UnitType::RingMod => {
                UnitState::Stateless
            }
        }
    }

    /// The unit type this state serves, or `None` for stateless types.
    fn unit_type(&self) -> Option<UnitType> {
        match self {
            UnitState::Stateless => None,
            UnitState::Vco(_) => Some(UnitType::Vco),
            UnitState::Adsr(_) => Some(UnitType::Adsr),
            UnitState::Lowpass(_) => Some(UnitType::Lowpass),
            UnitState::Lfo(_) => Some(UnitType::Lfo),
            UnitState::Noise(_) => Some(UnitType::Noise),
        }
    }
}
