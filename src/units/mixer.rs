#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Unit, UnitHeader, UnitIo, ROUTING_MAX, ROUTING_MIN};
use crate::dsp::mix::{crossfade, scale};
use crate::params::{field, Field, ParamBlock};
use crate::{Sample, AMPLITUDE_UNITY};

const CONTROL_SHIFT: u32 = 15;

/// Two-input crossfader.
///
/// `Balance` 0 is all `SourceUnit`, 256 all `Source2Unit`. The control tap
/// pushes the balance by up to ±`ControlGain` before it is clamped.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerParams {
    pub header: UnitHeader,
    pub source2_unit: u8,
    pub balance: u16,
    pub control_gain: u16,
    pub amplitude: u16,
}

impl MixerParams {
    pub fn new(header: UnitHeader) -> Self {
        Self {
            source2_unit: header.source_unit,
            header,
            balance: 128,
            control_gain: 0,
            amplitude: AMPLITUDE_UNITY as u16,
        }
    }

    /// Mixer at `slot` reading two explicit inputs.
    pub fn between(slot: usize, source: u8, source2: u8) -> Self {
        let mut mixer = Self::new(UnitHeader::chained(slot));
        mixer.header.source_unit = source;
        mixer.source2_unit = source2;
        mixer
    }

    pub fn effective_balance(&self, control: Sample) -> u32 {
        let offset = (i64::from(control) * i64::from(self.control_gain)) >> CONTROL_SHIFT;
        (i64::from(self.balance) + offset).clamp(0, i64::from(AMPLITUDE_UNITY)) as u32
    }
}

static FIELDS: [Field<MixerParams>; 6] = [
    field!(MixerParams, "SourceUnit", header.source_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(MixerParams, "ControlUnit", header.control_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(MixerParams, "Source2Unit", source2_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(MixerParams, "Balance", balance: u16, 3, 0, AMPLITUDE_UNITY),
    field!(MixerParams, "ControlGain", control_gain: u16, 3, 0, AMPLITUDE_UNITY),
    field!(MixerParams, "Amplitude", amplitude: u16, 3, 0, AMPLITUDE_UNITY),
];

impl ParamBlock for MixerParams {
    fn fields() -> &'static [Field<Self>] {
        &FIELDS
    }
}

impl Unit for MixerParams {
    type State = ();

    fn header(&self) -> &UnitHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut UnitHeader {
        &mut self.header
    }

    #[inline]
    fn process(&self, _state: &mut (), io: &mut UnitIo<'_>) -> Sample {
        let mixed = crossfade(
            io.source,
            io.tap(self.source2_unit),
            self.effective_balance(io.control),
        );
        scale(mixed, u32::from(self.amplitude))
    }
}
