#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Unit, UnitHeader, UnitIo, ROUTING_MAX, ROUTING_MIN};
use crate::dsp::mix::{clamp_sample, scale, FULL_SCALE};
use crate::params::{field, Field, ParamBlock};
use crate::{Sample, AMPLITUDE_UNITY};

/// Voltage-controlled amplifier.
///
/// The control tap is scaled by `ControlGain` and recentered from
/// `-32768..32768` onto a gain of `0..=1`:
///
/// ```text
/// gain = (control × control_gain / 256 + 32768) / 2      (Q15)
/// out  = source × gain × amplitude / 256
/// ```
///
/// With no control signal the gain sits at one half.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcaParams {
    pub header: UnitHeader,
    pub amplitude: u16,
    pub control_gain: u16,
}

impl VcaParams {
    pub fn new(header: UnitHeader) -> Self {
        Self {
            header,
            amplitude: AMPLITUDE_UNITY as u16,
            control_gain: AMPLITUDE_UNITY as u16,
        }
    }

    /// Q15 gain for a control sample.
    pub fn gain(&self, control: Sample) -> i64 {
        let scaled = i64::from(control) * i64::from(self.control_gain) / i64::from(AMPLITUDE_UNITY);
        ((scaled + FULL_SCALE) / 2).clamp(0, FULL_SCALE)
    }
}

static FIELDS: [Field<VcaParams>; 4] = [
    field!(VcaParams, "SourceUnit", header.source_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(VcaParams, "ControlUnit", header.control_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(VcaParams, "Amplitude", amplitude: u16, 3, 0, AMPLITUDE_UNITY),
    field!(VcaParams, "ControlGain", control_gain: u16, 3, 0, AMPLITUDE_UNITY),
];

impl ParamBlock for VcaParams {
    fn fields() -> &'static [Field<Self>] {
        &FIELDS
    }
}

impl Unit for VcaParams {
    type State = ();

    fn header(&self) -> &UnitHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut UnitHeader {
        &mut self.header
    }

    #[inline]
    fn process(&self, _state: &mut (), io: &mut UnitIo<'_>) -> Sample {
        let shaped = clamp_sample(i64::from(io.source) * self.gain(io.control) / FULL_SCALE);
        scale(shaped, u32::from(self.amplitude))
    }
}
