#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Unit, UnitHeader, UnitIo, ROUTING_MAX, ROUTING_MIN};
use crate::dsp::mix::{ring, scale};
use crate::params::{field, Field, ParamBlock};
use crate::{Sample, AMPLITUDE_UNITY};

/// Ring modulator: source × control, renormalized, times amplitude.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingParams {
    pub header: UnitHeader,
    pub amplitude: u16,
}

impl RingParams {
    pub fn new(header: UnitHeader) -> Self {
        Self {
            header,
            amplitude: AMPLITUDE_UNITY as u16,
        }
    }
}

static FIELDS: [Field<RingParams>; 3] = [
    field!(RingParams, "SourceUnit", header.source_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(RingParams, "ControlUnit", header.control_unit: u8, 2, ROUTING_MIN, ROUTING_MAX),
    field!(RingParams, "Amplitude", amplitude: u16, 3, 0, AMPLITUDE_UNITY),
];

impl ParamBlock for RingParams {
    fn fields() -> &'static [Field<Self>] {
        &FIELDS
    }
}

impl Unit for RingParams {
    type State = ();

    fn header(&self) -> &UnitHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut UnitHeader {
        &mut self.header
    }

    #[inline]
    fn process(&self, _state: &mut (), io: &mut UnitIo<'_>) -> Sample {
        scale(ring(io.source, io.control), u32::from(self.amplitude))
    }
}
