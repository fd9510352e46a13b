#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Unit, UnitHeader, UnitIo, ROUTING_MAX, ROUTING_MIN};
use crate::params::{field, Field, ParamBlock};
use crate::Sample;

/// Empty slot. Forwards its source tap unchanged.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoneParams {
    pub header: UnitHeader,
}

impl NoneParams {
    pub fn new(header: UnitHeader) -> Self {
        Self { header }
    }
}

static FIELDS: [Field<NoneParams>; 1] = [field!(
    NoneParams,
    "SourceUnit",
    header.source_unit: u8,
    2,
    ROUTING_MIN,
    ROUTING_MAX
)];

impl ParamBlock for NoneParams {
    fn fields() -> &'static [Field<Self>] {
        &FIELDS
    }
}

impl Unit for NoneParams {
    type State = ();

    fn header(&self) -> &UnitHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut UnitHeader {
        &mut self.header
    }

    #[inline]
    fn process(&self, _state: &mut (), io: &mut UnitIo<'_>) -> Sample {
        io.source
    }
}
