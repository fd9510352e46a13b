//! The full set of slot parameter blocks.
//!
//! A [`Patch`] is what the engine publishes to the renderer and what a bank
//! image stores. It is plain data: copy it, edit it, hand it to
//! [`SynthEngine::load_patch`](crate::SynthEngine::load_patch).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::units::{UnitParams, UnitType};
use crate::MAX_SYNTH_UNITS;

pub mod presets;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    units: [UnitParams; MAX_SYNTH_UNITS],
}

impl Patch {
    /// Every slot empty and chained to the one before it.
    pub fn new() -> Self {
        Self {
            units: std::array::from_fn(|slot| UnitType::None.default_params(slot)),
        }
    }

    /// Builder: place `params` in `slot`. Out-of-range slots are ignored.
    pub fn with_unit(mut self, slot: usize, params: impl Into<UnitParams>) -> Self {
        if let Some(unit) = self.units.get_mut(slot) {
            *unit = params.into();
        }
        self
    }

    pub fn unit(&self, slot: usize) -> Result<&UnitParams> {
        self.units.get(slot).ok_or(Error::InvalidSlot(slot))
    }

    pub fn unit_mut(&mut self, slot: usize) -> Result<&mut UnitParams> {
        self.units.get_mut(slot).ok_or(Error::InvalidSlot(slot))
    }

    pub fn units(&self) -> &[UnitParams; MAX_SYNTH_UNITS] {
        &self.units
    }

    /// True when some slot holds an envelope unit.
    pub fn has_envelope(&self) -> bool {
        self.units
            .iter()
            .any(|unit| unit.unit_type() == UnitType::Adsr)
    }

    /// Check every slot's stored values against its descriptors.
    pub fn validate(&self) -> Result<()> {
        self.units
            .iter()
            .enumerate()
            .try_for_each(|(slot, unit)| unit.check().map_err(|source| Error::Param { slot, source }))
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::new()
    }
}
