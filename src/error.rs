//! Error types for unitsynth.
//!
//! Nothing in the engine is fatal: every failure is reported to the caller
//! and leaves the engine state untouched.

use thiserror::Error;

use crate::MAX_SYNTH_UNITS;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single parameter lookup or write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// The unit type has no field with this name.
    #[error("no parameter named '{0}'")]
    NotFound(String),

    /// The value is outside the descriptor's inclusive bounds.
    #[error("value {value} for '{name}' is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Errors reported by the engine facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Slot index is not below `MAX_SYNTH_UNITS`.
    #[error("unit slot {0} is out of range (expected < {max})", max = MAX_SYNTH_UNITS)]
    InvalidSlot(usize),

    /// Unit type tag does not name a known unit.
    #[error("unknown unit type {0}")]
    InvalidUnitType(u8),

    /// Parameter access on a valid slot failed.
    #[error("unit {slot}: {source}")]
    Param {
        slot: usize,
        #[source]
        source: ParamError,
    },

    /// A persisted bank image could not be read or written.
    #[error("bank image: {0}")]
    Bank(String),
}

impl Error {
    /// True when the failure was a bounds check on the value.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            Error::Param {
                source: ParamError::OutOfRange { .. },
                ..
            }
        )
    }

    /// True when the named parameter does not exist on the slot's unit.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Param {
                source: ParamError::NotFound(_),
                ..
            }
        )
    }
}
