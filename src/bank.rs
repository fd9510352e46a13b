//! Persisted parameter-bank images.
//!
//! A bank is the raw parameter array of a [`Patch`] plus a small header. Several
//! images may exist side by side (e.g. alternate save slots); the valid one with
//! the highest generation wins.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::patch::Patch;
use crate::synth::engine::SynthEngine;

/// Marks a valid image.
pub const BANK_MAGIC: u32 = 0xFEE1_FEDE;

/// Fixed width of the description field.
pub const DESCRIPTION_LEN: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBank {
    magic: u32,
    pub generation: u32,
    description: [u8; DESCRIPTION_LEN],
    pub patch: Patch,
}

impl ParameterBank {
    pub fn new(generation: u32, description: &str, patch: Patch) -> Self {
        Self {
            magic: BANK_MAGIC,
            generation,
            description: sanitize_description(description),
            patch,
        }
    }

    /// Snapshot the engine's current parameters.
    pub fn capture(engine: &SynthEngine, generation: u32, description: &str) -> Self {
        Self::new(generation, description, engine.patch())
    }

    /// Load this bank into `engine`. Every voice is reset.
    pub fn apply(&self, engine: &SynthEngine) -> Result<()> {
        engine.load_patch(self.patch)?;
        info!(
            generation = self.generation,
            description = self.description().trim_end(),
            "bank applied"
        );
        Ok(())
    }

    /// The space-padded description.
    pub fn description(&self) -> &str {
        // Only ASCII is ever stored.
        std::str::from_utf8(&self.description).unwrap_or("")
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Bank(format!("encode failed: {e}")))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let bank: Self = bincode::deserialize(bytes)
            .map_err(|e| Error::Bank(format!("decode failed: {e}")))?;
        if bank.magic != BANK_MAGIC {
            return Err(Error::Bank(format!("bad magic {:#010x}", bank.magic)));
        }
        bank.patch.validate()?;
        Ok(bank)
    }

    /// The valid image with the highest generation. Invalid images are skipped.
    pub fn newest<'a, I>(images: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        images
            .into_iter()
            .enumerate()
            .filter_map(|(index, bytes)| match Self::decode(bytes) {
                Ok(bank) => Some(bank),
                Err(error) => {
                    debug!(index, %error, "skipping bank image");
                    None
                }
            })
            .max_by_key(|bank| bank.generation)
    }
}

/// Uppercase, replace anything outside ` A-Z0-9-/.!?` with a space, then
/// truncate or pad to [`DESCRIPTION_LEN`].
pub fn sanitize_description(text: &str) -> [u8; DESCRIPTION_LEN] {
    let mut out = [b' '; DESCRIPTION_LEN];
    for (slot, ch) in out.iter_mut().zip(text.chars()) {
        let ch = ch.to_ascii_uppercase();
        *slot = match ch {
            'A'..='Z' | '0'..='9' | '-' | '/' | '.' | '!' | '?' | ' ' => ch as u8,
            _ => b' ',
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::presets;
    use crate::EngineConfig;

    #[test]
    fn description_is_sanitized_and_padded() {
        assert_eq!(&sanitize_description("lead #2"), b"LEAD  2        ");
        assert_eq!(
            &sanitize_description("a very long description"),
            b"A VERY LONG DES"
        );
        assert_eq!(&sanitize_description("ok?/-.!"), b"OK?/-.!        ");
    }

    #[test]
    fn image_survives_encoding() {
        let bank = ParameterBank::new(3, "bell", presets::bell());
        let decoded = ParameterBank::decode(&bank.encode().unwrap()).unwrap();
        assert_eq!(decoded, bank);
        assert_eq!(decoded.description().trim_end(), "BELL");
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut bank = ParameterBank::new(1, "x", Patch::new());
        bank.magic = 0;
        let err = ParameterBank::decode(&bank.encode().unwrap()).unwrap_err();
        assert!(matches!(err, Error::Bank(_)));
        assert!(ParameterBank::decode(&[1, 2, 3]).is_err());
    }

    #[test]
    fn newest_valid_generation_wins() {
        let old = ParameterBank::new(4, "old", presets::lead()).encode().unwrap();
        let new = ParameterBank::new(9, "new", presets::bass()).encode().unwrap();
        let mut corrupt = ParameterBank::new(12, "bad", Patch::new());
        corrupt.magic = 1;
        let corrupt = corrupt.encode().unwrap();

        let images = [old.as_slice(), corrupt.as_slice(), new.as_slice()];
        let newest = ParameterBank::newest(images).unwrap();
        assert_eq!(newest.generation, 9);
        assert_eq!(newest.patch, presets::bass());
        assert!(ParameterBank::newest(std::iter::empty::<&[u8]>()).is_none());
    }

    #[test]
    fn capture_and_apply_round_trip_through_engine() {
        let engine = SynthEngine::new(EngineConfig::default());
        engine.load_patch(presets::pad()).unwrap();
        let bank = ParameterBank::capture(&engine, 1, "pad");

        engine.load_patch(Patch::new()).unwrap();
        engine.note_on(60, 100);
        bank.apply(&engine).unwrap();
        assert_eq!(engine.patch(), presets::pad());
        assert_eq!(engine.active_voice_count(), 0);
    }
}
