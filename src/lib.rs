//! Polyphonic unit-chain synthesis engine.
//!
//! A patch is a fixed row of [`MAX_SYNTH_UNITS`] slots. Each slot holds one
//! unit (oscillator, envelope, filter, ...) whose parameters are shared by
//! every voice, while each of the [`MAX_POLYPHONY`] voices keeps its own
//! per-slot state. The render context calls [`SynthEngine::render_tick`] once
//! per sample period; MIDI and UI code call the control entry points
//! (`note_on`, `set_parameter`, ...) from any other thread.
//!
//! ```ignore
//! use unitsynth::{patch::presets, EngineConfig, SynthEngine};
//!
//! let engine = SynthEngine::new(EngineConfig::default());
//! engine.load_patch(presets::lead())?;
//! engine.note_on(60, 100);
//! let sample = engine.render_tick();
//! ```

#[cfg(feature = "serde")]
pub mod bank;
pub mod config;
pub mod controls;
pub mod dsp;
pub mod error;
pub mod io;
pub mod params;
pub mod patch;
pub mod synth; // Voices, note allocation and the engine facade
pub mod units;

pub use config::EngineConfig;
pub use error::{Error, ParamError, Result};
pub use patch::Patch;
pub use synth::engine::SynthEngine;
pub use synth::voice::{VoiceSnapshot, VoiceStatus};
pub use units::{UnitParams, UnitType};

/// Number of voices that can sound at once.
pub const MAX_POLYPHONY: usize = 8;

/// Number of unit slots in a patch.
pub const MAX_SYNTH_UNITS: usize = 16;

/// Length in samples of the linear fade used to retire a voice on steal,
/// retrigger or panic.
pub const SYNTH_STOPPING_COUNTER: u32 = 256;

/// Length in samples of the fade used when a voice without an envelope unit
/// is released.
pub const SYNTH_RELEASE_COUNTER: u32 = 1024;

/// The summed voices are divided by this before clamping.
pub const POLYPHONY_DIVISOR: Sample = 4;

/// One fixed-point audio sample.
pub type Sample = i32;

/// Number of magnitude bits in a [`Sample`].
pub const SAMPLE_BITS: u32 = 15;

pub const SAMPLE_MAX: Sample = (1 << SAMPLE_BITS) - 1;
pub const SAMPLE_MIN: Sample = -SAMPLE_MAX;

/// Amplitude fields run from 0 to this value, which is unity gain.
pub const AMPLITUDE_UNITY: u32 = 256;

pub const DEFAULT_SAMPLE_RATE: u32 = 32_000;
