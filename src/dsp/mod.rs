//! Fixed-point DSP primitives used by the synthesis units.
//!
//! Everything here is allocation-free and branch-light so it can run inside
//! the render tick. Units combine these pieces; they never own the math.

/// Fixed-point 4-phase envelope with exact sample durations.
pub mod envelope;
/// One-pole lowpass design and stage cascade.
pub mod filter;
/// Clamping, amplitude scaling and two-signal combinators.
pub mod mix;
/// Linear-congruential noise source.
pub mod noise;
/// Note, frequency and phase-increment conversions.
pub mod pitch;
/// Precomputed single-cycle waveforms.
pub mod wavetable;

pub use envelope::{Envelope, EnvelopeTiming, Stage};
pub use filter::OnePoleCascade;
pub use noise::Lcg;
pub use wavetable::Waveform;
