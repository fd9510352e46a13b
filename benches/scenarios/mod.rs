//! Real-world scenario benchmarks.
//!
//! Preset voices rendered on their own, and the whole engine with every
//! voice sounding.

mod polyphony;
mod voices;

pub use polyphony::bench_polyphony;
pub use voices::bench_voices;
