/*
Pitch and Phase Increments
==========================

Oscillators never see a frequency. They see a phase increment: the amount
added to a 32-bit phase accumulator every sample (see `wavetable`). This
module turns musical quantities into increments, once per note, so the
render tick only adds integers.

  note → Hz        equal temperament, A4 (note 69) = 440 Hz

                       hz = 440 × 2^((note - 69) / 12)

  Hz → increment   one full cycle is 2^32 phase units

                       increment = hz / sample_rate × 2^32

                   Anything at or above Nyquist is pinned just below it.


Pitch Bend
----------

Bend is a signed 14-bit wheel value in -8192..=8191. A voice computes a
bend coefficient at note start:

    bend_coef = base × (2^(range / 12) - 1)

and each tick adds `bend × bend_coef >> 13` to the increment. Full positive
bend therefore lands exactly `range` semitones up. Negative bend uses the same
coefficient, so the downward throw is a linear approximation (slightly wider
than `range` in frequency ratio terms). Good enough for a wheel.


Harmonic Offsets
----------------

A VCO can sound a fixed interval above or below the played note. The table
holds the classic drawbar-ish partials and a few sub-octaves, in semitones:

    index   0   1   2   3   4   5   6   7   8    9    10  11
    offset  0  12  19  24  28  31  34  36  -12  -24   7   5
            1×  2×  3×  4×  5×  6×  7×  8×  ½×  ¼×   5th 4th


Exponential Rates
-----------------

LFO rates are a 0..=383 index, 24 steps per octave, starting at 0.05 Hz:

    hz = 0.05 × 2^(rate / 24)        rate 383 ≈ 3.2 kHz
*/

/// Neutral wheel position is 0; the wheel spans `BEND_MIN..=BEND_MAX`.
pub const BEND_MIN: i32 = -8192;
pub const BEND_MAX: i32 = 8191;

/// `bend × bend_coef >> BEND_SHIFT` is the bend's increment offset.
pub const BEND_SHIFT: u32 = 13;

/// Largest increment produced, just under half a cycle per sample.
pub const MAX_INCREMENT: u32 = (1 << 31) - 1;

/// Interval in semitones for each `Harmonic` parameter value.
pub const HARMONIC_OFFSETS: [i32; 12] = [0, 12, 19, 24, 28, 31, 34, 36, -12, -24, 7, 5];

pub const LFO_RATE_MAX: u32 = 383;
pub const LFO_BASE_HZ: f64 = 0.05;
pub const LFO_STEPS_PER_OCTAVE: f64 = 24.0;

pub fn note_to_hz(note: f64) -> f64 {
    440.0 * 2f64.powf((note - 69.0) / 12.0)
}

pub fn hz_to_increment(hz: f64, sample_rate: u32) -> u32 {
    let increment = hz.max(0.0) / f64::from(sample_rate.max(1)) * 4_294_967_296.0;
    increment.min(f64::from(MAX_INCREMENT)) as u32
}

pub fn note_increment(note: f64, sample_rate: u32) -> u32 {
    hz_to_increment(note_to_hz(note), sample_rate)
}

/// Semitone offset for a `Harmonic` index. Unknown indices play the root.
pub fn harmonic_offset(index: u8) -> i32 {
    HARMONIC_OFFSETS
        .get(usize::from(index))
        .copied()
        .unwrap_or(0)
}

/// Increment delta that full positive bend adds to `base`.
pub fn bend_coefficient(base: u32, range_semitones: u32) -> i64 {
    let ratio = 2f64.powf(f64::from(range_semitones) / 12.0) - 1.0;
    (f64::from(base) * ratio).round() as i64
}

pub fn lfo_rate_hz(rate: u32) -> f64 {
    LFO_BASE_HZ * 2f64.powf(f64::from(rate.min(LFO_RATE_MAX)) / LFO_STEPS_PER_OCTAVE)
}

/// Base increment with modulation terms applied, kept non-negative and below
/// Nyquist.
#[inline]
pub fn modulate_increment(base: u32, control_term: i64, bend_term: i64) -> u32 {
    (i64::from(base) + control_term + bend_term).clamp(0, i64::from(MAX_INCREMENT)) as u32
}

/// Offset `bend × bend_coef >> 13` for the current wheel position.
#[inline]
pub fn bend_term(bend: i32, bend_coef: i64) -> i64 {
    (i64::from(bend) * bend_coef) >> BEND_SHIFT
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn a4_is_440() {
        assert_relative_eq!(note_to_hz(69.0), 440.0);
        assert_relative_eq!(note_to_hz(81.0), 880.0);
        assert_relative_eq!(note_to_hz(60.0), 261.625_565, epsilon = 1e-5);
    }

    #[test]
    fn increment_is_fraction_of_cycle() {
        // A quarter of the sample rate is a quarter cycle per sample.
        assert_eq!(hz_to_increment(8_000.0, 32_000), 1 << 30);
        assert_eq!(hz_to_increment(0.0, 32_000), 0);
    }

    #[test]
    fn increment_stops_below_nyquist() {
        assert_eq!(hz_to_increment(100_000.0, 32_000), MAX_INCREMENT);
    }

    #[test]
    fn full_bend_reaches_the_range() {
        let base = note_increment(60.0, 32_000);
        let coef = bend_coefficient(base, 12);
        let up = modulate_increment(base, 0, bend_term(8192, coef));
        assert_relative_eq!(f64::from(up) / f64::from(base), 2.0, epsilon = 1e-6);
        assert_eq!(modulate_increment(base, 0, bend_term(0, coef)), base);
    }

    #[test]
    fn negative_modulation_never_wraps() {
        assert_eq!(modulate_increment(1000, -5000, 0), 0);
    }

    #[test]
    fn harmonic_table_lookup() {
        assert_eq!(harmonic_offset(1), 12);
        assert_eq!(harmonic_offset(9), -24);
        assert_eq!(harmonic_offset(99), 0);
    }

    #[test]
    fn lfo_rate_doubles_every_24_steps() {
        assert_relative_eq!(lfo_rate_hz(0), 0.05);
        assert_relative_eq!(lfo_rate_hz(24), 0.1, epsilon = 1e-12);
        assert_relative_eq!(lfo_rate_hz(240), 51.2, epsilon = 1e-9);
    }
}
