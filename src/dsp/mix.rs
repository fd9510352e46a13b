//! Sample clamping, amplitude scaling and two-signal combinators.

/*
Fixed-Point Mixing
==================

Every function here works on 15-bit samples held in an i32 and widens to i64
for the products, so nothing overflows before the final clamp.

  amplitude     0..=256, 256 is unity. `scale(x, 128)` halves x.

  crossfade     balance 0..=256 between A and B:

                    out = (A × (256 - balance) + B × balance) / 256

                  balance = 0    →  all A
                  balance = 128  →  half and half
                  balance = 256  →  all B

  ring          product of two full-scale signals renormalized to full scale:

                    out = A × B / 32768

                Two sines at f1 and f2 give f1 + f2 and f1 - f2, with neither
                carrier left over. That is the metallic bell sound.

  fade          linear gain remaining / total, used for retiring voices.

Division rounds toward zero, so scaling is symmetric around 0 (a negative
sample is never pushed one step further than its positive mirror).
*/

use crate::{Sample, AMPLITUDE_UNITY, SAMPLE_MAX, SAMPLE_MIN};

/// Full-scale value used to normalize products of two samples.
pub const FULL_SCALE: i64 = 1 << 15;

#[inline]
pub fn clamp_sample(value: i64) -> Sample {
    value.clamp(i64::from(SAMPLE_MIN), i64::from(SAMPLE_MAX)) as Sample
}

/// Multiply by an amplitude in `0..=256`.
#[inline]
pub fn scale(sample: Sample, amplitude: u32) -> Sample {
    clamp_sample(i64::from(sample) * i64::from(amplitude) / i64::from(AMPLITUDE_UNITY))
}

#[inline]
pub fn crossfade(a: Sample, b: Sample, balance: u32) -> Sample {
    let balance = i64::from(balance.min(AMPLITUDE_UNITY));
    let unity = i64::from(AMPLITUDE_UNITY);
    clamp_sample((i64::from(a) * (unity - balance) + i64::from(b) * balance) / unity)
}

#[inline]
pub fn ring(a: Sample, b: Sample) -> Sample {
    clamp_sample(i64::from(a) * i64::from(b) / FULL_SCALE)
}

/// Scale by `remaining / total`.
#[inline]
pub fn fade(sample: Sample, remaining: u32, total: u32) -> Sample {
    if total == 0 {
        return 0;
    }
    clamp_sample(i64::from(sample) * i64::from(remaining.min(total)) / i64::from(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_amplitude_is_identity() {
        assert_eq!(scale(12_345, 256), 12_345);
        assert_eq!(scale(-12_345, 256), -12_345);
        assert_eq!(scale(1000, 0), 0);
    }

    #[test]
    fn scaling_is_symmetric() {
        assert_eq!(scale(-301, 128), -scale(301, 128));
    }

    #[test]
    fn crossfade_endpoints() {
        assert_eq!(crossfade(1000, -1000, 0), 1000);
        assert_eq!(crossfade(1000, -1000, 256), -1000);
        assert_eq!(crossfade(1000, 3000, 128), 2000);
    }

    #[test]
    fn ring_of_full_scale_is_full_scale() {
        assert_eq!(ring(SAMPLE_MAX, SAMPLE_MAX), SAMPLE_MAX - 1);
        assert_eq!(ring(SAMPLE_MAX, 0), 0);
        assert_eq!(ring(SAMPLE_MAX, SAMPLE_MIN), -(SAMPLE_MAX - 1));
    }

    #[test]
    fn fade_is_linear() {
        assert_eq!(fade(256, 256, 256), 256);
        assert_eq!(fade(256, 128, 256), 128);
        assert_eq!(fade(256, 0, 256), 0);
    }

    #[test]
    fn clamp_saturates() {
        assert_eq!(clamp_sample(1 << 40), SAMPLE_MAX);
        assert_eq!(clamp_sample(-(1 << 40)), SAMPLE_MIN);
    }
}
