use std::f64::consts::TAU;

use crate::Sample;

/*
| stages | slope above knee | character                      |
| ------ | ---------------- | ------------------------------ |
| 1      | 6 dB/oct         | gentle tilt, mostly brightness |
| 2      | 12 dB/oct        | classic "soft" synth lowpass   |
| 3      | 18 dB/oct        | darker, still no resonance     |
| 4      | 24 dB/oct        | ladder-like rolloff            |

One pole:   y[n] = y[n-1] + a × (x[n] - y[n-1])
Design:     a = 1 - e^(-2π fc / fs)

`a` is Q16: COEF_ONE is a pass-through wire, 0 freezes the output. Anything
above COEF_ONE would overshoot and ring, so callers clamp into 0..=COEF_ONE
after adding modulation.
*/

pub const COEF_BITS: u32 = 16;
pub const COEF_ONE: i32 = 1 << COEF_BITS;
pub const MAX_STAGES: usize = 4;

/// Q16 smoothing coefficient for a knee at `cutoff_hz`.
pub fn one_pole_coefficient(cutoff_hz: f64, sample_rate: u32) -> i32 {
    let a = 1.0 - (-TAU * cutoff_hz.max(0.0) / f64::from(sample_rate.max(1))).exp();
    (a * f64::from(COEF_ONE)).round().clamp(0.0, f64::from(COEF_ONE)) as i32
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OnePoleCascade {
    history: [Sample; MAX_STAGES],
}

impl OnePoleCascade {
    /// Run `input` through the first `stages` poles with coefficient `coef`.
    #[inline]
    pub fn process(&mut self, input: Sample, coef: i32, stages: usize) -> Sample {
        let coef = i64::from(coef.clamp(0, COEF_ONE));
        let mut x = input;
        for y in self.history.iter_mut().take(stages.clamp(1, MAX_STAGES)) {
            *y += ((i64::from(x - *y) * coef) >> COEF_BITS) as Sample;
            x = *y;
        }
        x
    }

    pub fn reset(&mut self) {
        self.history = [0; MAX_STAGES];
    }
}
