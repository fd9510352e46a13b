use crate::{Sample, SAMPLE_MIN};

const MULTIPLIER: u32 = 1_664_525;
const INCREMENT: u32 = 1_013_904_223;

/// 32-bit linear-congruential generator (Numerical Recipes constants).
///
/// The low bits of an LCG cycle quickly, so samples come from the top 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT);
        self.state
    }

    /// Uniform sample in the full signed sample range.
    #[inline]
    pub fn next_sample(&mut self) -> Sample {
        Sample::from((self.next_u32() >> 16) as u16 as i16).max(SAMPLE_MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SAMPLE_MAX;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Lcg::new(42);
        let mut b = Lcg::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn first_step_from_zero() {
        assert_eq!(Lcg::new(0).next_u32(), INCREMENT);
    }

    #[test]
    fn samples_cover_both_signs() {
        let mut lcg = Lcg::new(7);
        let samples: Vec<Sample> = (0..1000).map(|_| lcg.next_sample()).collect();
        assert!(samples.iter().any(|&s| s > 10_000));
        assert!(samples.iter().any(|&s| s < -10_000));
        assert!(samples.iter().all(|&s| (SAMPLE_MIN..=SAMPLE_MAX).contains(&s)));
    }
}
