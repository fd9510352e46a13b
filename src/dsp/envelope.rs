/*
Fixed-Point ADSR Envelope
=========================

A linear four-phase envelope generator whose stage lengths are exact sample
counts. An attack of 2000 reaches its peak on the 2000th step, never the
1999th or 2001st.

Vocabulary
----------

  level       Current output, Q24 fixed point: ENV_ONE (1 << 24) is full
              scale. Q24 leaves room for long, shallow ramps without the
              per-sample slope rounding to zero.

  stage       Idle, Attack, Decay, Sustain, Release or Done.

  segment     A ramp from `start` to `target` over `length` steps. The level
              at step k is interpolated, not accumulated:

                  level = start + (target - start) × k / length

              so there is no drift and the final step lands on `target`
              exactly.


The Shape
---------

  Level
   peak ┐     ╱╲
        │    ╱  ╲___________
   sus  │   ╱               ╲
        │  ╱                 ╲
      0 └─╱───────────────────╲──→ samples
          |  A  |  D  |   S   | R |

Attack ramps 0 → peak, Decay ramps peak → sustain, Sustain holds until
`release()` is called, Release ramps from wherever the level is → 0 and ends
in Done. Releasing during Attack or Decay starts the release from the current
level; the ramp still takes exactly `release` steps.


State Machine
-------------

    Idle ──trigger──→ Attack ──→ Decay ──→ Sustain
                         │         │          │
                         └─release─┴──────────┘
                                   ↓
                                Release ──→ Done

`release()` on an Idle envelope goes straight to Done: a note that was never
started has nothing to fade.
*/

pub const ENV_BITS: u32 = 24;
pub const ENV_ONE: i32 = 1 << ENV_BITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
    Done,
}

/// Stage lengths and levels for one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeTiming {
    pub attack: u32,
    pub decay: u32,
    pub release: u32,
    /// Q24 level held during Sustain.
    pub sustain: i32,
    /// Q24 level reached at the end of Attack.
    pub peak: i32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Envelope {
    stage: Stage,
    level: i32,
    start: i32,
    target: i32,
    length: u32,
    elapsed: u32,
    decay: u32,
    release: u32,
    sustain: i32,
}

impl Envelope {
    pub fn trigger(&mut self, timing: EnvelopeTiming) {
        self.decay = timing.decay.max(1);
        self.release = timing.release.max(1);
        self.sustain = timing.sustain.clamp(0, timing.peak);
        self.level = 0;
        self.stage = Stage::Attack;
        self.segment(timing.peak, timing.attack);
    }

    /// Begin the release ramp from the current level. No-op once releasing.
    pub fn release(&mut self) {
        match self.stage {
            Stage::Idle => self.stage = Stage::Done,
            Stage::Attack | Stage::Decay | Stage::Sustain => {
                self.stage = Stage::Release;
                self.segment(0, self.release);
            }
            Stage::Release | Stage::Done => {}
        }
    }

    /// Advance one sample and return the new level.
    #[inline]
    pub fn step(&mut self) -> i32 {
        match self.stage {
            Stage::Idle | Stage::Sustain | Stage::Done => return self.level,
            Stage::Attack | Stage::Decay | Stage::Release => {}
        }

        self.elapsed += 1;
        if self.elapsed >= self.length {
            self.level = self.target;
            self.advance();
        } else {
            let span = i64::from(self.target) - i64::from(self.start);
            let offset = span * i64::from(self.elapsed) / i64::from(self.length);
            self.level = self.start + offset as i32;
        }
        self.level
    }

    fn advance(&mut self) {
        self.stage = match self.stage {
            Stage::Attack => {
                self.segment(self.sustain, self.decay);
                Stage::Decay
            }
            Stage::Decay => Stage::Sustain,
            Stage::Release => Stage::Done,
            other => other,
        };
    }

    fn segment(&mut self, target: i32, length: u32) {
        self.start = self.level;
        self.target = target;
        self.length = length.max(1);
        self.elapsed = 0;
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> EnvelopeTiming {
        EnvelopeTiming {
            attack: 10,
            decay: 20,
            release: 5,
            sustain: ENV_ONE / 2,
            peak: ENV_ONE,
        }
    }

    #[test]
    fn attack_reaches_peak_on_last_step() {
        let mut env = Envelope::default();
        env.trigger(timing());
        for _ in 0..9 {
            assert!(env.step() < ENV_ONE);
        }
        assert_eq!(env.step(), ENV_ONE);
        assert_eq!(env.stage(), Stage::Decay);
    }

    #[test]
    fn decay_settles_on_sustain() {
        let mut env = Envelope::default();
        env.trigger(timing());
        for _ in 0..30 {
            env.step();
        }
        assert_eq!(env.level(), ENV_ONE / 2);
        assert_eq!(env.stage(), Stage::Sustain);
        assert_eq!(env.step(), ENV_ONE / 2);
    }

    #[test]
    fn release_takes_exact_length_from_any_stage() {
        let mut env = Envelope::default();
        env.trigger(timing());
        for _ in 0..4 {
            env.step();
        }
        env.release();
        let mut previous = env.level();
        for _ in 0..4 {
            let level = env.step();
            assert!(level < previous);
            previous = level;
        }
        assert!(!env.is_finished());
        assert_eq!(env.step(), 0);
        assert!(env.is_finished());
    }

    #[test]
    fn second_release_does_not_restart() {
        let mut env = Envelope::default();
        env.trigger(timing());
        for _ in 0..40 {
            env.step();
        }
        env.release();
        env.step();
        env.step();
        let level = env.level();
        env.release();
        assert_eq!(env.level(), level);
        for _ in 0..3 {
            env.step();
        }
        assert!(env.is_finished());
    }

    #[test]
    fn idle_release_is_done() {
        let mut env = Envelope::default();
        env.release();
        assert!(env.is_finished());
    }

    #[test]
    fn sustain_never_exceeds_peak() {
        let mut env = Envelope::default();
        env.trigger(EnvelopeTiming {
            sustain: ENV_ONE,
            peak: ENV_ONE / 4,
            ..timing()
        });
        for _ in 0..30 {
            env.step();
        }
        assert_eq!(env.level(), ENV_ONE / 4);
    }
}
