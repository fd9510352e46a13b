//! Computer-keyboard note entry.
//!
//! Terminals report key presses but not releases, so notes latch: the first
//! press starts a note, the next press of the same key releases it.
//!
//! ```text
//!   r t   u i o
//!  d f g h j k l ;
//! ```

use std::collections::BTreeSet;

use crossterm::event::KeyCode;
use unitsynth::dsp::pitch::{BEND_MAX, BEND_MIN};
use unitsynth::synth::SynthMessage;

/// Key → semitone above the current octave's C.
const PIANO: [(char, u8); 13] = [
    ('d', 0),
    ('r', 1),
    ('f', 2),
    ('t', 3),
    ('g', 4),
    ('h', 5),
    ('u', 6),
    ('j', 7),
    ('i', 8),
    ('k', 9),
    ('o', 10),
    ('l', 11),
    (';', 12),
];

const BEND_STEP: i32 = 1024;
const VELOCITY: u8 = 100;
const OCTAVE_MIN: u8 = 1;
const OCTAVE_MAX: u8 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Send(SynthMessage),
    LoadPreset(usize),
    SaveBank,
    NextSlot,
    PrevSlot,
    Quit,
    Ignore,
}

#[derive(Debug)]
pub struct Keyboard {
    octave: u8,
    bend: i32,
    latched: BTreeSet<u8>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            octave: 4,
            bend: 0,
            latched: BTreeSet::new(),
        }
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    pub fn latched(&self) -> impl Iterator<Item = u8> + '_ {
        self.latched.iter().copied()
    }

    pub fn handle(&mut self, key: KeyCode) -> KeyAction {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('s') => KeyAction::SaveBank,
            KeyCode::Char(c @ '1'..='5') => KeyAction::LoadPreset(c as usize - '1' as usize),
            KeyCode::Char('z') => {
                self.octave = self.octave.saturating_sub(1).max(OCTAVE_MIN);
                KeyAction::Ignore
            }
            KeyCode::Char('x') => {
                self.octave = (self.octave + 1).min(OCTAVE_MAX);
                KeyAction::Ignore
            }
            KeyCode::Char(' ') => {
                self.latched.clear();
                self.bend = 0;
                KeyAction::Send(SynthMessage::Panic)
            }
            KeyCode::Up => self.bend_by(BEND_STEP),
            KeyCode::Down => self.bend_by(-BEND_STEP),
            KeyCode::Left | KeyCode::Right => {
                self.bend = 0;
                KeyAction::Send(SynthMessage::PitchBend { value: 0 })
            }
            KeyCode::Tab => KeyAction::NextSlot,
            KeyCode::BackTab => KeyAction::PrevSlot,
            KeyCode::Char(c) => self.piano(c),
            _ => KeyAction::Ignore,
        }
    }

    /// Forget latched notes, e.g. after a patch load silenced the engine.
    pub fn clear(&mut self) {
        self.latched.clear();
    }

    fn bend_by(&mut self, step: i32) -> KeyAction {
        self.bend = (self.bend + step).clamp(BEND_MIN, BEND_MAX);
        KeyAction::Send(SynthMessage::PitchBend { value: self.bend })
    }

    fn piano(&mut self, c: char) -> KeyAction {
        let Some(&(_, semitone)) = PIANO.iter().find(|(key, _)| *key == c) else {
            return KeyAction::Ignore;
        };
        let note = 12 * (self.octave + 1) + semitone;

        if self.latched.remove(&note) {
            KeyAction::Send(SynthMessage::NoteOff { note, velocity: 0 })
        } else {
            self.latched.insert(note);
            KeyAction::Send(SynthMessage::NoteOn {
                note,
                velocity: VELOCITY,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_latch() {
        let mut keys = Keyboard::new();
        assert_eq!(
            keys.handle(KeyCode::Char('d')),
            KeyAction::Send(SynthMessage::NoteOn {
                note: 60,
                velocity: VELOCITY
            })
        );
        assert_eq!(keys.latched().collect::<Vec<_>>(), [60]);
        assert_eq!(
            keys.handle(KeyCode::Char('d')),
            KeyAction::Send(SynthMessage::NoteOff {
                note: 60,
                velocity: 0
            })
        );
        assert_eq!(keys.latched().count(), 0);
    }

    #[test]
    fn octave_shift_is_bounded() {
        let mut keys = Keyboard::new();
        for _ in 0..10 {
            keys.handle(KeyCode::Char('z'));
        }
        assert_eq!(keys.octave(), OCTAVE_MIN);
        for _ in 0..10 {
            keys.handle(KeyCode::Char('x'));
        }
        assert_eq!(keys.octave(), OCTAVE_MAX);
    }

    #[test]
    fn bend_saturates() {
        let mut keys = Keyboard::new();
        for _ in 0..20 {
            keys.handle(KeyCode::Up);
        }
        assert_eq!(
            keys.handle(KeyCode::Up),
            KeyAction::Send(SynthMessage::PitchBend { value: BEND_MAX })
        );
    }

    #[test]
    fn panic_clears_latches() {
        let mut keys = Keyboard::new();
        keys.handle(KeyCode::Char('g'));
        assert_eq!(
            keys.handle(KeyCode::Char(' ')),
            KeyAction::Send(SynthMessage::Panic)
        );
        assert_eq!(keys.latched().count(), 0);
    }

    #[test]
    fn reserved_keys() {
        let mut keys = Keyboard::new();
        assert_eq!(keys.handle(KeyCode::Char('3')), KeyAction::LoadPreset(2));
        assert_eq!(keys.handle(KeyCode::Char('s')), KeyAction::SaveBank);
        assert_eq!(keys.handle(KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(keys.handle(KeyCode::Char('w')), KeyAction::Ignore);
    }
}
