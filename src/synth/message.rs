#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::units::UnitType;

/// Control-path request, queued from MIDI or UI code to the control worker.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8, velocity: u8 },
    /// Signed 14-bit wheel value, 0 is neutral.
    PitchBend { value: i32 },
    Panic,
    SetUnitType { slot: usize, unit: UnitType },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
