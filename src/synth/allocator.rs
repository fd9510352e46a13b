//! Note-to-voice assignment.
//!
//! The allocator holds no voice state of its own: every decision is made
//! from [`VoiceSnapshot`]s, so the "note registry" is simply a scan for a
//! sounding voice with the right note number.

use crate::synth::voice::{VoiceSnapshot, VoiceStatus};

/// Where a new note should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// This voice is idle.
    Free(usize),
    /// Every voice is busy; retire this one (the oldest) first.
    Steal(usize),
}

impl Allocation {
    pub fn index(self) -> usize {
        match self {
            Allocation::Free(index) | Allocation::Steal(index) => index,
        }
    }
}

#[derive(Debug, Default)]
pub struct NoteAllocator {
    last_sequence: u64,
}

impl NoteAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next trigger sequence number. Strictly increasing, never 0.
    pub fn next_sequence(&mut self) -> u64 {
        self.last_sequence += 1;
        self.last_sequence
    }

    /// A non-free voice already playing `note`.
    pub fn find_sounding(voices: &[VoiceSnapshot], note: u8) -> Option<usize> {
        voices
            .iter()
            .find(|v| !v.status.is_free() && v.note == note)
            .map(|v| v.index)
    }

    /// The held (Active, not yet released) voice playing `note`.
    pub fn find_held(voices: &[VoiceSnapshot], note: u8) -> Option<usize> {
        voices
            .iter()
            .find(|v| v.status == VoiceStatus::Active && v.note == note)
            .map(|v| v.index)
    }

    /// First free voice, else the one with the smallest sequence number.
    /// Ties go to the lowest index.
    pub fn choose(voices: &[VoiceSnapshot]) -> Option<Allocation> {
        if let Some(free) = voices.iter().find(|v| v.status.is_free()) {
            return Some(Allocation::Free(free.index));
        }
        voices
            .iter()
            .min_by_key(|v| v.sequence)
            .map(|v| Allocation::Steal(v.index))
    }
}
