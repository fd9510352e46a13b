//! Channel-voice MIDI messages, decoded from raw status/data bytes.

use crate::dsp::pitch::BEND_MIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Signed wheel position, `-8192..=8191`, 0 centred.
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Decode one complete message. Running status and system messages are
    /// not handled.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status & 0x80 == 0 {
            return None;
        }
        let channel = status & 0x0F;
        let byte = |i: usize| data.get(i).copied().filter(|b| b & 0x80 == 0);

        let event = match status & 0xF0 {
            0x80 => MidiEvent::NoteOff {
                channel,
                key: byte(0)?,
                velocity: byte(1)?,
            },
            0x90 => MidiEvent::NoteOn {
                channel,
                key: byte(0)?,
                velocity: byte(1)?,
            },
            0xB0 => MidiEvent::ControlChange {
                channel,
                controller: byte(0)?,
                value: byte(1)?,
            },
            0xC0 => MidiEvent::ProgramChange {
                channel,
                program: byte(0)?,
            },
            0xE0 => {
                let raw = i32::from(byte(0)?) | (i32::from(byte(1)?) << 7);
                MidiEvent::PitchBend {
                    channel,
                    value: (raw + BEND_MIN) as i16,
                }
            }
            _ => return None,
        };
        Some(event)
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_notes() {
        assert_eq!(
            MidiEvent::parse(&[0x92, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 2,
                key: 60,
                velocity: 100
            })
        );
        assert_eq!(
            MidiEvent::parse(&[0x80, 60, 0]),
            Some(MidiEvent::NoteOff {
                channel: 0,
                key: 60,
                velocity: 0
            })
        );
    }

    #[test]
    fn pitch_bend_is_recentred() {
        let bend = |lsb, msb| match MidiEvent::parse(&[0xE0, lsb, msb]) {
            Some(MidiEvent::PitchBend { value, .. }) => value,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(bend(0x00, 0x40), 0);
        assert_eq!(bend(0x00, 0x00), -8192);
        assert_eq!(bend(0x7F, 0x7F), 8191);
    }

    #[test]
    fn rejects_truncated_and_malformed() {
        assert_eq!(MidiEvent::parse(&[]), None);
        assert_eq!(MidiEvent::parse(&[60, 100]), None);
        assert_eq!(MidiEvent::parse(&[0x90, 60]), None);
        assert_eq!(MidiEvent::parse(&[0x90, 0x80, 1]), None);
        assert_eq!(MidiEvent::parse(&[0xF8]), None);
    }
}
