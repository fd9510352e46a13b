use crate::controls::{ControlPanel, CONTROL_CHANNELS};
use crate::io::midi::MidiEvent;
use crate::synth::message::SynthMessage;
use crate::{Sample, SAMPLE_MAX};

/// Translate a MIDI event on `channel_filter` into an engine request.
///
/// Note-on with velocity 0 is a note-off. Controller and program changes
/// are not engine messages; see [`apply_control_change`].
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    if midi.channel() != channel_filter {
        return None;
    }
    match midi {
        MidiEvent::NoteOn {
            key, velocity: 0, ..
        } => Some(SynthMessage::NoteOff {
            note: key,
            velocity: 0,
        }),
        MidiEvent::NoteOn { key, velocity, .. } => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOff { key, velocity, .. } => Some(SynthMessage::NoteOff {
            note: key,
            velocity,
        }),
        MidiEvent::PitchBend { value, .. } => Some(SynthMessage::PitchBend {
            value: i32::from(value),
        }),
        MidiEvent::ControlChange { .. } | MidiEvent::ProgramChange { .. } => None,
    }
}

/// Controller numbers `1..=CONTROL_CHANNELS` drive the matching control
/// channel. The 7-bit value is widened to 14 bits. Returns whether the
/// controller was mapped.
pub fn apply_control_change(panel: &ControlPanel, controller: u8, value: u8) -> bool {
    if !(1..=CONTROL_CHANNELS).contains(&usize::from(controller)) {
        return false;
    }
    let value = u32::from(value & 0x7F);
    panel.set(controller, (value << 7) | value);
    true
}

pub fn sample_to_f32(sample: Sample) -> f32 {
    sample as f32 / SAMPLE_MAX as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{ControlInput, CONTROL_MAX};

    #[test]
    fn zero_velocity_note_on_releases() {
        let event = MidiEvent::NoteOn {
            channel: 0,
            key: 64,
            velocity: 0,
        };
        assert_eq!(
            midi_to_synth(event, 0),
            Some(SynthMessage::NoteOff {
                note: 64,
                velocity: 0
            })
        );
    }

    #[test]
    fn other_channels_are_ignored() {
        let event = MidiEvent::NoteOn {
            channel: 3,
            key: 64,
            velocity: 90,
        };
        assert_eq!(midi_to_synth(event, 0), None);
        assert!(midi_to_synth(event, 3).is_some());
    }

    #[test]
    fn pitch_bend_passes_through() {
        let event = MidiEvent::PitchBend {
            channel: 0,
            value: -300,
        };
        assert_eq!(
            midi_to_synth(event, 0),
            Some(SynthMessage::PitchBend { value: -300 })
        );
    }

    #[test]
    fn controllers_widen_to_control_range() {
        let panel = ControlPanel::new();
        assert!(apply_control_change(&panel, 1, 127));
        assert_eq!(panel.read_control_input(1), CONTROL_MAX);
        assert!(apply_control_change(&panel, 23, 0));
        assert_eq!(panel.read_control_input(23), 0);
        assert!(!apply_control_change(&panel, 0, 64));
        assert!(!apply_control_change(&panel, 64, 64));
    }

    #[test]
    fn samples_map_to_unit_range() {
        assert_eq!(sample_to_f32(0), 0.0);
        assert_eq!(sample_to_f32(SAMPLE_MAX), 1.0);
        assert_eq!(sample_to_f32(-SAMPLE_MAX), -1.0);
    }
}
