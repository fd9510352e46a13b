// Purpose - external interfaces: MIDI decoding and sample format conversion

pub mod converter;
pub mod midi;

pub use converter::{apply_control_change, midi_to_synth, sample_to_f32};
pub use midi::MidiEvent;
