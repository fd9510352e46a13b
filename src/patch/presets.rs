//! Factory patches.
//!
//! Routing values are 1-based result-buffer reads: slot `i`'s output is read
//! with the value `i + 2`. Unused slots stay `None` and carry the last unit's
//! output down to the voice output.

use super::Patch;
use crate::dsp::wavetable::Waveform;
use crate::units::{
    AdsrParams, LfoParams, LowpassParams, MixerParams, NoiseParams, RingParams, UnitHeader,
    UnitParams, VcaParams, VcoParams,
};

/// Routing value that reads `slot`'s output.
const fn out(slot: usize) -> u8 {
    slot as u8 + 2
}

fn vco(slot: usize, waveform: Waveform) -> VcoParams {
    VcoParams {
        osc_type: waveform as u8,
        ..VcoParams::new(UnitHeader::chained(slot))
    }
}

fn adsr(slot: usize, attack: u32, decay: u32, sustain: u8, release: u32) -> AdsrParams {
    AdsrParams {
        attack,
        decay,
        sustain,
        release,
        ..AdsrParams::new(UnitHeader::chained(slot))
    }
}

/// Sawtooth through a note-tracking lowpass.
pub fn lead() -> Patch {
    Patch::new()
        .with_unit(0, vco(0, Waveform::Sawtooth))
        .with_unit(
            1,
            LowpassParams {
                stages: 2,
                track_offset: 24,
                ..LowpassParams::new(UnitHeader::chained(1))
            },
        )
        .with_unit(2, adsr(2, 160, 6_400, 160, 4_800))
}

/// Saw plus a square one octave down, mixed and filtered.
pub fn bass() -> Patch {
    Patch::new()
        .with_unit(0, vco(0, Waveform::Sawtooth))
        .with_unit(
            1,
            VcoParams {
                harmonic: 8,
                ..vco(1, Waveform::Square)
            },
        )
        .with_unit(2, MixerParams::between(2, out(0), out(1)))
        .with_unit(
            3,
            LowpassParams {
                stages: 4,
                track_offset: 12,
                ..LowpassParams::new(UnitHeader::chained(3))
            },
        )
        .with_unit(4, adsr(4, 64, 4_800, 96, 1_600))
}

/// Slow triangle with LFO tremolo.
pub fn pad() -> Patch {
    Patch::new()
        .with_unit(
            0,
            LfoParams {
                rate: 80,
                ..LfoParams::new(UnitHeader::chained(0))
            },
        )
        .with_unit(1, vco(1, Waveform::Triangle))
        .with_unit(
            2,
            UnitParams::from(VcaParams {
                control_gain: 128,
                ..VcaParams::new(UnitHeader::chained(2))
            })
            .routed(out(1), out(0)),
        )
        .with_unit(3, adsr(3, 16_000, 16_000, 200, 24_000))
}

/// Two sines a twelfth apart, ring modulated.
pub fn bell() -> Patch {
    Patch::new()
        .with_unit(0, vco(0, Waveform::Sine))
        .with_unit(
            1,
            VcoParams {
                harmonic: 2,
                ..vco(1, Waveform::Sine)
            },
        )
        .with_unit(
            2,
            UnitParams::from(RingParams::new(UnitHeader::chained(2))).routed(out(0), out(1)),
        )
        .with_unit(3, adsr(3, 32, 24_000, 0, 16_000))
}

/// Short burst of fast-grained noise.
pub fn noise_hat() -> Patch {
    Patch::new()
        .with_unit(
            0,
            NoiseParams {
                shift_up: 8,
                ..NoiseParams::new(UnitHeader::chained(0))
            },
        )
        .with_unit(1, adsr(1, 16, 1_600, 0, 1_600))
}

/// Every preset with its display name, in keyboard order.
pub fn all() -> [(&'static str, Patch); 5] {
    [
        ("lead", lead()),
        ("bass", bass()),
        ("pad", pad()),
        ("bell", bell()),
        ("noise_hat", noise_hat()),
    ]
}

pub fn by_name(name: &str) -> Option<Patch> {
    all()
        .into_iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
        .map(|(_, patch)| patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitType;

    #[test]
    fn presets_are_valid_and_enveloped() {
        for (name, patch) in all() {
            assert!(patch.validate().is_ok(), "{name} is out of range");
            assert!(patch.has_envelope(), "{name} has no envelope");
        }
    }

    #[test]
    fn bass_mixer_reads_both_oscillators() {
        let patch = bass();
        let mixer = patch.unit(2).unwrap();
        assert_eq!(mixer.unit_type(), UnitType::Mixer);
        assert_eq!(mixer.get("SourceUnit").unwrap(), 2);
        assert_eq!(mixer.get("Source2Unit").unwrap(), 3);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(by_name("PAD"), Some(pad()));
        assert_eq!(by_name("organ"), None);
    }
}
