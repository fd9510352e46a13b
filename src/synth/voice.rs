use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::dsp::mix::fade;
use crate::patch::Patch;
use crate::units::{NoteStart, UnitIo, UnitParams, UnitState, UnitType};
use crate::{Sample, MAX_SYNTH_UNITS, SYNTH_RELEASE_COUNTER, SYNTH_STOPPING_COUNTER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum VoiceStatus {
    #[default]
    Free = 0, // Available for allocation
    Active = 1,         // Playing, unit chain running normally
    Releasing = 2,      // Note released, envelope (or release fade) running
    ForceReleasing = 3, // Being retired: fixed-length fade to silence
}

impl VoiceStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => VoiceStatus::Active,
            2 => VoiceStatus::Releasing,
            3 => VoiceStatus::ForceReleasing,
            _ => VoiceStatus::Free,
        }
    }

    pub fn is_free(self) -> bool {
        self == VoiceStatus::Free
    }

    pub fn name(self) -> &'static str {
        match self {
            VoiceStatus::Free => "free",
            VoiceStatus::Active => "active",
            VoiceStatus::Releasing => "releasing",
            VoiceStatus::ForceReleasing => "stopping",
        }
    }
}

/// Point-in-time view of one voice, read without taking its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceSnapshot {
    pub index: usize,
    pub status: VoiceStatus,
    pub note: u8,
    pub velocity: u8,
    pub sequence: u64,
}

/// One independent instance of the unit chain.
#[derive(Debug, Clone)]
pub struct Voice {
    active: bool,
    releasing: bool,
    release_countdown: Option<u32>,
    force_countdown: Option<u32>,
    note: u8,
    velocity: u8,
    sequence: u64,
    units: [UnitState; MAX_SYNTH_UNITS],
    // Entry 0 is the constant zero, entry i + 1 is slot i's latest output.
    // Kept across ticks so backward references read the previous tick.
    taps: [Sample; MAX_SYNTH_UNITS + 1],
}

impl Voice {
    pub fn new() -> Self {
        Self {
            active: false,
            releasing: false,
            release_countdown: None,
            force_countdown: None,
            note: 0,
            velocity: 0,
            sequence: 0,
            units: [UnitState::default(); MAX_SYNTH_UNITS],
            taps: [0; MAX_SYNTH_UNITS + 1],
        }
    }

    /// Begin a note: fresh per-slot state, then every unit's `note_start`.
    pub fn start(&mut self, patch: &Patch, trigger: &NoteStart<'_>, sequence: u64) {
        self.taps = [0; MAX_SYNTH_UNITS + 1];
        for (state, params) in self.units.iter_mut().zip(patch.units()) {
            *state = UnitState::for_type(params.unit_type());
            params.note_start(state, trigger);
        }

        self.note = trigger.note;
        self.velocity = trigger.velocity;
        self.sequence = sequence;
        self.releasing = false;
        self.release_countdown = None;
        self.force_countdown = None;
        self.active = true;
    }

    /// Graceful release. Only an Active voice playing `note` is affected, so
    /// repeating it never restarts a release already under way.
    pub fn release(&mut self, note: u8) -> bool {
        if self.status() != VoiceStatus::Active || self.note != note {
            return false;
        }
        self.releasing = true;
        true
    }

    /// Start the fixed-length fade. A fade already running is left alone.
    pub fn force_release(&mut self) -> bool {
        if !self.active || self.force_countdown.is_some() {
            return false;
        }
        self.force_countdown = Some(SYNTH_STOPPING_COUNTER);
        true
    }

    pub fn free(&mut self) {
        self.active = false;
        self.releasing = false;
        self.release_countdown = None;
        self.force_countdown = None;
    }

    /// Drop one slot's state after its unit type changed.
    pub fn reset_slot(&mut self, slot: usize, unit_type: UnitType) {
        if let Some(state) = self.units.get_mut(slot) {
            *state = UnitState::for_type(unit_type);
            self.taps[slot + 1] = 0;
        }
    }

    /// Free the voice and clear every slot, e.g. after a patch load.
    pub fn reset(&mut self, patch: &Patch) {
        self.free();
        self.taps = [0; MAX_SYNTH_UNITS + 1];
        for (state, params) in self.units.iter_mut().zip(patch.units()) {
            *state = UnitState::for_type(params.unit_type());
        }
    }

    /// Evaluate the chain once and return this voice's sample.
    pub fn render(&mut self, patch: &Patch, pitch_bend: i32) -> Sample {
        if !self.active {
            return 0;
        }

        self.taps[0] = 0;
        let mut finished = false;
        let mut has_envelope = false;

        for (slot, params) in patch.units().iter().enumerate() {
            let header = params.header();
            let source = self.taps[header.source_tap()];
            let out = match params {
                UnitParams::None(_) => source,
                _ => {
                    has_envelope |= matches!(params, UnitParams::Adsr(_));
                    let mut io = UnitIo {
                        source,
                        control: self.taps[header.control_tap()],
                        taps: &self.taps,
                        releasing: self.releasing,
                        pitch_bend,
                        finished: false,
                    };
                    let out = params.process(&mut self.units[slot], &mut io);
                    finished |= io.finished;
                    out
                }
            };
            self.taps[slot + 1] = out;
        }

        let out = self.taps[MAX_SYNTH_UNITS];

        if let Some(remaining) = self.force_countdown {
            let out = fade(out, remaining, SYNTH_STOPPING_COUNTER);
            self.count_down(remaining, |voice, left| voice.force_countdown = Some(left));
            return out;
        }

        if self.releasing && !has_envelope && self.release_countdown.is_none() {
            self.release_countdown = Some(SYNTH_RELEASE_COUNTER);
        }
        if let Some(remaining) = self.release_countdown {
            let out = fade(out, remaining, SYNTH_RELEASE_COUNTER);
            self.count_down(remaining, |voice, left| voice.release_countdown = Some(left));
            return out;
        }

        if self.releasing && finished {
            self.free();
        }
        out
    }

    fn count_down(&mut self, remaining: u32, store: impl FnOnce(&mut Self, u32)) {
        match remaining.saturating_sub(1) {
            0 => self.free(),
            left => store(self, left),
        }
    }

    pub fn status(&self) -> VoiceStatus {
        if !self.active {
            VoiceStatus::Free
        } else if self.force_countdown.is_some() {
            VoiceStatus::ForceReleasing
        } else if self.releasing {
            VoiceStatus::Releasing
        } else {
            VoiceStatus::Active
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Output of `slot` from the most recent tick.
    pub fn tap(&self, slot: usize) -> Option<Sample> {
        self.taps.get(slot + 1).copied()
    }

    pub fn force_countdown(&self) -> Option<u32> {
        self.force_countdown
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new()
    }
}

/// A voice behind its lock, plus a lock-free mirror of its bookkeeping.
///
/// The renderer only ever `try_lock`s; control code `lock`s. The mirror is
/// republished after every change so allocation and UIs can look at voices
/// without contending for the lock.
#[derive(Debug, Default)]
pub struct VoiceCell {
    voice: Mutex<Voice>,
    status: AtomicU8,
    note: AtomicU8,
    velocity: AtomicU8,
    sequence: AtomicU64,
}

impl VoiceCell {
    pub fn lock(&self) -> MutexGuard<'_, Voice> {
        self.voice.lock()
    }

    pub fn try_lock(&self) -> Option<MutexGuard<'_, Voice>> {
        self.voice.try_lock()
    }

    pub fn publish(&self, voice: &Voice) {
        self.note.store(voice.note, Ordering::Relaxed);
        self.velocity.store(voice.velocity, Ordering::Relaxed);
        self.sequence.store(voice.sequence, Ordering::Relaxed);
        self.publish_status(voice.status());
    }

    pub fn publish_status(&self, status: VoiceStatus) {
        self.status.store(status as u8, Ordering::Release);
    }

    pub fn status(&self) -> VoiceStatus {
        VoiceStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn snapshot(&self, index: usize) -> VoiceSnapshot {
        VoiceSnapshot {
            index,
            status: self.status(),
            note: self.note.load(Ordering::Relaxed),
            velocity: self.velocity.load(Ordering::Relaxed),
            sequence: self.sequence.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::NoControls;
    use crate::dsp::wavetable::Waveform;
    use crate::units::{AdsrMode, AdsrParams, UnitHeader, VcoParams};
    use crate::SAMPLE_MAX;

    fn trigger(note: u8) -> NoteStart<'static> {
        NoteStart {
            note,
            velocity: 100,
            voice: 0,
            sample_rate: 32_000,
            controls: &NoControls,
        }
    }

    fn square() -> Patch {
        Patch::new().with_unit(
            0,
            VcoParams {
                osc_type: Waveform::Square as u8,
                ..VcoParams::new(UnitHeader::chained(0))
            },
        )
    }

    #[test]
    fn none_slots_carry_output_to_the_end() {
        let mut voice = Voice::new();
        voice.start(&square(), &trigger(60), 1);
        assert_eq!(voice.render(&square(), 0), SAMPLE_MAX);
        assert_eq!(voice.tap(0), Some(SAMPLE_MAX));
        assert_eq!(voice.tap(15), Some(SAMPLE_MAX));
    }

    #[test]
    fn free_voice_is_silent() {
        let mut voice = Voice::new();
        assert_eq!(voice.render(&square(), 0), 0);
        assert_eq!(voice.status(), VoiceStatus::Free);
    }

    /// Constant full-scale output from the first tick.
    fn dc() -> Patch {
        Patch::new().with_unit(
            0,
            AdsrParams {
                attack: 1,
                decay: 1,
                sustain: 255,
                mode: AdsrMode::Envelope as u8,
                ..AdsrParams::new(UnitHeader::chained(0))
            },
        )
    }

    #[test]
    fn forced_fade_is_linear_and_exact() {
        let patch = dc();
        let mut voice = Voice::new();
        voice.start(&patch, &trigger(60), 1);
        assert_eq!(voice.render(&patch, 0), SAMPLE_MAX);

        voice.force_release();
        for t in 0..SYNTH_STOPPING_COUNTER {
            assert_eq!(voice.status(), VoiceStatus::ForceReleasing);
            assert_eq!(
                voice.render(&patch, 0),
                fade(SAMPLE_MAX, SYNTH_STOPPING_COUNTER - t, SYNTH_STOPPING_COUNTER)
            );
        }
        assert_eq!(voice.status(), VoiceStatus::Free);
        assert_eq!(voice.render(&patch, 0), 0);
    }

    #[test]
    fn release_without_envelope_fades_out() {
        let patch = square();
        let mut voice = Voice::new();
        voice.start(&patch, &trigger(60), 1);
        assert!(voice.release(60));
        for _ in 0..SYNTH_RELEASE_COUNTER {
            assert!(voice.is_active());
            voice.render(&patch, 0);
        }
        assert_eq!(voice.status(), VoiceStatus::Free);
    }

    #[test]
    fn release_is_idempotent() {
        let patch = square().with_unit(1, AdsrParams::new(UnitHeader::chained(1)));
        let mut voice = Voice::new();
        voice.start(&patch, &trigger(60), 1);
        assert!(!voice.release(61));
        assert!(voice.release(60));
        assert!(!voice.release(60));
        assert_eq!(voice.status(), VoiceStatus::Releasing);
    }

    #[test]
    fn second_force_release_keeps_countdown() {
        let patch = square();
        let mut voice = Voice::new();
        voice.start(&patch, &trigger(60), 1);
        voice.force_release();
        voice.render(&patch, 0);
        assert!(!voice.force_release());
        assert_eq!(voice.force_countdown(), Some(SYNTH_STOPPING_COUNTER - 1));
    }

    #[test]
    fn cell_mirror_tracks_voice() {
        let cell = VoiceCell::default();
        {
            let mut voice = cell.lock();
            voice.start(&square(), &trigger(64), 9);
            cell.publish(&voice);
        }
        let snapshot = cell.snapshot(2);
        assert_eq!(snapshot.status, VoiceStatus::Active);
        assert_eq!((snapshot.index, snapshot.note, snapshot.sequence), (2, 64, 9));
        let _held = cell.lock();
        assert!(cell.try_lock().is_none());
    }
}
