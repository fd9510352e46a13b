/*
Engine: Render Path vs Control Path
===================================

Two contexts drive the engine.

  render    `render_tick`, once per sample period, from the audio clock.
            Must never block. For each voice it `try_lock`s; a voice that a
            control operation currently holds is skipped for this tick
            (absent from the sum). Nothing is logged and nothing allocates.

  control   everything else: notes, bend, parameters, patch loads. May block
            on voice locks. Serialized by one control mutex, which also owns
            the allocator's sequence counter.

Shared data
-----------

  patch        every slot's parameter block, published through `ArcSwap`.
               Writers copy the current patch, edit the copy and store it
               whole, so the renderer sees either the old block or the new
               one and never a half-written mixture.

  voices       `MAX_POLYPHONY` `VoiceCell`s: a mutex around the voice plus an
               atomic mirror of status/note/velocity/sequence for lock-free
               reads.

  pitch_bend   one atomic word, read by every voice every tick.

  ticks        completed render ticks, for hosts and tests that need to
               know how far the audio clock has run.

Retiring a voice
----------------

Stealing and retriggering start a `SYNTH_STOPPING_COUNTER`-tick fade and then
wait for the voice to come back Free:

    control:  lock → force_release → publish → unlock → wait
    render:   ... fade 256 → fade 255 → ... → fade 1 → Free (published)

The wait spins briefly, then yields, and has no timeout: only the renderer
ever frees a fading voice, so a retriggered or stolen note always gets its
full fade. It ends within `SYNTH_STOPPING_COUNTER` ticks of the audio clock,
however long the host leaves between blocks. A host that stops calling
`render_tick` must stop sending notes that retrigger or steal.

Unit-type changes and patch loads hold every voice lock across the publish
and the state reset, so no voice is ever evaluated with state built for a
different unit type.
*/

use std::hint;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::controls::{ControlInput, NoControls};
use crate::dsp::mix::clamp_sample;
use crate::dsp::pitch::{BEND_MAX, BEND_MIN};
use crate::dsp::wavetable;
use crate::error::{Error, Result};
use crate::params::ParamDescriptor;
use crate::patch::Patch;
use crate::synth::allocator::{Allocation, NoteAllocator};
use crate::synth::message::{MessageReceiver, SynthMessage};
use crate::synth::voice::{VoiceCell, VoiceSnapshot, VoiceStatus};
use crate::units::{NoteStart, UnitType};
use crate::{Sample, MAX_POLYPHONY, POLYPHONY_DIVISOR};

/// Busy-wait iterations before the retire wait starts yielding.
const SPIN_LIMIT: u32 = 1_000;

pub struct SynthEngine {
    config: EngineConfig,
    patch: ArcSwap<Patch>,
    voices: [VoiceCell; MAX_POLYPHONY],
    pitch_bend: AtomicI32,
    ticks: AtomicU64,
    control: Mutex<NoteAllocator>,
    controls: Arc<dyn ControlInput>,
}

impl SynthEngine {
    /// Engine with an empty patch and no live controls.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_controls(config, Arc::new(NoControls))
    }

    pub fn with_controls(config: EngineConfig, controls: Arc<dyn ControlInput>) -> Self {
        wavetable::warm_up();
        Self {
            config,
            patch: ArcSwap::from_pointee(Patch::new()),
            voices: Default::default(),
            pitch_bend: AtomicI32::new(0),
            ticks: AtomicU64::new(0),
            control: Mutex::new(NoteAllocator::new()),
            controls,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    // ---- render path ------------------------------------------------------

    /// Produce one output sample. Never blocks.
    pub fn render_tick(&self) -> Sample {
        let bend = self.pitch_bend.load(Ordering::Relaxed);
        let mut sum: i64 = 0;

        for cell in &self.voices {
            let Some(mut voice) = cell.try_lock() else {
                continue;
            };
            if !voice.is_active() {
                continue;
            }
            let patch = self.patch.load();
            sum += i64::from(voice.render(&patch, bend));
            cell.publish_status(voice.status());
        }

        self.ticks.fetch_add(1, Ordering::Release);
        clamp_sample(sum / i64::from(POLYPHONY_DIVISOR))
    }

    pub fn render_block(&self, out: &mut [Sample]) {
        for sample in out.iter_mut() {
            *sample = self.render_tick();
        }
    }

    /// Number of completed render ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    // ---- notes ------------------------------------------------------------

    /// Start `note` and return the voice it was given.
    ///
    /// A voice already sounding `note` is retired first, and if no voice is
    /// free the oldest one is. Each retire waits for its fade to finish on
    /// the render path, which takes `SYNTH_STOPPING_COUNTER` render ticks.
    pub fn note_on(&self, note: u8, velocity: u8) -> usize {
        let mut allocator = self.control.lock();

        if let Some(index) = NoteAllocator::find_sounding(&self.voices(), note) {
            debug!(note, voice = index, "retriggering note");
            self.retire(index);
        }

        // `choose` only returns None for an empty voice table.
        let allocation = NoteAllocator::choose(&self.voices()).unwrap_or(Allocation::Free(0));
        if let Allocation::Steal(index) = allocation {
            let victim = self.voices[index].snapshot(index);
            debug!(
                note,
                voice = index,
                stolen_note = victim.note,
                "stealing oldest voice"
            );
            self.retire(index);
        }

        let index = allocation.index();
        let sequence = allocator.next_sequence();
        let patch = self.patch.load();
        let trigger = NoteStart {
            note,
            velocity,
            voice: index,
            sample_rate: self.config.sample_rate,
            controls: self.controls.as_ref(),
        };

        let cell = &self.voices[index];
        let mut voice = cell.lock();
        voice.start(&patch, &trigger, sequence);
        cell.publish(&voice);
        debug!(note, velocity, voice = index, sequence, "note on");
        index
    }

    /// Release the held voice playing `note`. Returns false when no such
    /// voice exists or it is already releasing.
    pub fn note_off(&self, note: u8, _velocity: u8) -> bool {
        let _control = self.control.lock();

        let Some(index) = NoteAllocator::find_held(&self.voices(), note) else {
            return false;
        };
        let cell = &self.voices[index];
        let mut voice = cell.lock();
        let released = voice.release(note);
        cell.publish(&voice);
        if released {
            debug!(note, voice = index, "note off");
        }
        released
    }

    pub fn set_pitch_bend(&self, value: i32) {
        self.pitch_bend
            .store(value.clamp(BEND_MIN, BEND_MAX), Ordering::Relaxed);
    }

    pub fn pitch_bend(&self) -> i32 {
        self.pitch_bend.load(Ordering::Relaxed)
    }

    /// Fade out every sounding voice and centre the bend. Does not wait.
    pub fn panic(&self) {
        let _control = self.control.lock();
        let mut stopped = 0;
        for cell in &self.voices {
            let mut voice = cell.lock();
            if voice.force_release() {
                stopped += 1;
            }
            cell.publish(&voice);
        }
        self.pitch_bend.store(0, Ordering::Relaxed);
        info!(stopped, "panic");
    }

    fn retire(&self, index: usize) {
        let cell = &self.voices[index];
        {
            let mut voice = cell.lock();
            voice.force_release();
            cell.publish(&voice);
        }
        self.wait_until_free(index);
    }

    fn wait_until_free(&self, index: usize) {
        let cell = &self.voices[index];
        let mut spins = 0;
        while cell.status() != VoiceStatus::Free {
            if spins < SPIN_LIMIT {
                spins += 1;
                hint::spin_loop();
            } else {
                thread::yield_now();
            }
        }
    }

    // ---- parameters -------------------------------------------------------

    pub fn get_parameter(&self, slot: usize, name: &str) -> Result<u32> {
        self.patch
            .load()
            .unit(slot)?
            .get(name)
            .map_err(|source| Error::Param { slot, source })
    }

    /// Bounds-checked write. On any error the patch is unchanged.
    pub fn set_parameter(&self, slot: usize, name: &str, value: u32) -> Result<()> {
        let _control = self.control.lock();
        let mut patch = **self.patch.load();
        patch
            .unit_mut(slot)?
            .set(name, value)
            .map_err(|source| Error::Param { slot, source })?;
        self.patch.store(Arc::new(patch));
        debug!(slot, name, value, "parameter set");
        Ok(())
    }

    pub fn get_unit_type(&self, slot: usize) -> Result<UnitType> {
        Ok(self.patch.load().unit(slot)?.unit_type())
    }

    /// Replace the unit in `slot` with a default-initialized one and reset
    /// that slot's state in every voice.
    pub fn set_unit_type(&self, slot: usize, unit_type: UnitType) -> Result<()> {
        let _control = self.control.lock();
        let mut patch = **self.patch.load();
        *patch.unit_mut(slot)? = unit_type.default_params(slot);

        let mut voices: Vec<_> = self.voices.iter().map(VoiceCell::lock).collect();
        self.patch.store(Arc::new(patch));
        for voice in voices.iter_mut() {
            voice.reset_slot(slot, unit_type);
        }
        drop(voices);

        info!(slot, unit = %unit_type, "unit type set");
        Ok(())
    }

    /// Like [`set_unit_type`](Self::set_unit_type) for a raw type tag.
    pub fn set_unit_type_tag(&self, slot: usize, tag: u8) -> Result<()> {
        self.set_unit_type(slot, UnitType::try_from(tag)?)
    }

    pub fn enumerate_descriptors(&self, slot: usize) -> Result<Vec<ParamDescriptor>> {
        Ok(self.patch.load().unit(slot)?.descriptors())
    }

    // ---- patches ----------------------------------------------------------

    /// Copy of the current patch.
    pub fn patch(&self) -> Patch {
        **self.patch.load()
    }

    /// Replace every slot at once. All voices are silenced and reset.
    pub fn load_patch(&self, patch: Patch) -> Result<()> {
        patch.validate()?;
        let _control = self.control.lock();

        let mut voices: Vec<_> = self.voices.iter().map(VoiceCell::lock).collect();
        self.patch.store(Arc::new(patch));
        for (cell, voice) in self.voices.iter().zip(voices.iter_mut()) {
            voice.reset(&patch);
            cell.publish(voice);
        }
        drop(voices);

        info!("patch loaded");
        Ok(())
    }

    // ---- voices -----------------------------------------------------------

    pub fn voices(&self) -> [VoiceSnapshot; MAX_POLYPHONY] {
        std::array::from_fn(|index| self.voices[index].snapshot(index))
    }

    pub fn voice_status(&self, index: usize) -> Option<VoiceStatus> {
        self.voices.get(index).map(VoiceCell::status)
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices
            .iter()
            .filter(|cell| !cell.status().is_free())
            .count()
    }

    // ---- messages ---------------------------------------------------------

    pub fn handle(&self, message: SynthMessage) -> Result<()> {
        match message {
            SynthMessage::NoteOn { note, velocity } => {
                self.note_on(note, velocity);
            }
            SynthMessage::NoteOff { note, velocity } => {
                self.note_off(note, velocity);
            }
            SynthMessage::PitchBend { value } => self.set_pitch_bend(value),
            SynthMessage::Panic => self.panic(),
            SynthMessage::SetUnitType { slot, unit } => self.set_unit_type(slot, unit)?,
        }
        Ok(())
    }

    /// Apply every queued message. Rejected messages are logged and skipped.
    pub fn drain<R: MessageReceiver>(&self, rx: &mut R) -> usize {
        let mut handled = 0;
        while let Some(message) = rx.pop() {
            if let Err(error) = self.handle(message) {
                warn!(?message, %error, "control message rejected");
            }
            handled += 1;
        }
        handled
    }
}

impl Default for SynthEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
