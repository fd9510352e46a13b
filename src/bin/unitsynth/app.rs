//! Audio host, control worker and bank storage

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{error, info, warn};

use unitsynth::bank::ParameterBank;
use unitsynth::io::sample_to_f32;
use unitsynth::patch::presets;
use unitsynth::synth::SynthMessage;
use unitsynth::{EngineConfig, Patch, SynthEngine};

use super::ui::UiApp;
use super::Args;

/// Pending control messages between the UI and the control worker.
const MESSAGE_CAPACITY: usize = 256;

/// Rendered samples kept for the oscilloscope and spectrum.
const SCOPE_CAPACITY: usize = 8192;

/// How long the control worker sleeps when its queue is empty.
const CONTROL_IDLE: Duration = Duration::from_millis(1);

pub struct Playground {
    args: Args,
    preset: Patch,
}

impl Playground {
    pub fn new(args: Args) -> EyreResult<Self> {
        let preset = presets::by_name(&args.preset).ok_or_else(|| {
            let names: Vec<_> = presets::all().iter().map(|(name, _)| *name).collect();
            eyre!("unknown preset {:?} (try one of {})", args.preset, names.join(", "))
        })?;
        Ok(Self { args, preset })
    }

    /// Take over the terminal and play until the user quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;
        let sample_rate = config.sample_rate().0;
        let channels = usize::from(config.channels());

        let engine = Arc::new(SynthEngine::new(
            EngineConfig::default().with_sample_rate(sample_rate),
        ));
        let mut bank = BankStore::new(self.args.bank);
        if !bank.load(&engine) {
            engine.load_patch(self.preset)?;
            info!(preset = %self.args.preset, "preset loaded");
        }

        let (message_tx, message_rx) = RingBuffer::<SynthMessage>::new(MESSAGE_CAPACITY);
        let (scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));

        let worker = spawn_control_worker(engine.clone(), message_rx, running.clone())?;
        let stream = build_stream(&device, &config.into(), channels, engine.clone(), scope_tx)?;
        stream.play().wrap_err("failed to start audio stream")?;
        info!(sample_rate, channels, "audio stream started");

        let mut terminal = ratatui::init();
        let result = UiApp::new(engine, message_tx, scope_rx, bank, sample_rate).run(&mut terminal);
        ratatui::restore();

        running.store(false, Ordering::Release);
        drop(stream);
        worker
            .join()
            .map_err(|_| eyre!("control worker panicked"))?;
        info!("shut down");
        result
    }
}

/// Apply queued control messages off the UI thread, so a note-on that has to
/// wait for a voice fade never stalls drawing.
fn spawn_control_worker(
    engine: Arc<SynthEngine>,
    mut rx: Consumer<SynthMessage>,
    running: Arc<AtomicBool>,
) -> EyreResult<JoinHandle<()>> {
    thread::Builder::new()
        .name("control".into())
        .spawn(move || {
            while running.load(Ordering::Acquire) {
                if engine.drain(&mut rx) == 0 {
                    thread::sleep(CONTROL_IDLE);
                }
            }
        })
        .wrap_err("failed to spawn control worker")
}

fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    engine: Arc<SynthEngine>,
    mut scope_tx: Producer<f32>,
) -> EyreResult<cpal::Stream> {
    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _| {
            for frame in data.chunks_mut(channels) {
                let sample = sample_to_f32(engine.render_tick());
                frame.fill(sample);
                // Scope is best effort; drop samples when the UI lags.
                let _ = scope_tx.push(sample);
            }
        },
        |err| error!(%err, "audio stream error"),
        None,
    )?;
    Ok(stream)
}

/// Bank image on disk plus one backup; the newest valid one is loaded.
pub struct BankStore {
    path: PathBuf,
    generation: u32,
}

impl BankStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            generation: 0,
        }
    }

    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("bak")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Apply the newest stored bank. Returns false when nothing usable exists.
    pub fn load(&mut self, engine: &SynthEngine) -> bool {
        let images: Vec<Vec<u8>> = [self.path.clone(), self.backup_path()]
            .iter()
            .filter_map(|path| fs::read(path).ok())
            .collect();
        let Some(bank) = ParameterBank::newest(images.iter().map(Vec::as_slice)) else {
            return false;
        };
        match bank.apply(engine) {
            Ok(()) => {
                self.generation = bank.generation;
                true
            }
            Err(err) => {
                warn!(%err, path = %self.path.display(), "stored bank rejected");
                false
            }
        }
    }

    /// Write the engine's current parameters as the next generation. The
    /// previous image is kept as the backup.
    pub fn save(&mut self, engine: &SynthEngine, description: &str) -> EyreResult<u32> {
        let generation = self.generation.wrapping_add(1);
        let bytes = ParameterBank::capture(engine, generation, description).encode()?;
        if self.path.exists() {
            fs::rename(&self.path, self.backup_path())
                .wrap_err("failed to keep previous bank as backup")?;
        }
        fs::write(&self.path, bytes)
            .wrap_err_with(|| format!("failed to write {}", self.path.display()))?;
        self.generation = generation;
        info!(generation, path = %self.path.display(), "bank saved");
        Ok(generation)
    }
}
