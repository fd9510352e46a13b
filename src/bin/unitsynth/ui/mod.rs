//! TUI for unitsynth
//!
//! Shows the voice table, the parameters of one slot, and the rendered output.

mod patch;
mod spectrum;
mod status;
mod voices;
mod waveform;

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use tracing::warn;

use unitsynth::patch::presets;
use unitsynth::synth::SynthMessage;
use unitsynth::{SynthEngine, MAX_SYNTH_UNITS};

use super::app::BankStore;
use super::keyboard::{KeyAction, Keyboard};

use patch::render_patch;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats};
use voices::render_voices;
use waveform::render_waveform;

/// Samples shown by the oscilloscope and fed to the FFT.
const VIS_BUFFER_SIZE: usize = 1024;

pub struct UiApp {
    engine: Arc<SynthEngine>,
    keyboard: Keyboard,
    message_tx: Producer<SynthMessage>,
    scope_rx: Consumer<f32>,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    bank: BankStore,
    slot: usize,
    preset_name: String,
    notice: String,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        engine: Arc<SynthEngine>,
        message_tx: Producer<SynthMessage>,
        scope_rx: Consumer<f32>,
        bank: BankStore,
        sample_rate: u32,
    ) -> Self {
        let notice = match bank.generation() {
            0 => "no stored bank".to_string(),
            generation => format!("bank generation {generation} loaded"),
        };
        Self {
            engine,
            keyboard: Keyboard::new(),
            message_tx,
            scope_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate as f32),
            bank,
            slot: 0,
            preset_name: "custom".to_string(),
            notice,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.spectrum.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        let action = self.keyboard.handle(key.code);
                        self.apply(action);
                    }
                }
            }
        }
        Ok(())
    }

    /// Keep the newest `VIS_BUFFER_SIZE` samples.
    fn poll_audio(&mut self) {
        let available = self.scope_rx.slots();
        if available == 0 {
            return;
        }
        if let Ok(chunk) = self.scope_rx.read_chunk(available) {
            let (first, second) = chunk.as_slices();
            self.audio_buffer.extend_from_slice(first);
            self.audio_buffer.extend_from_slice(second);
            chunk.commit_all();
        }
        let excess = self.audio_buffer.len().saturating_sub(VIS_BUFFER_SIZE);
        self.audio_buffer.drain(..excess);
    }

    fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::Send(message) => {
                if self.message_tx.push(message).is_err() {
                    warn!(?message, "control queue full, message dropped");
                    self.notice = "control queue full".to_string();
                }
            }
            KeyAction::LoadPreset(index) => {
                let Some((name, patch)) = presets::all().get(index).copied() else {
                    return;
                };
                match self.engine.load_patch(patch) {
                    Ok(()) => {
                        self.keyboard.clear();
                        self.preset_name = name.to_string();
                        self.notice = format!("loaded {name}");
                    }
                    Err(err) => self.notice = err.to_string(),
                }
            }
            KeyAction::SaveBank => {
                self.notice = match self.bank.save(&self.engine, &self.preset_name) {
                    Ok(generation) => format!(
                        "saved generation {generation} to {}",
                        self.bank.path().display()
                    ),
                    Err(err) => format!("save failed: {err}"),
                };
            }
            KeyAction::NextSlot => self.slot = (self.slot + 1) % MAX_SYNTH_UNITS,
            KeyAction::PrevSlot => {
                self.slot = (self.slot + MAX_SYNTH_UNITS - 1) % MAX_SYNTH_UNITS
            }
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Ignore => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Status bar
                Constraint::Min(12),    // Voices + patch
                Constraint::Length(10), // Scope + spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_status(
            frame,
            rows[0],
            &self.engine,
            self.keyboard.octave(),
            &self.notice,
            &stats,
        );

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[1]);
        render_voices(frame, middle[0], &self.engine.voices());
        render_patch(frame, middle[1], &self.engine, self.slot);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[2]);
        render_waveform(frame, bottom[0], &self.audio_buffer);
        render_spectrum(frame, bottom[1], self.spectrum.data());

        let help = Paragraph::new(
            " [d..;] Play  [z/x] Octave  [↑↓←→] Bend  [Tab] Slot  [1-5] Preset  [Space] Panic  [S] Save  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, rows[3]);
    }
}
