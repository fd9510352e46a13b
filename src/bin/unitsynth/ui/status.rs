//! Status bar - engine state, keyboard octave, output level

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use unitsynth::{SynthEngine, MAX_POLYPHONY};

pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    engine: &SynthEngine,
    octave: u8,
    notice: &str,
    stats: &AudioStats,
) {
    let block = Block::default().title(" unitsynth ").borders(Borders::ALL);

    let active = engine.active_voice_count();
    let line = Line::from(vec![
        Span::styled(
            format!(" {:.1}kHz  ", engine.sample_rate() as f32 / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Voices {active}/{MAX_POLYPHONY}  "),
            Style::default().fg(if active == MAX_POLYPHONY {
                Color::Yellow
            } else {
                Color::Green
            }),
        ),
        Span::styled(
            format!("Oct {octave}  Bend {:+}  ", engine.pitch_bend()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}  ", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(notice.to_string(), Style::default().fg(Color::White)),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
