//! Voice table - one row per voice, read from the lock-free snapshots

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use unitsynth::{VoiceSnapshot, VoiceStatus};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

fn note_name(note: u8) -> String {
    format!(
        "{}{}",
        NOTE_NAMES[usize::from(note % 12)],
        i32::from(note / 12) - 1
    )
}

fn status_color(status: VoiceStatus) -> Color {
    match status {
        VoiceStatus::Free => Color::DarkGray,
        VoiceStatus::Active => Color::Green,
        VoiceStatus::Releasing => Color::Yellow,
        VoiceStatus::ForceReleasing => Color::Red,
    }
}

pub fn render_voices(frame: &mut Frame, area: Rect, voices: &[VoiceSnapshot]) {
    let header = Row::new(["#", "State", "Note", "Vel", "Seq"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = voices.iter().map(|voice| {
        let sounding = !voice.status.is_free();
        let field = |text: String| if sounding { text } else { "-".to_string() };
        Row::new([
            Cell::from(voice.index.to_string()),
            Cell::from(voice.status.name()).style(Style::default().fg(status_color(voice.status))),
            Cell::from(field(note_name(voice.note))),
            Cell::from(field(voice.velocity.to_string())),
            Cell::from(field(voice.sequence.to_string())),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(9),
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Min(4),
        ],
    )
    .header(header)
    .block(Block::default().title(" Voices ").borders(Borders::ALL));

    frame.render_widget(table, area);
}
