//! Patch view - every descriptor of the selected slot with its live value

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

use unitsynth::SynthEngine;

pub fn render_patch(frame: &mut Frame, area: Rect, engine: &SynthEngine, slot: usize) {
    let unit = engine
        .get_unit_type(slot)
        .map(|t| t.name())
        .unwrap_or("?");
    let title = format!(" Slot {slot:02}: {unit} (out = {}) ", slot + 2);

    let descriptors = engine.enumerate_descriptors(slot).unwrap_or_default();
    let rows = descriptors.iter().map(|d| {
        let value = engine
            .get_parameter(slot, d.name)
            .map(|v| format!("{v:>width$}", width = usize::from(d.digits)))
            .unwrap_or_else(|_| "?".to_string());
        Row::new([
            d.name.to_string(),
            value,
            format!("{}..={}", d.min, d.max),
            d.control.unwrap_or("").to_string(),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(7),
            Constraint::Length(12),
            Constraint::Min(7),
        ],
    )
    .header(
        Row::new(["Param", "Value", "Range", "Control"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(table, area);
}
