//! Oscilloscope of the most recent output samples

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Start the trace at a rising zero crossing so periodic tones stand still.
fn trigger_point(buffer: &[f32]) -> usize {
    let search = buffer.len() / 2;
    buffer
        .windows(2)
        .take(search)
        .position(|pair| pair[0] <= 0.0 && pair[1] > 0.0)
        .unwrap_or(0)
}

pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    let block = Block::default().title(" Output ").borders(Borders::ALL);

    let start = trigger_point(audio_buffer);
    let shown = &audio_buffer[start..];
    let data: Vec<(f64, f64)> = shown
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / shown.len().max(1) as f64, f64::from(sample)))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
