//! Spectrum analyzer - Hann-windowed FFT sampled at log-spaced frequencies

use std::f32::consts::PI;
use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

const SPECTRUM_POINTS: usize = 48;
const LOWEST_HZ: f64 = 20.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin read for each displayed point.
    bins: Vec<usize>,
    /// (log10 Hz, dB) per displayed point.
    points: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize, sample_rate: f32) -> Self {
        let size = size.max(2);
        let fft = FftPlanner::new().plan_fft_forward(size);
        let window: Vec<f32> = (0..size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / (size - 1) as f32).cos()))
            .collect();

        let nyquist = (f64::from(sample_rate) / 2.0).max(LOWEST_HZ * 2.0);
        let last_bin = size / 2 - 1;
        let (bins, points): (Vec<usize>, Vec<(f64, f64)>) = (0..SPECTRUM_POINTS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_POINTS - 1) as f64;
                let hz = LOWEST_HZ * (nyquist / LOWEST_HZ).powf(t);
                let bin = ((hz * size as f64 / f64::from(sample_rate)).round() as usize).min(last_bin);
                (bin, (hz.log10(), FLOOR_DB))
            })
            .unzip();

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); size],
            bins,
            points,
        }
    }

    /// Recompute from `buffer`. Buffers of the wrong length are ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }
        for ((out, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *out = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (point, &bin) in self.points.iter_mut().zip(&self.bins) {
            let power = f64::from(self.scratch[bin].norm_sqr()).max(1e-12);
            point.1 = (10.0 * power.log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.points
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, points: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(points);

    let (lo, hi) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
    let top_db = points.iter().map(|&(_, db)| db).fold(0.0, f64::max) + 10.0;

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([lo.min(hi), hi.max(lo + 1.0)])
                .labels(["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, top_db])
                .labels(["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
