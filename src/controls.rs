//! Live control inputs.
//!
//! The analog front end (potentiometers, pedals) lives outside the engine.
//! Units only see it through [`ControlInput`], and only while a note starts:
//! an ADSR whose `AttackCtrl` names channel 3 reads that channel once, at
//! trigger time, and never again for the life of the note.

use std::sync::atomic::{AtomicU32, Ordering};

/// Number of control channels. Channel numbers run `1..=CONTROL_CHANNELS`;
/// channel 0 means "not controlled".
pub const CONTROL_CHANNELS: usize = 23;

/// Largest value a control channel reports.
pub const CONTROL_MAX: u32 = 16_383;

/// Source of sampled control values.
pub trait ControlInput: Send + Sync {
    /// Current value of `channel` in `0..=CONTROL_MAX`. Unknown channels read 0.
    fn read_control_input(&self, channel: u8) -> u32;
}

/// Control input that always reads zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControls;

impl ControlInput for NoControls {
    fn read_control_input(&self, _channel: u8) -> u32 {
        0
    }
}

/// Bank of control values written by the host and read by the engine.
#[derive(Debug)]
pub struct ControlPanel {
    values: [AtomicU32; CONTROL_CHANNELS],
}

impl ControlPanel {
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|_| AtomicU32::new(0)),
        }
    }

    /// Store a sampled value. Out-of-range channels are ignored and values
    /// are clamped to `CONTROL_MAX`.
    pub fn set(&self, channel: u8, value: u32) {
        if let Some(slot) = Self::slot(channel).map(|i| &self.values[i]) {
            slot.store(value.min(CONTROL_MAX), Ordering::Relaxed);
        }
    }

    fn slot(channel: u8) -> Option<usize> {
        let index = usize::from(channel).checked_sub(1)?;
        (index < CONTROL_CHANNELS).then_some(index)
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlInput for ControlPanel {
    fn read_control_input(&self, channel: u8) -> u32 {
        Self::slot(channel)
            .map(|i| self.values[i].load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

/// Map a control reading onto `min..=max` linearly.
pub fn scale_control(value: u32, min: u32, max: u32) -> u32 {
    let value = u64::from(value.min(CONTROL_MAX));
    let span = u64::from(max.saturating_sub(min));
    min + (value * span / u64::from(CONTROL_MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_zero_is_never_controlled() {
        let panel = ControlPanel::new();
        panel.set(0, 1000);
        assert_eq!(panel.read_control_input(0), 0);
    }

    #[test]
    fn channels_are_one_based() {
        let panel = ControlPanel::new();
        panel.set(1, 42);
        panel.set(CONTROL_CHANNELS as u8, 7);
        assert_eq!(panel.read_control_input(1), 42);
        assert_eq!(panel.read_control_input(CONTROL_CHANNELS as u8), 7);
        assert_eq!(panel.read_control_input(CONTROL_CHANNELS as u8 + 1), 0);
    }

    #[test]
    fn values_are_clamped() {
        let panel = ControlPanel::new();
        panel.set(2, u32::MAX);
        assert_eq!(panel.read_control_input(2), CONTROL_MAX);
    }

    #[test]
    fn scale_covers_full_range() {
        assert_eq!(scale_control(0, 10, 110), 10);
        assert_eq!(scale_control(CONTROL_MAX, 10, 110), 110);
        assert_eq!(scale_control(CONTROL_MAX / 2, 0, 100), 49);
    }
}
