//! Single-cycle wavetables and fixed-point phase lookup.

/*
Wavetable Oscillators
=====================

A wavetable oscillator stores one cycle of a waveform in a table and walks
through it with a phase accumulator. Nothing is computed per sample except an
addition and an index.

Vocabulary
----------

  phase         A 32-bit unsigned accumulator. 0 is the start of the cycle and
                the value wraps back to 0 after 2^32, so the wrap IS the end of
                the cycle. No modulo, no branch.

  increment     How far the phase moves per sample. For a frequency f at
                sample rate fs:

                    increment = f / fs * 2^32

                At 32 kHz, 440 Hz → 59_055_800 per sample.

  cell          One table entry. With 2^10 cells the top 10 phase bits pick
                the cell:

                    cell = phase >> (32 - 10)

                The low 22 bits are the fractional position inside the cell.
                We drop them (no interpolation); at 1024 cells the step error
                sits far below the 15-bit output noise floor for the bright
                waveforms and is inaudible on the sine.


Waveform Shapes
---------------

  Sine       smooth, fundamental only
  Triangle   odd harmonics, falling as 1/n²
  Sawtooth   every harmonic, falling as 1/n (ramps -max → +max)
  Square     odd harmonics, falling as 1/n (first half +max, second -max)

The tables are naive (not band-limited). Aliasing on high notes is part of the
instrument's character and costs nothing.
*/

use lazy_static::lazy_static;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Sample, SAMPLE_MAX};

/// log2 of the number of cells in each table.
pub const TABLE_BITS: u32 = 10;

pub const TABLE_SIZE: usize = 1 << TABLE_BITS;

/// Right shift turning a phase into a cell index.
pub const PHASE_SHIFT: u32 = 32 - TABLE_BITS;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Waveform {
    #[default]
    Sine = 0,
    Triangle = 1,
    Sawtooth = 2,
    Square = 3,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Sawtooth,
        Waveform::Square,
    ];

    /// Largest valid `OscType` parameter value.
    pub const MAX_INDEX: u32 = 3;

    /// Waveform for an `OscType` value. Out-of-range values fall back to sine.
    pub fn from_index(index: u8) -> Self {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "Sine",
            Waveform::Triangle => "Triangle",
            Waveform::Sawtooth => "Sawtooth",
            Waveform::Square => "Square",
        }
    }
}

type Table = [i16; TABLE_SIZE];

lazy_static! {
    static ref TABLES: [Table; 4] = [
        build(Waveform::Sine),
        build(Waveform::Triangle),
        build(Waveform::Sawtooth),
        build(Waveform::Square),
    ];
}

fn build(waveform: Waveform) -> Table {
    let max = SAMPLE_MAX as f64;
    let mut table = [0i16; TABLE_SIZE];
    for (i, cell) in table.iter_mut().enumerate() {
        let t = i as f64 / TABLE_SIZE as f64;
        let value = match waveform {
            Waveform::Sine => (std::f64::consts::TAU * t).sin(),
            Waveform::Triangle => {
                if t < 0.25 {
                    4.0 * t
                } else if t < 0.75 {
                    2.0 - 4.0 * t
                } else {
                    4.0 * t - 4.0
                }
            }
            Waveform::Sawtooth => 2.0 * t - 1.0,
            Waveform::Square => {
                if t < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        };
        *cell = (value * max).round().clamp(-max, max) as i16;
    }
    table
}

/// Force the tables to be built. Call from the control context before the
/// first render so the render path never pays for it.
pub fn warm_up() {
    lazy_static::initialize(&TABLES);
}

/// Cell index for a phase.
#[inline]
pub fn cell(phase: u32) -> usize {
    (phase >> PHASE_SHIFT) as usize
}

/// Table value for `phase`.
#[inline]
pub fn lookup(waveform: Waveform, phase: u32) -> Sample {
    Sample::from(TABLES[waveform as usize][cell(phase)])
}
