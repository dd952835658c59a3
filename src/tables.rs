//! # Scale tables
//!
//! The reference tables the quantizer snaps to. Both are built once at start-up and never change afterwards.
//!
//! The pitch table holds equal tempered frequencies in hertz, the voltage table holds 1volt/octave control voltages
//! where each semitone spans 1/12 of a volt.

use core::ops::RangeInclusive;

use heapless::Vec;

use crate::{
    config::Config,
    error::{Error, Result},
    quantizer::{ScaleTable, TABLE_CAPACITY},
};

/// `build_frequency_table(f, n)` is the equal tempered scale starting at `f` hertz and rising `n` semitones.
///
/// The table has `n + 1` entries, entry `i` is `f * 2^(i/12)`.
///
/// # Arguments
///
/// * `base_frequency` - the frequency of the lowest entry in hertz, must be positive and finite
///
/// * `semitone_count` - how many semitones above the base the table reaches
///
/// # Errors
///
/// * `InvalidConfig` if `base_frequency` is not positive and finite
/// * `CapacityExceeded` if the table would not fit in `TABLE_CAPACITY` entries
pub fn build_frequency_table(base_frequency: f32, semitone_count: usize) -> Result<ScaleTable> {
    if !(base_frequency.is_finite() && 0.0 < base_frequency) {
        return Err(Error::InvalidConfig("base frequency must be positive and finite"));
    }
    let len = semitone_count + 1;
    let mut values = Vec::<f32, TABLE_CAPACITY>::new();

    for i in 0..len {
        let freq = base_frequency * libm::powf(2.0_f32, i as f32 / STEPS_PER_OCTAVE as f32);
        values.push(freq).map_err(|_| Error::CapacityExceeded {
            len,
            capacity: TABLE_CAPACITY,
        })?;
    }

    ScaleTable::new(&values)
}

/// `build_voltage_table(r, s)` is the 1volt/octave table covering octave offsets `r` with `s` steps per octave.
///
/// The first entry is a reference floor one step below the lowest octave, the rest are `octave + step / s` for each
/// octave in `r` and each step in `[0, s)`, in ascending order.
///
/// # Arguments
///
/// * `octave_range` - the octave offsets to cover, both ends included, e.g. `-5..=4`
///
/// * `steps_per_octave` - how many equal steps each octave is divided into, must not be zero
pub fn build_voltage_table(
    octave_range: RangeInclusive<i8>,
    steps_per_octave: usize,
) -> Result<ScaleTable> {
    if steps_per_octave == 0 {
        return Err(Error::InvalidConfig("steps per octave must not be zero"));
    }
    if octave_range.is_empty() {
        return Err(Error::InvalidConfig("octave range must not be empty"));
    }

    let num_octaves = (*octave_range.end() as i16 - *octave_range.start() as i16 + 1) as usize;
    let len = 1 + num_octaves * steps_per_octave;
    let capacity_exceeded = |_: f32| Error::CapacityExceeded {
        len,
        capacity: TABLE_CAPACITY,
    };

    let step_width = 1.0_f32 / steps_per_octave as f32;
    let mut values = Vec::<f32, TABLE_CAPACITY>::new();

    values
        .push(*octave_range.start() as f32 - step_width)
        .map_err(capacity_exceeded)?;

    for octave in octave_range {
        for step in 0..steps_per_octave {
            values
                .push(octave as f32 + step as f32 * step_width)
                .map_err(capacity_exceeded)?;
        }
    }

    ScaleTable::new(&values)
}

/// The pitch and voltage tables are bundled here.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleTables {
    pitch: ScaleTable,
    voltage: ScaleTable,
    // voltage of pitch entry zero, the bottom of the lowest octave
    lowest_octave: f32,
}

impl ScaleTables {
    /// `ScaleTables::build(cfg)` is both tables built from the configuration `cfg`.
    pub fn build(config: &Config) -> Result<Self> {
        Ok(Self {
            pitch: build_frequency_table(config.base_frequency, config.semitone_count)?,
            voltage: build_voltage_table(config.octave_range.clone(), config.steps_per_octave)?,
            lowest_octave: *config.octave_range.start() as f32,
        })
    }

    /// `tables.pitch()` is the table of frequencies in hertz
    pub fn pitch(&self) -> &ScaleTable {
        &self.pitch
    }

    /// `tables.voltage()` is the table of 1volt/octave control voltages
    pub fn voltage(&self) -> &ScaleTable {
        &self.voltage
    }

    /// `tables.voltage_for_semitone(i)` is the control voltage matching entry `i` of the pitch table.
    ///
    /// The voltage table starts with the reference floor, so pitch entry `i` lines up with voltage entry `i + 1`.
    /// Pitch entries past the top of the voltage table keep rising by one semitone each, so the top note of a ten
    /// octave pitch table sits one full octave above the voltage of the note twelve below it.
    pub fn voltage_for_semitone(&self, index: usize) -> f32 {
        self.voltage
            .get(index + 1)
            .unwrap_or_else(|| self.lowest_octave + index as f32 * VOLT_PER_SEMITONE)
    }
}

/// The number of semitones in an octave.
pub const STEPS_PER_OCTAVE: usize = 12;

/// The width of one semitone in 1volt/octave scaling.
pub const VOLT_PER_SEMITONE: f32 = 1.0_f32 / STEPS_PER_OCTAVE as f32;
