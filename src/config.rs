//! Start-up configuration for the quantizer.
//!
//! Nothing here is persisted, the configuration is fixed when the firmware is built.

use core::ops::RangeInclusive;

use crate::{
    error::{Error, Result},
    quantizer::TABLE_CAPACITY,
    scale::ScaleMask,
    tables::STEPS_PER_OCTAVE,
};

/// The maximum value that can be produced by the Analog to Digital Converters.
pub const ADC_MAX: u16 = 64_535;

/// Frequency of the lowest note of the pitch table, A0.
pub const FREQ_A0: f32 = 27.5;

/// The number of semitones the pitch table spans above its base, ten octaves.
pub const NUM_SEMITONES: usize = 120;

/// The number of discrete positions shown on the 3 bit indicator display.
pub const NUM_INDICATOR_POSITIONS: u16 = 8;

/// The configuration values used to build tables and run the control cycle are represented here.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Frequency of the lowest pitch table entry in hertz
    pub base_frequency: f32,

    /// How many semitones the pitch table spans above its base
    pub semitone_count: usize,

    /// The octave offsets covered by the voltage table, both ends included
    pub octave_range: RangeInclusive<i8>,

    /// Equal steps per octave in the voltage table
    pub steps_per_octave: usize,

    /// Full scale reading of the analog inputs
    pub adc_max: u16,

    /// How many positions the control pot is divided into
    pub indicator_positions: u16,

    /// Voltage of the oscillator CV input at a raw reading of zero
    pub input_min_volts: f32,

    /// Voltage of the oscillator CV input at full scale
    pub input_max_volts: f32,

    /// Voltage of the filtered PWM output at zero duty
    pub output_min_volts: f32,

    /// Voltage of the filtered PWM output at full duty
    pub output_max_volts: f32,

    /// Tonic of the selected scale, in semitones above the base frequency
    pub root: u8,

    /// A user defined scale that replaces the pot selected mode, the pot still drives the indicators
    pub custom_scale: Option<ScaleMask>,

    /// Carrier frequency of the PWM output
    pub pwm_frequency_hz: u32,

    /// PWM duty before the first cycle, in `[0, adc_max]`
    pub initial_duty: u16,

    /// Time between control cycles
    pub cycle_period_us: u32,

    /// Number of control cycles to run, `None` runs forever
    pub cycle_limit: Option<u32>,
}

impl Default for Config {
    /// `Config::default()` is the reference configuration, ten octaves from A0 with C as the tonic.
    fn default() -> Self {
        Self {
            base_frequency: FREQ_A0,
            semitone_count: NUM_SEMITONES,
            octave_range: -5..=4,
            steps_per_octave: STEPS_PER_OCTAVE,
            adc_max: ADC_MAX,
            indicator_positions: NUM_INDICATOR_POSITIONS,
            input_min_volts: -5.0_f32,
            input_max_volts: 5.0_f32,
            output_min_volts: -5.0_f32,
            output_max_volts: 5.0_f32,
            root: 3,
            custom_scale: None,
            pwm_frequency_hz: 440,
            initial_duty: ADC_MAX / 3,
            cycle_period_us: 1,
            cycle_limit: Some(100),
        }
    }
}

impl Config {
    /// `cfg.validate()` is `Ok` iff every value is usable for building tables and running cycles.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_frequency.is_finite() && 0.0 < self.base_frequency) {
            return Err(Error::InvalidConfig("base frequency must be positive and finite"));
        }
        if TABLE_CAPACITY <= self.semitone_count {
            return Err(Error::InvalidConfig("too many semitones for the pitch table"));
        }
        if self.steps_per_octave == 0 {
            return Err(Error::InvalidConfig("steps per octave must not be zero"));
        }
        if self.octave_range.is_empty() {
            return Err(Error::InvalidConfig("octave range must not be empty"));
        }
        let num_octaves =
            (*self.octave_range.end() as i16 - *self.octave_range.start() as i16 + 1) as usize;
        if TABLE_CAPACITY < 1 + num_octaves * self.steps_per_octave {
            return Err(Error::InvalidConfig("too many steps for the voltage table"));
        }
        if self.adc_max == 0 {
            return Err(Error::InvalidConfig("adc max must not be zero"));
        }
        if !(1..=NUM_INDICATOR_POSITIONS).contains(&self.indicator_positions) {
            return Err(Error::InvalidConfig("indicator positions must be in 1..=8"));
        }
        if !(self.input_min_volts < self.input_max_volts) {
            return Err(Error::InvalidConfig("input voltage span is inverted"));
        }
        if !(self.output_min_volts < self.output_max_volts) {
            return Err(Error::InvalidConfig("output voltage span is inverted"));
        }
        if self.adc_max < self.initial_duty {
            return Err(Error::InvalidConfig("initial duty is above adc max"));
        }
        Ok(())
    }
}
