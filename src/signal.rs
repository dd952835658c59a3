//! # Signal adapter
//!
//! Conversions between the analog domain (raw ADC counts) and the musical domain (hertz, 1volt/octave voltages), and
//! the mapping from a small integer to the 3 bit indicator display.
//!
//! None of these functions quantize anything, they prepare inputs for the quantizer and interpret its outputs.

use core::fmt;

use crate::{
    error::{Error, Result},
    hardware::{AnalogChannel, AnalogSampler},
};

/// `sample_to_scale_index(s, m, n)` is raw sample `s` divided into one of `n` equal buckets.
///
/// Full scale lands in the last bucket, so the result is always in `[0, n)`. Samples above `m` count as `m`.
///
/// # Arguments
///
/// * `raw` - the raw ADC reading
///
/// * `adc_max` - the full scale ADC reading
///
/// * `num_positions` - how many buckets to divide the range into, zero buckets always gives zero
pub fn sample_to_scale_index(raw: u16, adc_max: u16, num_positions: u16) -> u16 {
    if num_positions == 0 {
        return 0;
    }
    let raw = raw.min(adc_max) as u32;
    // widen so that the multiply can't overflow, this is `raw / (adc_max / n)` without losing the fraction
    let index = raw * num_positions as u32 / (adc_max as u32).max(1);
    (index as u16).min(num_positions - 1)
}

/// `sample_to_ratio(s, m)` is raw sample `s` as a fraction of full scale `m`, in `[0.0, 1.0]`.
pub fn sample_to_ratio(raw: u16, adc_max: u16) -> Ratio {
    if adc_max == 0 {
        return Ratio(0.0);
    }
    Ratio(raw.min(adc_max) as f32 / adc_max as f32)
}

/// `sample_to_voltage(s, m, lo, hi)` is raw sample `s` mapped linearly onto the voltage span `[lo, hi]`.
pub fn sample_to_voltage(raw: u16, adc_max: u16, min_volts: f32, max_volts: f32) -> f32 {
    min_volts + sample_to_ratio(raw, adc_max).value() * (max_volts - min_volts)
}

/// `voltage_to_frequency(v, f)` is 1volt/octave voltage `v` as a frequency, where zero volts is `f` hertz.
pub fn voltage_to_frequency(volts: f32, base_frequency: f32) -> f32 {
    base_frequency * libm::exp2f(volts)
}

/// `frequency_to_voltage(f, b)` is frequency `f` as a 1volt/octave voltage, where `b` hertz is zero volts.
///
/// Non-positive frequencies have no pitch, the result is then negative infinity or NaN.
pub fn frequency_to_voltage(freq: f32, base_frequency: f32) -> f32 {
    libm::log2f(freq / base_frequency)
}

/// `voltage_to_duty(v, lo, hi, m)` is voltage `v` as a PWM duty in `[0, m]`, where zero duty is `lo` volts and full
/// duty is `hi` volts.
///
/// Voltages outside of `[lo, hi]` are clamped.
pub fn voltage_to_duty(volts: f32, min_volts: f32, max_volts: f32, adc_max: u16) -> u16 {
    let span = max_volts - min_volts;
    if !(0.0 < span) {
        return 0;
    }
    let fraction = ((volts - min_volts) / span).clamp(0.0, 1.0);
    // NaN survives the clamp, treat it as zero duty
    if fraction.is_nan() {
        return 0;
    }
    libm::roundf(fraction * adc_max as f32) as u16
}

/// `index_to_indicator_bits(i)` is the lowest three bits of `i`, one for each indicator.
pub fn index_to_indicator_bits(index: u16) -> IndicatorBits {
    IndicatorBits {
        bit0: index & 0b001 != 0,
        bit1: index & 0b010 != 0,
        bit2: index & 0b100 != 0,
    }
}

/// `read_sample(s, ch)` is a raw reading of channel `ch`, waiting for the conversion to finish if needed.
///
/// # Errors
///
/// * `SensorUnavailable` if the sampler reports a hardware failure, a failed read is never turned into a zero reading
pub fn read_sample<S: AnalogSampler>(sampler: &mut S, channel: AnalogChannel) -> Result<u16> {
    nb::block!(sampler.read_raw(channel)).map_err(|e| {
        log::warn!("{:?} read failed: {:?}", channel, e);
        Error::SensorUnavailable(channel)
    })
}

/// The three indicator outputs are represented here, `true` means the indicator is lit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndicatorBits {
    pub bit0: bool,
    pub bit1: bool,
    pub bit2: bool,
}

/// A normalized analog reading in `[0.0, 1.0]`.
///
/// Displays with two decimals, which is how it shows up on the diagnostic stream.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Ratio(f32);

impl Ratio {
    pub fn value(&self) -> f32 {
        self.0
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ADC_MAX;

    #[test]
    fn zero_is_the_first_scale_index() {
        assert_eq!(sample_to_scale_index(0, ADC_MAX, 8), 0);
    }

    #[test]
    fn full_scale_is_the_last_scale_index() {
        assert_eq!(sample_to_scale_index(ADC_MAX, ADC_MAX, 8), 7);
    }

    #[test]
    fn readings_above_adc_max_are_the_last_scale_index() {
        assert_eq!(sample_to_scale_index(u16::MAX, ADC_MAX, 8), 7);
    }

    #[test]
    fn scale_index_buckets_are_equal_width() {
        let bucket = ADC_MAX / 8;
        assert_eq!(sample_to_scale_index(bucket - 1, ADC_MAX, 8), 0);
        assert_eq!(sample_to_scale_index(bucket + 1, ADC_MAX, 8), 1);
        assert_eq!(sample_to_scale_index(ADC_MAX / 2, ADC_MAX, 8), 3);
        assert_eq!(sample_to_scale_index(ADC_MAX / 2 + 10, ADC_MAX, 8), 4);
    }

    #[test]
    fn zero_positions_is_always_zero() {
        assert_eq!(sample_to_scale_index(1234, ADC_MAX, 0), 0);
    }

    #[test]
    fn ratio_spans_zero_to_one() {
        assert_eq!(sample_to_ratio(0, ADC_MAX).value(), 0.0);
        assert_eq!(sample_to_ratio(ADC_MAX, ADC_MAX).value(), 1.0);
        assert_eq!(sample_to_ratio(u16::MAX, ADC_MAX).value(), 1.0);
    }

    #[test]
    fn ratio_displays_with_two_decimals() {
        assert_eq!(sample_to_ratio(27_105, ADC_MAX).to_string(), "0.42");
        assert_eq!(sample_to_ratio(ADC_MAX, ADC_MAX).to_string(), "1.00");
    }

    #[test]
    fn voltage_spans_the_input_range() {
        assert_eq!(sample_to_voltage(0, ADC_MAX, -5.0, 5.0), -5.0);
        assert_eq!(sample_to_voltage(ADC_MAX, ADC_MAX, -5.0, 5.0), 5.0);
    }

    #[test]
    fn one_volt_is_one_octave() {
        assert_eq!(voltage_to_frequency(0.0, 27.5), 27.5);
        assert_eq!(voltage_to_frequency(1.0, 27.5), 55.0);
        assert_eq!(voltage_to_frequency(-1.0, 440.0), 220.0);
        assert_eq!(frequency_to_voltage(110.0, 27.5), 2.0);
    }

    #[test]
    fn duty_clamps_to_the_output_range() {
        assert_eq!(voltage_to_duty(-5.0, -5.0, 5.0, ADC_MAX), 0);
        assert_eq!(voltage_to_duty(-9.0, -5.0, 5.0, ADC_MAX), 0);
        assert_eq!(voltage_to_duty(5.0, -5.0, 5.0, ADC_MAX), ADC_MAX);
        assert_eq!(voltage_to_duty(9.0, -5.0, 5.0, ADC_MAX), ADC_MAX);
        assert_eq!(voltage_to_duty(0.0, -5.0, 5.0, 1000), 500);
        assert_eq!(voltage_to_duty(f32::NAN, -5.0, 5.0, 1000), 0);
    }

    #[test]
    fn five_is_binary_101() {
        assert_eq!(
            index_to_indicator_bits(5),
            IndicatorBits {
                bit0: true,
                bit1: false,
                bit2: true
            }
        );
    }

    #[test]
    fn zero_lights_nothing() {
        assert_eq!(index_to_indicator_bits(0), IndicatorBits::default());
    }

    #[test]
    fn only_the_lowest_three_bits_are_shown() {
        assert_eq!(index_to_indicator_bits(8), IndicatorBits::default());
        assert_eq!(index_to_indicator_bits(15), index_to_indicator_bits(7));
    }

    struct BusySampler {
        busy_reads: u8,
        reading: u16,
    }

    impl AnalogSampler for BusySampler {
        type Error = ();

        fn read_raw(&mut self, _channel: AnalogChannel) -> nb::Result<u16, ()> {
            if 0 < self.busy_reads {
                self.busy_reads -= 1;
                return Err(nb::Error::WouldBlock);
            }
            Ok(self.reading)
        }
    }

    struct BrokenSampler;

    impl AnalogSampler for BrokenSampler {
        type Error = ();

        fn read_raw(&mut self, _channel: AnalogChannel) -> nb::Result<u16, ()> {
            Err(nb::Error::Other(()))
        }
    }

    #[test]
    fn read_sample_waits_out_busy_conversions() {
        let mut sampler = BusySampler {
            busy_reads: 3,
            reading: 4242,
        };
        assert_eq!(read_sample(&mut sampler, AnalogChannel::OscPitch), Ok(4242));
    }

    #[test]
    fn failed_reads_are_sensor_unavailable() {
        assert_eq!(
            read_sample(&mut BrokenSampler, AnalogChannel::ControlPot),
            Err(Error::SensorUnavailable(AnalogChannel::ControlPot))
        );
    }
}
