//! The hardware collaborators of the quantizer are represented here as traits.
//!
//! Nothing in the numeric core touches a peripheral directly. The firmware board implements these traits on top of
//! the MCU HAL, and tests implement them in memory.

use embedded_hal::digital::v2::OutputPin;

use crate::signal::IndicatorBits;

/// The analog inputs that get sampled each control cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalogChannel {
    /// The front panel pot that selects the scale
    ControlPot,
    /// The pitch CV to be quantized
    OscPitch,
}

/// Something that can take raw readings from the analog inputs.
pub trait AnalogSampler {
    type Error: core::fmt::Debug;

    /// `s.read_raw(ch)` is a raw reading of channel `ch`, nominally in `[0, ADC_MAX]`.
    ///
    /// `WouldBlock` means the conversion is not finished yet and the read should be retried.
    fn read_raw(&mut self, channel: AnalogChannel) -> nb::Result<u16, Self::Error>;
}

/// The 3 bit indicator display.
pub trait IndicatorOutput {
    fn set_indicators(&mut self, bits: IndicatorBits);
}

/// The pulse width output, filtered externally into a control voltage.
pub trait PulseWidthOutput {
    /// `p.set_duty(d)` sets the duty cycle, `d` is in `[0, ADC_MAX]`
    fn set_duty(&mut self, duty: u16);
}

/// The write-only stream for human readable status lines.
pub trait DiagnosticSink {
    fn report(&mut self, line: &str);
}

/// The clock that paces the control cycles.
pub trait Ticker {
    /// `t.wait_tick()` returns once the next control cycle is due.
    fn wait_tick(&mut self);
}

/// Three digital output pins driving the indicator LEDs are represented here.
///
/// `bit0` drives the first pin, `bit2` the last.
pub struct IndicatorPins<P0, P1, P2> {
    pin_0: P0,
    pin_1: P1,
    pin_2: P2,
}

impl<P0, P1, P2> IndicatorPins<P0, P1, P2>
where
    P0: OutputPin,
    P1: OutputPin,
    P2: OutputPin,
{
    /// `IndicatorPins::new(p0, p1, p2)` is a new indicator display on the given pins.
    pub fn new(pin_0: P0, pin_1: P1, pin_2: P2) -> Self {
        Self {
            pin_0,
            pin_1,
            pin_2,
        }
    }

    /// `ip.release()` gives the pins back.
    pub fn release(self) -> (P0, P1, P2) {
        (self.pin_0, self.pin_1, self.pin_2)
    }
}

impl<P0, P1, P2> IndicatorOutput for IndicatorPins<P0, P1, P2>
where
    P0: OutputPin,
    P1: OutputPin,
    P2: OutputPin,
{
    fn set_indicators(&mut self, bits: IndicatorBits) {
        // LED writes can't meaningfully fail, and there is nothing to do about it if they do
        set_pin(&mut self.pin_0, bits.bit0).ok();
        set_pin(&mut self.pin_1, bits.bit1).ok();
        set_pin(&mut self.pin_2, bits.bit2).ok();
    }
}

fn set_pin<P: OutputPin>(pin: &mut P, val: bool) -> Result<(), P::Error> {
    match val {
        true => pin.set_high(),
        false => pin.set_low(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct FakePin {
        high: bool,
    }

    impl OutputPin for FakePin {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    #[test]
    fn indicator_pins_follow_the_bits() {
        let mut pins = IndicatorPins::new(FakePin::default(), FakePin::default(), FakePin::default());

        pins.set_indicators(IndicatorBits {
            bit0: true,
            bit1: false,
            bit2: true,
        });
        let (p0, p1, p2) = pins.release();
        assert!(p0.high);
        assert!(!p1.high);
        assert!(p2.high);
    }

    #[test]
    fn indicator_pins_turn_off_again() {
        let mut pins = IndicatorPins::new(FakePin::default(), FakePin::default(), FakePin::default());

        pins.set_indicators(IndicatorBits {
            bit0: true,
            bit1: true,
            bit2: true,
        });
        pins.set_indicators(IndicatorBits::default());
        let (p0, p1, p2) = pins.release();
        assert!(!p0.high && !p1.high && !p2.high);
    }
}
