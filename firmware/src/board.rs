use cv_quantizer::{
    config::{Config, ADC_MAX},
    hardware::{
        AnalogChannel, AnalogSampler, DiagnosticSink, IndicatorOutput, IndicatorPins,
        PulseWidthOutput, Ticker,
    },
    signal::IndicatorBits,
};

use cortex_m_semihosting::hprintln;

use stm32l0xx_hal::{
    adc::{Adc, Ready},
    gpio::{
        gpioa::{PA0, PA1, PA4, PA5, PA6, PA7},
        Analog, Output, PushPull,
    },
    pac::{Peripherals, TIM2, TIM21},
    prelude::*,
    pwm::{Assigned, Pwm, Timer, C2},
    rcc::Config as RccConfig,
    timer::{Timer as CountdownTimer, TimerExt},
};

/// The physical board hardware structure is represented here.
///
/// The board consists of digital and analog peripherals.
pub struct Board {
    /// The analog to digital converter
    adc: Adc<Ready>,

    /// The scale select pot
    pot_pin: PA0<Analog>,

    /// The pitch CV input
    osc_pin: PA4<Analog>,

    /// PWM output, filtered externally into the quantized CV
    pwm: Pwm<TIM2, C2, Assigned<PA1<Analog>>>,

    /// The 3 bit indicator LEDs
    leds: IndicatorPins<PA5<Output<PushPull>>, PA6<Output<PushPull>>, PA7<Output<PushPull>>>,
}

/// Hardware timer that paces the control cycles.
pub struct CycleTimer {
    timer: CountdownTimer<TIM21>,
}

impl Board {
    /// `Board::init(cfg)` is the board with all peripherals initialized, along with the cycle timer.
    pub fn init(config: &Config) -> (Self, CycleTimer) {
        let dp = Peripherals::take().unwrap();

        // use internal HSI oscillator as clock
        let mut rcc = dp.RCC.freeze(RccConfig::hsi16());

        let gpioa = dp.GPIOA.split(&mut rcc);

        let leds = IndicatorPins::new(
            gpioa.pa5.into_push_pull_output(),
            gpioa.pa6.into_push_pull_output(),
            gpioa.pa7.into_push_pull_output(),
        );

        let adc = dp.ADC.constrain(&mut rcc);
        let pot_pin = gpioa.pa0.into_analog();
        let osc_pin = gpioa.pa4.into_analog();

        let pwm = Timer::new(dp.TIM2, config.pwm_frequency_hz.Hz(), &mut rcc);
        let mut pwm = pwm.channel2.assign(gpioa.pa1);
        pwm.enable();

        let cycle_hz = 1_000_000 / config.cycle_period_us.max(1);
        let timer = dp.TIM21.timer(cycle_hz.Hz(), &mut rcc);

        let mut board = Self {
            adc,
            pot_pin,
            osc_pin,
            pwm,
            leds,
        };
        board.set_duty(config.initial_duty);

        (board, CycleTimer { timer })
    }
}

impl AnalogSampler for Board {
    type Error = ();

    fn read_raw(&mut self, channel: AnalogChannel) -> nb::Result<u16, ()> {
        let reading: nb::Result<u16, _> = match channel {
            AnalogChannel::ControlPot => self.adc.read(&mut self.pot_pin),
            AnalogChannel::OscPitch => self.adc.read(&mut self.osc_pin),
        };
        reading.map_err(|e| e.map(drop))
    }
}

impl IndicatorOutput for Board {
    fn set_indicators(&mut self, bits: IndicatorBits) {
        self.leds.set_indicators(bits);
    }
}

impl PulseWidthOutput for Board {
    /// `board.set_duty(d)` sets the PWM duty, `d` in `[0, ADC_MAX]` is scaled to the timer resolution.
    fn set_duty(&mut self, duty: u16) {
        let max_duty = self.pwm.get_max_duty() as u32;
        let scaled = duty.min(ADC_MAX) as u32 * max_duty / ADC_MAX as u32;
        self.pwm.set_duty(scaled as u16);
    }
}

impl DiagnosticSink for Board {
    fn report(&mut self, line: &str) {
        hprintln!("{}", line);
    }
}

impl Ticker for CycleTimer {
    fn wait_tick(&mut self) {
        nb::block!(self.timer.wait()).ok();
    }
}
