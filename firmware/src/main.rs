// cargo flash --chip stm32l031f4px --release

#![no_std]
#![no_main]

mod board;
mod logger;

use cv_quantizer::{Config, CvQuantizer};

use crate::board::Board;

use panic_halt as _;

use cortex_m_rt::entry;

/// Quantize the pitch CV input to the scale selected with the pot.
///
/// Each cycle reads the pot and the pitch CV, shows the selected scale on the LEDs and writes the quantized CV via
/// the PWM output. After the configured number of cycles the MCU goes to sleep.
#[entry]
fn main() -> ! {
    logger::init(log::LevelFilter::Info);

    let config = Config::default();
    let (board, mut cycle_timer) = Board::init(&config);

    match CvQuantizer::new(config, board) {
        Ok(mut quantizer) => {
            if let Err(e) = quantizer.run(&mut cycle_timer) {
                log::error!("control loop stopped: {}", e);
            }
        }
        Err(e) => log::error!("can't start the quantizer: {}", e),
    }

    loop {
        cortex_m::asm::wfi();
    }
}
