//! # CV quantizer
//!
//! The control-rate cycle: read the pot and the pitch CV, snap the pitch onto the selected scale, then drive the
//! indicators, the PWM output, and the diagnostic stream.
//!
//! Cycles share nothing but the immutable tables, so each one can be run, repeated, or reordered in isolation.

use core::fmt::Write;

use heapless::String;

use crate::{
    config::Config,
    error::Result,
    hardware::{
        AnalogChannel, AnalogSampler, DiagnosticSink, IndicatorOutput, PulseWidthOutput, Ticker,
    },
    scale::{Mode, ScaleMask},
    signal::{self, IndicatorBits, Ratio},
    tables::ScaleTables,
};

/// Longest diagnostic line the quantizer writes.
const DIAGNOSTIC_LINE_LEN: usize = 64;

/// The quantizer context is represented here.
///
/// It owns the configuration, the two reference tables, and the board that connects it to the outside world.
pub struct CvQuantizer<B> {
    config: Config,
    tables: ScaleTables,
    board: B,
}

/// A quantized note is represented here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    /// Index of the note in the pitch table, i.e. semitones above the base frequency
    pub index: usize,
    /// The note frequency in hertz, straight from the pitch table
    pub frequency: f32,
    /// The matching 1volt/octave control voltage, straight from the voltage table
    pub voltage: f32,
}

/// The outcome of a single control cycle is represented here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleReport {
    /// The scale selected with the control pot
    pub mode: Mode,
    /// What the indicator display shows, the pot position in binary
    pub indicators: IndicatorBits,
    /// The pitch CV reading as a fraction of full scale
    pub osc: Ratio,
    /// The unquantized pitch CV reading as a frequency
    pub candidate_frequency: f32,
    /// The quantized note, `None` if no note of the scale could be found at or below the input
    pub note: Option<Note>,
}

impl<B> CvQuantizer<B> {
    /// `CvQuantizer::new(cfg, board)` is a new quantizer with freshly built tables.
    ///
    /// # Arguments
    ///
    /// * `config` - the configuration, it is validated before anything is built
    ///
    /// * `board` - the hardware the quantizer reads from and writes to
    pub fn new(config: Config, board: B) -> Result<Self> {
        config.validate()?;
        let tables = ScaleTables::build(&config)?;

        log::info!(
            "built {} pitches from {} Hz and {} voltages from {} V",
            tables.pitch().len(),
            tables.pitch().first(),
            tables.voltage().len(),
            tables.voltage().first()
        );

        Ok(Self {
            config,
            tables,
            board,
        })
    }

    /// `q.process(pot, osc)` is the result of one control cycle for the raw readings `pot` and `osc`.
    ///
    /// This is the whole numeric pipeline with no hardware involved.
    ///
    /// # Arguments
    ///
    /// * `pot_raw` - raw reading of the scale select pot
    ///
    /// * `osc_raw` - raw reading of the pitch CV input
    pub fn process(&self, pot_raw: u16, osc_raw: u16) -> CycleReport {
        let cfg = &self.config;

        let position = signal::sample_to_scale_index(pot_raw, cfg.adc_max, cfg.indicator_positions);
        let mode = Mode::from_index(position);
        let mask = cfg
            .custom_scale
            .unwrap_or_else(|| ScaleMask::for_mode(mode, cfg.root));

        let osc = signal::sample_to_ratio(osc_raw, cfg.adc_max);
        let volts = signal::sample_to_voltage(
            osc_raw,
            cfg.adc_max,
            cfg.input_min_volts,
            cfg.input_max_volts,
        );
        // the bottom of the input span plays the base frequency
        let candidate_frequency =
            signal::voltage_to_frequency(volts - cfg.input_min_volts, cfg.base_frequency);

        let chromatic = self.tables.pitch().quantize(candidate_frequency);

        let note = mask.floor_to_allowed(chromatic.index).and_then(|index| {
            Some(Note {
                index,
                frequency: self.tables.pitch().get(index)?,
                voltage: self.tables.voltage_for_semitone(index),
            })
        });

        CycleReport {
            mode,
            indicators: signal::index_to_indicator_bits(position),
            osc,
            candidate_frequency,
            note,
        }
    }

    /// `q.tables()` is the pitch and voltage tables.
    pub fn tables(&self) -> &ScaleTables {
        &self.tables
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// `q.release()` gives the board back.
    pub fn release(self) -> B {
        self.board
    }
}

impl<B> CvQuantizer<B>
where
    B: AnalogSampler + IndicatorOutput + PulseWidthOutput + DiagnosticSink,
{
    /// `q.tick()` runs one control cycle against the board.
    ///
    /// When the input can't be placed in the scale the PWM output is left alone, so it keeps playing the last note.
    ///
    /// # Errors
    ///
    /// * `SensorUnavailable` if either analog read fails, nothing is written to the outputs in that case
    pub fn tick(&mut self) -> Result<CycleReport> {
        let pot_raw = signal::read_sample(&mut self.board, AnalogChannel::ControlPot)?;
        let osc_raw = signal::read_sample(&mut self.board, AnalogChannel::OscPitch)?;

        let report = self.process(pot_raw, osc_raw);

        self.board.set_indicators(report.indicators);

        let mut line: String<DIAGNOSTIC_LINE_LEN> = String::new();
        // the line is sized for the longest message, a truncated line is still worth sending
        write!(line, "Osc: {}", report.osc).ok();
        self.board.report(&line);

        match report.note {
            Some(note) => {
                let cfg = &self.config;
                let duty = signal::voltage_to_duty(
                    note.voltage,
                    cfg.output_min_volts,
                    cfg.output_max_volts,
                    cfg.adc_max,
                );
                self.board.set_duty(duty);

                line.clear();
                write!(
                    line,
                    "Note: idx {} {:.1}Hz {:.4}V",
                    note.index, note.frequency, note.voltage
                )
                .ok();
                self.board.report(&line);

                log::debug!(
                    "{:?}: {} Hz -> idx {} duty {}",
                    report.mode,
                    report.candidate_frequency,
                    note.index,
                    duty
                );
            }
            None => {
                log::warn!(
                    "no {:?} note at or below {} Hz, holding output",
                    report.mode,
                    report.candidate_frequency
                );
            }
        }

        Ok(report)
    }

    /// `q.run(t)` runs control cycles paced by ticker `t` until the configured cycle limit is reached.
    ///
    /// Each cycle waits for a tick first. With no cycle limit this never returns unless a cycle fails.
    ///
    /// # Returns
    ///
    /// * the number of cycles that were run
    pub fn run<T: Ticker>(&mut self, ticker: &mut T) -> Result<u32> {
        let mut cycles = 0;

        while self.config.cycle_limit.map_or(true, |limit| cycles < limit) {
            ticker.wait_tick();
            self.tick()?;
            cycles += 1;
        }

        log::info!("finished after {} cycles", cycles);
        Ok(cycles)
    }
}
