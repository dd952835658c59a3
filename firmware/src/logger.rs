use cortex_m_semihosting::hprintln;
use log::{LevelFilter, Log, Metadata, Record};

/// Log records are forwarded to the debugger over semihosting.
struct SemihostingLogger;

static LOGGER: SemihostingLogger = SemihostingLogger;

impl Log for SemihostingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            hprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// `init(lvl)` installs the semihosting logger, showing records at `lvl` and above.
pub fn init(level: LevelFilter) {
    // the M0+ has no compare-and-swap, and this runs once before anything else logs
    unsafe { log::set_logger_racy(&LOGGER) }.ok();
    log::set_max_level(level);
}
