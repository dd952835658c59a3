use thiserror::Error;

use crate::hardware::AnalogChannel;

/// Result type used throughout the quantizer.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while building tables, quantizing, or running the control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A lookup table with no entries was handed to the quantizer.
    #[error("scale table is empty")]
    EmptyTable,

    /// A lookup table was not strictly ascending.
    #[error("scale table is not strictly ascending at index {index}")]
    NotAscending {
        /// Index of the first entry that is not greater than its predecessor.
        index: usize,
    },

    /// A table would not fit in the fixed capacity storage.
    #[error("scale table needs {len} entries but holds at most {capacity}")]
    CapacityExceeded { len: usize, capacity: usize },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// The analog sampler reported a hardware failure.
    #[error("sensor unavailable on the {0:?} input")]
    SensorUnavailable(AnalogChannel),
}
