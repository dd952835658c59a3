//! # CV quantizer
//!
//! Pitch quantization for a control voltage synthesizer module. A raw analog pitch reading is converted to a
//! frequency, snapped onto a ten octave equal tempered scale, and filtered through a user selected musical mode.
//!
//! The crate is hardware agnostic, the board is reached only through the traits in [`hardware`].

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod cv_quantizer;
pub mod error;
pub mod hardware;
pub mod quantizer;
pub mod scale;
pub mod signal;
pub mod tables;

pub use crate::{
    config::Config,
    cv_quantizer::{CvQuantizer, CycleReport, Note},
    error::{Error, Result},
};
