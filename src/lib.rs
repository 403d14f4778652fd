//! A driver for the ZMPT101B AC voltage sensor.
//!
//! The sensor outputs the mains waveform, scaled down and centered
//! around a DC offset. [`Zmpt101b`] samples it with any `embedded-hal`
//! ADC for one AC period to find that offset (the zero point), then for
//! another period to integrate the squared deviations from it, giving
//! the RMS voltage.
//!
//! Readings that look like a floating input, a quiet line or noise are
//! reported as distinct [`Error`] variants.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

mod clock;
mod config;
mod window;
mod zmpt101b;

pub use crate::clock::Clock;
pub use crate::config::{Config, ConfigError};
pub use crate::zmpt101b::{Error, Zmpt101b};
