//! Build-time display setup for an SPI TFT panel
//!
//! This crate holds the display configuration an external graphics library
//! reads while it is being built:
//!
//! - Configuration types (driver, SPI pins, geometry, fonts, backlight)
//! - The board manifest ([`config::user_setup`])
//! - Validation of pin assignments and geometry
//! - Header representation with the library's macro names
//! - Binary representation for storage
//! - Backlight control honouring the active level

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod backlight;
pub mod codec;
pub mod config;
pub mod header;

pub use config::{user_setup, DisplayConfiguration};
