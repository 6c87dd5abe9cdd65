//! Display setup files
//!
//! Reads and writes the TOML form of a display setup and loads the board's
//! setup file, which `build.rs` validates whenever it changes.
//!
//! - [`toml`]: `no_std` TOML subset parser and writer
//! - [`syntax`]: line syntax of the subset, shared with `build.rs`
//! - [`loader`]: embedded setup loading with validation
//! - [`render_header`]: preprocessor header for the graphics library

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod loader;
pub mod syntax;
pub mod toml;

use alloc::string::String;
use core::fmt;

use tft_setup_core::header::write_header;
use tft_setup_core::DisplayConfiguration;

pub use loader::{load, load_embedded, load_or_default, ConfigError, EMBEDDED_SETUP};
pub use toml::{parse_config, to_toml, ParseError};

/// Render a configuration as the graphics library's setup header
///
/// Fails if the setup name cannot be written as a header literal.
pub fn render_header(config: &DisplayConfiguration) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_header(config, &mut out)?;
    Ok(out)
}
