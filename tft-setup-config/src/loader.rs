//! Setup loading
//!
//! Loads the display setup from the TOML file embedded at build time.
//! `build.rs` has already checked it against the same line syntax the
//! parser uses; this parses it into a [`DisplayConfiguration`] and runs the
//! pin and geometry checks.

#[cfg(feature = "defmt")]
use defmt::{debug, info, warn};

use tft_setup_core::config::{user_setup, DisplayConfiguration, SetupError};

use super::toml::{parse_config, ParseError};

/// Setup file embedded into the crate
pub const EMBEDDED_SETUP: &str = include_str!("../user_setup.toml");

/// Setup loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML parsing failed
    TomlParse(ParseError),
    /// Values parsed but failed validation
    Invalid(SetupError),
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::TomlParse(e)
    }
}

impl From<SetupError> for ConfigError {
    fn from(e: SetupError) -> Self {
        ConfigError::Invalid(e)
    }
}

/// Load the embedded setup file
pub fn load_embedded() -> Result<DisplayConfiguration, ConfigError> {
    load(EMBEDDED_SETUP)
}

/// Parse and validate a TOML setup
pub fn load(input: &str) -> Result<DisplayConfiguration, ConfigError> {
    #[cfg(feature = "defmt")]
    info!("Loading display setup...");

    let config = parse_config(input)?;
    config.validate()?;

    log_setup_summary(&config);
    Ok(config)
}

/// Load a TOML setup, falling back to the board manifest
///
/// Returns the parsed setup, or [`user_setup`] if the input does not parse
/// or fails validation.
pub fn load_or_default(input: &str) -> DisplayConfiguration {
    match load(input) {
        Ok(config) => config,
        Err(_e) => {
            #[cfg(feature = "defmt")]
            warn!("Failed to load display setup: {:?}, using board defaults", _e);
            user_setup()
        }
    }
}

/// Log a summary of the loaded setup
fn log_setup_summary(_config: &DisplayConfiguration) {
    #[cfg(feature = "defmt")]
    {
        let config = _config;
        let (width, height) = config.logical_size();
        info!("Display setup '{}' loaded", config.info());
        debug!("  driver {}", config.driver().define());
        debug!("  {}x{} rotation {}", width, height, config.rotation().index());
        debug!("  {} font sets, smooth {}", config.fonts().len(), config.smooth_font());
        debug!("  backlight on {}", config.backlight_on().define());
    }
}
