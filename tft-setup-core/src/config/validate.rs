//! Setup validation
//!
//! Checks a graphics library applies before driving the panel: every pin
//! must be a usable ESP32 output, no two roles may share a pin, and the
//! geometry and bus clock must be sane.

use super::setup::{is_valid_info, DisplayConfiguration};

/// Highest GPIO number on the ESP32
pub const MAX_GPIO: u8 = 39;

/// GPIOs 34-39 have no output driver
pub const INPUT_ONLY_PINS: core::ops::RangeInclusive<u8> = 34..=39;

/// GPIOs 6-11 are wired to the SPI flash
pub const FLASH_PINS: core::ops::RangeInclusive<u8> = 6..=11;

/// Fastest SPI clock the panel controllers accept
pub const MAX_SPI_FREQUENCY: u32 = 80_000_000;

/// Validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupError {
    /// Pin number above [`MAX_GPIO`]
    InvalidPin(u8),
    /// Input-only pin used as an output
    InputOnlyPin(u8),
    /// Pin reserved for the SPI flash
    FlashPin(u8),
    /// Pin assigned to more than one role
    DuplicatePin(u8),
    /// Width or height is zero
    ZeroDimension,
    /// SPI frequency is zero or above [`MAX_SPI_FREQUENCY`]
    InvalidFrequency,
    /// Setup name cannot be written as a quoted literal
    InvalidInfo,
}

/// Check a configuration, reporting the first problem found
pub fn validate(config: &DisplayConfiguration) -> Result<(), SetupError> {
    let mut used = [false; MAX_GPIO as usize + 1];

    let pins = config
        .pins
        .assigned()
        .map(|(_, pin)| pin)
        .chain(config.backlight_pin);

    for pin in pins {
        check_output_pin(pin)?;
        let slot = &mut used[pin as usize];
        if *slot {
            return Err(SetupError::DuplicatePin(pin));
        }
        *slot = true;
    }

    if config.resolution.width == 0 || config.resolution.height == 0 {
        return Err(SetupError::ZeroDimension);
    }

    if let Some(freq) = config.spi_frequency {
        if freq == 0 || freq > MAX_SPI_FREQUENCY {
            return Err(SetupError::InvalidFrequency);
        }
    }

    if !is_valid_info(&config.info) {
        return Err(SetupError::InvalidInfo);
    }

    Ok(())
}

/// Check that a pin can be driven as an output
pub fn check_output_pin(pin: u8) -> Result<(), SetupError> {
    if pin > MAX_GPIO {
        Err(SetupError::InvalidPin(pin))
    } else if INPUT_ONLY_PINS.contains(&pin) {
        Err(SetupError::InputOnlyPin(pin))
    } else if FLASH_PINS.contains(&pin) {
        Err(SetupError::FlashPin(pin))
    } else {
        Ok(())
    }
}

impl DisplayConfiguration {
    /// Validate this configuration
    pub fn validate(&self) -> Result<(), SetupError> {
        validate(self)
    }
}
