//! Simple TOML parser and writer for display setup files
//!
//! This is a minimal TOML parser that handles only the subset needed for a
//! display setup. It does NOT support the full TOML spec; the accepted line
//! syntax is defined in [`crate::syntax`] and anything outside it is an
//! error rather than being read differently.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Single-line arrays of strings: load = ["glcd", "font2"]
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings or arrays
//! - Literal ('...') strings and escape sequences
//! - Inline tables
//! - Dotted keys

use alloc::string::String;
use core::fmt::{self, Write};

use heapless::String as HString;

use tft_setup_core::config::{
    is_valid_info, BacklightLevel, DisplayConfiguration, DriverKind, Font, FontSet, Resolution,
    Rotation, SpiPins,
};

use crate::syntax::{parse_line, Line, SyntaxError};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Invalid value type or unknown name
    InvalidValue,
    /// Invalid pin value
    InvalidPin,
    /// Required key missing
    MissingValue(&'static str),
    /// Line is neither a section header nor `key = value`
    InvalidSyntax,
}

impl From<SyntaxError> for ParseError {
    fn from(e: SyntaxError) -> Self {
        match e {
            SyntaxError::UnknownSection => ParseError::InvalidSection,
            SyntaxError::Malformed => ParseError::InvalidSyntax,
            SyntaxError::UnsupportedValue => ParseError::InvalidValue,
        }
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Setup,
    Pins,
    Display,
    Fonts,
    Backlight,
}

/// Values read so far; required ones stay `None` until seen
#[derive(Default)]
struct Partial {
    info: HString<{ tft_setup_core::config::MAX_INFO_LEN }>,
    driver: Option<DriverKind>,
    mosi: Option<u8>,
    sclk: Option<u8>,
    cs: Option<u8>,
    dc: Option<u8>,
    rst: Option<u8>,
    width: Option<u16>,
    height: Option<u16>,
    rotation: Rotation,
    spi_frequency: Option<u32>,
    fonts: FontSet,
    smooth_font: bool,
    backlight_on: BacklightLevel,
    backlight_pin: Option<u8>,
}

impl Partial {
    fn finish(self) -> Result<DisplayConfiguration, ParseError> {
        let pins = SpiPins {
            mosi: self.mosi.ok_or(ParseError::MissingValue("pins.mosi"))?,
            sclk: self.sclk.ok_or(ParseError::MissingValue("pins.sclk"))?,
            cs: self.cs,
            dc: self.dc.ok_or(ParseError::MissingValue("pins.dc"))?,
            rst: self.rst,
        };

        Ok(DisplayConfiguration {
            info: self.info,
            driver: self.driver.ok_or(ParseError::MissingValue("setup.driver"))?,
            pins,
            resolution: Resolution::new(
                self.width.ok_or(ParseError::MissingValue("display.width"))?,
                self.height.ok_or(ParseError::MissingValue("display.height"))?,
            ),
            rotation: self.rotation,
            fonts: self.fonts,
            smooth_font: self.smooth_font,
            backlight_on: self.backlight_on,
            backlight_pin: self.backlight_pin,
            spi_frequency: self.spi_frequency,
        })
    }
}

/// Parse a TOML setup file into a DisplayConfiguration
///
/// `cs`, `rst`, `rotation`, `[fonts]` and `[backlight]` are optional and
/// fall back to the graphics library defaults.
pub fn parse_config(input: &str) -> Result<DisplayConfiguration, ParseError> {
    let mut partial = Partial::default();
    let mut section = Section::Root;

    for line in input.lines() {
        match parse_line(line)? {
            Line::Blank => {}
            Line::Section(name) => section = parse_section_header(name)?,
            Line::KeyValue(key, value) => apply_value(section, key, value, &mut partial)?,
        }
    }

    partial.finish()
}

/// Parse section header like "pins" or "display"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "setup" => Ok(Section::Setup),
        "pins" => Ok(Section::Pins),
        "display" => Ok(Section::Display),
        "fonts" => Ok(Section::Fonts),
        "backlight" => Ok(Section::Backlight),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

/// Parse a value that must be a quoted string
fn parse_quoted(value: &str) -> Result<&str, ParseError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a pin like `23`, `"gpio23"` or `-1` (not connected)
fn parse_pin(value: &str) -> Result<Option<u8>, ParseError> {
    let value = parse_string(value)?;
    if value == "-1" {
        return Ok(None);
    }

    let digits = value.strip_prefix("gpio").unwrap_or(value);
    digits.parse().map(Some).map_err(|_| ParseError::InvalidPin)
}

/// Parse a pin that must be connected
fn parse_required_pin(value: &str) -> Result<u8, ParseError> {
    parse_pin(value)?.ok_or(ParseError::InvalidPin)
}

/// Parse a font list like ["glcd", "font2"]
fn parse_fonts(value: &str) -> Result<FontSet, ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut fonts = FontSet::empty();
    for item in inner.split(',') {
        let item = item.trim();
        // Trailing comma
        if item.is_empty() {
            continue;
        }
        let name = parse_string(item)?;
        fonts.insert(Font::from_name(name).ok_or(ParseError::InvalidValue)?);
    }

    Ok(fonts)
}

/// Apply a parsed value to the appropriate field
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    p: &mut Partial,
) -> Result<(), ParseError> {
    match section {
        Section::Setup => match key {
            "info" => {
                let info = parse_quoted(value)?;
                if !is_valid_info(info) {
                    return Err(ParseError::InvalidValue);
                }
                p.info = HString::try_from(info).map_err(|_| ParseError::InvalidValue)?;
            }
            "driver" => {
                let name = parse_quoted(value)?;
                p.driver = Some(DriverKind::from_name(name).ok_or(ParseError::InvalidValue)?);
            }
            _ => {} // Ignore unknown keys
        },
        Section::Pins => match key {
            "mosi" => p.mosi = Some(parse_required_pin(value)?),
            "sclk" => p.sclk = Some(parse_required_pin(value)?),
            "cs" => p.cs = parse_pin(value)?,
            "dc" => p.dc = Some(parse_required_pin(value)?),
            "rst" => p.rst = parse_pin(value)?,
            _ => {}
        },
        Section::Display => match key {
            "width" => p.width = Some(parse_int(value)?),
            "height" => p.height = Some(parse_int(value)?),
            "rotation" => {
                p.rotation = Rotation::from_index(parse_int(value)?).ok_or(ParseError::InvalidValue)?
            }
            "spi_frequency" => p.spi_frequency = Some(parse_int(value)?),
            _ => {}
        },
        Section::Fonts => match key {
            "load" => p.fonts = parse_fonts(value)?,
            "smooth" => p.smooth_font = parse_bool(value)?,
            _ => {}
        },
        Section::Backlight => match key {
            "on" => {
                let level = parse_string(value)?;
                p.backlight_on =
                    BacklightLevel::from_define(level).ok_or(ParseError::InvalidValue)?;
            }
            "pin" => p.backlight_pin = parse_pin(value)?,
            _ => {}
        },
        Section::Root => {
            // No root-level keys
        }
    }

    Ok(())
}

/// Write a configuration as a TOML setup file
///
/// Fails with [`fmt::Error`] before writing anything if the setup name
/// cannot be written as a plain quoted string.
pub fn write_config<W: Write>(config: &DisplayConfiguration, out: &mut W) -> fmt::Result {
    if !is_valid_info(&config.info) {
        return Err(fmt::Error);
    }

    writeln!(out, "[setup]")?;
    writeln!(out, "info = \"{}\"", config.info)?;
    writeln!(out, "driver = \"{}\"", config.driver.name())?;
    writeln!(out)?;

    let pins = &config.pins;
    writeln!(out, "[pins]")?;
    writeln!(out, "mosi = {}", pins.mosi)?;
    writeln!(out, "sclk = {}", pins.sclk)?;
    write_optional_pin(out, "cs", pins.cs)?;
    writeln!(out, "dc = {}", pins.dc)?;
    write_optional_pin(out, "rst", pins.rst)?;
    writeln!(out)?;

    writeln!(out, "[display]")?;
    writeln!(out, "width = {}", config.resolution.width)?;
    writeln!(out, "height = {}", config.resolution.height)?;
    writeln!(out, "rotation = {}", config.rotation.index())?;
    if let Some(freq) = config.spi_frequency {
        writeln!(out, "spi_frequency = {}", freq)?;
    }
    writeln!(out)?;

    writeln!(out, "[fonts]")?;
    write!(out, "load = [")?;
    for (i, font) in config.fonts.iter().enumerate() {
        if i > 0 {
            write!(out, ", ")?;
        }
        write!(out, "\"{}\"", font.name())?;
    }
    writeln!(out, "]")?;
    writeln!(out, "smooth = {}", config.smooth_font)?;
    writeln!(out)?;

    writeln!(out, "[backlight]")?;
    let level = match config.backlight_on {
        BacklightLevel::High => "high",
        BacklightLevel::Low => "low",
    };
    writeln!(out, "on = \"{}\"", level)?;
    if let Some(pin) = config.backlight_pin {
        writeln!(out, "pin = {}", pin)?;
    }

    Ok(())
}

fn write_optional_pin<W: Write>(out: &mut W, key: &str, pin: Option<u8>) -> fmt::Result {
    match pin {
        Some(pin) => writeln!(out, "{} = {}", key, pin),
        None => writeln!(out, "{} = -1", key),
    }
}

/// Render a configuration as a TOML setup file
pub fn to_toml(config: &DisplayConfiguration) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_config(config, &mut out)?;
    Ok(out)
}
