//! Preprocessor header representation
//!
//! The graphics library is configured through `#define` macros in a user
//! setup header. [`write_header`] renders a [`DisplayConfiguration`] with
//! the exact macro names the library branches on; [`parse_header`] reads
//! such a header back.
//!
//! ```text
//! #define USER_SETUP_INFO "User_Setup"
//! #define ST7789_DRIVER
//! #define TFT_MOSI 23
//! ...
//! #define LOAD_GLCD   // Font 1. Original Adafruit 8 pixel font
//! #define SMOOTH_FONT
//! #define TFT_ROTATION 1
//! #define TFT_BACKLIGHT_ON HIGH
//! ```
//!
//! Flag macros are present only when enabled. Unconnected `TFT_CS` and
//! `TFT_RST` are written as `-1`. Macros the parser does not know are
//! skipped, as are conditionals and comments.
//!
//! The setup name is written unescaped, so [`write_header`] refuses names
//! rejected by [`is_valid_info`] and [`parse_header`] refuses to read them.

use core::fmt::{self, Write};

use heapless::String;

use crate::config::{
    is_valid_info, BacklightLevel, DisplayConfiguration, DriverKind, Font, FontSet, Resolution,
    Rotation, SpiPins,
};

/// Value written for an unconnected pin
pub const PIN_UNUSED: i16 = -1;

/// Header parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderError {
    /// No `<NAME>_DRIVER` macro
    MissingDriver,
    /// More than one driver selected
    MultipleDrivers,
    /// `<NAME>_DRIVER` for a controller that is not supported
    UnknownDriver,
    /// Required macro not defined
    MissingValue(&'static str),
    /// Macro value could not be parsed
    InvalidValue(&'static str),
    /// `USER_SETUP_INFO` longer than the setup name capacity
    InfoTooLong,
}

/// Write a configuration as a setup header
///
/// Fails with [`fmt::Error`] before writing anything if the setup name is
/// not a valid literal.
pub fn write_header<W: Write>(config: &DisplayConfiguration, out: &mut W) -> fmt::Result {
    if !is_valid_info(&config.info) {
        return Err(fmt::Error);
    }

    writeln!(out, "#define USER_SETUP_INFO \"{}\"", config.info)?;
    writeln!(out)?;

    writeln!(out, "#define {}", config.driver.define())?;
    writeln!(out)?;

    let pins = &config.pins;
    writeln!(out, "#define TFT_MOSI {}", pins.mosi)?;
    writeln!(out, "#define TFT_SCLK {}", pins.sclk)?;
    writeln!(out, "#define TFT_CS {}", pin_value(pins.cs))?;
    writeln!(out, "#define TFT_DC {}", pins.dc)?;
    writeln!(out, "#define TFT_RST {}", pin_value(pins.rst))?;
    if let Some(bl) = config.backlight_pin {
        writeln!(out, "#define TFT_BL {}", bl)?;
    }
    writeln!(out)?;

    writeln!(out, "#define TFT_WIDTH {}", config.resolution.width)?;
    writeln!(out, "#define TFT_HEIGHT {}", config.resolution.height)?;
    writeln!(out)?;

    for font in config.fonts.iter() {
        writeln!(out, "#define {:<12}// {}", font.define(), font.description())?;
    }
    if config.smooth_font {
        writeln!(out)?;
        writeln!(out, "#define SMOOTH_FONT")?;
    }
    writeln!(out)?;

    if let Some(freq) = config.spi_frequency {
        writeln!(out, "#define SPI_FREQUENCY {}", freq)?;
        writeln!(out)?;
    }

    writeln!(out, "#define TFT_ROTATION {}", config.rotation.index())?;
    writeln!(out)?;

    writeln!(out, "#define TFT_BACKLIGHT_ON {}", config.backlight_on.define())
}

fn pin_value(pin: Option<u8>) -> i16 {
    pin.map(i16::from).unwrap_or(PIN_UNUSED)
}

/// Fields collected while reading a header
#[derive(Default)]
struct Collected {
    info: String<{ crate::config::MAX_INFO_LEN }>,
    driver: Option<DriverKind>,
    mosi: Option<u8>,
    sclk: Option<u8>,
    cs: Option<u8>,
    dc: Option<u8>,
    rst: Option<u8>,
    width: Option<u16>,
    height: Option<u16>,
    rotation: Rotation,
    fonts: FontSet,
    smooth_font: bool,
    backlight_on: BacklightLevel,
    backlight_pin: Option<u8>,
    spi_frequency: Option<u32>,
}

impl Collected {
    fn finish(self) -> Result<DisplayConfiguration, HeaderError> {
        let driver = self.driver.ok_or(HeaderError::MissingDriver)?;
        let pins = SpiPins {
            mosi: self.mosi.ok_or(HeaderError::MissingValue("TFT_MOSI"))?,
            sclk: self.sclk.ok_or(HeaderError::MissingValue("TFT_SCLK"))?,
            cs: self.cs,
            dc: self.dc.ok_or(HeaderError::MissingValue("TFT_DC"))?,
            rst: self.rst,
        };
        let resolution = Resolution::new(
            self.width.ok_or(HeaderError::MissingValue("TFT_WIDTH"))?,
            self.height.ok_or(HeaderError::MissingValue("TFT_HEIGHT"))?,
        );

        Ok(DisplayConfiguration {
            info: self.info,
            driver,
            pins,
            resolution,
            rotation: self.rotation,
            fonts: self.fonts,
            smooth_font: self.smooth_font,
            backlight_on: self.backlight_on,
            backlight_pin: self.backlight_pin,
            spi_frequency: self.spi_frequency,
        })
    }
}

/// Parse a setup header
///
/// `TFT_CS`, `TFT_RST` and `TFT_BL` may be absent or `-1`. A missing
/// `TFT_ROTATION` means portrait and a missing `TFT_BACKLIGHT_ON` means
/// active high, matching the library defaults.
pub fn parse_header(input: &str) -> Result<DisplayConfiguration, HeaderError> {
    let mut c = Collected::default();
    let mut in_block_comment = false;

    for line in input.lines() {
        let mut line = line.trim();

        if in_block_comment {
            match line.find("*/") {
                Some(end) => {
                    in_block_comment = false;
                    line = line[end + 2..].trim();
                }
                None => continue,
            }
        }
        line = strip_line_comment(line);
        if let Some(start) = line.find("/*") {
            let before = line[..start].trim();
            line = match line[start..].find("*/") {
                Some(end) if before.is_empty() => line[start + end + 2..].trim(),
                Some(_) => before,
                None => {
                    in_block_comment = true;
                    before
                }
            };
        }

        let Some(rest) = line.strip_prefix("#define") else {
            continue;
        };

        let rest = rest.trim();
        let (name, value) = match rest.find(char::is_whitespace) {
            Some(pos) => (&rest[..pos], rest[pos..].trim()),
            None => (rest, ""),
        };

        apply_define(&mut c, name, value)?;
    }

    c.finish()
}

/// Remove a trailing `// ...` that is not inside a string literal
fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) if line[..pos].matches('"').count() % 2 == 0 => line[..pos].trim(),
        _ => line,
    }
}

fn apply_define(c: &mut Collected, name: &str, value: &str) -> Result<(), HeaderError> {
    match name {
        "USER_SETUP_INFO" => {
            let info = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .ok_or(HeaderError::InvalidValue("USER_SETUP_INFO"))?;
            if info.len() > crate::config::MAX_INFO_LEN {
                return Err(HeaderError::InfoTooLong);
            }
            if !is_valid_info(info) {
                return Err(HeaderError::InvalidValue("USER_SETUP_INFO"));
            }
            c.info = String::try_from(info).map_err(|_| HeaderError::InfoTooLong)?;
        }
        "TFT_MOSI" => c.mosi = Some(parse_required_pin(value, "TFT_MOSI")?),
        "TFT_SCLK" => c.sclk = Some(parse_required_pin(value, "TFT_SCLK")?),
        "TFT_CS" => c.cs = parse_optional_pin(value, "TFT_CS")?,
        "TFT_DC" => c.dc = Some(parse_required_pin(value, "TFT_DC")?),
        "TFT_RST" => c.rst = parse_optional_pin(value, "TFT_RST")?,
        "TFT_BL" => c.backlight_pin = parse_optional_pin(value, "TFT_BL")?,
        "TFT_WIDTH" => c.width = Some(parse_number(value, "TFT_WIDTH")?),
        "TFT_HEIGHT" => c.height = Some(parse_number(value, "TFT_HEIGHT")?),
        "TFT_ROTATION" => {
            let index = parse_number(value, "TFT_ROTATION")?;
            c.rotation =
                Rotation::from_index(index).ok_or(HeaderError::InvalidValue("TFT_ROTATION"))?;
        }
        "TFT_BACKLIGHT_ON" => {
            c.backlight_on = BacklightLevel::from_define(value)
                .ok_or(HeaderError::InvalidValue("TFT_BACKLIGHT_ON"))?;
        }
        "SPI_FREQUENCY" => c.spi_frequency = Some(parse_number(value, "SPI_FREQUENCY")?),
        "SMOOTH_FONT" => c.smooth_font = true,
        _ => {
            if let Some(font) = Font::from_define(name) {
                c.fonts.insert(font);
            } else if name.ends_with("_DRIVER") && value.is_empty() {
                let driver = DriverKind::from_define(name).ok_or(HeaderError::UnknownDriver)?;
                if c.driver.is_some_and(|d| d != driver) {
                    return Err(HeaderError::MultipleDrivers);
                }
                c.driver = Some(driver);
            }
            // Anything else belongs to other parts of the library setup
        }
    }

    Ok(())
}

fn parse_number<T: core::str::FromStr>(value: &str, name: &'static str) -> Result<T, HeaderError> {
    value.parse().map_err(|_| HeaderError::InvalidValue(name))
}

fn parse_required_pin(value: &str, name: &'static str) -> Result<u8, HeaderError> {
    parse_optional_pin(value, name)?.ok_or(HeaderError::InvalidValue(name))
}

fn parse_optional_pin(value: &str, name: &'static str) -> Result<Option<u8>, HeaderError> {
    let pin: i16 = parse_number(value, name)?;
    if pin == PIN_UNUSED {
        return Ok(None);
    }
    u8::try_from(pin)
        .map(Some)
        .map_err(|_| HeaderError::InvalidValue(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::user_setup;
    use proptest::prelude::*;

    /// Setup header as distributed with the board
    const BOARD_HEADER: &str = r#"#define USER_SETUP_INFO "User_Setup"

#define ST7789_DRIVER     // ST7789 driver

// Define the ESP32 pins used for SPI communication
#define TFT_MOSI 23   // Default ESP32 MOSI
#define TFT_SCLK 18   // Default ESP32 SCK
#define TFT_CS    5   // Chip select control pin
#define TFT_DC    4   // Data Command control pin
#define TFT_RST   22  // Reset pin

// For ST7789 displays with 240 x 320 resolution
#define TFT_WIDTH  240
#define TFT_HEIGHT 320

// Define the fonts that are to be used
#define LOAD_GLCD   // Font 1. Original Adafruit 8 pixel font
#define LOAD_FONT2  // Font 2. Small 16 pixel high font
#define LOAD_FONT4  // Font 4. Medium 26 pixel high font
#define LOAD_FONT6  // Font 6. Large 48 pixel font
#define LOAD_FONT7  // Font 7. 7 segment 48 pixel font
#define LOAD_GFXFF  // FreeFonts. Include access to the Adafruit_GFX free fonts FF1 to FF48

#define SMOOTH_FONT

// Display rotation
#define TFT_ROTATION 1  // Landscape mode

// Color definitions
#define TFT_BACKLIGHT_ON HIGH
"#;

    fn render(config: &DisplayConfiguration) -> std::string::String {
        let mut out = std::string::String::new();
        write_header(config, &mut out).unwrap();
        out
    }

    #[test]
    fn test_parse_board_header() {
        let config = parse_header(BOARD_HEADER).unwrap();
        assert_eq!(config, user_setup());
    }

    #[test]
    fn test_write_manifest() {
        let header = render(&user_setup());
        assert!(header.starts_with("#define USER_SETUP_INFO \"User_Setup\"\n"));
        assert!(header.contains("#define ST7789_DRIVER\n"));
        assert!(header.contains("#define TFT_MOSI 23\n"));
        assert!(header.contains("#define TFT_SCLK 18\n"));
        assert!(header.contains("#define TFT_CS 5\n"));
        assert!(header.contains("#define TFT_DC 4\n"));
        assert!(header.contains("#define TFT_RST 22\n"));
        assert!(header.contains("#define TFT_WIDTH 240\n"));
        assert!(header.contains("#define TFT_HEIGHT 320\n"));
        assert!(header.contains("#define LOAD_GLCD   // Font 1."));
        assert!(header.contains("#define LOAD_GFXFF  // FreeFonts."));
        assert!(!header.contains("LOAD_FONT8"));
        assert!(header.contains("#define SMOOTH_FONT\n"));
        assert!(header.contains("#define TFT_ROTATION 1\n"));
        assert!(header.ends_with("#define TFT_BACKLIGHT_ON HIGH\n"));
        assert!(!header.contains("TFT_BL "));
        assert!(!header.contains("SPI_FREQUENCY"));
    }

    #[test]
    fn test_manifest_roundtrip() {
        let config = user_setup();
        assert_eq!(parse_header(&render(&config)).unwrap(), config);
    }

    #[test]
    fn test_unconnected_pins() {
        let mut config = user_setup();
        config.pins.cs = None;
        config.pins.rst = None;

        let header = render(&config);
        assert!(header.contains("#define TFT_CS -1\n"));
        assert!(header.contains("#define TFT_RST -1\n"));
        assert_eq!(parse_header(&header).unwrap(), config);
    }

    #[test]
    fn test_defaults_when_absent() {
        let header = "#define ILI9341_DRIVER\n\
                      #define TFT_MOSI 13\n\
                      #define TFT_SCLK 14\n\
                      #define TFT_DC 2\n\
                      #define TFT_WIDTH 240\n\
                      #define TFT_HEIGHT 320\n";
        let config = parse_header(header).unwrap();
        assert_eq!(config.driver, DriverKind::Ili9341);
        assert_eq!(config.pins.cs, None);
        assert_eq!(config.pins.rst, None);
        assert_eq!(config.rotation, Rotation::Deg0);
        assert_eq!(config.backlight_on, BacklightLevel::High);
        assert!(config.fonts.is_empty());
        assert!(!config.smooth_font);
        assert!(config.info.is_empty());
    }

    #[test]
    fn test_skips_comments_and_unknown_macros() {
        let header = "/* #define ILI9341_DRIVER\n\
                      #define ST7735_DRIVER */\n\
                      // #define GC9A01_DRIVER\n\
                      #define ST7789_DRIVER\n\
                      #define TFT_INVERSION_ON\n\
                      #define TOUCH_DRIVER 0x2046\n\
                      #define TFT_MOSI 23\n\
                      #define TFT_SCLK 18\n\
                      #define TFT_DC 4\n\
                      #define TFT_WIDTH 240\n\
                      #define TFT_HEIGHT 320\n\
                      #define SPI_READ_FREQUENCY 20000000\n";
        let config = parse_header(header).unwrap();
        assert_eq!(config.driver, DriverKind::St7789);
    }

    #[test]
    fn test_driver_errors() {
        assert_eq!(
            parse_header("#define TFT_MOSI 23\n"),
            Err(HeaderError::MissingDriver)
        );
        assert_eq!(
            parse_header("#define ST7789_DRIVER\n#define ILI9341_DRIVER\n"),
            Err(HeaderError::MultipleDrivers)
        );
        assert_eq!(
            parse_header("#define SSD1306_DRIVER\n"),
            Err(HeaderError::UnknownDriver)
        );
    }

    #[test]
    fn test_value_errors() {
        assert_eq!(
            parse_header("#define ST7789_DRIVER\n#define TFT_MOSI 23\n"),
            Err(HeaderError::MissingValue("TFT_SCLK"))
        );
        assert_eq!(
            parse_header("#define TFT_ROTATION 4\n"),
            Err(HeaderError::InvalidValue("TFT_ROTATION"))
        );
        assert_eq!(
            parse_header("#define TFT_MOSI -1\n"),
            Err(HeaderError::InvalidValue("TFT_MOSI"))
        );
        assert_eq!(
            parse_header("#define TFT_BACKLIGHT_ON MAYBE\n"),
            Err(HeaderError::InvalidValue("TFT_BACKLIGHT_ON"))
        );
        assert_eq!(
            parse_header("#define USER_SETUP_INFO User_Setup\n"),
            Err(HeaderError::InvalidValue("USER_SETUP_INFO"))
        );
        assert_eq!(
            parse_header("#define USER_SETUP_INFO \"Rev\" 2\"\n"),
            Err(HeaderError::InvalidValue("USER_SETUP_INFO"))
        );
    }

    #[test]
    fn test_comment_in_info_not_written() {
        let mut config = user_setup();
        config.info = String::try_from("Board/*A").unwrap();

        let mut out = std::string::String::new();
        assert_eq!(write_header(&config, &mut out), Err(fmt::Error));
        assert!(out.is_empty());

        config.info = String::try_from("Rev\" // 2").unwrap();
        assert_eq!(write_header(&config, &mut out), Err(fmt::Error));
    }

    #[test]
    fn test_info_with_symbols_roundtrip() {
        let mut config = user_setup();
        config.info = String::try_from("ST7789 #2 a/b *c").unwrap();
        assert_eq!(parse_header(&render(&config)), Ok(config));
    }

    fn arb_config() -> impl Strategy<Value = DisplayConfiguration> {
        (
            "[A-Za-z0-9_ \"/*#\\\\\\n]{0,32}",
            prop::sample::select(DriverKind::ALL.to_vec()),
            (any::<u8>(), any::<u8>(), any::<Option<u8>>(), any::<u8>(), any::<Option<u8>>()),
            (any::<u16>(), any::<u16>(), 0u8..4),
            (any::<u8>(), any::<bool>(), any::<bool>()),
            (any::<Option<u8>>(), any::<Option<u32>>()),
        )
            .prop_map(
                |(info, driver, (mosi, sclk, cs, dc, rst), (w, h, rot), (fonts, smooth, high), (bl, freq))| {
                    DisplayConfiguration {
                        info: String::try_from(info.as_str()).unwrap(),
                        driver,
                        pins: SpiPins { mosi, sclk, cs, dc, rst },
                        resolution: Resolution::new(w, h),
                        rotation: Rotation::from_index(rot).unwrap(),
                        fonts: Font::ALL
                            .into_iter()
                            .enumerate()
                            .filter(|(i, _)| fonts & (1 << i) != 0)
                            .map(|(_, f)| f)
                            .collect(),
                        smooth_font: smooth,
                        backlight_on: if high { BacklightLevel::High } else { BacklightLevel::Low },
                        backlight_pin: bl,
                        spi_frequency: freq,
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn prop_header_roundtrip(config in arb_config()) {
            let mut header = std::string::String::new();
            match write_header(&config, &mut header) {
                Ok(()) => prop_assert_eq!(parse_header(&header), Ok(config)),
                Err(_) => prop_assert!(!is_valid_info(&config.info)),
            }
        }
    }
}
