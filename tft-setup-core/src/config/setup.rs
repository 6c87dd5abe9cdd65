//! Display configuration record and the board manifest
//!
//! [`DisplayConfiguration`] is the complete set of values the graphics
//! library reads at build time. [`user_setup`] returns the values for this
//! board; the individual values are also available as constants.

use heapless::String;
use serde::{Deserialize, Serialize};

use super::types::{BacklightLevel, DriverKind, Font, FontSet, Resolution, Rotation, SpiPins};

/// Maximum length of the setup name
pub const MAX_INFO_LEN: usize = 32;

/// Check that a setup name can be written as a quoted literal
///
/// The name ends up inside `"..."` in both the header and the TOML file,
/// neither of which escapes anything, so it must be printable ASCII
/// without quotes or backslashes and must not open or close a comment.
pub fn is_valid_info(info: &str) -> bool {
    info.len() <= MAX_INFO_LEN
        && info
            .bytes()
            .all(|b| (b' '..=b'~').contains(&b) && b != b'"' && b != b'\\')
        && !info.contains("//")
        && !info.contains("/*")
        && !info.contains("*/")
}

/// Setup name reported by the library (`USER_SETUP_INFO`)
pub const SETUP_INFO: &str = "User_Setup";

/// Panel controller
pub const DRIVER: DriverKind = DriverKind::St7789;

/// Default ESP32 VSPI data out
pub const TFT_MOSI: u8 = 23;
/// Default ESP32 VSPI clock
pub const TFT_SCLK: u8 = 18;
/// Chip select control pin
pub const TFT_CS: u8 = 5;
/// Data/command control pin
pub const TFT_DC: u8 = 4;
/// Reset pin
pub const TFT_RST: u8 = 22;

pub const PINS: SpiPins = SpiPins::new(TFT_MOSI, TFT_SCLK, TFT_CS, TFT_DC, TFT_RST);

/// ST7789 240 x 320 panel
pub const RESOLUTION: Resolution = Resolution::new(240, 320);

/// Landscape
pub const ROTATION: Rotation = Rotation::Deg90;

pub const FONTS: FontSet = FontSet::empty()
    .with(Font::Glcd)
    .with(Font::Font2)
    .with(Font::Font4)
    .with(Font::Font6)
    .with(Font::Font7)
    .with(Font::Gfxff);

pub const SMOOTH_FONT: bool = true;

pub const BACKLIGHT_ON: BacklightLevel = BacklightLevel::High;

/// Complete display configuration
///
/// Defined once and read by the graphics library during its own setup;
/// nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfiguration {
    /// Setup name (`USER_SETUP_INFO`)
    pub info: String<MAX_INFO_LEN>,
    /// Panel controller
    pub driver: DriverKind,
    /// SPI wiring
    pub pins: SpiPins,
    /// Native panel size
    pub resolution: Resolution,
    /// Logical orientation
    pub rotation: Rotation,
    /// Font bundles linked in
    pub fonts: FontSet,
    /// Anti-aliased font rendering
    pub smooth_font: bool,
    /// Level that turns the backlight on
    pub backlight_on: BacklightLevel,
    /// Backlight control pin (`TFT_BL`), if the backlight is switchable
    pub backlight_pin: Option<u8>,
    /// SPI clock in Hz (`SPI_FREQUENCY`), library default when unset
    pub spi_frequency: Option<u32>,
}

impl Default for DisplayConfiguration {
    fn default() -> Self {
        Self {
            info: String::new(),
            driver: DriverKind::default(),
            pins: SpiPins::default(),
            resolution: Resolution::default(),
            rotation: Rotation::default(),
            fonts: FontSet::empty(),
            smooth_font: false,
            backlight_on: BacklightLevel::default(),
            backlight_pin: None,
            spi_frequency: None,
        }
    }
}

impl DisplayConfiguration {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&self) -> &str {
        self.info.as_str()
    }

    pub fn driver(&self) -> DriverKind {
        self.driver
    }

    pub fn pins(&self) -> SpiPins {
        self.pins
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn fonts(&self) -> FontSet {
        self.fonts
    }

    pub fn smooth_font(&self) -> bool {
        self.smooth_font
    }

    pub fn backlight_on(&self) -> BacklightLevel {
        self.backlight_on
    }

    pub fn backlight_pin(&self) -> Option<u8> {
        self.backlight_pin
    }

    pub fn spi_frequency(&self) -> Option<u32> {
        self.spi_frequency
    }

    /// Logical (width, height) after rotation
    pub fn logical_size(&self) -> (u16, u16) {
        self.resolution.oriented(self.rotation)
    }
}

/// The display setup of this board
pub fn user_setup() -> DisplayConfiguration {
    DisplayConfiguration {
        info: String::try_from(SETUP_INFO).unwrap_or_default(),
        driver: DRIVER,
        pins: PINS,
        resolution: RESOLUTION,
        rotation: ROTATION,
        fonts: FONTS,
        smooth_font: SMOOTH_FONT,
        backlight_on: BACKLIGHT_ON,
        backlight_pin: None,
        spi_frequency: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_values() {
        let setup = user_setup();
        assert_eq!(setup.info(), "User_Setup");
        assert_eq!(setup.driver(), DriverKind::St7789);

        let pins = setup.pins();
        assert_eq!(pins.mosi, 23);
        assert_eq!(pins.sclk, 18);
        assert_eq!(pins.cs, Some(5));
        assert_eq!(pins.dc, 4);
        assert_eq!(pins.rst, Some(22));

        assert_eq!(setup.resolution().width, 240);
        assert_eq!(setup.resolution().height, 320);
        assert_eq!(setup.rotation().index(), 1);
        assert!(setup.smooth_font());
        assert_eq!(setup.backlight_on(), BacklightLevel::High);
        assert!(setup.backlight_pin().is_none());
        assert!(setup.spi_frequency().is_none());
    }

    #[test]
    fn test_manifest_rotation_in_range() {
        let rotation = user_setup().rotation();
        assert_eq!(Rotation::from_index(rotation.index()), Some(rotation));
        assert!(rotation.index() <= 3);
    }

    #[test]
    fn test_manifest_fonts_exact() {
        let fonts = user_setup().fonts();
        let enabled: heapless::Vec<Font, 8> = fonts.iter().collect();
        assert_eq!(
            enabled.as_slice(),
            &[
                Font::Glcd,
                Font::Font2,
                Font::Font4,
                Font::Font6,
                Font::Font7,
                Font::Gfxff
            ]
        );
        assert!(!fonts.contains(Font::Font8));
        assert!(!fonts.contains(Font::Font8N));
    }

    #[test]
    fn test_valid_info() {
        assert!(is_valid_info(SETUP_INFO));
        assert!(is_valid_info(""));
        assert!(is_valid_info("Rev 2 #3 a/b *c"));
        assert!(!is_valid_info("Board/*A"));
        assert!(!is_valid_info("Board*/"));
        assert!(!is_valid_info("see // note"));
        assert!(!is_valid_info("Rev\" #2"));
        assert!(!is_valid_info("C:\\boards"));
        assert!(!is_valid_info("two\nlines"));
        assert!(!is_valid_info("Ünicode"));
        assert!(!is_valid_info("0123456789012345678901234567890123"));
    }

    #[test]
    fn test_logical_size_landscape() {
        assert_eq!(user_setup().logical_size(), (320, 240));
    }

    #[test]
    fn test_empty_config() {
        let config = DisplayConfiguration::new();
        assert!(config.info().is_empty());
        assert!(config.fonts().is_empty());
        assert!(!config.smooth_font());
    }
}
