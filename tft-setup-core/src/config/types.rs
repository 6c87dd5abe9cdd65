//! Display setup type definitions
//!
//! Enumerations and small records that make up a [`DisplayConfiguration`].
//! Each option knows the preprocessor name the graphics library expects.
//!
//! [`DisplayConfiguration`]: super::DisplayConfiguration

use serde::{Deserialize, Serialize};

/// Display controller on the panel module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverKind {
    Ili9341,
    St7735,
    Ili9163,
    S6d02a1,
    RpiIli9486,
    Hx8357d,
    Ili9481,
    Ili9486,
    Ili9488,
    #[default]
    St7789,
    /// ST7789 variant with a minimal init sequence
    St7789Alt,
    R61581,
    Rm68140,
    St7796,
    Ssd1351,
    Ssd1963_480,
    Ssd1963_800,
    Ssd1963_800Alt,
    Ili9225,
    Gc9a01,
}

impl DriverKind {
    /// Every supported controller
    pub const ALL: [DriverKind; 20] = [
        DriverKind::Ili9341,
        DriverKind::St7735,
        DriverKind::Ili9163,
        DriverKind::S6d02a1,
        DriverKind::RpiIli9486,
        DriverKind::Hx8357d,
        DriverKind::Ili9481,
        DriverKind::Ili9486,
        DriverKind::Ili9488,
        DriverKind::St7789,
        DriverKind::St7789Alt,
        DriverKind::R61581,
        DriverKind::Rm68140,
        DriverKind::St7796,
        DriverKind::Ssd1351,
        DriverKind::Ssd1963_480,
        DriverKind::Ssd1963_800,
        DriverKind::Ssd1963_800Alt,
        DriverKind::Ili9225,
        DriverKind::Gc9a01,
    ];

    /// Flag macro that selects this driver (e.g. `ST7789_DRIVER`)
    pub const fn define(self) -> &'static str {
        match self {
            DriverKind::Ili9341 => "ILI9341_DRIVER",
            DriverKind::St7735 => "ST7735_DRIVER",
            DriverKind::Ili9163 => "ILI9163_DRIVER",
            DriverKind::S6d02a1 => "S6D02A1_DRIVER",
            DriverKind::RpiIli9486 => "RPI_ILI9486_DRIVER",
            DriverKind::Hx8357d => "HX8357D_DRIVER",
            DriverKind::Ili9481 => "ILI9481_DRIVER",
            DriverKind::Ili9486 => "ILI9486_DRIVER",
            DriverKind::Ili9488 => "ILI9488_DRIVER",
            DriverKind::St7789 => "ST7789_DRIVER",
            DriverKind::St7789Alt => "ST7789_2_DRIVER",
            DriverKind::R61581 => "R61581_DRIVER",
            DriverKind::Rm68140 => "RM68140_DRIVER",
            DriverKind::St7796 => "ST7796_DRIVER",
            DriverKind::Ssd1351 => "SSD1351_DRIVER",
            DriverKind::Ssd1963_480 => "SSD1963_480_DRIVER",
            DriverKind::Ssd1963_800 => "SSD1963_800_DRIVER",
            DriverKind::Ssd1963_800Alt => "SSD1963_800ALT_DRIVER",
            DriverKind::Ili9225 => "ILI9225_DRIVER",
            DriverKind::Gc9a01 => "GC9A01_DRIVER",
        }
    }

    /// Short lowercase name used in TOML setup files (e.g. `st7789`)
    pub const fn name(self) -> &'static str {
        match self {
            DriverKind::Ili9341 => "ili9341",
            DriverKind::St7735 => "st7735",
            DriverKind::Ili9163 => "ili9163",
            DriverKind::S6d02a1 => "s6d02a1",
            DriverKind::RpiIli9486 => "rpi_ili9486",
            DriverKind::Hx8357d => "hx8357d",
            DriverKind::Ili9481 => "ili9481",
            DriverKind::Ili9486 => "ili9486",
            DriverKind::Ili9488 => "ili9488",
            DriverKind::St7789 => "st7789",
            DriverKind::St7789Alt => "st7789_2",
            DriverKind::R61581 => "r61581",
            DriverKind::Rm68140 => "rm68140",
            DriverKind::St7796 => "st7796",
            DriverKind::Ssd1351 => "ssd1351",
            DriverKind::Ssd1963_480 => "ssd1963_480",
            DriverKind::Ssd1963_800 => "ssd1963_800",
            DriverKind::Ssd1963_800Alt => "ssd1963_800alt",
            DriverKind::Ili9225 => "ili9225",
            DriverKind::Gc9a01 => "gc9a01",
        }
    }

    /// Look up a driver by its flag macro
    pub fn from_define(define: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.define() == define)
    }

    /// Look up a driver by its short name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }
}

/// SPI wiring between the MCU and the panel
///
/// `cs` and `rst` are optional: a chip select tied low or a reset wired to
/// the board reset are written as `-1` in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiPins {
    /// Data out (MOSI)
    pub mosi: u8,
    /// Clock
    pub sclk: u8,
    /// Chip select
    pub cs: Option<u8>,
    /// Data/command select
    pub dc: u8,
    /// Panel reset
    pub rst: Option<u8>,
}

impl SpiPins {
    /// Pins with every control line connected
    pub const fn new(mosi: u8, sclk: u8, cs: u8, dc: u8, rst: u8) -> Self {
        Self {
            mosi,
            sclk,
            cs: Some(cs),
            dc,
            rst: Some(rst),
        }
    }

    /// Assigned pins paired with their role, in header order
    pub fn assigned(&self) -> impl Iterator<Item = (&'static str, u8)> {
        [
            ("TFT_MOSI", Some(self.mosi)),
            ("TFT_SCLK", Some(self.sclk)),
            ("TFT_CS", self.cs),
            ("TFT_DC", Some(self.dc)),
            ("TFT_RST", self.rst),
        ]
        .into_iter()
        .filter_map(|(role, pin)| pin.map(|p| (role, p)))
    }
}

/// Native panel resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolution {
    pub width: u16,
    pub height: u16,
}

impl Resolution {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Logical (width, height) after applying a rotation
    pub const fn oriented(&self, rotation: Rotation) -> (u16, u16) {
        if rotation.is_landscape() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Number of pixels on the panel
    pub const fn pixel_count(&self) -> u32 {
        self.width as u32 * self.height as u32
    }
}

/// Logical display orientation, in quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// Portrait
    #[default]
    Deg0,
    /// Landscape
    Deg90,
    /// Inverted portrait
    Deg180,
    /// Inverted landscape
    Deg270,
}

impl Rotation {
    /// Value of `TFT_ROTATION`
    pub const fn index(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    /// Rotation from a `TFT_ROTATION` value; only 0-3 are valid
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Rotation::Deg0),
            1 => Some(Rotation::Deg90),
            2 => Some(Rotation::Deg180),
            3 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    /// Width and height swap in landscape orientations
    pub const fn is_landscape(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// Font bundle that can be linked into the graphics library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    /// Font 1, original Adafruit 8 pixel font
    Glcd,
    /// Font 2, small 16 pixel high font
    Font2,
    /// Font 4, medium 26 pixel high font
    Font4,
    /// Font 6, large 48 pixel numeric font
    Font6,
    /// Font 7, 7 segment 48 pixel numeric font
    Font7,
    /// Font 8, large 75 pixel numeric font
    Font8,
    /// Font 8, narrower variant
    Font8N,
    /// Adafruit_GFX free fonts FF1 to FF48
    Gfxff,
}

impl Font {
    /// Every font bundle, in header order
    pub const ALL: [Font; 8] = [
        Font::Glcd,
        Font::Font2,
        Font::Font4,
        Font::Font6,
        Font::Font7,
        Font::Font8,
        Font::Font8N,
        Font::Gfxff,
    ];

    /// Flag macro that links the bundle in (e.g. `LOAD_FONT2`)
    pub const fn define(self) -> &'static str {
        match self {
            Font::Glcd => "LOAD_GLCD",
            Font::Font2 => "LOAD_FONT2",
            Font::Font4 => "LOAD_FONT4",
            Font::Font6 => "LOAD_FONT6",
            Font::Font7 => "LOAD_FONT7",
            Font::Font8 => "LOAD_FONT8",
            Font::Font8N => "LOAD_FONT8N",
            Font::Gfxff => "LOAD_GFXFF",
        }
    }

    /// Short lowercase name used in TOML setup files
    pub const fn name(self) -> &'static str {
        match self {
            Font::Glcd => "glcd",
            Font::Font2 => "font2",
            Font::Font4 => "font4",
            Font::Font6 => "font6",
            Font::Font7 => "font7",
            Font::Font8 => "font8",
            Font::Font8N => "font8n",
            Font::Gfxff => "gfxff",
        }
    }

    /// Human readable description, used as the header comment
    pub const fn description(self) -> &'static str {
        match self {
            Font::Glcd => "Font 1. Original Adafruit 8 pixel font",
            Font::Font2 => "Font 2. Small 16 pixel high font",
            Font::Font4 => "Font 4. Medium 26 pixel high font",
            Font::Font6 => "Font 6. Large 48 pixel font",
            Font::Font7 => "Font 7. 7 segment 48 pixel font",
            Font::Font8 => "Font 8. Large 75 pixel font",
            Font::Font8N => "Font 8. Narrower large 75 pixel font",
            Font::Gfxff => "FreeFonts. Adafruit_GFX free fonts FF1 to FF48",
        }
    }

    pub fn from_define(define: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.define() == define)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of enabled font bundles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct FontSet(u8);

impl FontSet {
    /// No fonts enabled
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every font enabled
    pub const fn all() -> Self {
        Self(u8::MAX)
    }

    /// This set with `font` added
    pub const fn with(self, font: Font) -> Self {
        Self(self.0 | font.bit())
    }

    /// This set with `font` removed
    pub const fn without(self, font: Font) -> Self {
        Self(self.0 & !font.bit())
    }

    pub fn insert(&mut self, font: Font) {
        *self = self.with(font);
    }

    pub const fn contains(&self, font: Font) -> bool {
        self.0 & font.bit() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Enabled fonts in header order
    pub fn iter(&self) -> impl Iterator<Item = Font> + '_ {
        Font::ALL.into_iter().filter(|f| self.contains(*f))
    }
}

impl FromIterator<Font> for FontSet {
    fn from_iter<I: IntoIterator<Item = Font>>(iter: I) -> Self {
        iter.into_iter().fold(FontSet::empty(), FontSet::with)
    }
}

/// Logic level that turns the backlight on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BacklightLevel {
    #[default]
    High,
    Low,
}

impl BacklightLevel {
    /// Value of `TFT_BACKLIGHT_ON`
    pub const fn define(self) -> &'static str {
        match self {
            BacklightLevel::High => "HIGH",
            BacklightLevel::Low => "LOW",
        }
    }

    /// Parse `HIGH`/`LOW` (also `1`/`0`), case-insensitive
    pub fn from_define(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("high") || value == "1" {
            Some(BacklightLevel::High)
        } else if value.eq_ignore_ascii_case("low") || value == "0" {
            Some(BacklightLevel::Low)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_names() {
        assert_eq!(DriverKind::St7789.define(), "ST7789_DRIVER");
        assert_eq!(DriverKind::St7789.name(), "st7789");
        assert_eq!(DriverKind::St7789Alt.name(), "st7789_2");
        assert_eq!(DriverKind::Ssd1963_800Alt.name(), "ssd1963_800alt");
        assert_eq!(DriverKind::RpiIli9486.name(), "rpi_ili9486");

        for driver in DriverKind::ALL {
            assert_eq!(DriverKind::from_define(driver.define()), Some(driver));
            assert_eq!(DriverKind::from_name(driver.name()), Some(driver));
        }
        assert_eq!(DriverKind::from_name("ST7789"), Some(DriverKind::St7789));
        assert!(DriverKind::from_define("SSD1306_DRIVER").is_none());
    }

    #[test]
    fn test_rotation_index() {
        for i in 0..4 {
            assert_eq!(Rotation::from_index(i).unwrap().index(), i);
        }
        assert!(Rotation::from_index(4).is_none());
        assert!(Rotation::Deg90.is_landscape());
        assert!(!Rotation::Deg180.is_landscape());
    }

    #[test]
    fn test_oriented_resolution() {
        let res = Resolution::new(240, 320);
        assert_eq!(res.oriented(Rotation::Deg0), (240, 320));
        assert_eq!(res.oriented(Rotation::Deg90), (320, 240));
        assert_eq!(res.oriented(Rotation::Deg270), (320, 240));
        assert_eq!(res.pixel_count(), 76_800);
    }

    #[test]
    fn test_font_set() {
        let set = FontSet::empty().with(Font::Glcd).with(Font::Gfxff);
        assert_eq!(set.len(), 2);
        assert!(set.contains(Font::Glcd));
        assert!(!set.contains(Font::Font8));

        let fonts: heapless::Vec<Font, 8> = set.iter().collect();
        assert_eq!(fonts.as_slice(), &[Font::Glcd, Font::Gfxff]);

        assert!(set.without(Font::Glcd).without(Font::Gfxff).is_empty());
        assert_eq!(FontSet::all().len(), Font::ALL.len());
        assert_eq!(Font::ALL.into_iter().collect::<FontSet>(), FontSet::all());
    }

    #[test]
    fn test_backlight_level() {
        assert_eq!(BacklightLevel::from_define("HIGH"), Some(BacklightLevel::High));
        assert_eq!(BacklightLevel::from_define("low"), Some(BacklightLevel::Low));
        assert_eq!(BacklightLevel::from_define("0"), Some(BacklightLevel::Low));
        assert!(BacklightLevel::from_define("maybe").is_none());
    }
}
