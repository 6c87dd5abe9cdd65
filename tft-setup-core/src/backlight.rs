//! Backlight output
//!
//! Switches the panel backlight through a GPIO pin, driving it high or low
//! according to the configured [`BacklightLevel`].

use embedded_hal::digital::OutputPin;

use crate::config::BacklightLevel;

/// Backlight control pin
pub struct Backlight<P> {
    pin: P,
    active: BacklightLevel,
    /// Current logical state (true = backlight lit)
    on: bool,
}

impl<P: OutputPin> Backlight<P> {
    /// Create a backlight output, initially off
    pub fn new(pin: P, active: BacklightLevel) -> Result<Self, P::Error> {
        let mut backlight = Self {
            pin,
            active,
            on: false,
        };
        backlight.set_on(false)?;
        Ok(backlight)
    }

    /// Switch the backlight on or off
    pub fn set_on(&mut self, on: bool) -> Result<(), P::Error> {
        let high = match self.active {
            BacklightLevel::High => on,
            BacklightLevel::Low => !on,
        };

        if high {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(())
    }

    pub fn on(&mut self) -> Result<(), P::Error> {
        self.set_on(true)
    }

    pub fn off(&mut self) -> Result<(), P::Error> {
        self.set_on(false)
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Active level this output was created with
    pub fn active_level(&self) -> BacklightLevel {
        self.active
    }

    /// Give the pin back
    pub fn release(self) -> P {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    /// Mock GPIO pin for testing
    struct MockPin {
        high: bool,
        writes: u8,
    }

    impl MockPin {
        fn new() -> Self {
            Self {
                high: false,
                writes: 0,
            }
        }
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_active_high_backlight() {
        let mut backlight = Backlight::new(MockPin::new(), BacklightLevel::High).unwrap();

        // Initially off
        assert!(!backlight.is_on());
        assert!(!backlight.pin.high);

        backlight.on().unwrap();
        assert!(backlight.is_on());
        assert!(backlight.pin.high);

        backlight.off().unwrap();
        assert!(!backlight.is_on());
        assert!(!backlight.pin.high);
    }

    #[test]
    fn test_active_low_backlight() {
        let mut backlight = Backlight::new(MockPin::new(), BacklightLevel::Low).unwrap();

        // Off means the pin is held high
        assert!(!backlight.is_on());
        assert!(backlight.pin.high);

        backlight.on().unwrap();
        assert!(backlight.is_on());
        assert!(!backlight.pin.high);
    }

    #[test]
    fn test_manifest_level() {
        let level = crate::config::user_setup().backlight_on();
        let mut backlight = Backlight::new(MockPin::new(), level).unwrap();
        backlight.set_on(true).unwrap();

        assert_eq!(backlight.active_level(), BacklightLevel::High);
        let pin = backlight.release();
        assert!(pin.high);
        assert_eq!(pin.writes, 2);
    }
}
