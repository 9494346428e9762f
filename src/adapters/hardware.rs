//! Hardware adapter: bridges GPIO pins to domain port traits.
//!
//! Owns the PIR input, the siren relay output and the button input,
//! exposing them through [`MotionSensorPort`], [`SirenPort`] and
//! [`ButtonPort`].  The pins are plain `embedded-hal` 1.0 digital
//! traits: on the device they are `esp-idf-hal` `PinDriver`s, on the host
//! any mock pin will do.
//!
//! ## Read failures
//!
//! A pin read that errors is reported at `warn` and mapped to the *safe*
//! level: no motion for the PIR, released (HIGH) for the button.  A
//! flaky wire must never arm, disarm or trigger anything by itself.

use embedded_hal::digital::{Error as _, InputPin, OutputPin};
use log::warn;

use crate::app::ports::{ButtonPort, MotionSensorPort, SirenPort};

/// Concrete adapter that combines the three discrete I/O lines.
pub struct HardwareAdapter<Pir, Relay, Button> {
    pir: Pir,
    relay: Relay,
    button: Button,
    siren_on: bool,
}

impl<Pir, Relay, Button> HardwareAdapter<Pir, Relay, Button>
where
    Pir: InputPin,
    Relay: OutputPin,
    Button: InputPin,
{
    /// Takes ownership of the pins and drives the relay LOW so a reboot
    /// always starts with the siren silent.
    pub fn new(pir: Pir, relay: Relay, button: Button) -> Self {
        let mut hw = Self {
            pir,
            relay,
            button,
            siren_on: false,
        };
        hw.set_siren(false);
        hw
    }
}

// ── SirenPort implementation ──────────────────────────────────

impl<Pir, Relay, Button> SirenPort for HardwareAdapter<Pir, Relay, Button>
where
    Relay: OutputPin,
{
    fn set_siren(&mut self, on: bool) {
        let res = if on {
            self.relay.set_high()
        } else {
            self.relay.set_low()
        };
        match res {
            Ok(()) => self.siren_on = on,
            Err(e) => warn!("Siren relay write failed: {:?}", e.kind()),
        }
    }

    fn is_siren_on(&self) -> bool {
        self.siren_on
    }
}

// ── MotionSensorPort implementation ───────────────────────────

impl<Pir, Relay, Button> MotionSensorPort for HardwareAdapter<Pir, Relay, Button>
where
    Pir: InputPin,
{
    fn motion_detected(&mut self) -> bool {
        self.pir.is_high().unwrap_or_else(|e| {
            warn!("PIR read failed: {:?}", e.kind());
            false
        })
    }
}

// ── ButtonPort implementation ─────────────────────────────────

impl<Pir, Relay, Button> ButtonPort for HardwareAdapter<Pir, Relay, Button>
where
    Button: InputPin,
{
    fn read_level(&mut self) -> bool {
        self.button.is_high().unwrap_or_else(|e| {
            warn!("Button read failed: {:?}", e.kind());
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    /// Pin whose level the test sets; `broken` makes every access fail.
    #[derive(Default)]
    struct FakePin {
        high: bool,
        broken: bool,
        writes: Vec<bool>,
    }

    impl ErrorType for FakePin {
        type Error = ErrorKind;
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            if self.broken {
                Err(ErrorKind::Other)
            } else {
                Ok(self.high)
            }
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|h| !h)
        }
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            self.high = false;
            self.writes.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            self.high = true;
            self.writes.push(true);
            Ok(())
        }
    }

    fn pin(high: bool) -> FakePin {
        FakePin {
            high,
            ..FakePin::default()
        }
    }

    #[test]
    fn relay_starts_released() {
        let hw = HardwareAdapter::new(pin(false), pin(true), pin(true));
        assert!(!hw.is_siren_on());
        assert_eq!(hw.relay.writes, vec![false]);
    }

    #[test]
    fn siren_follows_relay_writes() {
        let mut hw = HardwareAdapter::new(pin(false), pin(false), pin(true));
        hw.set_siren(true);
        assert!(hw.is_siren_on());
        assert!(hw.relay.high);
        hw.set_siren(false);
        assert!(!hw.relay.high);
    }

    #[test]
    fn inputs_pass_levels_through() {
        let mut hw = HardwareAdapter::new(pin(true), pin(false), pin(false));
        assert!(hw.motion_detected());
        assert!(!hw.read_level());
    }

    #[test]
    fn read_errors_map_to_safe_levels() {
        let broken = || FakePin {
            high: false,
            broken: true,
            writes: Vec::new(),
        };
        let mut hw = HardwareAdapter::new(broken(), pin(false), broken());
        assert!(!hw.motion_detected(), "broken PIR must not report motion");
        assert!(hw.read_level(), "broken button reads as released");
    }

    #[test]
    fn failed_relay_write_keeps_last_known_state() {
        let mut hw = HardwareAdapter::new(pin(false), pin(false), pin(true));
        hw.relay.broken = true;
        hw.set_siren(true);
        assert!(!hw.is_siren_on());
    }
}
