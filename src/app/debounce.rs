//! Debounce filter for the physical arm/disarm button.
//!
//! ## Hardware
//!
//! Active-low momentary switch with internal pull-up: idle reads HIGH,
//! a press pulls the line LOW.  Contacts bounce for a few milliseconds on
//! both press and release.
//!
//! ## Behaviour
//!
//! The filter is sampled from the main loop with the raw level and the
//! current monotonic time.  Any change of the raw level (either direction)
//! restarts the hold timer.  Once the raw level has held for the quiet
//! period the stable level follows it, and the transition is reported as
//! one [`Edge`].  A press therefore yields exactly one `Falling` edge and
//! its release exactly one `Rising` edge, however much the contacts
//! bounce.  There is no reset; the filter runs for the life of the device.

/// Default quiet period in milliseconds.
pub const DEBOUNCE_MS: u32 = 50;

/// Stabilised level transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// HIGH → LOW: the button was pressed.
    Falling,
    /// LOW → HIGH: the button was released.
    Rising,
}

#[derive(Debug, Clone)]
pub struct DebounceFilter {
    quiet_ms: u32,
    last_raw: bool,
    last_change_ms: u32,
    stable: bool,
}

impl DebounceFilter {
    /// `idle_level` is the level of a released button (`true` for pull-up).
    pub fn new(quiet_ms: u32, idle_level: bool) -> Self {
        Self {
            quiet_ms,
            last_raw: idle_level,
            last_change_ms: 0,
            stable: idle_level,
        }
    }

    /// Feed one raw sample taken at `now_ms` (wrapping monotonic ms).
    /// Returns the stabilised edge, if this sample completed one.
    pub fn update(&mut self, raw: bool, now_ms: u32) -> Option<Edge> {
        if raw != self.last_raw {
            self.last_raw = raw;
            self.last_change_ms = now_ms;
        }

        let held_ms = now_ms.wrapping_sub(self.last_change_ms);
        if held_ms < self.quiet_ms || raw == self.stable {
            return None;
        }

        self.stable = raw;
        Some(if raw { Edge::Rising } else { Edge::Falling })
    }

    /// Current stabilised level.
    pub fn level(&self) -> bool {
        self.stable
    }
}
