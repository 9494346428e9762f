//! ESP32 time adapter.
//!
//! Two clocks with different jobs:
//!
//! - [`Esp32TimeAdapter`]: monotonic milliseconds since boot, the time
//!   base of every interval and debounce computation.
//!   - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!     ESP-IDF high-resolution timer.
//!   - **`not(target_os = "espidf")`**: uses `std::time::Instant`.
//! - [`SystemTimeSource`]: wall-clock seconds for log timestamps.  On the
//!   device this reads the RTC that SNTP keeps in sync (see
//!   [`start_sntp`]); before the first sync it reports a date near 1970.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::app::ports::TimeSource;

/// Monotonic time for the control loop.
pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot, wrapping after ~49.7 days.  Consumers
    /// compare with `wrapping_sub`.
    pub fn uptime_ms(&self) -> u32 {
        (self.uptime_us() / 1_000) as u32
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

/// Wall clock backed by the system RTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn unix_time(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_secs() as i64,
            Err(e) => -(e.duration().as_secs() as i64),
        }
    }
}

/// Start background time sync against `pool.ntp.org`.  The returned
/// handle must be kept alive for sync to continue.
#[cfg(target_os = "espidf")]
pub fn start_sntp() -> crate::Result<esp_idf_svc::sntp::EspSntp<'static>> {
    esp_idf_svc::sntp::EspSntp::new_default().map_err(|e| {
        log::error!("SNTP start failed: {}", e);
        crate::Error::Init("sntp")
    })
}
