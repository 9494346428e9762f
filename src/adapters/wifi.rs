//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the hexagonal boundary for network
//! connectivity.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Connect policy
//!
//! `connect` starts association and then polls the link every 500 ms
//! until the station has an IP or the timeout elapses.  There is no
//! backoff here; the caller's check interval paces the retries.

use log::{error, info, warn};

use crate::app::ports::{ConnectivityError, ConnectivityPort};

use super::utils::is_printable_ascii;

/// Link poll period inside [`ConnectivityPort::connect`].
const CONNECT_POLL_MS: u32 = 500;

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    attempts: u32,
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::EspWifi<'static>,
    /// Simulation: whether the pretend access point is reachable.
    #[cfg(not(target_os = "espidf"))]
    sim_ap_reachable: bool,
    /// Simulation: link state as the driver would report it.
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    /// Wrap an already-created driver.  Credentials are set separately.
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: esp_idf_svc::wifi::EspWifi<'static>) -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            attempts: 0,
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            attempts: 0,
            sim_ap_reachable: true,
            sim_link_up: false,
        }
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    /// Connect attempts since boot.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    // ── Simulation controls ───────────────────────────────────

    /// Simulation: make the access point (un)reachable.  Dropping
    /// reachability also drops an established link.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_ap_reachable(&mut self, reachable: bool) {
        self.sim_ap_reachable = reachable;
        if !reachable {
            self.sim_link_up = false;
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self) -> Result<(), ConnectivityError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        let started = self.wifi.is_started().unwrap_or(false);
        if !started {
            self.wifi.set_configuration(&config).map_err(|e| {
                error!("WiFi: set_configuration failed: {}", e);
                ConnectivityError::ConnectionFailed
            })?;
            self.wifi.start().map_err(|e| {
                error!("WiFi: start failed: {}", e);
                ConnectivityError::ConnectionFailed
            })?;
        }

        // A stale association blocks a fresh connect.
        let _ = self.wifi.disconnect();
        self.wifi.connect().map_err(|e| {
            error!("WiFi: connect request failed: {}", e);
            ConnectivityError::ConnectionFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self) -> Result<(), ConnectivityError> {
        if self.sim_ap_reachable {
            self.sim_link_up = true;
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_up(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false) && self.wifi.sta_netif().is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_up(&self) -> bool {
        self.sim_link_up
    }

    #[cfg(target_os = "espidf")]
    fn platform_wait(&self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_wait(&self, _ms: u32) {}
}

#[cfg(not(target_os = "espidf"))]
impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectivityPort
// ───────────────────────────────────────────────────────────────

impl ConnectivityPort for WifiAdapter {
    fn is_up(&self) -> bool {
        self.platform_is_up()
    }

    fn connect(&mut self, timeout_ms: u32) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.platform_is_up() {
            self.state = WifiState::Connected;
            return Ok(());
        }

        self.attempts = self.attempts.wrapping_add(1);
        info!("WiFi: connecting to '{}' (attempt {})", self.ssid, self.attempts);
        self.state = WifiState::Connecting;

        if let Err(e) = self.platform_begin() {
            self.state = WifiState::Failed;
            return Err(e);
        }

        let mut waited = 0;
        while !self.platform_is_up() {
            if waited >= timeout_ms {
                warn!("WiFi: no link after {} ms", waited);
                self.state = WifiState::Failed;
                return Err(ConnectivityError::Timeout);
            }
            self.platform_wait(CONNECT_POLL_MS);
            waited = waited.saturating_add(CONNECT_POLL_MS);
        }

        self.state = WifiState::Connected;
        info!("WiFi: connected");
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
