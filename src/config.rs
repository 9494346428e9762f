//! System configuration parameters
//!
//! All tunable parameters for the Sentinela alarm controller.
//! Values can be overridden via NVS (non-volatile storage); secrets are
//! kept out of NVS entirely and arrive at build time (see [`Credentials`]).

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Radio remote ---
    /// Code the 433 MHz remote sends to ARM the system
    pub radio_arm_code: u32,
    /// Code the 433 MHz remote sends to DISARM the system
    pub radio_disarm_code: u32,

    // --- Button ---
    /// Quiet period the raw button level must hold before it counts (ms)
    pub button_debounce_ms: u32,

    // --- Remote chat ---
    /// Minimum interval between two remote polls (ms), keeps us under the
    /// bot API rate limit
    pub remote_poll_interval_ms: u32,
    /// Chat the operator talks from; all notifications go here
    pub operator_chat_id: i64,
    /// Upper bound of one bot API request (ms)
    pub http_timeout_ms: u32,

    // --- Connectivity ---
    /// Interval between two connectivity checks (ms)
    pub connectivity_check_interval_ms: u32,
    /// Upper bound of the blocking connect routine (ms)
    pub connect_timeout_ms: u32,

    // --- Time ---
    /// Fixed local offset applied to log timestamps (seconds east of UTC)
    pub utc_offset_secs: i32,
    /// Wall-clock years at or below this are treated as "not synced yet"
    pub time_sync_sentinel_year: i32,

    // --- Loop ---
    /// Idle delay at the end of each control loop iteration (ms)
    pub loop_idle_ms: u32,

    // --- Event log ---
    /// Logical path of the persistent event log
    pub log_path: heapless::String<64>,
}

/// Default location of the event log on the SPIFFS partition.
pub const DEFAULT_LOG_PATH: &str = "/spiffs/log_sentinela.txt";

impl Default for SystemConfig {
    fn default() -> Self {
        let mut log_path = heapless::String::new();
        // DEFAULT_LOG_PATH is well under the 64-byte capacity.
        let _ = log_path.push_str(DEFAULT_LOG_PATH);

        Self {
            // Radio remote
            radio_arm_code: 1_234_567,
            radio_disarm_code: 7_654_321,

            // Button
            button_debounce_ms: 50,

            // Remote chat
            remote_poll_interval_ms: 3_000,
            operator_chat_id: 0,
            http_timeout_ms: 10_000,

            // Connectivity
            connectivity_check_interval_ms: 10_000,
            connect_timeout_ms: 15_000,

            // Time
            utc_offset_secs: -3 * 3600, // BRT
            time_sync_sentinel_year: 2020,

            // Loop
            loop_idle_ms: 10,

            log_path,
        }
    }
}

// ---------------------------------------------------------------------------
// Build-time secrets
// ---------------------------------------------------------------------------

/// Network and bot secrets, baked in at build time from environment
/// variables so they never end up in a plaintext NVS namespace.
#[derive(Clone)]
pub struct Credentials {
    pub wifi_ssid: &'static str,
    pub wifi_password: &'static str,
    pub bot_token: &'static str,
    /// Operator chat id as text; parsed with [`Credentials::chat_id`].
    pub chat_id: &'static str,
}

impl Credentials {
    /// Read the secrets captured by `option_env!` at compile time.
    /// Missing variables become empty strings and are rejected later by
    /// the adapters that need them.
    pub const fn from_build_env() -> Self {
        Self {
            wifi_ssid: match option_env!("SENTINELA_WIFI_SSID") {
                Some(v) => v,
                None => "",
            },
            wifi_password: match option_env!("SENTINELA_WIFI_PASSWORD") {
                Some(v) => v,
                None => "",
            },
            bot_token: match option_env!("SENTINELA_BOT_TOKEN") {
                Some(v) => v,
                None => "",
            },
            chat_id: match option_env!("SENTINELA_CHAT_ID") {
                Some(v) => v,
                None => "",
            },
        }
    }

    /// Operator chat id, if one was configured and parses as an integer.
    pub fn chat_id(&self) -> Option<i64> {
        self.chat_id.trim().parse().ok()
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Never print secrets to the serial console.
        f.debug_struct("Credentials")
            .field("wifi_ssid", &self.wifi_ssid)
            .field("wifi_password", &"***")
            .field("bot_token", &"***")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}
