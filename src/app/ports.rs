//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AlarmService (domain)
//! ```
//!
//! Driven adapters (pins, radio, chat bot, file system, WiFi, clock)
//! implement these traits.  The [`AlarmService`](super::service::AlarmService)
//! consumes them via generics, so the domain core never touches hardware
//! or the network directly.
//!
//! ## Failure policy
//!
//! - No port error is fatal.  The control loop logs and carries on.
//! - **NotificationSink** is best-effort: a failed delivery never rolls
//!   back a state transition.
//! - **LogStore** failures degrade to the serial console only.

use crate::config::SystemConfig;

// ───────────────────────────────────────────────────────────────
// Hardware ports (driven adapter: GPIO ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Siren relay output.
pub trait SirenPort {
    /// Energise (`true`) or release (`false`) the siren relay.
    fn set_siren(&mut self, on: bool);

    /// Whether the relay is currently energised.
    fn is_siren_on(&self) -> bool;
}

/// PIR motion sensor input, read directly by the controller every tick.
pub trait MotionSensorPort {
    fn motion_detected(&mut self) -> bool;
}

/// Raw physical button level.  Pull-up wiring: `true` (HIGH) is released,
/// `false` (LOW) is pressed.
pub trait ButtonPort {
    fn read_level(&mut self) -> bool;
}

/// 433 MHz receiver holding at most one decoded value.
pub trait RadioReceiverPort {
    /// Take the buffered code, if any.  The buffer is empty afterwards.
    fn take_code(&mut self) -> Option<u32>;
}

// ───────────────────────────────────────────────────────────────
// Remote chat ports (driven adapter: network ↔ domain)
// ───────────────────────────────────────────────────────────────

/// One inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMessage {
    /// Monotonic identifier assigned by the remote service.
    pub update_id: i64,
    /// Chat the message was sent from.
    pub chat_id: i64,
    pub text: String,
}

/// Pull-style source of operator chat messages.
pub trait RemoteCommandSource {
    /// Fetch every message with an identifier strictly greater than `after`
    /// (all pending messages when `after` is `None`).
    fn fetch_since(&mut self, after: Option<i64>) -> Result<Vec<RemoteMessage>, RemoteError>;
}

/// Text rendering requested from the notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// Sent verbatim.
    Plain,
    /// Lightweight markup (`*bold*`), rendered by the chat client.
    RichText,
}

/// Outbound operator notifications.  Best-effort; no delivery receipt.
pub trait NotificationSink {
    fn send(&mut self, text: &str, format: TextFormat) -> Result<(), NotifyError>;

    /// Deliver `bytes` as one file attachment named `filename`.
    fn send_file(&mut self, bytes: &[u8], filename: &str) -> Result<(), NotifyError>;
}

/// Network reachability.
pub trait ConnectivityPort {
    /// Non-blocking link status query.
    fn is_up(&self) -> bool;

    /// Blocking (re)connect, bounded by `timeout_ms`.  This is the only
    /// blocking call allowed on the control thread.
    fn connect(&mut self, timeout_ms: u32) -> Result<(), ConnectivityError>;
}

// ───────────────────────────────────────────────────────────────
// Persistence ports
// ───────────────────────────────────────────────────────────────

/// Append-only byte store behind the [`EventLog`](super::event_log::EventLog).
pub trait LogStore {
    /// Append one already-formatted record line (no trailing newline).
    fn append_line(&mut self, line: &str) -> Result<(), StorageError>;

    /// Whole store content, exactly as written.
    fn read_all(&self) -> Result<Vec<u8>, StorageError>;

    /// Stored size in bytes.
    fn size(&self) -> Result<u64, StorageError>;
}

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting and
/// reject invalid ranges with [`ConfigError::ValidationFailed`] instead of
/// clamping them.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Time + diagnostics ports
// ───────────────────────────────────────────────────────────────

/// Wall-clock source.  Before network time sync this returns whatever the
/// RTC booted with (usually close to the epoch).
pub trait TimeSource {
    /// Seconds since 1970-01-01T00:00:00Z.
    fn unix_time(&self) -> i64;
}

/// The domain emits structured [`AlarmEvent`](super::events::AlarmEvent)s
/// through this port.  Adapters decide where they go (serial console today).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AlarmEvent);
}

/// Task watchdog.  The loop feeds it between blocking steps so that no
/// two feeds are further apart than one reconnect plus one HTTP request.
pub trait WatchdogPort {
    fn feed(&self);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`LogStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The store does not exist yet (nothing was ever appended).
    NotFound,
    /// The backing file system is not mounted or refused the open.
    Unavailable,
    /// Generic I/O error while reading or writing.
    IoError,
}

/// Errors from [`NotificationSink`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    /// No network path to the notification service.
    Offline,
    /// The service answered with a non-success status.
    Rejected(u16),
    /// Transport-level failure (TLS, socket, timeout).
    Transport,
}

/// Errors from [`ConnectivityPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    /// No credentials configured.
    NoCredentials,
    /// SSID is empty, too long or not printable ASCII.
    InvalidSsid,
    /// Password length is not valid for WPA2.
    InvalidPassword,
    /// The link did not come up before the timeout.
    Timeout,
    /// The driver refused the connection attempt.
    ConnectionFailed,
}

/// Errors from [`RemoteCommandSource`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteError {
    /// Transport-level failure.
    Transport,
    /// The service answered with a non-success status.
    Status(u16),
    /// The response body could not be decoded.
    Malformed,
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "log store not found"),
            Self::Unavailable => write!(f, "log store unavailable"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Offline => write!(f, "notification channel offline"),
            Self::Rejected(status) => write!(f, "notification rejected (HTTP {})", status),
            Self::Transport => write!(f, "notification transport error"),
        }
    }
}

impl core::fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::Timeout => write!(f, "WiFi connect timed out"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl core::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transport => write!(f, "remote transport error"),
            Self::Status(status) => write!(f, "remote service returned HTTP {}", status),
            Self::Malformed => write!(f, "malformed remote response"),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
