//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements          | Connects to                   |
//! |-------------|---------------------|-------------------------------|
//! | `hardware`  | SirenPort           | relay GPIO                    |
//! |             | MotionSensorPort    | PIR GPIO                      |
//! |             | ButtonPort          | push-button GPIO              |
//! | `log_sink`  | EventSink           | Serial log output             |
//! | `log_store` | LogStore            | SPIFFS file / host directory  |
//! | `nvs`       | ConfigPort          | NVS / in-memory store         |
//! | `telegram`  | RemoteCommandSource | Telegram Bot API over HTTPS   |
//! |             | NotificationSink    |                               |
//! | `time`      | TimeSource          | RTC (SNTP-disciplined)        |
//! | `wifi`      | ConnectivityPort    | ESP-IDF WiFi STA              |
//!
//! The 433 MHz receiver lives in [`crate::drivers::rf_receiver`] since it
//! owns an interrupt handler.

pub mod hardware;
pub mod log_sink;
pub mod log_store;
pub mod nvs;
pub mod telegram;
pub mod time;
pub(super) mod utils;
pub mod wifi;
