//! Sentinela Firmware: Main Entry Point
//!
//! Hexagonal architecture around a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter     RfReceiver       FileLogStore  NvsAdapter │
//! │  (Siren+PIR+Button)  (433 MHz, ISR)   (SPIFFS)      (Config)   │
//! │  WifiAdapter         TelegramBot      LogEventSink             │
//! │  (Connectivity)      (Remote+Notify)  (EventSink)              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AlarmService (pure logic)                 │    │
//! │  │  AlarmController · channels · EventLog · link watch    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  loop { tick(uptime) · feed watchdog · idle }                  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{error, info, warn};

use sentinela::adapters::hardware::HardwareAdapter;
use sentinela::adapters::log_sink::LogEventSink;
use sentinela::adapters::log_store::{self, FileLogStore};
use sentinela::adapters::nvs::NvsAdapter;
use sentinela::adapters::telegram::TelegramBot;
use sentinela::adapters::telegram::http::EspHttpTransport;
use sentinela::adapters::time::{self, Esp32TimeAdapter, SystemTimeSource};
use sentinela::adapters::wifi::WifiAdapter;
use sentinela::app::ports::{ConfigPort, WatchdogPort};
use sentinela::app::service::AlarmService;
use sentinela::config::{Credentials, SystemConfig};
use sentinela::drivers::rf_receiver::{self, RfReceiver};
use sentinela::drivers::watchdog::Watchdog;
use sentinela::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Sentinela v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let watchdog = Watchdog::new();
    let credentials = Credentials::from_build_env();
    info!("{:?}", credentials);

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut config = match NvsAdapter::new().and_then(|nvs| nvs.load()) {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };
    if config.operator_chat_id == 0 {
        config.operator_chat_id = credentials.chat_id().unwrap_or(0);
    }

    // ── 3. Storage ────────────────────────────────────────────
    if let Err(e) = log_store::mount_spiffs() {
        // The loop still runs; the event log degrades to the console.
        error!("{}", e);
    }
    let store = FileLogStore::new(config.log_path.as_str());

    // ── 4. Discrete I/O ───────────────────────────────────────
    let peripherals = Peripherals::take()?;

    // SAFETY: each GPIO number in `pins` is claimed exactly once here and
    // nowhere else in the firmware.
    let (pir_pin, relay_pin, button_pin) = unsafe {
        (
            AnyInputPin::new(pins::PIR_GPIO),
            AnyOutputPin::new(pins::RELAY_GPIO),
            AnyInputPin::new(pins::BUTTON_GPIO),
        )
    };
    let pir = PinDriver::input(pir_pin)?;
    let relay = PinDriver::output(relay_pin)?;
    let mut button = PinDriver::input(button_pin)?;
    button.set_pull(Pull::Up)?;
    let mut hw = HardwareAdapter::new(pir, relay, button);

    rf_receiver::init_rf_isr(pins::RF_RECEIVER_GPIO)?;
    let mut radio = RfReceiver::new();

    // ── 5. Network ────────────────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let esp_wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs_partition))?;
    let mut wifi = WifiAdapter::new(esp_wifi);
    if let Err(e) = wifi.set_credentials(credentials.wifi_ssid, credentials.wifi_password) {
        error!("WiFi credentials rejected: {}", e);
    }

    let mut bot = TelegramBot::new(
        EspHttpTransport::new(config.http_timeout_ms),
        credentials.bot_token,
        config.operator_chat_id,
    )
    .map_err(sentinela::Error::from)?;

    // ── 6. App service ────────────────────────────────────────
    let mut log_sink = LogEventSink::new();
    let mut app = AlarmService::new(&config, store, SystemTimeSource);
    app.start(&mut log_sink);

    watchdog.feed();
    app.establish_link(&mut wifi, &mut log_sink);
    watchdog.feed();

    // Kept alive for the whole run; dropping it stops time sync.
    let _sntp = match time::start_sntp() {
        Ok(sntp) => Some(sntp),
        Err(e) => {
            warn!("{}: log timestamps stay unsynced", e);
            None
        }
    };

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    loop {
        app.tick(
            clock.uptime_ms(),
            &mut hw,
            &mut radio,
            &mut wifi,
            &mut bot,
            &mut log_sink,
            &watchdog,
        );

        watchdog.feed();
        FreeRtos::delay_ms(config.loop_idle_ms);
    }
}
