//! Mock adapters for integration tests.
//!
//! Records every output so tests can assert on the full history without
//! touching real GPIO, flash or network.  The WiFi and 433 MHz adapters
//! are the real ones in their host simulation mode.

use std::cell::Cell;
use std::rc::Rc;

use sentinela::adapters::wifi::WifiAdapter;
use sentinela::app::events::AlarmEvent;
use sentinela::app::ports::{
    ButtonPort, EventSink, LogStore, MotionSensorPort, NotificationSink, NotifyError,
    RemoteCommandSource, RemoteError, RemoteMessage, SirenPort, StorageError, TextFormat,
    TimeSource, WatchdogPort,
};
use sentinela::app::service::AlarmService;
use sentinela::config::SystemConfig;
use sentinela::drivers::rf_receiver::RfReceiver;

/// Chat the tests talk from.
pub const OPERATOR_CHAT: i64 = 4242;

/// 2025-06-12 12:00:00 UTC.
pub const SYNCED_EPOCH: i64 = 1_749_729_600;

// ── Discrete I/O ──────────────────────────────────────────────

pub struct MockHardware {
    pub motion: bool,
    /// Raw button level; HIGH is released.
    pub button_level: bool,
    pub siren: bool,
    pub siren_writes: Vec<bool>,
}

impl MockHardware {
    pub fn new() -> Self {
        Self {
            motion: false,
            button_level: true,
            siren: false,
            siren_writes: Vec::new(),
        }
    }
}

impl SirenPort for MockHardware {
    fn set_siren(&mut self, on: bool) {
        self.siren = on;
        self.siren_writes.push(on);
    }

    fn is_siren_on(&self) -> bool {
        self.siren
    }
}

impl MotionSensorPort for MockHardware {
    fn motion_detected(&mut self) -> bool {
        self.motion
    }
}

impl ButtonPort for MockHardware {
    fn read_level(&mut self) -> bool {
        self.button_level
    }
}

// ── Chat bot ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String, TextFormat),
    File(Vec<u8>, String),
}

#[derive(Default)]
pub struct MockBot {
    inbox: Vec<RemoteMessage>,
    next_update_id: i64,
    pub fetches: Vec<Option<i64>>,
    pub outbox: Vec<Outbound>,
    pub offline: bool,
    /// Shared with the rig's watchdog.
    feeds: Rc<Cell<u32>>,
    /// Watchdog feed count at the moment of every network call.
    pub feeds_at_call: Vec<u32>,
}

#[allow(dead_code)]
impl MockBot {
    pub fn say(&mut self, chat_id: i64, text: &str) {
        self.next_update_id += 1;
        self.inbox.push(RemoteMessage {
            update_id: self.next_update_id,
            chat_id,
            text: text.to_owned(),
        });
    }

    fn network_call(&mut self) {
        self.feeds_at_call.push(self.feeds.get());
    }

    pub fn texts(&self) -> Vec<&str> {
        self.outbox
            .iter()
            .filter_map(|o| match o {
                Outbound::Text(t, _) => Some(t.as_str()),
                Outbound::File(..) => None,
            })
            .collect()
    }

    pub fn files(&self) -> Vec<(&[u8], &str)> {
        self.outbox
            .iter()
            .filter_map(|o| match o {
                Outbound::File(bytes, name) => Some((bytes.as_slice(), name.as_str())),
                Outbound::Text(..) => None,
            })
            .collect()
    }
}

impl RemoteCommandSource for MockBot {
    fn fetch_since(&mut self, after: Option<i64>) -> Result<Vec<RemoteMessage>, RemoteError> {
        self.network_call();
        self.fetches.push(after);
        if self.offline {
            return Err(RemoteError::Transport);
        }
        Ok(self
            .inbox
            .iter()
            .filter(|m| after.is_none_or(|a| m.update_id > a))
            .cloned()
            .collect())
    }
}

impl NotificationSink for MockBot {
    fn send(&mut self, text: &str, format: TextFormat) -> Result<(), NotifyError> {
        self.network_call();
        if self.offline {
            return Err(NotifyError::Offline);
        }
        self.outbox.push(Outbound::Text(text.to_owned(), format));
        Ok(())
    }

    fn send_file(&mut self, bytes: &[u8], filename: &str) -> Result<(), NotifyError> {
        self.network_call();
        if self.offline {
            return Err(NotifyError::Offline);
        }
        self.outbox.push(Outbound::File(bytes.to_vec(), filename.to_owned()));
        Ok(())
    }
}

// ── Storage + time ────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    pub bytes: Vec<u8>,
    pub broken: bool,
}

impl LogStore for MemoryStore {
    fn append_line(&mut self, line: &str) -> Result<(), StorageError> {
        if self.broken {
            return Err(StorageError::Unavailable);
        }
        self.bytes.extend_from_slice(line.as_bytes());
        self.bytes.push(b'\n');
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<u8>, StorageError> {
        if self.broken {
            return Err(StorageError::Unavailable);
        }
        Ok(self.bytes.clone())
    }

    fn size(&self) -> Result<u64, StorageError> {
        Ok(self.bytes.len() as u64)
    }
}

pub struct FixedTime(pub i64);

impl TimeSource for FixedTime {
    fn unix_time(&self) -> i64 {
        self.0
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AlarmEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AlarmEvent) {
        self.events.push(event.clone());
    }
}

/// Counts feeds instead of resetting anything.
#[derive(Default)]
pub struct CountingWatchdog(Rc<Cell<u32>>);

impl CountingWatchdog {
    pub fn feeds(&self) -> u32 {
        self.0.get()
    }
}

impl WatchdogPort for CountingWatchdog {
    fn feed(&self) {
        self.0.set(self.0.get() + 1);
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// The service plus every adapter it talks to, wired like `main`.
pub struct Rig {
    pub app: AlarmService<MemoryStore, FixedTime>,
    pub hw: MockHardware,
    pub radio: RfReceiver,
    pub wifi: WifiAdapter,
    pub bot: MockBot,
    pub sink: RecordingSink,
    pub wdt: CountingWatchdog,
    pub config: SystemConfig,
}

#[allow(dead_code)]
impl Rig {
    /// Started service with the link up and the clock synced.
    pub fn booted() -> Self {
        Self::booted_with(MemoryStore::default(), SYNCED_EPOCH)
    }

    pub fn booted_with(store: MemoryStore, unix_time: i64) -> Self {
        let mut rig = Self::unstarted(store, unix_time);
        rig.app.start(&mut rig.sink);
        rig.app.establish_link(&mut rig.wifi, &mut rig.sink);
        rig
    }

    /// Constructed but `start` not called yet.
    pub fn unstarted(store: MemoryStore, unix_time: i64) -> Self {
        let config = SystemConfig {
            operator_chat_id: OPERATOR_CHAT,
            ..SystemConfig::default()
        };
        let mut wifi = WifiAdapter::new();
        wifi.set_credentials("Casa", "senha-forte-123")
            .expect("test credentials are valid");
        let wdt = CountingWatchdog::default();
        let bot = MockBot {
            feeds: Rc::clone(&wdt.0),
            ..MockBot::default()
        };
        Self {
            app: AlarmService::new(&config, store, FixedTime(unix_time)),
            hw: MockHardware::new(),
            radio: RfReceiver::new(),
            wifi,
            bot,
            sink: RecordingSink::default(),
            wdt,
            config,
        }
    }

    pub fn tick(&mut self, now_ms: u32) {
        self.app.tick(
            now_ms,
            &mut self.hw,
            &mut self.radio,
            &mut self.wifi,
            &mut self.bot,
            &mut self.sink,
            &self.wdt,
        );
    }

    /// Every persisted record message, in order.
    pub fn log_messages(&self) -> Vec<String> {
        self.app
            .event_log()
            .records()
            .expect("store readable")
            .into_iter()
            .map(|r| r.message)
            .collect()
    }
}
