//! Durable, append-only event log.
//!
//! Every state transition lands here as one line:
//!
//! ```text
//! [2025-06-12 12:04:05] 🔒 Sistema ARMADO com sucesso pela origem: chat
//! [sincronizando relogio...] Sistema iniciado e configurado.
//! ```
//!
//! Records are never edited or removed and the log has no size cap.
//! Storage failures are reported on the serial console only; they never
//! reach the caller, so a dead flash chip cannot stop the alarm.

use log::{error, info, warn};

use super::clock::{Clock, Timestamp};
use super::messages;
use super::ports::{LogStore, NotificationSink, NotifyError, StorageError, TimeSource};

/// One parsed log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: String,
    pub message: String,
}

impl LogRecord {
    /// Render as the persisted line (without the trailing newline).
    pub fn to_line(&self) -> String {
        format!("[{}] {}", self.timestamp, self.message)
    }

    /// Parse a persisted line.  Returns `None` for lines not in
    /// `[timestamp] message` form.
    pub fn parse_line(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('[')?;
        let (timestamp, message) = rest.split_once("] ")?;
        Some(Self {
            timestamp: timestamp.to_owned(),
            message: message.to_owned(),
        })
    }
}

/// Result of reading the whole log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogContents {
    /// The store exists but holds no records.
    Empty,
    /// Raw bytes exactly as persisted.
    Data(Vec<u8>),
}

/// What an [`EventLog::export`] request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The full log was handed to the notification sink as one file.
    Sent,
    /// The log was read but the file transfer failed.
    TransferFailed(NotifyError),
    /// The log was empty; the operator was told so, no transfer attempted.
    Empty,
    /// The store could not be read; the operator was told so.
    Unreadable(StorageError),
}

pub struct EventLog<S: LogStore, T: TimeSource> {
    store: S,
    clock: Clock<T>,
}

impl<S: LogStore, T: TimeSource> EventLog<S, T> {
    pub fn new(store: S, clock: Clock<T>) -> Self {
        Self { store, clock }
    }

    /// Stamp `message` with the current time and persist it.
    ///
    /// Line breaks inside `message` are flattened to spaces so one record
    /// is always one line.  Storage failures are logged, not returned.
    pub fn append(&mut self, message: &str) {
        let record = LogRecord {
            timestamp: self.clock.now().to_string(),
            message: flatten(message),
        };
        let line = record.to_line();
        info!("{}", line);

        if let Err(e) = self.store.append_line(&line) {
            error!("EventLog: could not persist record ({}): {}", e, line);
        }
    }

    /// Everything persisted so far.
    pub fn read_all(&self) -> Result<LogContents, StorageError> {
        let bytes = self.store.read_all()?;
        if bytes.is_empty() {
            Ok(LogContents::Empty)
        } else {
            Ok(LogContents::Data(bytes))
        }
    }

    /// Parsed records in append order.  Lines that do not parse (e.g. a
    /// record cut short by a power loss) are skipped with a warning.
    pub fn records(&self) -> Result<Vec<LogRecord>, StorageError> {
        let bytes = match self.read_all()? {
            LogContents::Empty => return Ok(Vec::new()),
            LogContents::Data(bytes) => bytes,
        };
        let text = String::from_utf8_lossy(&bytes);
        let mut records = Vec::new();
        for line in text.lines().filter(|l| !l.is_empty()) {
            match LogRecord::parse_line(line) {
                Some(record) => records.push(record),
                None => warn!("EventLog: skipping malformed line {:?}", line),
            }
        }
        Ok(records)
    }

    /// Stored size in bytes.
    pub fn size(&self) -> Result<u64, StorageError> {
        self.store.size()
    }

    /// Deliver the whole log, untouched, to the operator as one file.
    pub fn export(&self, notifier: &mut impl NotificationSink) -> ExportOutcome {
        let outcome = match self.read_all() {
            Ok(LogContents::Data(bytes)) => {
                match notifier.send_file(&bytes, messages::LOG_EXPORT_FILENAME) {
                    Ok(()) => ExportOutcome::Sent,
                    Err(e) => {
                        warn!("EventLog: export transfer failed: {}", e);
                        ExportOutcome::TransferFailed(e)
                    }
                }
            }
            Ok(LogContents::Empty) => {
                notify(notifier, messages::LOG_EMPTY);
                ExportOutcome::Empty
            }
            Err(e) => {
                warn!("EventLog: cannot read log for export: {}", e);
                notify(notifier, messages::LOG_UNREADABLE);
                ExportOutcome::Unreadable(e)
            }
        };
        info!("EventLog: export -> {:?}", outcome);
        outcome
    }

    /// Current timestamp as the log would stamp it.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

fn flatten(message: &str) -> String {
    message.replace(['\r', '\n'], " ")
}

fn notify(notifier: &mut impl NotificationSink, text: &str) {
    if let Err(e) = notifier.send(text, super::ports::TextFormat::Plain) {
        warn!("EventLog: notification failed: {}", e);
    }
}
