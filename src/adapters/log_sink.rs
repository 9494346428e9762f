//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured alarm events to the
//! ESP-IDF logger (UART in production).  The lines are tagged so they can
//! be grepped out of a serial capture.

use log::info;

use crate::app::events::AlarmEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AlarmEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AlarmEvent) {
        match event {
            AlarmEvent::Started(phase) => {
                info!("START | initial_phase={:?}", phase);
            }
            AlarmEvent::PhaseChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AlarmEvent::CommandReceived { kind, source } => {
                info!("CMD   | {:?} from {}", kind, source);
            }
            AlarmEvent::LinkChanged { up } => {
                info!("LINK  | {}", if *up { "up" } else { "down" });
            }
        }
    }
}
