//! Connectivity supervision.
//!
//! Tracks the last known link state so that only *edges* reach the
//! durable log and the operator:
//!
//! ```text
//!            link down (checked every 10 s)
//!   Up ────────────────────────────────────▶ Down   log "perdida"
//!    ▲                                         │
//!    │   reconnect ok / link found up          │    bounded blocking
//!    └─────────────────────────────────────────┘    connect (15 s)
//!        log "restabelecida" + notify operator
//! ```
//!
//! A failed reconnect while already down is only a console warning;
//! otherwise an unplugged router would grow the log every ten seconds.

use log::{info, warn};

use super::event_log::EventLog;
use super::interval::IntervalGate;
use super::messages;
use super::ports::{ConnectivityPort, LogStore, NotificationSink, TextFormat, TimeSource};

/// A link state transition observed by [`ConnectivitySupervisor::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEdge {
    Lost,
    Restored,
}

pub struct ConnectivitySupervisor {
    gate: IntervalGate,
    connect_timeout_ms: u32,
    connected: bool,
}

impl ConnectivitySupervisor {
    pub fn new(check_interval_ms: u32, connect_timeout_ms: u32) -> Self {
        Self {
            gate: IntervalGate::new(check_interval_ms),
            connect_timeout_ms,
            connected: false,
        }
    }

    /// Startup connect.  Blocks for at most the connect timeout.
    pub fn establish(
        &mut self,
        link: &mut impl ConnectivityPort,
        log: &mut EventLog<impl LogStore, impl TimeSource>,
    ) -> bool {
        if link.is_up() {
            self.connected = true;
            return true;
        }

        match link.connect(self.connect_timeout_ms) {
            Ok(()) => {
                info!("Link: connected at startup");
                log.append(messages::LINK_CONNECTED);
                self.connected = true;
            }
            Err(e) => {
                warn!("Link: startup connect failed: {}", e);
                log.append(messages::LINK_CONNECT_FAILED);
                self.connected = false;
            }
        }
        self.connected
    }

    /// Interval-gated link check with opportunistic reconnect.
    pub fn poll(
        &mut self,
        now_ms: u32,
        link: &mut impl ConnectivityPort,
        log: &mut EventLog<impl LogStore, impl TimeSource>,
        notifier: &mut impl NotificationSink,
    ) -> Option<ConnectivityEdge> {
        if !self.gate.try_fire(now_ms) {
            return None;
        }

        if link.is_up() {
            return self.mark_up(log, notifier);
        }

        let mut edge = None;
        if self.connected {
            warn!("Link: lost");
            log.append(messages::LINK_LOST);
            self.connected = false;
            edge = Some(ConnectivityEdge::Lost);
        }

        match link.connect(self.connect_timeout_ms) {
            // Lost and restored inside one check: the restore is the edge
            // the operator can actually be told about.
            Ok(()) => self.mark_up(log, notifier).or(edge),
            Err(e) => {
                warn!("Link: reconnect failed: {}", e);
                edge
            }
        }
    }

    fn mark_up(
        &mut self,
        log: &mut EventLog<impl LogStore, impl TimeSource>,
        notifier: &mut impl NotificationSink,
    ) -> Option<ConnectivityEdge> {
        if self.connected {
            return None;
        }
        info!("Link: restored");
        self.connected = true;
        log.append(messages::LINK_RESTORED);
        if let Err(e) = notifier.send(messages::LINK_RESTORED_NOTICE, TextFormat::Plain) {
            warn!("Link: restore notice not delivered: {}", e);
        }
        Some(ConnectivityEdge::Restored)
    }

    /// Link state as of the last check.
    pub fn is_connected(&self) -> bool {
        self.connected
    }
}
