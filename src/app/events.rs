//! Outbound diagnostic events.
//!
//! The [`AlarmService`](super::service::AlarmService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  They are the
//! secondary diagnostic channel: the durable record of what happened is
//! the [`EventLog`](super::event_log::EventLog), these only mirror it to
//! the serial console.

use super::commands::{CommandKind, CommandSource};
use super::controller::AlarmPhase;

/// Structured events emitted by the alarm core.
#[derive(Debug, Clone, PartialEq)]
pub enum AlarmEvent {
    /// The service has started (carries the initial phase).
    Started(AlarmPhase),

    /// The arming state machine moved between phases.
    PhaseChanged { from: AlarmPhase, to: AlarmPhase },

    /// A decoded command is about to be dispatched.
    CommandReceived { kind: CommandKind, source: CommandSource },

    /// The network link went down or came back.
    LinkChanged { up: bool },
}
