//! Arming state machine.
//!
//! ```text
//!               arm                 motion
//!  Disarmed ─────────▶ ArmedIdle ─────────▶ ArmedTriggered
//!     ▲                    │                      │
//!     └──── disarm ────────┴────── disarm ────────┘
//! ```
//!
//! `triggered ⇒ armed` holds after every method: the only way into
//! `triggered` is motion while armed, and disarm clears both flags.
//! There is no timeout out of `ArmedTriggered`; the siren sounds until
//! somebody disarms.  Further motion while triggered does nothing, so the
//! operator is not spammed while the siren is already ringing.
//!
//! Side effects per transition: the siren output, one durable log record,
//! one best-effort notification.  Notification failures are logged and
//! ignored; they never undo the transition or the log write.

use log::{info, warn};

use super::commands::CommandSource;
use super::event_log::EventLog;
use super::messages;
use super::ports::{LogStore, NotificationSink, SirenPort, TextFormat, TimeSource};

/// The two flags that make up the alarm state.  Lives only in RAM; a
/// reboot always starts disarmed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmState {
    pub armed: bool,
    pub triggered: bool,
}

impl AlarmState {
    pub fn phase(self) -> AlarmPhase {
        match (self.armed, self.triggered) {
            (false, _) => AlarmPhase::Disarmed,
            (true, false) => AlarmPhase::ArmedIdle,
            (true, true) => AlarmPhase::ArmedTriggered,
        }
    }
}

/// Named view of [`AlarmState`] for logs and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmPhase {
    Disarmed,
    ArmedIdle,
    ArmedTriggered,
}

/// Outcome of [`AlarmController::arm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    Armed,
    AlreadyArmed,
}

#[derive(Debug, Default)]
pub struct AlarmController {
    state: AlarmState,
}

impl AlarmController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the system.  Arming an armed system changes nothing and writes
    /// no log record; the operator still gets an "already armed" reply.
    pub fn arm(
        &mut self,
        source: CommandSource,
        log: &mut EventLog<impl LogStore, impl TimeSource>,
        notifier: &mut impl NotificationSink,
    ) -> ArmOutcome {
        if self.state.armed {
            info!("Alarm: arm from {} ignored, already armed", source);
            send(notifier, messages::ALREADY_ARMED, TextFormat::Plain);
            return ArmOutcome::AlreadyArmed;
        }

        self.state = AlarmState {
            armed: true,
            triggered: false,
        };
        let text = messages::armed(source);
        log.append(&text);
        send(notifier, &text, TextFormat::Plain);
        ArmOutcome::Armed
    }

    /// Disarm unconditionally.  Always silences the siren and always
    /// writes a record, even when already disarmed.
    pub fn disarm(
        &mut self,
        source: CommandSource,
        siren: &mut impl SirenPort,
        log: &mut EventLog<impl LogStore, impl TimeSource>,
        notifier: &mut impl NotificationSink,
    ) {
        siren.set_siren(false);
        self.state = AlarmState::default();
        let text = messages::disarmed(source);
        log.append(&text);
        send(notifier, &text, TextFormat::Plain);
    }

    /// Feed one motion observation.  Returns `true` if this call triggered
    /// the alarm.
    pub fn report_motion(
        &mut self,
        siren: &mut impl SirenPort,
        log: &mut EventLog<impl LogStore, impl TimeSource>,
        notifier: &mut impl NotificationSink,
    ) -> bool {
        if !self.state.armed || self.state.triggered {
            return false;
        }

        self.state.triggered = true;
        siren.set_siren(true);
        log.append(messages::ALARM_TRIGGERED_RECORD);
        send(notifier, messages::ALARM_TRIGGERED, TextFormat::Plain);
        true
    }

    pub fn status(&self) -> AlarmState {
        self.state
    }

    pub fn phase(&self) -> AlarmPhase {
        self.state.phase()
    }
}

fn send(notifier: &mut impl NotificationSink, text: &str, format: TextFormat) {
    if let Err(e) = notifier.send(text, format) {
        warn!("Alarm: notification not delivered ({}): {}", e, text);
    }
}
