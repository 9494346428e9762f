//! Application service: the hexagonal core.
//!
//! [`AlarmService`] owns the arming controller, the durable event log, the
//! three input channels and the connectivity supervisor.  Every piece of
//! I/O flows through port traits injected at call sites, so the whole
//! service runs on the host against mock adapters.
//!
//! ```text
//!  ConnectivityPort ──▶ ┌──────────────────────────┐
//!   RemoteCommand   ──▶ │       AlarmService        │ ──▶ NotificationSink
//!   RadioReceiver   ──▶ │  channels → dispatch →    │ ──▶ SirenPort
//!   ButtonPort      ──▶ │  AlarmController          │ ──▶ EventSink
//!   MotionSensor    ──▶ │  EventLog (LogStore)      │
//!                       └──────────────────────────┘
//! ```
//!
//! ## Tick order
//!
//! One [`AlarmService::tick`] runs, in this order: connectivity check,
//! remote poll, radio, button, motion.  Each channel's command is
//! dispatched before the next channel is read, so a button press always
//! toggles relative to the state left by an earlier command in the same
//! tick, and a command always lands before that tick's motion check.
//!
//! The watchdog is fed after every step that may block on the network,
//! so the longest unfed stretch is one reconnect plus the restore notice.

use log::{info, warn};

use crate::config::SystemConfig;

use super::channels::{ButtonChannel, RadioChannel, RemoteCommandChannel};
use super::clock::Clock;
use super::commands::{Command, CommandKind, UnknownInput};
use super::connectivity::{ConnectivityEdge, ConnectivitySupervisor};
use super::controller::{AlarmController, AlarmPhase, AlarmState};
use super::event_log::{EventLog, ExportOutcome};
use super::events::AlarmEvent;
use super::messages;
use super::ports::{
    ButtonPort, ConnectivityPort, EventSink, LogStore, MotionSensorPort, NotificationSink,
    RadioReceiverPort, RemoteCommandSource, SirenPort, TextFormat, TimeSource, WatchdogPort,
};

// ───────────────────────────────────────────────────────────────
// AlarmService
// ───────────────────────────────────────────────────────────────

pub struct AlarmService<S: LogStore, T: TimeSource> {
    controller: AlarmController,
    log: EventLog<S, T>,
    remote: RemoteCommandChannel,
    radio: RadioChannel,
    button: ButtonChannel,
    link: ConnectivitySupervisor,
}

impl<S: LogStore, T: TimeSource> AlarmService<S, T> {
    /// Construct the service.  Does **not** write anything yet; call
    /// [`start`](Self::start) once the log store is mounted.
    pub fn new(config: &SystemConfig, store: S, time_source: T) -> Self {
        let clock = Clock::new(
            time_source,
            config.utc_offset_secs,
            config.time_sync_sentinel_year,
        );
        Self {
            controller: AlarmController::new(),
            log: EventLog::new(store, clock),
            remote: RemoteCommandChannel::new(
                config.remote_poll_interval_ms,
                config.operator_chat_id,
            ),
            radio: RadioChannel::new(config.radio_arm_code, config.radio_disarm_code),
            button: ButtonChannel::new(config.button_debounce_ms),
            link: ConnectivitySupervisor::new(
                config.connectivity_check_interval_ms,
                config.connect_timeout_ms,
            ),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Record the boot and announce the initial (disarmed) phase.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.log.append(messages::BOOT_RECORD);
        sink.emit(&AlarmEvent::Started(self.controller.phase()));
        info!("AlarmService started in {:?}", self.controller.phase());
    }

    /// Blocking startup connect, bounded by the configured timeout.
    pub fn establish_link(
        &mut self,
        link: &mut impl ConnectivityPort,
        sink: &mut impl EventSink,
    ) -> bool {
        let up = self.link.establish(link, &mut self.log);
        sink.emit(&AlarmEvent::LinkChanged { up });
        up
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop iteration.
    ///
    /// `hw` satisfies the siren, motion and button ports at once, and
    /// `bot` is both the command source and the notification sink; this
    /// avoids double mutable borrows of the same adapter.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SirenPort + MotionSensorPort + ButtonPort),
        radio: &mut impl RadioReceiverPort,
        link: &mut impl ConnectivityPort,
        bot: &mut (impl RemoteCommandSource + NotificationSink),
        sink: &mut impl EventSink,
        wdt: &impl WatchdogPort,
    ) {
        // 1. Connectivity
        if let Some(edge) = self.link.poll(now_ms, link, &mut self.log, bot) {
            sink.emit(&AlarmEvent::LinkChanged {
                up: edge == ConnectivityEdge::Restored,
            });
        }
        wdt.feed();

        // 2. Remote chat
        let remote_cmd = self.remote.poll(now_ms, link.is_up(), bot);
        wdt.feed();
        if let Some(cmd) = remote_cmd {
            self.dispatch(cmd, hw, bot, sink);
            wdt.feed();
        }

        // 3. Radio
        if let Some(cmd) = self.radio.poll(radio) {
            self.dispatch(cmd, hw, bot, sink);
            wdt.feed();
        }

        // 4. Button
        let armed = self.controller.status().armed;
        if let Some(cmd) = self.button.poll(now_ms, hw, armed) {
            self.dispatch(cmd, hw, bot, sink);
            wdt.feed();
        }

        // 5. Motion
        if hw.motion_detected() {
            let from = self.controller.phase();
            if self.controller.report_motion(hw, &mut self.log, bot) {
                emit_phase_change(sink, from, self.controller.phase());
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// The single place where decoded commands take effect.
    pub fn dispatch(
        &mut self,
        cmd: Command,
        siren: &mut impl SirenPort,
        notifier: &mut impl NotificationSink,
        sink: &mut impl EventSink,
    ) {
        sink.emit(&AlarmEvent::CommandReceived {
            kind: cmd.kind.clone(),
            source: cmd.source,
        });
        let from = self.controller.phase();

        match cmd.kind {
            CommandKind::Arm => {
                self.controller.arm(cmd.source, &mut self.log, notifier);
            }
            CommandKind::Disarm => {
                self.controller
                    .disarm(cmd.source, siren, &mut self.log, notifier);
            }
            CommandKind::StatusQuery => {
                let report = messages::status_report(self.controller.status());
                reply(notifier, &report, TextFormat::RichText);
            }
            CommandKind::LogRequest => {
                if let ExportOutcome::Unreadable(e) = self.log.export(notifier) {
                    info!("Log export refused: {}", e);
                }
            }
            CommandKind::Unknown(UnknownInput::Text(_)) => {
                reply(notifier, &messages::help(), TextFormat::Plain);
            }
            CommandKind::Unknown(UnknownInput::RadioCode(code)) => {
                self.log.append(&messages::unknown_radio_code(code));
            }
        }

        emit_phase_change(sink, from, self.controller.phase());
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> AlarmState {
        self.controller.status()
    }

    pub fn phase(&self) -> AlarmPhase {
        self.controller.phase()
    }

    /// Link state as of the last connectivity check.
    pub fn is_link_up(&self) -> bool {
        self.link.is_connected()
    }

    pub fn event_log(&self) -> &EventLog<S, T> {
        &self.log
    }
}

fn emit_phase_change(sink: &mut impl EventSink, from: AlarmPhase, to: AlarmPhase) {
    if from != to {
        sink.emit(&AlarmEvent::PhaseChanged { from, to });
    }
}

fn reply(notifier: &mut impl NotificationSink, text: &str, format: TextFormat) {
    if let Err(e) = notifier.send(text, format) {
        warn!("Reply not delivered: {}", e);
    }
}
