//! The three command input channels.
//!
//! | Channel                  | Cadence                 | Decodes                          |
//! |--------------------------|-------------------------|----------------------------------|
//! | [`RemoteCommandChannel`] | interval-gated (3 s)    | chat text, exact vocabulary      |
//! | [`RadioChannel`]         | every tick              | key-fob code vs two constants    |
//! | [`ButtonChannel`]        | every tick              | debounced press → arm/disarm     |
//!
//! Every `poll` yields at most one [`Command`] so the service acts on at
//! most one command per channel per loop iteration.

use std::collections::VecDeque;

use log::{debug, info, warn};

use super::commands::{Command, CommandKind, CommandSource};
use super::debounce::{DebounceFilter, Edge};
use super::interval::IntervalGate;
use super::ports::{ButtonPort, RadioReceiverPort, RemoteCommandSource};

// ───────────────────────────────────────────────────────────────
// Remote chat
// ───────────────────────────────────────────────────────────────

/// Rate-limited chat poller.
///
/// A poll fetches every message newer than the last one seen.  The batch
/// is queued and handed out one command per tick; the next fetch happens
/// only once the queue is drained and the interval has elapsed.
pub struct RemoteCommandChannel {
    gate: IntervalGate,
    last_update_id: Option<i64>,
    operator_chat_id: i64,
    pending: VecDeque<Command>,
}

impl RemoteCommandChannel {
    /// `operator_chat_id` of 0 accepts every chat (unprovisioned device).
    pub fn new(poll_interval_ms: u32, operator_chat_id: i64) -> Self {
        Self {
            gate: IntervalGate::new(poll_interval_ms),
            last_update_id: None,
            operator_chat_id,
            pending: VecDeque::new(),
        }
    }

    /// Next command, fetching a new batch if the queue is empty, the link
    /// is up, and the poll interval has elapsed.
    pub fn poll(
        &mut self,
        now_ms: u32,
        link_up: bool,
        source: &mut impl RemoteCommandSource,
    ) -> Option<Command> {
        if self.pending.is_empty() && link_up && self.gate.is_due(now_ms) {
            self.fetch(source);
            self.gate.mark(now_ms);
        }
        self.pending.pop_front()
    }

    fn fetch(&mut self, source: &mut impl RemoteCommandSource) {
        let messages = match source.fetch_since(self.last_update_id) {
            Ok(messages) => messages,
            Err(e) => {
                warn!("Remote: poll failed: {}", e);
                return;
            }
        };

        for msg in messages {
            // Advance past everything we saw, accepted or not, so a foreign
            // message is never fetched twice.
            self.last_update_id = Some(self.last_update_id.map_or(msg.update_id, |id| id.max(msg.update_id)));

            if self.operator_chat_id != 0 && msg.chat_id != self.operator_chat_id {
                warn!("Remote: dropping message from unknown chat {}", msg.chat_id);
                continue;
            }
            info!("Remote: received {:?}", msg.text);
            self.pending.push_back(Command::from_chat_text(&msg.text));
        }
    }

    /// Identifier of the newest message seen so far.
    pub fn last_update_id(&self) -> Option<i64> {
        self.last_update_id
    }

    /// Commands fetched but not yet handed out.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

// ───────────────────────────────────────────────────────────────
// Radio
// ───────────────────────────────────────────────────────────────

/// Key-fob decoder.  The receiver buffers one value; every tick takes it.
pub struct RadioChannel {
    arm_code: u32,
    disarm_code: u32,
}

impl RadioChannel {
    pub fn new(arm_code: u32, disarm_code: u32) -> Self {
        Self {
            arm_code,
            disarm_code,
        }
    }

    pub fn poll(&mut self, receiver: &mut impl RadioReceiverPort) -> Option<Command> {
        let code = receiver.take_code()?;
        info!("Radio: received code {}", code);
        Some(Command::from_radio_code(code, self.arm_code, self.disarm_code))
    }
}

// ───────────────────────────────────────────────────────────────
// Button
// ───────────────────────────────────────────────────────────────

/// Toggle button: each debounced press flips between arm and disarm.
pub struct ButtonChannel {
    filter: DebounceFilter,
}

impl ButtonChannel {
    pub fn new(debounce_ms: u32) -> Self {
        // Pull-up wiring: released reads HIGH.
        Self {
            filter: DebounceFilter::new(debounce_ms, true),
        }
    }

    /// `armed` must be the alarm state at this very instant; the press
    /// toggles relative to it.
    pub fn poll(&mut self, now_ms: u32, button: &mut impl ButtonPort, armed: bool) -> Option<Command> {
        match self.filter.update(button.read_level(), now_ms)? {
            Edge::Falling => {
                let kind = if armed { CommandKind::Disarm } else { CommandKind::Arm };
                info!("Button: press -> {:?}", kind);
                Some(Command::new(kind, CommandSource::Button))
            }
            Edge::Rising => {
                debug!("Button: released");
                None
            }
        }
    }
}
