//! Inbound commands to the alarm core.
//!
//! Each input channel decodes its raw signal (chat text, radio code,
//! button edge) into a [`Command`] exactly once; the
//! [`AlarmService`](super::service::AlarmService) consumes it in a single
//! dispatch function and never looks at the raw input again.

use core::fmt;

/// Where a command came from.  Used in log records and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandSource {
    /// Remote chat bot.
    Chat,
    /// 433 MHz key fob.
    Radio,
    /// Physical button on the enclosure.
    Button,
}

impl CommandSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Radio => "radio",
            Self::Button => "button",
        }
    }
}

impl fmt::Display for CommandSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw input that matched nothing in the channel's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownInput {
    Text(String),
    RadioCode(u32),
}

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Arm,
    Disarm,
    StatusQuery,
    LogRequest,
    Unknown(UnknownInput),
}

/// A decoded command together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub source: CommandSource,
}

/// Chat vocabulary.  Matching is exact: no trimming, no case folding.
pub const CHAT_ARM: &str = "/armar";
pub const CHAT_DISARM: &str = "/desarmar";
pub const CHAT_STATUS: &str = "/status";
pub const CHAT_LOGS: &str = "/logs";

impl Command {
    pub fn new(kind: CommandKind, source: CommandSource) -> Self {
        Self { kind, source }
    }

    /// Decode a chat message.
    pub fn from_chat_text(text: &str) -> Self {
        let kind = match text {
            CHAT_ARM => CommandKind::Arm,
            CHAT_DISARM => CommandKind::Disarm,
            CHAT_STATUS => CommandKind::StatusQuery,
            CHAT_LOGS => CommandKind::LogRequest,
            other => CommandKind::Unknown(UnknownInput::Text(other.to_owned())),
        };
        Self::new(kind, CommandSource::Chat)
    }

    /// Decode a radio code against the two configured key-fob codes.
    pub fn from_radio_code(code: u32, arm_code: u32, disarm_code: u32) -> Self {
        let kind = if code == arm_code {
            CommandKind::Arm
        } else if code == disarm_code {
            CommandKind::Disarm
        } else {
            CommandKind::Unknown(UnknownInput::RadioCode(code))
        };
        Self::new(kind, CommandSource::Radio)
    }
}
