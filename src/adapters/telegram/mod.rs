//! Telegram Bot API adapter.
//!
//! Implements [`RemoteCommandSource`] (long-poll disabled `getUpdates`)
//! and [`NotificationSink`] (`sendMessage`, `sendDocument`) for the single
//! operator chat.
//!
//! ## Offsets
//!
//! Updates that carry no text (stickers, joins, edits) are not handed to
//! the domain, but their `update_id` is remembered here so the next
//! `getUpdates` asks past them.  Otherwise Telegram would resend them on
//! every poll.

pub mod http;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{
    ConfigError, NotificationSink, NotifyError, RemoteCommandSource, RemoteError, RemoteMessage,
    TextFormat,
};

use self::http::{HttpError, HttpResponse, HttpTransport};
use super::utils::is_path_segment_safe;

const API_BASE: &str = "https://api.telegram.org/bot";

/// Multipart boundary for `sendDocument`.  Log content is plain text
/// records, which never contain this sequence.
const MULTIPART_BOUNDARY: &str = "----SentinelaLogBoundary7d1f";

// ───────────────────────────────────────────────────────────────
// Wire format
// ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
}

#[derive(Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

/// Decoded `getUpdates` answer.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UpdateBatch {
    /// Text messages, in server order.
    pub messages: Vec<RemoteMessage>,
    /// Highest `update_id` in the answer, text or not.
    pub last_update_id: Option<i64>,
}

/// Decode a `getUpdates` response body.
///
/// Updates are decoded one by one: an entry of unexpected shape is
/// skipped, but its `update_id` (when readable) still counts so the
/// offset moves past it.
pub fn parse_updates(body: &[u8]) -> Result<UpdateBatch, RemoteError> {
    let response: ApiResponse<Vec<serde_json::Value>> =
        serde_json::from_slice(body).map_err(|_| RemoteError::Malformed)?;
    if !response.ok {
        return Err(RemoteError::Malformed);
    }

    let mut batch = UpdateBatch::default();
    for entry in response.result.unwrap_or_default() {
        let update = match Update::deserialize(&entry) {
            Ok(update) => update,
            Err(e) => {
                let id = entry.get("update_id").and_then(serde_json::Value::as_i64);
                warn!("Telegram: skipping undecodable update {:?}: {}", id, e);
                if let Some(id) = id {
                    batch.last_update_id = Some(batch.last_update_id.map_or(id, |last| last.max(id)));
                }
                continue;
            }
        };
        batch.last_update_id = Some(batch.last_update_id.map_or(update.update_id, |id| id.max(update.update_id)));
        let Some(message) = update.message else {
            continue;
        };
        let Some(text) = message.text else {
            debug!("Telegram: update {} has no text", update.update_id);
            continue;
        };
        batch.messages.push(RemoteMessage {
            update_id: update.update_id,
            chat_id: message.chat.id,
            text,
        });
    }
    Ok(batch)
}

fn validate_token(token: &str) -> Result<(), ConfigError> {
    // <bot id>:<secret>
    let valid_shape = token
        .split_once(':')
        .is_some_and(|(id, secret)| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) && !secret.is_empty());
    if !valid_shape || !is_path_segment_safe(token) {
        return Err(ConfigError::ValidationFailed("bot token must look like <id>:<secret>"));
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Bot
// ───────────────────────────────────────────────────────────────

pub struct TelegramBot<H> {
    http: H,
    token: String,
    chat_id: i64,
    /// Highest update id seen by this adapter, including skipped ones.
    seen_through: Option<i64>,
}

impl<H: HttpTransport> TelegramBot<H> {
    /// `chat_id` is where notifications go.
    pub fn new(http: H, token: &str, chat_id: i64) -> Result<Self, ConfigError> {
        validate_token(token)?;
        if chat_id == 0 {
            warn!("Telegram: no operator chat configured, notifications will be rejected");
        }
        info!("Telegram: bot ready (chat {})", chat_id);
        Ok(Self {
            http,
            token: token.to_owned(),
            chat_id,
            seen_through: None,
        })
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}{}/{}", API_BASE, self.token, method)
    }

    fn check_send(response: Result<HttpResponse, HttpError>) -> Result<(), NotifyError> {
        let response = response.map_err(|e| match e {
            HttpError::Offline => NotifyError::Offline,
            HttpError::Transport => NotifyError::Transport,
        })?;
        if !response.is_success() {
            warn!("Telegram: send rejected with HTTP {}", response.status);
            return Err(NotifyError::Rejected(response.status));
        }
        Ok(())
    }

    fn multipart_document(&self, bytes: &[u8], filename: &str) -> Vec<u8> {
        let head = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"chat_id\"\r\n\r\n\
             {chat}\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"document\"; filename=\"{file}\"\r\n\
             Content-Type: text/plain\r\n\r\n",
            b = MULTIPART_BOUNDARY,
            chat = self.chat_id,
            file = filename.replace('"', "'"),
        );
        let tail = format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY);

        let mut body = Vec::with_capacity(head.len() + bytes.len() + tail.len());
        body.extend_from_slice(head.as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(tail.as_bytes());
        body
    }

    /// Underlying transport, for tests and diagnostics.
    pub fn transport(&self) -> &H {
        &self.http
    }
}

impl<H: HttpTransport> RemoteCommandSource for TelegramBot<H> {
    fn fetch_since(&mut self, after: Option<i64>) -> Result<Vec<RemoteMessage>, RemoteError> {
        let after = match (after, self.seen_through) {
            (Some(a), Some(s)) => Some(a.max(s)),
            (a, s) => a.or(s),
        };
        let url = match after {
            Some(id) => format!("{}?offset={}&timeout=0", self.method_url("getUpdates"), id + 1),
            None => format!("{}?timeout=0", self.method_url("getUpdates")),
        };

        let response = self.http.get(&url).map_err(|_| RemoteError::Transport)?;
        if !response.is_success() {
            return Err(RemoteError::Status(response.status));
        }

        let batch = parse_updates(&response.body)?;
        if let Some(last) = batch.last_update_id {
            self.seen_through = Some(self.seen_through.map_or(last, |s| s.max(last)));
        }
        Ok(batch.messages)
    }
}

impl<H: HttpTransport> NotificationSink for TelegramBot<H> {
    fn send(&mut self, text: &str, format: TextFormat) -> Result<(), NotifyError> {
        let payload = SendMessage {
            chat_id: self.chat_id,
            text,
            parse_mode: match format {
                TextFormat::Plain => None,
                TextFormat::RichText => Some("Markdown"),
            },
        };
        let body = serde_json::to_vec(&payload).map_err(|_| NotifyError::Transport)?;
        let url = self.method_url("sendMessage");
        Self::check_send(self.http.post(&url, "application/json", &body))
    }

    fn send_file(&mut self, bytes: &[u8], filename: &str) -> Result<(), NotifyError> {
        let body = self.multipart_document(bytes, filename);
        let content_type = format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY);
        let url = self.method_url("sendDocument");
        info!("Telegram: sending {} ({} bytes)", filename, bytes.len());
        Self::check_send(self.http.post(&url, &content_type, &body))
    }
}
