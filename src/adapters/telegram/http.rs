//! Minimal blocking HTTP client seam for the bot adapter.
//!
//! [`TelegramBot`](super::TelegramBot) is generic over [`HttpTransport`],
//! so the Bot API logic runs unchanged against the ESP-IDF client on the
//! device and against a scripted transport in host tests.

use core::fmt;

/// Status code and full body of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    /// No client available (host builds, or the stack is not up yet).
    Offline,
    /// Connect, TLS, write or read failure.
    Transport,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => write!(f, "HTTP client offline"),
            Self::Transport => write!(f, "HTTP transport failure"),
        }
    }
}

/// One request, one response, no connection state visible to the caller.
pub trait HttpTransport {
    fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError>;

    fn post(&mut self, url: &str, content_type: &str, body: &[u8]) -> Result<HttpResponse, HttpError>;
}

/// Transport that never reaches anything.  Every request is `Offline`.
pub struct NullHttpTransport;

impl HttpTransport for NullHttpTransport {
    fn get(&mut self, _url: &str) -> Result<HttpResponse, HttpError> {
        Err(HttpError::Offline)
    }

    fn post(&mut self, _url: &str, _content_type: &str, _body: &[u8]) -> Result<HttpResponse, HttpError> {
        Err(HttpError::Offline)
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp_impl::EspHttpTransport;

#[cfg(target_os = "espidf")]
mod esp_impl {
    use core::time::Duration;

    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
    use log::warn;

    use super::{HttpError, HttpResponse, HttpTransport};

    /// Read chunk size for response bodies.
    const READ_CHUNK: usize = 512;

    /// Largest body we keep.  getUpdates answers with timeout=0 are small.
    const MAX_BODY: usize = 16 * 1024;

    /// HTTPS client over `esp_http_client`, server certificates checked
    /// against the built-in CA bundle.  A fresh connection per request
    /// keeps a half-closed socket from poisoning the next call.
    pub struct EspHttpTransport {
        timeout: Duration,
    }

    impl EspHttpTransport {
        pub fn new(timeout_ms: u32) -> Self {
            Self {
                timeout: Duration::from_millis(u64::from(timeout_ms)),
            }
        }

        fn connection(&self) -> Result<EspHttpConnection, HttpError> {
            EspHttpConnection::new(&Configuration {
                timeout: Some(self.timeout),
                crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
                ..Default::default()
            })
            .map_err(|e| {
                warn!("HTTP: client init failed: {}", e);
                HttpError::Transport
            })
        }

        fn request(
            &mut self,
            method: Method,
            url: &str,
            headers: &[(&str, &str)],
            body: &[u8],
        ) -> Result<HttpResponse, HttpError> {
            let mut conn = self.connection()?;
            conn.initiate_request(method, url, headers).map_err(|e| {
                warn!("HTTP: request failed: {}", e);
                HttpError::Transport
            })?;

            let mut written = 0;
            while written < body.len() {
                let n = conn.write(&body[written..]).map_err(|e| {
                    warn!("HTTP: body write failed: {}", e);
                    HttpError::Transport
                })?;
                if n == 0 {
                    return Err(HttpError::Transport);
                }
                written += n;
            }

            conn.initiate_response().map_err(|e| {
                warn!("HTTP: no response: {}", e);
                HttpError::Transport
            })?;
            let status = conn.status();

            let mut out = Vec::new();
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                let n = conn.read(&mut chunk).map_err(|e| {
                    warn!("HTTP: body read failed: {}", e);
                    HttpError::Transport
                })?;
                if n == 0 {
                    break;
                }
                if out.len() + n > MAX_BODY {
                    warn!("HTTP: response body over {} bytes", MAX_BODY);
                    return Err(HttpError::Transport);
                }
                out.extend_from_slice(&chunk[..n]);
            }

            Ok(HttpResponse { status, body: out })
        }
    }

    impl HttpTransport for EspHttpTransport {
        fn get(&mut self, url: &str) -> Result<HttpResponse, HttpError> {
            self.request(Method::Get, url, &[], &[])
        }

        fn post(&mut self, url: &str, content_type: &str, body: &[u8]) -> Result<HttpResponse, HttpError> {
            let len = body.len().to_string();
            let headers = [("Content-Type", content_type), ("Content-Length", len.as_str())];
            self.request(Method::Post, url, &headers, body)
        }
    }
}
