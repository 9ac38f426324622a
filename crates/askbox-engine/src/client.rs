//! Transport for the ask endpoint.
//!
//! One user message maps to one `POST /ask` carrying `{"message": …}`. A 2xx
//! answer with `{"reply": …}` is the only success; any other status, a
//! transport failure, or an unreadable body is an [`AskError`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Instrument};

use crate::config::Config;
use crate::session::PendingAsk;

/// Request body sent to the ask endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// The user's trimmed message.
    pub message: String,
}

/// Response body expected from the ask endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// The bot reply, in the markdown subset understood by [`crate::markup`].
    pub reply: String,
}

/// Something that can answer a user message.
#[async_trait]
pub trait AskClient: Send + Sync {
    /// Send one message and return the raw reply text.
    async fn ask(&self, message: &str) -> Result<String, AskError>;
}

/// [`AskClient`] backed by an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpAskClient {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpAskClient {
    /// Create a client for the given endpoint URL.
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, AskError> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| AskError::InvalidUrl(format!("{url}: {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(AskError::Transport)?;

        Ok(Self { client, url })
    }

    /// Create a client from configuration.
    pub fn from_config(config: &Config) -> Result<Self, AskError> {
        Self::new(&config.ask_url(), config.request_timeout())
    }

    /// The endpoint this client posts to.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

#[async_trait]
impl AskClient for HttpAskClient {
    async fn ask(&self, message: &str) -> Result<String, AskError> {
        let body = AskRequest {
            message: message.to_string(),
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(classify)?;
        let parsed: AskResponse = serde_json::from_slice(&bytes).map_err(AskError::Decode)?;
        Ok(parsed.reply)
    }
}

/// Run one pending ask against a client, with logging.
pub async fn dispatch(client: &dyn AskClient, pending: &PendingAsk) -> Result<String, AskError> {
    let span = tracing::info_span!(
        "ask",
        request_id = %pending.id,
        chars = pending.message.chars().count()
    );

    async {
        let start = Instant::now();
        debug!("sending message");

        let result = client.ask(&pending.message).await;

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(reply) => info!(duration_ms, reply_chars = reply.chars().count(), "reply received"),
            Err(e) => warn!(duration_ms, error = %e, "ask request failed"),
        }
        result
    }
    .instrument(span)
    .await
}

fn classify(error: reqwest::Error) -> AskError {
    if error.is_timeout() {
        AskError::Timeout
    } else {
        AskError::Transport(error)
    }
}

/// Errors that can occur when asking the backend.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    /// The endpoint URL could not be parsed.
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// Connection or send failure before a response arrived.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// No complete response within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("Server error: {status} {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Standard reason phrase for `status`. The phrase on the server's
        /// status line is not kept.
        reason: String,
    },

    /// The body was not JSON or had no string `reply`.
    #[error("Malformed response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The task running the request panicked or was cancelled.
    #[error("Request interrupted: {0}")]
    Interrupted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoClient;

    #[async_trait]
    impl AskClient for EchoClient {
        async fn ask(&self, message: &str) -> Result<String, AskError> {
            Ok(format!("you said **{message}**"))
        }
    }

    struct DownClient;

    #[async_trait]
    impl AskClient for DownClient {
        async fn ask(&self, _message: &str) -> Result<String, AskError> {
            Err(AskError::Status {
                status: 503,
                reason: "Service Unavailable".into(),
            })
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = AskRequest {
            message: "hello".into(),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"message":"hello"}"#);
    }

    #[test]
    fn test_response_requires_reply() {
        assert!(serde_json::from_str::<AskResponse>(r#"{"reply":"hi"}"#).is_ok());
        assert!(serde_json::from_str::<AskResponse>(r#"{"answer":"hi"}"#).is_err());
        assert!(serde_json::from_str::<AskResponse>(r#"{"reply":null}"#).is_err());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = HttpAskClient::new("not a url", None).unwrap_err();
        assert!(matches!(err, AskError::InvalidUrl(_)));
    }

    #[test]
    fn test_from_config_uses_ask_path() {
        let client = HttpAskClient::from_config(&Config::default()).unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:5000/ask");
    }

    #[test]
    fn test_status_error_message() {
        let err = AskError::Status {
            status: 500,
            reason: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "Server error: 500 Internal Server Error");
    }

    #[tokio::test]
    async fn test_dispatch_passes_reply_through() {
        let pending = PendingAsk::new("hi");
        let reply = dispatch(&EchoClient, &pending).await.unwrap();
        assert_eq!(reply, "you said **hi**");
    }

    #[tokio::test]
    async fn test_dispatch_passes_error_through() {
        let pending = PendingAsk::new("hi");
        let err = dispatch(&DownClient, &pending).await.unwrap_err();
        assert!(matches!(err, AskError::Status { status: 503, .. }));
    }
}
