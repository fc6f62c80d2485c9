//! HTTP transport to the inference endpoint.
//!
//! The chat loop and adapters only construct and parse payload values; this
//! module owns the single outbound call. Failures surface as
//! [`TransportError`] and are recorded at the exchange boundary rather than
//! terminating the session.

use std::error::Error as StdError;
use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::api::{ChatRequest, ChatResponse};
use crate::core::config::ServiceSession;

/// Network or backend failure for one chat call.
#[derive(Debug)]
pub enum TransportError {
    /// The request never produced a usable HTTP response.
    Network(reqwest::Error),
    /// The backend answered with a non-success status.
    Http { status: u16, body: String },
    /// The response body was not a recognizable chat response.
    Decode(reqwest::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(source) => write!(f, "request failed: {source}"),
            TransportError::Http { status, body } => {
                let body = body.trim();
                if body.is_empty() {
                    write!(f, "service returned HTTP {status}")
                } else {
                    write!(f, "service returned HTTP {status}: {body}")
                }
            }
            TransportError::Decode(source) => {
                write!(f, "could not decode chat response: {source}")
            }
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Network(source) | TransportError::Decode(source) => Some(source),
            TransportError::Http { .. } => None,
        }
    }
}

/// A collaborator able to perform the chat round trip. The chat loop is
/// written against this seam so exchanges can be driven without a network
/// in tests.
#[async_trait]
pub trait ChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

/// reqwest-backed transport for the regional inference endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: String,
    auth_token: String,
}

impl ChatClient {
    pub fn new(session: &ServiceSession) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: session.endpoint(),
            auth_token: session.auth_token.clone(),
        }
    }
}

#[async_trait]
impl ChatTransport for ChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        debug!(endpoint = %self.endpoint, model = %request.serving_mode.model_id, "sending chat request");

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .json(request)
            .send()
            .await
            .map_err(TransportError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "chat request rejected");
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(TransportError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_render_status_and_body() {
        let err = TransportError::Http {
            status: 429,
            body: "{\"code\":\"TooManyRequests\"}".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("429"));
        assert!(rendered.contains("TooManyRequests"));
    }

    #[test]
    fn http_errors_without_body_stay_terse() {
        let err = TransportError::Http {
            status: 503,
            body: "  \n".to_string(),
        };
        assert_eq!(err.to_string(), "service returned HTTP 503");
    }
}
