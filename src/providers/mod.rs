//! Per-family request building and response parsing.
//!
//! Each model family speaks a different schema behind the shared chat
//! endpoint: Cohere models take one flat message, Meta Llama models take a
//! structured user/assistant turn list. A [`ModelAdapter`] hides that
//! difference from the chat loop, including how much prior history each
//! family forwards. New families are added as new adapter types; existing
//! adapters are never edited to accommodate one.

use std::error::Error as StdError;
use std::fmt;

use crate::api::{ChatRequest, ChatResponse, ChatResponseBody};
use crate::core::models::{family_of, ModelFamily};
use crate::core::session::Exchange;

pub mod cohere;
pub mod generic;

pub use cohere::CohereAdapter;
pub use generic::GenericAdapter;

/// The backend answered with a shape this adapter cannot interpret.
/// Recorded as a failed exchange; never surfaced as partial text.
#[derive(Debug, PartialEq, Eq)]
pub enum ResponseFormatError {
    /// The response carried a different `apiFormat` than this family emits.
    UnexpectedFormat {
        family: &'static str,
        got: &'static str,
    },
    /// The shape matched but carried no text payload.
    EmptyResponse { family: &'static str },
}

impl fmt::Display for ResponseFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseFormatError::UnexpectedFormat { family, got } => {
                write!(f, "unexpected response format for {family} model: got {got}")
            }
            ResponseFormatError::EmptyResponse { family } => {
                write!(f, "empty response from {family} model")
            }
        }
    }
}

impl StdError for ResponseFormatError {}

/// Translation capability for one model family: prompt + optional history
/// in, backend-specific request out; backend response in, plain text out.
pub trait ModelAdapter {
    /// Build a single-turn request with the fixed generation parameters.
    fn build_request(&self, compartment_id: &str, model_id: &str, prompt: &str) -> ChatRequest;

    /// Build a multi-turn request honoring the family's context window.
    ///
    /// Windowing is positional first, success-filtered second: the window is
    /// cut from the raw tail of `history`, then failed exchanges inside it
    /// are dropped. With an empty history this is identical to
    /// [`ModelAdapter::build_request`].
    fn build_request_with_context(
        &self,
        compartment_id: &str,
        model_id: &str,
        prompt: &str,
        history: &[Exchange],
    ) -> ChatRequest;

    /// Extract the completion text from a backend response.
    fn parse_response(&self, response: &ChatResponse) -> Result<String, ResponseFormatError>;

    /// Static family identifier, used for grouping and display only.
    fn family(&self) -> &'static str;
}

/// Select the adapter matching a model identifier's family. `None` for
/// unknown families; callers treat that as fatal at session startup.
pub fn create_adapter(model_id: &str) -> Option<Box<dyn ModelAdapter>> {
    match family_of(model_id) {
        ModelFamily::Cohere => Some(Box::new(CohereAdapter)),
        ModelFamily::Generic => Some(Box::new(GenericAdapter)),
        ModelFamily::Unknown => None,
    }
}

pub(crate) fn response_format_name(body: &ChatResponseBody) -> &'static str {
    match body {
        ChatResponseBody::Cohere { .. } => "COHERE",
        ChatResponseBody::Generic { .. } => "GENERIC",
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use chrono::Local;

    use crate::core::session::Exchange;

    /// Build a history where `outcomes[i]` decides whether exchange `i + 1`
    /// succeeded. Prompts and responses carry their ordinal for assertions.
    pub fn history(outcomes: &[bool]) -> Vec<Exchange> {
        outcomes
            .iter()
            .enumerate()
            .map(|(i, &success)| Exchange {
                ordinal: i + 1,
                prompt: format!("prompt-{}", i + 1),
                response: if success {
                    format!("answer-{}", i + 1)
                } else {
                    String::new()
                },
                timestamp: Local::now(),
                process_time: Duration::from_millis(50),
                success,
                error: if success {
                    String::new()
                } else {
                    "boom".to_string()
                },
            })
            .collect()
    }
}
