//! Adapter for the simple-message (Cohere) family.
//!
//! Cohere's schema accepts a single flat message, so conversation context is
//! folded into one synthetic message: numbered question/answer pairs from
//! the window, then the current prompt under its own label.

use std::fmt::Write as _;

use crate::api::{ChatRequest, ChatRequestBody, ChatResponse, ChatResponseBody, ServingMode};
use crate::core::constants::{COHERE_CONTEXT_WINDOW, MAX_TOKENS, TEMPERATURE, TOP_K, TOP_P};
use crate::core::session::Exchange;
use crate::providers::{response_format_name, ModelAdapter, ResponseFormatError};

pub struct CohereAdapter;

const FAMILY: &str = "cohere";

impl CohereAdapter {
    fn request(compartment_id: &str, model_id: &str, message: String) -> ChatRequest {
        ChatRequest {
            compartment_id: compartment_id.to_string(),
            serving_mode: ServingMode::on_demand(model_id),
            chat_request: ChatRequestBody::Cohere {
                message,
                max_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
                is_stream: false,
            },
        }
    }

    /// Fold the windowed history and the current prompt into one message.
    ///
    /// The window is cut positionally from the raw tail of the history;
    /// failed exchanges inside it are skipped when rendering but still
    /// occupy their slot and their position number.
    fn context_message(prompt: &str, history: &[Exchange]) -> String {
        let start = history.len().saturating_sub(COHERE_CONTEXT_WINDOW);
        let window = &history[start..];

        let mut message = "Previous conversation context:\n".to_string();
        for (i, exchange) in window.iter().enumerate() {
            if exchange.success {
                let _ = write!(
                    message,
                    "\nQuestion {}: {}\nAnswer {}: {}\n",
                    i + 1,
                    exchange.prompt,
                    i + 1,
                    exchange.response
                );
            }
        }
        message.push_str("\nCurrent question: ");
        message.push_str(prompt);
        message
    }
}

impl ModelAdapter for CohereAdapter {
    fn build_request(&self, compartment_id: &str, model_id: &str, prompt: &str) -> ChatRequest {
        Self::request(compartment_id, model_id, prompt.to_string())
    }

    fn build_request_with_context(
        &self,
        compartment_id: &str,
        model_id: &str,
        prompt: &str,
        history: &[Exchange],
    ) -> ChatRequest {
        if history.is_empty() {
            return self.build_request(compartment_id, model_id, prompt);
        }

        Self::request(
            compartment_id,
            model_id,
            Self::context_message(prompt, history),
        )
    }

    fn parse_response(&self, response: &ChatResponse) -> Result<String, ResponseFormatError> {
        match &response.chat_response {
            ChatResponseBody::Cohere {
                text: Some(text), ..
            } if !text.is_empty() => Ok(text.clone()),
            ChatResponseBody::Cohere { .. } => {
                Err(ResponseFormatError::EmptyResponse { family: FAMILY })
            }
            other => Err(ResponseFormatError::UnexpectedFormat {
                family: FAMILY,
                got: response_format_name(other),
            }),
        }
    }

    fn family(&self) -> &'static str {
        FAMILY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::history;
    use serde_json::json;

    const COMPARTMENT: &str = "ocid1.compartment.oc1..test";
    const MODEL: &str = "cohere.command-r-08-2024";

    fn request_message(request: &ChatRequest) -> String {
        match &request.chat_request {
            ChatRequestBody::Cohere { message, .. } => message.clone(),
            other => panic!("expected cohere body, got {other:?}"),
        }
    }

    #[test]
    fn single_turn_request_carries_fixed_parameters() {
        let request = CohereAdapter.build_request(COMPARTMENT, MODEL, "hello");
        match request.chat_request {
            ChatRequestBody::Cohere {
                message,
                max_tokens,
                temperature,
                top_p,
                top_k,
                is_stream,
            } => {
                assert_eq!(message, "hello");
                assert_eq!(max_tokens, 600);
                assert_eq!(temperature, 0.1);
                assert_eq!(top_p, 0.75);
                assert_eq!(top_k, 0);
                assert!(!is_stream);
            }
            other => panic!("expected cohere body, got {other:?}"),
        }
        assert_eq!(request.serving_mode.model_id, MODEL);
        assert_eq!(request.compartment_id, COMPARTMENT);
    }

    #[test]
    fn context_windows_positionally_then_filters_failures() {
        // Exchanges 2 and 4 failed. The positional window is the last three
        // (3, 4, 5); only the successful 3 and 5 may appear.
        let history = history(&[true, false, true, false, true]);
        let request =
            CohereAdapter.build_request_with_context(COMPARTMENT, MODEL, "current?", &history);
        let message = request_message(&request);

        assert!(message.starts_with("Previous conversation context:\n"));
        assert!(message.contains("prompt-3"));
        assert!(message.contains("answer-3"));
        assert!(message.contains("prompt-5"));
        assert!(message.contains("answer-5"));
        assert!(!message.contains("prompt-1"));
        assert!(!message.contains("prompt-2"));
        assert!(!message.contains("prompt-4"));
        assert!(message.ends_with("\nCurrent question: current?"));
    }

    #[test]
    fn pairs_are_numbered_by_window_position() {
        // Window over 5 entries is (3, 4, 5); 4 failed, so the rendered
        // pairs keep positions 1 and 3 rather than renumbering.
        let history = history(&[true, false, true, false, true]);
        let request = CohereAdapter.build_request_with_context(COMPARTMENT, MODEL, "q", &history);
        let message = request_message(&request);

        assert!(message.contains("Question 1: prompt-3"));
        assert!(message.contains("Answer 1: answer-3"));
        assert!(message.contains("Question 3: prompt-5"));
        assert!(!message.contains("Question 2:"));
    }

    #[test]
    fn empty_history_matches_single_turn_request() {
        let plain = CohereAdapter.build_request(COMPARTMENT, MODEL, "solo");
        let contextual = CohereAdapter.build_request_with_context(COMPARTMENT, MODEL, "solo", &[]);
        assert_eq!(request_message(&plain), request_message(&contextual));
    }

    #[test]
    fn all_failed_window_still_labels_current_prompt() {
        let history = history(&[false, false, false]);
        let request = CohereAdapter.build_request_with_context(COMPARTMENT, MODEL, "q", &history);
        let message = request_message(&request);
        assert_eq!(message, "Previous conversation context:\n\nCurrent question: q");
    }

    #[test]
    fn parse_extracts_cohere_text() {
        let response: ChatResponse = serde_json::from_value(json!({
            "chatResponse": {"apiFormat": "COHERE", "text": "forty-two"}
        }))
        .expect("deserialize");
        assert_eq!(
            CohereAdapter.parse_response(&response).expect("text"),
            "forty-two"
        );
    }

    #[test]
    fn parse_rejects_missing_text() {
        let response: ChatResponse = serde_json::from_value(json!({
            "chatResponse": {"apiFormat": "COHERE", "finishReason": "COMPLETE"}
        }))
        .expect("deserialize");
        assert_eq!(
            CohereAdapter.parse_response(&response),
            Err(ResponseFormatError::EmptyResponse { family: "cohere" })
        );
    }

    #[test]
    fn parse_rejects_foreign_format() {
        let response: ChatResponse = serde_json::from_value(json!({
            "chatResponse": {"apiFormat": "GENERIC", "choices": []}
        }))
        .expect("deserialize");
        assert_eq!(
            CohereAdapter.parse_response(&response),
            Err(ResponseFormatError::UnexpectedFormat {
                family: "cohere",
                got: "GENERIC"
            })
        );
    }
}
