//! Adapter for the structured-turns (Generic) family, used by Meta Llama
//! models.
//!
//! The generic schema takes an explicit message list, so each successful
//! exchange in the window becomes a user/assistant pair and the current
//! prompt is always the final user message.

use crate::api::{
    ChatRequest, ChatRequestBody, ChatResponse, ChatResponseBody, Message, ServingMode,
};
use crate::core::constants::{GENERIC_CONTEXT_WINDOW, MAX_TOKENS, TEMPERATURE, TOP_P};
use crate::core::session::Exchange;
use crate::providers::{response_format_name, ModelAdapter, ResponseFormatError};

pub struct GenericAdapter;

const FAMILY: &str = "generic";

impl GenericAdapter {
    fn request(compartment_id: &str, model_id: &str, messages: Vec<Message>) -> ChatRequest {
        ChatRequest {
            compartment_id: compartment_id.to_string(),
            serving_mode: ServingMode::on_demand(model_id),
            chat_request: ChatRequestBody::Generic {
                messages,
                max_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                is_stream: false,
            },
        }
    }
}

impl ModelAdapter for GenericAdapter {
    fn build_request(&self, compartment_id: &str, model_id: &str, prompt: &str) -> ChatRequest {
        Self::request(compartment_id, model_id, vec![Message::user(prompt)])
    }

    fn build_request_with_context(
        &self,
        compartment_id: &str,
        model_id: &str,
        prompt: &str,
        history: &[Exchange],
    ) -> ChatRequest {
        // Positional window first; failed exchanges inside it emit nothing.
        let start = history.len().saturating_sub(GENERIC_CONTEXT_WINDOW);
        let mut messages = Vec::new();

        for exchange in &history[start..] {
            if exchange.success {
                messages.push(Message::user(&exchange.prompt));
                messages.push(Message::assistant(&exchange.response));
            }
        }

        messages.push(Message::user(prompt));
        Self::request(compartment_id, model_id, messages)
    }

    fn parse_response(&self, response: &ChatResponse) -> Result<String, ResponseFormatError> {
        match &response.chat_response {
            ChatResponseBody::Generic { choices } => choices
                .first()
                .and_then(|choice| choice.message.as_ref())
                .and_then(|message| message.first_text())
                .filter(|text| !text.is_empty())
                .map(str::to_string)
                .ok_or(ResponseFormatError::EmptyResponse { family: FAMILY }),
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
