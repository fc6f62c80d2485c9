//! Payload types for the Generative AI `actions/chat` endpoint.
//!
//! The service multiplexes several request/response schemas behind one
//! endpoint, discriminated by the `apiFormat` field. The enums here mirror
//! that wire contract: adapters construct one variant and expect the
//! matching variant back.

use serde::{Deserialize, Serialize};

pub mod client;

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub compartment_id: String,
    pub serving_mode: ServingMode,
    pub chat_request: ChatRequestBody,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServingMode {
    pub serving_type: String,
    pub model_id: String,
}

impl ServingMode {
    pub fn on_demand(model_id: impl Into<String>) -> Self {
        Self {
            serving_type: "ON_DEMAND".to_string(),
            model_id: model_id.into(),
        }
    }
}

/// Family-specific request schema, discriminated on the wire by `apiFormat`.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "apiFormat")]
pub enum ChatRequestBody {
    #[serde(rename = "COHERE", rename_all = "camelCase")]
    Cohere {
        message: String,
        max_tokens: u32,
        temperature: f64,
        top_p: f64,
        top_k: i32,
        is_stream: bool,
    },
    #[serde(rename = "GENERIC", rename_all = "camelCase")]
    Generic {
        messages: Vec<Message>,
        max_tokens: u32,
        temperature: f64,
        top_p: f64,
        is_stream: bool,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: Vec<Content>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![Content::Text { text: text.into() }],
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![Content::Text { text: text.into() }],
        }
    }

    /// Text of the first content part, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|part| match part {
            Content::Text { text } => text.as_str(),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "TEXT")]
    Text { text: String },
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    pub chat_response: ChatResponseBody,
}

/// Family-specific response schema, discriminated by `apiFormat`.
#[derive(Deserialize, Debug)]
#[serde(tag = "apiFormat")]
pub enum ChatResponseBody {
    #[serde(rename = "COHERE", rename_all = "camelCase")]
    Cohere {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        finish_reason: Option<String>,
    },
    #[serde(rename = "GENERIC", rename_all = "camelCase")]
    Generic {
        #[serde(default)]
        choices: Vec<Choice>,
    },
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}
