//! Registry of supported model identifiers.
//!
//! The tables here are read-only and baked into the binary: classification
//! and lookup never mutate process state, so concurrent reads need no
//! locking. Adding a model means adding a row; adding a family means adding
//! a variant and a new adapter, not editing the existing ones.

// Cohere models
pub const MODEL_COHERE_COMMAND_A_03: &str = "cohere.command-a-03-2025";
pub const MODEL_COHERE_COMMAND_R_08: &str = "cohere.command-r-08-2024";
pub const MODEL_COHERE_COMMAND_R_PLUS_08: &str = "cohere.command-r-plus-08-2024";

// Meta Llama models
pub const MODEL_META_LLAMA_33_70B: &str = "meta.llama-3.3-70b-instruct";
pub const MODEL_META_LLAMA_31_70B: &str = "meta.llama-3.1-70b-instruct";
pub const MODEL_META_LLAMA_31_8B: &str = "meta.llama-3.1-8b-instruct";
pub const MODEL_META_LLAMA_2_70B: &str = "meta.llama-2-70b-chat";

/// A group of model identifiers sharing a request/response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Single flat message, no structured role history (Cohere schema).
    Cohere,
    /// Explicit alternating user/assistant message list (Meta Llama on the
    /// generic schema).
    Generic,
    Unknown,
}

impl ModelFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelFamily::Cohere => "cohere",
            ModelFamily::Generic => "generic",
            ModelFamily::Unknown => "unknown",
        }
    }
}

pub struct ModelSpec {
    pub id: &'static str,
    pub display_name: &'static str,
    pub family: ModelFamily,
}

pub const SUPPORTED_MODELS: &[ModelSpec] = &[
    ModelSpec {
        id: MODEL_COHERE_COMMAND_A_03,
        display_name: "Cohere Command A (March 2025)",
        family: ModelFamily::Cohere,
    },
    ModelSpec {
        id: MODEL_COHERE_COMMAND_R_08,
        display_name: "Cohere Command R (August 2024)",
        family: ModelFamily::Cohere,
    },
    ModelSpec {
        id: MODEL_COHERE_COMMAND_R_PLUS_08,
        display_name: "Cohere Command R Plus (August 2024)",
        family: ModelFamily::Cohere,
    },
    ModelSpec {
        id: MODEL_META_LLAMA_33_70B,
        display_name: "Meta Llama 3.3 70B Instruct",
        family: ModelFamily::Generic,
    },
    ModelSpec {
        id: MODEL_META_LLAMA_31_70B,
        display_name: "Meta Llama 3.1 70B Instruct",
        family: ModelFamily::Generic,
    },
    ModelSpec {
        id: MODEL_META_LLAMA_31_8B,
        display_name: "Meta Llama 3.1 8B Instruct",
        family: ModelFamily::Generic,
    },
    ModelSpec {
        id: MODEL_META_LLAMA_2_70B,
        display_name: "Meta Llama 2 70B Chat",
        family: ModelFamily::Generic,
    },
];

/// Model used when neither the CLI nor the config names one.
pub const DEFAULT_MODEL: &str = MODEL_META_LLAMA_33_70B;

pub fn find_model(model_id: &str) -> Option<&'static ModelSpec> {
    SUPPORTED_MODELS.iter().find(|spec| spec.id == model_id)
}

/// Classify a model identifier; [`ModelFamily::Unknown`] when unregistered.
pub fn family_of(model_id: &str) -> ModelFamily {
    find_model(model_id)
        .map(|spec| spec.family)
        .unwrap_or(ModelFamily::Unknown)
}

pub fn is_supported(model_id: &str) -> bool {
    find_model(model_id).is_some()
}

/// Display label and family for a registered model.
pub fn describe(model_id: &str) -> Option<(&'static str, ModelFamily)> {
    find_model(model_id).map(|spec| (spec.display_name, spec.family))
}

/// All registered models belonging to the given family, in table order.
pub fn models_in_family(family: ModelFamily) -> impl Iterator<Item = &'static ModelSpec> {
    SUPPORTED_MODELS
        .iter()
        .filter(move |spec| spec.family == family)
}
