//! Shared constants used across the application

/// Maximum number of output tokens requested per completion.
pub const MAX_TOKENS: u32 = 600;

/// Sampling temperature sent with every chat request.
pub const TEMPERATURE: f64 = 0.1;

/// Nucleus-sampling threshold sent with every chat request.
pub const TOP_P: f64 = 0.75;

/// Top-k cutoff for the Cohere request schema (0 disables it).
pub const TOP_K: i32 = 0;

/// Number of prior exchanges the simple-message (Cohere) family forwards.
pub const COHERE_CONTEXT_WINDOW: usize = 3;

/// Number of prior exchanges the structured-turns (Generic) family forwards.
pub const GENERIC_CONTEXT_WINDOW: usize = 5;
