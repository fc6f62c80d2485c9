//! Ocichat is a terminal chat client for the OCI Generative AI inference
//! service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns session state (history, statistics, transcript export),
//!   the model registry, and configuration loading.
//! - [`providers`] adapts prompts and conversation history into each model
//!   family's request schema and normalizes family-specific response shapes
//!   back into plain text.
//! - [`api`] defines the chat action payloads and the HTTP transport used to
//!   reach the inference endpoint.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//! - [`ui`] runs the interactive read-eval-print loop that drives prompts,
//!   command dispatch, and display updates.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which initializes and dispatches into
//! [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod providers;
pub mod ui;
