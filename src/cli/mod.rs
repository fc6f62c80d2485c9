//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the
//! appropriate commands. Startup-time failures (bad credentials, unknown
//! models) abort here with a diagnostic; they never reach the chat loop.

pub mod model_list;

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cli::model_list::list_models;
use crate::core::config::Config;
use crate::core::models::{is_supported, DEFAULT_MODEL};
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "ocichat")]
#[command(about = "A terminal chat client for the OCI Generative AI inference service")]
#[command(
    long_about = "Ocichat is an interactive terminal chat client for the OCI Generative AI \
inference service. It keeps a rolling conversation history per session and can \
forward it as context, shaped to each model family's request schema.\n\n\
Configuration:\n\
  Use 'ocichat set' to persist your compartment OCID and region. The auth token \
comes from OCI_AUTH_TOKEN or a token file.\n\n\
Environment Variables:\n\
  OCI_COMPARTMENT_ID   Compartment OCID billed for inference calls\n\
  OCI_REGION           Region identifier, e.g. us-chicago-1\n\
  OCI_AUTH_TOKEN       Bearer token for the inference endpoint\n\
  OCI_AUTH_TOKEN_FILE  Path to a file holding the token\n\n\
Commands inside the chat:\n\
  /help /history /stats /context /status /export [file] /clear /quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to use for chat (see 'ocichat models')
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Start with conversation context disabled
    #[arg(long, global = true)]
    pub no_context: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// List supported models grouped by family
    Models,
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        value: String,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Models => {
            list_models();
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "compartment-id" => config.compartment_id = Some(value.clone()),
                "region" => config.region = Some(value.clone()),
                "auth-token-file" => config.auth_token_file = Some(value.clone().into()),
                "default-model" => {
                    if !is_supported(&value) {
                        eprintln!("❌ Unknown model: {value}");
                        eprintln!("Run 'ocichat models' to see the registry.");
                        std::process::exit(1);
                    }
                    config.default_model = Some(value.clone());
                }
                _ => {
                    eprintln!("❌ Unknown config key: {key}");
                    std::process::exit(1);
                }
            }
            config.save()?;
            println!("✅ Set {key} to: {value}");
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "compartment-id" => config.compartment_id = None,
                "region" => config.region = None,
                "auth-token-file" => config.auth_token_file = None,
                "default-model" => config.default_model = None,
                _ => {
                    eprintln!("❌ Unknown config key: {key}");
                    std::process::exit(1);
                }
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Chat => {
            let config = Config::load()?;

            let model_id = args
                .model
                .or_else(|| config.default_model.clone())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string());

            if !is_supported(&model_id) {
                eprintln!("❌ Unsupported model: {model_id}");
                eprintln!("Run 'ocichat models' to see the registry.");
                std::process::exit(1);
            }

            let service = match config.resolve_session() {
                Ok(service) => service,
                Err(e) => {
                    eprintln!("❌ {e}");
                    eprintln!("\nQuick fixes:");
                    for fix in e.quick_fixes() {
                        eprintln!("  {fix}");
                    }
                    std::process::exit(e.exit_code());
                }
            };

            run_chat(&model_id, service, !args.no_context).await
        }
    }
}
