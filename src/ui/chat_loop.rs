//! The interactive read-eval-print loop.
//!
//! One conversation is processed strictly sequentially: read a line,
//! dispatch it, await the single outbound call, record the exchange, print.
//! Startup failures abort before the loop begins; per-exchange failures are
//! captured into the session as failed exchanges and the loop continues.

use std::error::Error;
use std::time::Instant;

use chrono::Local;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use crate::api::client::{ChatClient, ChatTransport};
use crate::commands::{help_text, parse_input, Command, InputAction};
use crate::core::config::ServiceSession;
use crate::core::models::describe;
use crate::core::session::{format_duration, ChatSession, Exchange};
use crate::providers::{create_adapter, ModelAdapter};

/// Start an interactive session against the given model.
///
/// Fails before entering the loop when the model is not registered; that is
/// fatal for session startup, not retryable.
pub async fn run_chat(
    model_id: &str,
    service: ServiceSession,
    context_enabled: bool,
) -> Result<(), Box<dyn Error>> {
    let (label, family) = describe(model_id)
        .ok_or_else(|| format!("Unsupported model: {model_id}. Run 'ocichat models' to see the registry."))?;

    let adapter = create_adapter(model_id)
        .ok_or_else(|| format!("No adapter registered for model: {model_id}"))?;

    let transport = ChatClient::new(&service);
    let mut session = ChatSession::new(model_id, label);
    session.set_context(context_enabled);

    println!("🚀 ocichat - {label} ({} family)", family.as_str());
    println!("{}", session.context_status());
    println!("Type /help for commands, /quit to end the session.\n");

    let mut editor = DefaultEditor::new()?;
    loop {
        let prompt_marker = format!("({}) > ", session.exchanges().len() + 1);
        let line = match editor.readline(&prompt_marker) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(Box::new(e)),
        };
        let _ = editor.add_history_entry(line.as_str());

        match parse_input(&line) {
            InputAction::Empty => continue,
            InputAction::Unknown(name) => {
                println!("Unknown command: /{name}. Type /help for the command list.");
            }
            InputAction::Command(Command::Help) => println!("{}", help_text()),
            InputAction::Command(Command::History) => println!("{}", session.format_history()),
            InputAction::Command(Command::Stats) => println!("{}", session.format_stats()),
            InputAction::Command(Command::Context) => {
                session.toggle_context();
                println!("{}", session.context_status());
            }
            InputAction::Command(Command::Status) => {
                println!("{}", session.context_status());
                if session.is_context_enabled() && !session.exchanges().is_empty() {
                    println!("Exchanges in history: {}", session.exchanges().len());
                }
            }
            InputAction::Command(Command::Clear) => {
                print!("\x1b[2J\x1b[H");
                println!("Session active with {}", session.model_label);
            }
            InputAction::Command(Command::Export(target)) => {
                let filename = target.unwrap_or_else(|| {
                    format!("ocichat-transcript-{}.txt", Local::now().format("%Y-%m-%d"))
                });
                match std::fs::write(&filename, session.export()) {
                    Ok(()) => println!("Transcript written to {filename}"),
                    Err(e) => eprintln!("❌ Could not write {filename}: {e}"),
                }
            }
            InputAction::Command(Command::Quit) => break,
            InputAction::Prompt(prompt) => {
                announce_context(&session);
                let exchange = process_prompt(
                    &mut session,
                    adapter.as_ref(),
                    &transport,
                    &service.compartment_id,
                    &prompt,
                )
                .await;
                print_exchange(&session, &exchange);
            }
        }
    }

    println!("\n{}", session.format_stats());
    Ok(())
}

/// One exchange boundary: build, send, parse, record. Errors are captured
/// into the returned exchange; this function never fails the loop.
pub(crate) async fn process_prompt<T: ChatTransport>(
    session: &mut ChatSession,
    adapter: &dyn ModelAdapter,
    transport: &T,
    compartment_id: &str,
    prompt: &str,
) -> Exchange {
    let started = Instant::now();

    let request = if session.is_context_enabled() && !session.exchanges().is_empty() {
        adapter.build_request_with_context(compartment_id, &session.model_id, prompt, session.exchanges())
    } else {
        adapter.build_request(compartment_id, &session.model_id, prompt)
    };

    let response = match transport.send(&request).await {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "chat request failed");
            return session
                .append(prompt, "", started.elapsed(), false, e.to_string())
                .clone();
        }
    };

    match adapter.parse_response(&response) {
        Ok(text) => session.append(prompt, text, started.elapsed(), true, "").clone(),
        Err(e) => {
            debug!(error = %e, "response could not be parsed");
            session
                .append(prompt, "", started.elapsed(), false, e.to_string())
                .clone()
        }
    }
}

fn announce_context(session: &ChatSession) {
    if session.is_context_enabled() && !session.exchanges().is_empty() {
        println!(
            "💭 Using context from {} prior exchange(s)",
            session.exchanges().len()
        );
    }
}

fn print_exchange(session: &ChatSession, exchange: &Exchange) {
    if exchange.success {
        let divider = "=".repeat(70);
        println!("{divider}");
        println!(
            "Response {} - {} ({})",
            exchange.ordinal,
            session.model_label,
            format_duration(exchange.process_time)
        );
        println!("{divider}");
        println!("{}", exchange.response);
        println!("{divider}");
    } else {
        eprintln!("❌ {}", exchange.error);
        eprintln!("💡 The session continues; you can retry with a new prompt.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatRequest, ChatRequestBody, ChatResponse};
    use crate::api::client::TransportError;
    use crate::core::models::MODEL_META_LLAMA_33_70B;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted transport: answers from a fixed queue, recording each
    /// request body for assertions.
    struct ScriptedTransport {
        replies: Mutex<Vec<Result<serde_json::Value, TransportError>>>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<serde_json::Value, TransportError>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn message_counts(&self) -> Vec<usize> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .map(|request| match &request.chat_request {
                    ChatRequestBody::Generic { messages, .. } => messages.len(),
                    ChatRequestBody::Cohere { .. } => 1,
                })
                .collect()
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            let reply = self.replies.lock().unwrap().remove(0);
            reply.map(|value| serde_json::from_value(value).expect("scripted response"))
        }
    }

    fn generic_reply(text: &str) -> serde_json::Value {
        json!({
            "chatResponse": {
                "apiFormat": "GENERIC",
                "choices": [{
                    "message": {
                        "role": "ASSISTANT",
                        "content": [{"type": "TEXT", "text": text}]
                    }
                }]
            }
        })
    }

    fn test_session() -> ChatSession {
        ChatSession::new(MODEL_META_LLAMA_33_70B, "Meta Llama 3.3 70B Instruct")
    }

    #[tokio::test]
    async fn successful_exchange_is_recorded() {
        let adapter = create_adapter(MODEL_META_LLAMA_33_70B).unwrap();
        let transport = ScriptedTransport::new(vec![Ok(generic_reply("hello!"))]);
        let mut session = test_session();

        let exchange =
            process_prompt(&mut session, adapter.as_ref(), &transport, "ocid1", "hi").await;

        assert!(exchange.success);
        assert_eq!(exchange.response, "hello!");
        assert_eq!(exchange.ordinal, 1);
        assert_eq!(session.stats().successful, 1);
    }

    #[tokio::test]
    async fn transport_failure_becomes_a_failed_exchange() {
        let adapter = create_adapter(MODEL_META_LLAMA_33_70B).unwrap();
        let transport = ScriptedTransport::new(vec![Err(TransportError::Http {
            status: 503,
            body: String::new(),
        })]);
        let mut session = test_session();

        let exchange =
            process_prompt(&mut session, adapter.as_ref(), &transport, "ocid1", "hi").await;

        assert!(!exchange.success);
        assert!(exchange.response.is_empty());
        assert!(exchange.error.contains("503"));
        assert_eq!(session.stats().failed, 1);
    }

    #[tokio::test]
    async fn malformed_response_becomes_a_failed_exchange() {
        let adapter = create_adapter(MODEL_META_LLAMA_33_70B).unwrap();
        // Cohere-shaped body answered to a generic-family model.
        let transport = ScriptedTransport::new(vec![Ok(json!({
            "chatResponse": {"apiFormat": "COHERE", "text": "hi"}
        }))]);
        let mut session = test_session();

        let exchange =
            process_prompt(&mut session, adapter.as_ref(), &transport, "ocid1", "hi").await;

        assert!(!exchange.success);
        assert!(exchange.error.contains("unexpected response format"));
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_session() {
        let adapter = create_adapter(MODEL_META_LLAMA_33_70B).unwrap();
        let transport = ScriptedTransport::new(vec![
            Err(TransportError::Http {
                status: 500,
                body: String::new(),
            }),
            Ok(generic_reply("recovered")),
        ]);
        let mut session = test_session();

        process_prompt(&mut session, adapter.as_ref(), &transport, "ocid1", "first").await;
        let second =
            process_prompt(&mut session, adapter.as_ref(), &transport, "ocid1", "second").await;

        assert!(second.success);
        assert_eq!(second.ordinal, 2);
        let stats = session.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test]
    async fn context_flag_controls_history_forwarding() {
        let adapter = create_adapter(MODEL_META_LLAMA_33_70B).unwrap();
        let transport = ScriptedTransport::new(vec![
            Ok(generic_reply("one")),
            Ok(generic_reply("two")),
            Ok(generic_reply("three")),
        ]);
        let mut session = test_session();

        process_prompt(&mut session, adapter.as_ref(), &transport, "ocid1", "a").await;
        process_prompt(&mut session, adapter.as_ref(), &transport, "ocid1", "b").await;
        session.set_context(false);
        process_prompt(&mut session, adapter.as_ref(), &transport, "ocid1", "c").await;

        // First request has no history, the second carries the first pair,
        // the third is independent again.
        assert_eq!(transport.message_counts(), vec![1, 3, 1]);
    }
}
