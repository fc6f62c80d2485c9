//! In-process conversation history for one chat session.
//!
//! A [`ChatSession`] owns an append-only sequence of [`Exchange`]s. Nothing
//! here talks to the network: adapters read the history to assemble context,
//! the chat loop appends one exchange per round trip, and statistics are
//! recomputed on demand rather than stored.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Local};

/// One prompt/response (or prompt/error) pair with metadata.
///
/// Immutable once appended; ordinals are contiguous starting at 1 and are
/// assigned at append time.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub ordinal: usize,
    pub prompt: String,
    /// Empty when the exchange failed.
    pub response: String,
    pub timestamp: DateTime<Local>,
    pub process_time: Duration,
    pub success: bool,
    /// Non-empty iff `success` is false.
    pub error: String,
}

/// Statistics derived from a session's history. Recomputed on demand.
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub session_duration: Duration,
    /// Average over successful exchanges only; zero when there are none.
    pub average_process_time: Duration,
    pub model_label: String,
}

/// A chat session: model identity, start time, and the exchange history.
pub struct ChatSession {
    pub model_id: String,
    pub model_label: String,
    pub started_at: DateTime<Local>,
    exchanges: Vec<Exchange>,
    context_enabled: bool,
}

impl ChatSession {
    pub fn new(model_id: impl Into<String>, model_label: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            model_label: model_label.into(),
            started_at: Local::now(),
            exchanges: Vec::new(),
            context_enabled: true,
        }
    }

    /// Append an exchange with the next ordinal. Always succeeds; no
    /// validation is applied to the text fields.
    pub fn append(
        &mut self,
        prompt: impl Into<String>,
        response: impl Into<String>,
        process_time: Duration,
        success: bool,
        error: impl Into<String>,
    ) -> &Exchange {
        let exchange = Exchange {
            ordinal: self.exchanges.len() + 1,
            prompt: prompt.into(),
            response: response.into(),
            timestamp: Local::now(),
            process_time,
            success,
            error: error.into(),
        };
        self.exchanges.push(exchange);
        self.exchanges.last().expect("exchange was just pushed")
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// The last `min(n, total)` exchanges in original order.
    pub fn recent_exchanges(&self, n: usize) -> &[Exchange] {
        let start = self.exchanges.len().saturating_sub(n);
        &self.exchanges[start..]
    }

    pub fn stats(&self) -> SessionStats {
        let total = self.exchanges.len();
        let successful = self.exchanges.iter().filter(|e| e.success).count();
        let successful_time: Duration = self
            .exchanges
            .iter()
            .filter(|e| e.success)
            .map(|e| e.process_time)
            .sum();

        let session_duration = (Local::now() - self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO);

        SessionStats {
            total,
            successful,
            failed: total - successful,
            session_duration,
            average_process_time: average_time(successful_time, successful),
            model_label: self.model_label.clone(),
        }
    }

    pub fn toggle_context(&mut self) {
        self.context_enabled = !self.context_enabled;
    }

    pub fn set_context(&mut self, enabled: bool) {
        self.context_enabled = enabled;
    }

    pub fn is_context_enabled(&self) -> bool {
        self.context_enabled
    }

    /// Human-readable context status line for the chat loop.
    pub fn context_status(&self) -> &'static str {
        if self.context_enabled {
            "Context: ON - the model will see prior exchanges"
        } else {
            "Context: OFF - each prompt stands alone"
        }
    }

    /// Serialize the full history into the plain-text transcript format.
    ///
    /// Header with start time, model label, and exchange count, then one
    /// block per exchange: the prompt, followed by either a `RESPONSE:`
    /// block with a rounded processing-time annotation or an `ERROR:` block,
    /// separated by a fixed-width divider.
    pub fn export(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== CHAT SESSION - {} ===",
            self.started_at.format("%d/%m/%Y %H:%M:%S")
        );
        let _ = writeln!(out, "Model: {}", self.model_label);
        let _ = writeln!(out, "Total exchanges: {}\n", self.exchanges.len());

        for exchange in &self.exchanges {
            let _ = writeln!(
                out,
                "PROMPT {} [{}]:",
                exchange.ordinal,
                exchange.timestamp.format("%H:%M:%S")
            );
            let _ = writeln!(out, "{}\n", exchange.prompt);

            if exchange.success {
                out.push_str("RESPONSE:\n");
                let _ = writeln!(out, "{}", exchange.response);
                let _ = writeln!(
                    out,
                    "(Processed in {})\n",
                    format_duration(exchange.process_time)
                );
            } else {
                let _ = writeln!(out, "ERROR: {}\n", exchange.error);
            }

            out.push_str(&"-".repeat(50));
            out.push_str("\n\n");
        }

        out
    }

    /// Render the history for interactive display (`/history`). Responses
    /// longer than 200 characters are truncated.
    pub fn format_history(&self) -> String {
        if self.exchanges.is_empty() {
            return "No prompts have been sent in this session yet.".to_string();
        }

        let mut out = String::new();
        let divider = "=".repeat(70);
        let _ = writeln!(out, "{divider}");
        out.push_str("SESSION HISTORY\n");
        let _ = writeln!(out, "{divider}");
        let _ = writeln!(out, "Model: {}", self.model_label);
        let _ = writeln!(out, "Started at: {}", self.started_at.format("%H:%M:%S"));
        let _ = writeln!(out, "Total exchanges: {}", self.exchanges.len());
        let _ = writeln!(out, "{}", "-".repeat(70));

        for exchange in &self.exchanges {
            let status = if exchange.success { "✅" } else { "❌" };
            let _ = writeln!(
                out,
                "\n{status} Prompt {} [{}]:",
                exchange.ordinal,
                exchange.timestamp.format("%H:%M:%S")
            );
            let _ = writeln!(out, "  {}", exchange.prompt);

            if exchange.success {
                let mut response = exchange.response.clone();
                if response.len() > 200 {
                    response = format!("{}...", truncate_chars(&response, 200));
                }
                let _ = writeln!(out, "  {response}");
                let _ = writeln!(
                    out,
                    "  (processed in {})",
                    format_duration(exchange.process_time)
                );
            } else {
                let _ = writeln!(out, "  Error: {}", exchange.error);
            }
        }

        let _ = write!(out, "{divider}");
        out
    }

    /// Render session statistics for interactive display (`/stats`).
    pub fn format_stats(&self) -> String {
        let stats = self.stats();
        let mut out = String::new();
        let divider = "=".repeat(60);
        let _ = writeln!(out, "{divider}");
        out.push_str("SESSION STATISTICS\n");
        let _ = writeln!(out, "{divider}");
        let _ = writeln!(out, "Model: {}", stats.model_label);
        let _ = writeln!(
            out,
            "Session duration: {}",
            format_duration(stats.session_duration)
        );
        let _ = writeln!(out, "Total exchanges: {}", stats.total);
        let _ = writeln!(out, "Successful: {}", stats.successful);
        let _ = writeln!(out, "Failed: {}", stats.failed);

        if stats.successful > 0 {
            let rate = stats.successful as f64 / stats.total as f64 * 100.0;
            let _ = writeln!(out, "Success rate: {rate:.1}%");
            let _ = writeln!(
                out,
                "Average processing time: {}",
                format_duration(stats.average_process_time)
            );
        }

        let _ = write!(out, "{divider}");
        out
    }
}

fn average_time(total: Duration, count: usize) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    total / count as u32
}

/// Format a duration rounded to whole milliseconds, e.g. `850ms` or `1.234s`.
pub fn format_duration(d: Duration) -> String {
    let ms = (d.as_secs_f64() * 1000.0).round() as u64;
    if ms >= 1000 {
        format!("{:.3}s", ms as f64 / 1000.0)
    } else {
        format!("{ms}ms")
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
