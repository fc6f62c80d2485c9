//! Slash-command parsing for the chat loop.
//!
//! Anything that does not start with `/` is a prompt for the model. Slash
//! commands act on the local session only and never reach the backend.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    History,
    Stats,
    /// Toggle whether history is forwarded to the adapter.
    Context,
    /// Show the current context flag without changing it.
    Status,
    Clear,
    /// Write the transcript to the given file, or a timestamped default.
    Export(Option<String>),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Forward the text to the model as a prompt.
    Prompt(String),
    Command(Command),
    /// A slash command we do not recognize.
    Unknown(String),
    Empty,
}

pub fn parse_input(input: &str) -> InputAction {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return InputAction::Empty;
    }

    if !trimmed.starts_with('/') {
        return InputAction::Prompt(trimmed.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    match name {
        "help" | "?" => InputAction::Command(Command::Help),
        "history" => InputAction::Command(Command::History),
        "stats" => InputAction::Command(Command::Stats),
        "context" => InputAction::Command(Command::Context),
        "status" => InputAction::Command(Command::Status),
        "clear" => InputAction::Command(Command::Clear),
        "export" => {
            let target = if args.is_empty() {
                None
            } else {
                Some(args.to_string())
            };
            InputAction::Command(Command::Export(target))
        }
        "quit" | "exit" | "q" => InputAction::Command(Command::Quit),
        _ => InputAction::Unknown(name.to_string()),
    }
}

pub fn help_text() -> &'static str {
    "Commands:\n\
     /help             Show this help\n\
     /history          Show the session history\n\
     /stats            Show session statistics\n\
     /context          Toggle conversation context on or off\n\
     /status           Show whether context is enabled\n\
     /export [file]    Write the transcript to a file\n\
     /clear            Clear the screen\n\
     /quit             End the session\n\
     \n\
     Anything else is sent to the model as a prompt."
}
