//! JSON-lines console for the assistant.

use anyhow::Result;
use campus_assistant::{AssistantTelemetry, CampusAssistant, ConversationContext};
use serde::Deserialize;
use serde_json::{json, Value};
use shared_logging::LogLevel;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::mpsc::{self, UnboundedSender},
};

/// Commands accepted from the console.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleCommand {
    /// Ask a question.
    Ask {
        /// Question text.
        question: String,
    },
    /// Re-read the catalog file.
    Reload,
    /// Print public/private counts.
    Stats,
    /// Exit the loop.
    Quit,
}

/// Reads JSON line commands and forwards them to the dispatcher.
pub struct ConsoleCommandReceiver {
    sender: UnboundedSender<ConsoleCommand>,
    telemetry: Option<AssistantTelemetry>,
}

impl ConsoleCommandReceiver {
    /// Creates a new receiver.
    #[must_use]
    pub const fn new(
        sender: UnboundedSender<ConsoleCommand>,
        telemetry: Option<AssistantTelemetry>,
    ) -> Self {
        Self { sender, telemetry }
    }

    /// Reads lines until `quit` or end of input. Lines that are not a valid
    /// command are reported and skipped.
    pub async fn run<R>(&self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let cmd: ConsoleCommand = match serde_json::from_str(&line) {
                Ok(cmd) => cmd,
                Err(err) => {
                    println!("{}", json!({ "error": format!("invalid console command: {err}") }));
                    self.log(LogLevel::Warn, "console.command.invalid", json!({ "error": err.to_string() }));
                    continue;
                }
            };
            if cmd == ConsoleCommand::Quit {
                break;
            }
            self.sender.send(cmd)?;
        }
        self.log(LogLevel::Info, "console.receiver.shutdown", json!({}));
        Ok(())
    }

    fn log(&self, level: LogLevel, message: &str, metadata: Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(level, message, metadata);
        }
    }
}

/// Executes one command and returns the JSON reply line.
#[must_use]
pub fn dispatch(assistant: &CampusAssistant, command: ConsoleCommand) -> Value {
    match command {
        ConsoleCommand::Ask { question } => {
            let (response, _) = assistant.answer(&question, &ConversationContext::default());
            json!({ "response": response })
        }
        ConsoleCommand::Reload => match assistant.rebuild() {
            Ok(count) => json!({ "status": "success", "count": count }),
            Err(err) => json!({ "status": "error", "error": err.to_string() }),
        },
        ConsoleCommand::Stats => json!(assistant.stats()),
        ConsoleCommand::Quit => json!({ "status": "bye" }),
    }
}

/// Runs the console on stdin until `quit` or end of input.
pub async fn run_stdin(
    assistant: CampusAssistant,
    telemetry: Option<AssistantTelemetry>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let receiver = ConsoleCommandReceiver::new(tx, telemetry);
    let reader = tokio::spawn(async move {
        receiver
            .run(BufReader::new(tokio::io::stdin()))
            .await
    });
    while let Some(cmd) = rx.recv().await {
        println!("{}", dispatch(&assistant, cmd));
    }
    reader.await?
}
