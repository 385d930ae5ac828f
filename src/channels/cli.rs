//! CLI channel — stdin/stdout REPL for local testing.
//!
//! Choices are printed as a numbered list; typing the number sends that choice's label.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::{Channel, IncomingMessage, MessageStream, OutgoingResponse};
use crate::error::ChannelError;

/// A simple CLI channel that reads from stdin and writes to stdout.
pub struct CliChannel {
    /// Choices from the last response, for number shortcuts.
    last_choices: Arc<Mutex<Vec<String>>>,
}

impl CliChannel {
    pub fn new() -> Self {
        Self {
            last_choices: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn `"2"` into the second offered choice; anything else passes through.
fn resolve_choice(line: &str, choices: &[String]) -> String {
    line.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| choices.get(i))
        .cloned()
        .unwrap_or_else(|| line.to_string())
}

fn render(response: &OutgoingResponse) -> String {
    let mut out = response.content.clone();
    for (i, choice) in response.choices.iter().enumerate() {
        out.push_str(&format!("\n  [{}] {}", i + 1, choice));
    }
    out
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let last_choices = Arc::clone(&self.last_choices);

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            eprintln!("Type /start to begin, /menu to reopen the menu, /cancel to stop.");
            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        let content = match last_choices.lock() {
                            Ok(choices) => resolve_choice(&line, &choices),
                            Err(_) => line,
                        };
                        let msg = IncomingMessage::new("cli", "local-user", &content);
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        println!("\n{}\n", render(&response));
        if let Ok(mut choices) = self.last_choices.lock() {
            *choices = response.choices;
        }
        eprint!("> ");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices() -> Vec<String> {
        vec!["is".into(), "are".into(), "am".into(), "be".into()]
    }

    #[test]
    fn number_selects_choice() {
        assert_eq!(resolve_choice("2", &choices()), "are");
        assert_eq!(resolve_choice("4", &choices()), "be");
    }

    #[test]
    fn out_of_range_number_passes_through() {
        assert_eq!(resolve_choice("0", &choices()), "0");
        assert_eq!(resolve_choice("5", &choices()), "5");
        assert_eq!(resolve_choice("7", &[]), "7");
    }

    #[test]
    fn text_passes_through() {
        assert_eq!(resolve_choice("Anna", &choices()), "Anna");
    }

    #[test]
    fn render_numbers_choices() {
        let response = OutgoingResponse {
            content: "Pick".into(),
            choices: vec!["a".into(), "b".into()],
            end_of_conversation: false,
        };
        assert_eq!(render(&response), "Pick\n  [1] a\n  [2] b");
    }

    #[tokio::test]
    async fn respond_remembers_choices() {
        let ch = CliChannel::new();
        let msg = IncomingMessage::new("cli", "local-user", "x");
        let response = OutgoingResponse {
            content: "Pick".into(),
            choices: choices(),
            end_of_conversation: false,
        };
        ch.respond(&msg, response).await.unwrap();
        assert_eq!(*ch.last_choices.lock().unwrap(), choices());
    }
}
