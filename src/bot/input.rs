//! Maps raw message text onto typed placement inputs.

use crate::placement::{Input, LevelMethod, MenuAction};

/// Parses message content into an [`Input`].
pub struct InputParser;

impl InputParser {
    /// Commands are matched case-insensitively and may carry a Telegram `@botname`
    /// suffix. Button labels must match exactly; everything else is free text.
    pub fn parse(content: &str) -> Input {
        let trimmed = content.trim();

        if let Some(command) = parse_command(trimmed) {
            return command;
        }
        if let Some(method) = LevelMethod::from_label(trimmed) {
            return Input::LevelMethod(method);
        }
        if let Some(action) = MenuAction::from_label(trimmed) {
            return Input::MenuAction(action);
        }
        Input::Text(trimmed.to_string())
    }
}

fn parse_command(trimmed: &str) -> Option<Input> {
    let word = trimmed.strip_prefix('/')?.split_whitespace().next()?;
    let name = word.split('@').next().unwrap_or(word).to_lowercase();
    match name.as_str() {
        "start" => Some(Input::Start),
        "menu" => Some(Input::Menu),
        "cancel" => Some(Input::Cancel),
        _ => None,
    }
}
