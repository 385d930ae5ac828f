//! Inputs the engine accepts and effects it emits.

use serde::{Deserialize, Serialize};

/// How the user wants their level determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelMethod {
    KnowMyLevel,
    TakeTest,
}

impl LevelMethod {
    pub const ALL: [LevelMethod; 2] = [LevelMethod::KnowMyLevel, LevelMethod::TakeTest];

    pub fn label(&self) -> &'static str {
        match self {
            Self::KnowMyLevel => "I know my level 📊",
            Self::TakeTest => "Take the test 📝",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|m| m.label() == text)
    }
}

/// Follow-on actions offered once the level is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    StartLesson,
    Vocabulary,
    Premium,
}

impl MenuAction {
    pub const ALL: [MenuAction; 3] = [
        MenuAction::StartLesson,
        MenuAction::Vocabulary,
        MenuAction::Premium,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::StartLesson => "📚 Start a lesson",
            Self::Vocabulary => "📖 Vocabulary training",
            Self::Premium => "✨ Premium functions",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|a| a.label() == text)
    }
}

/// A typed user input. Transport adapters map raw text and buttons onto these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Begin (or restart) onboarding.
    Start,
    /// Re-enter the menu from the stored record.
    Menu,
    /// Abandon the session.
    Cancel,
    LevelMethod(LevelMethod),
    MenuAction(MenuAction),
    /// Free text: a name, a tier label or a test answer.
    Text(String),
}

impl Input {
    /// The raw text behind this input, if it carried any.
    ///
    /// A test answer or a name can coincide with a button label, so text-consuming
    /// states read this instead of matching on `Text` alone.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            Self::LevelMethod(method) => Some(method.label()),
            Self::MenuAction(action) => Some(action.label()),
            Self::Start | Self::Menu | Self::Cancel => None,
        }
    }
}

/// What the transport should deliver next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Prompt { text: String, choices: Vec<String> },
    PromptNoChoices { text: String },
    /// The conversation is over; no further input is expected.
    Terminate { text: String },
}

impl Effect {
    pub fn prompt(text: impl Into<String>, choices: Vec<String>) -> Self {
        Self::Prompt {
            text: text.into(),
            choices,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Prompt { text, .. } | Self::PromptNoChoices { text } | Self::Terminate { text } => {
                text.as_str()
            }
        }
    }

    pub fn choices(&self) -> &[String] {
        match self {
            Self::Prompt { choices, .. } => choices,
            _ => &[],
        }
    }

    /// Same effect with `prefix` placed above the text.
    pub fn prefixed(self, prefix: &str) -> Self {
        let join = |text: String| format!("{prefix}\n\n{text}");
        match self {
            Self::Prompt { text, choices } => Self::Prompt {
                text: join(text),
                choices,
            },
            Self::PromptNoChoices { text } => Self::PromptNoChoices { text: join(text) },
            Self::Terminate { text } => Self::Terminate { text: join(text) },
        }
    }
}
