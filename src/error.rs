//! Error types for MoraTalk.

use std::path::PathBuf;

use crate::placement::Tier;

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Question bank error: {0}")]
    Bank(#[from] BankError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Level store errors. Always fatal for the request that triggered them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt user data in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("No channel named {0}")]
    UnknownChannel(String),
}

/// Question bank errors.
///
/// `Missing*` and `OutOfRange` during a running test mean the engine's own bookkeeping is
/// broken; they are never recovered from.
#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("No questions for tier {0}")]
    MissingTier(Tier),

    #[error("Tier {tier} has {count} questions, expected 5")]
    WrongQuestionCount { tier: Tier, count: usize },

    #[error("Tier {tier} question {index}: correct index {correct_index} is out of range")]
    InvalidCorrectIndex {
        tier: Tier,
        index: usize,
        correct_index: usize,
    },

    #[error("Tier {tier} question {index}: duplicate option labels")]
    DuplicateOptions { tier: Tier, index: usize },

    #[error("Question {index} out of range for tier {tier}")]
    OutOfRange { tier: Tier, index: usize },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
