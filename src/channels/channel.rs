//! Channel trait and the message types that cross it.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::error::ChannelError;
use crate::placement::Effect;

/// A message received from a user on some channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Name of the channel it arrived on, e.g. "telegram".
    pub channel: String,
    /// Channel-native user identifier. Used as the level store key.
    pub user_id: String,
    pub content: String,
    pub received_at: DateTime<Utc>,
    /// Channel-specific routing data (e.g. Telegram `chat_id`).
    pub metadata: serde_json::Value,
}

impl IncomingMessage {
    pub fn new(channel: &str, user_id: &str, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            received_at: Utc::now(),
            metadata: serde_json::json!({}),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Key of the conversation this message belongs to.
    pub fn session_key(&self) -> String {
        format!("{}:{}", self.channel, self.user_id)
    }
}

/// A reply to deliver back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingResponse {
    pub content: String,
    /// Buttons to offer, in order. Empty means no keyboard.
    pub choices: Vec<String>,
    /// The conversation ended; channels may tidy up their UI.
    pub end_of_conversation: bool,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            choices: Vec::new(),
            end_of_conversation: false,
        }
    }
}

impl From<Effect> for OutgoingResponse {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::Prompt { text, choices } => Self {
                content: text,
                choices,
                end_of_conversation: false,
            },
            Effect::PromptNoChoices { text } => Self::text(text),
            Effect::Terminate { text } => Self {
                content: text,
                choices: Vec::new(),
                end_of_conversation: true,
            },
        }
    }
}

/// Stream of inbound messages from a channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A transport that delivers user text in and prompts out.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start listening. Messages arrive on the returned stream until the channel stops.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Deliver a response to the user who sent `msg`.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_combines_channel_and_user() {
        let msg = IncomingMessage::new("telegram", "12345", "hi");
        assert_eq!(msg.session_key(), "telegram:12345");
    }

    #[test]
    fn effect_maps_to_response() {
        let prompt: OutgoingResponse =
            Effect::prompt("Pick", vec!["A1 - Beginner".into()]).into();
        assert_eq!(prompt.choices, vec!["A1 - Beginner"]);
        assert!(!prompt.end_of_conversation);

        let done: OutgoingResponse = Effect::Terminate { text: "Bye".into() }.into();
        assert!(done.choices.is_empty());
        assert!(done.end_of_conversation);
    }
}
