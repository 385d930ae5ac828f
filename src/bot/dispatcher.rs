//! Main message loop: routes channel messages through the placement engine.
//!
//! Every `channel:user_id` gets its own worker task fed by a queue, so one user's messages
//! are handled strictly in arrival order while different users run concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::bot::input::InputParser;
use crate::bot::sessions::{SessionManager, SessionSlot};
use crate::channels::{ChannelManager, IncomingMessage, OutgoingResponse};
use crate::error::{Error, Result};
use crate::placement::{Input, PlacementEngine, Session, prompts};

pub struct Dispatcher {
    engine: Arc<PlacementEngine>,
    channels: Arc<ChannelManager>,
    sessions: Arc<SessionManager>,
}

impl Dispatcher {
    pub fn new(engine: Arc<PlacementEngine>, channels: ChannelManager) -> Self {
        Self {
            engine,
            channels: Arc::new(channels),
            sessions: Arc::new(SessionManager::new()),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Run until Ctrl+C or until every channel stream ends.
    ///
    /// When the streams end, queued messages are still answered before returning.
    pub async fn run(self) -> Result<()> {
        let mut message_stream = self.channels.start_all().await?;
        let mut queues: HashMap<String, mpsc::UnboundedSender<IncomingMessage>> = HashMap::new();
        let mut workers = JoinSet::new();

        tracing::info!(channels = ?self.channels.names(), "MoraTalk ready and listening");

        let interrupted = loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break true;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break false;
                        }
                    }
                }
            };

            let key = message.session_key();
            let queue = match queues.get(&key) {
                Some(tx) => tx.clone(),
                None => {
                    let (tx, rx) = mpsc::unbounded_channel();
                    let slot = self.sessions.slot(&key).await;
                    workers.spawn(session_worker(
                        Arc::clone(&self.engine),
                        Arc::clone(&self.channels),
                        slot,
                        rx,
                    ));
                    queues.insert(key, tx.clone());
                    tx
                }
            };

            if queue.send(message).is_err() {
                tracing::warn!("Session worker stopped; dropping message");
            }
        };

        // Closing the queues lets each worker finish what it already has.
        drop(queues);
        if interrupted {
            workers.abort_all();
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined
                && !e.is_cancelled()
            {
                tracing::error!("Session worker failed: {e}");
            }
        }

        tracing::info!("MoraTalk shutting down...");
        self.channels.shutdown_all().await?;
        Ok(())
    }
}

async fn session_worker(
    engine: Arc<PlacementEngine>,
    channels: Arc<ChannelManager>,
    slot: SessionSlot,
    mut rx: mpsc::UnboundedReceiver<IncomingMessage>,
) {
    while let Some(message) = rx.recv().await {
        let response = {
            let mut session = slot.lock().await;
            handle_message(&engine, &mut session, &message).await
        };
        if let Err(e) = channels.respond(&message, response).await {
            tracing::warn!(channel = %message.channel, "Failed to deliver response: {e}");
        }
    }
}

/// Handle one message against a user's session and build the reply.
///
/// Engine errors never escape. A failed level write gets an apology and leaves the
/// session as it was, so the user can simply answer again. `/menu` only reads the store,
/// so its failures get a lookup apology instead.
pub async fn handle_message(
    engine: &PlacementEngine,
    session: &mut Option<Session>,
    message: &IncomingMessage,
) -> OutgoingResponse {
    let input = InputParser::parse(&message.content);
    tracing::debug!(
        message_id = %message.id,
        user_id = %message.user_id,
        channel = %message.channel,
        queued_ms = (Utc::now() - message.received_at).num_milliseconds(),
        ?input,
        "Received message"
    );

    let reads_only = matches!(input, Input::Menu);
    match engine.on_input(&message.user_id, session, input).await {
        Ok(effect) => effect.into(),
        Err(Error::Store(e)) if reads_only => {
            tracing::error!(user_id = %message.user_id, "Failed to load user record: {e}");
            OutgoingResponse::text(prompts::load_failed())
        }
        Err(Error::Store(e)) => {
            tracing::error!(user_id = %message.user_id, "Failed to save level: {e}");
            OutgoingResponse::text(prompts::save_failed())
        }
        Err(e) => {
            tracing::error!(user_id = %message.user_id, "Error handling message: {e}");
            OutgoingResponse::text(prompts::internal_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use futures::stream;

    use super::*;
    use crate::channels::{Channel, MessageStream};
    use crate::error::{ChannelError, StoreError};
    use crate::placement::{LevelMethod, MenuAction, Phase, QuestionBank, Tier};
    use crate::store::{LevelStore, MemoryStore, UserRecord, UserRecords};

    /// Store whose reads and/or writes fail with an I/O error.
    struct BrokenStore {
        reads_fail: bool,
    }

    fn disk_error() -> StoreError {
        StoreError::Io {
            path: "users_data.json".into(),
            source: std::io::Error::other("disk full"),
        }
    }

    #[async_trait]
    impl LevelStore for BrokenStore {
        async fn load(&self) -> std::result::Result<UserRecords, StoreError> {
            if self.reads_fail {
                Err(disk_error())
            } else {
                Ok(UserRecords::new())
            }
        }

        async fn save(&self, _records: &UserRecords) -> std::result::Result<(), StoreError> {
            Err(disk_error())
        }

        async fn upsert(
            &self,
            _user_id: &str,
            _record: UserRecord,
        ) -> std::result::Result<(), StoreError> {
            Err(disk_error())
        }
    }

    fn engine_over(store: Arc<dyn LevelStore>) -> PlacementEngine {
        PlacementEngine::new(Arc::new(QuestionBank::builtin()), store)
    }

    type Sent = Arc<Mutex<Vec<(String, OutgoingResponse)>>>;

    struct ScriptedChannel {
        inbound: Vec<IncomingMessage>,
        sent: Sent,
    }

    #[async_trait]
    impl Channel for ScriptedChannel {
        fn name(&self) -> &str {
            "test"
        }

        async fn start(&self) -> std::result::Result<MessageStream, ChannelError> {
            Ok(Box::pin(stream::iter(self.inbound.clone())))
        }

        async fn respond(
            &self,
            msg: &IncomingMessage,
            response: OutgoingResponse,
        ) -> std::result::Result<(), ChannelError> {
            self.sent
                .lock()
                .unwrap()
                .push((msg.user_id.clone(), response));
            Ok(())
        }
    }

    fn engine(store: Arc<MemoryStore>) -> Arc<PlacementEngine> {
        Arc::new(PlacementEngine::new(
            Arc::new(QuestionBank::builtin()),
            store,
        ))
    }

    fn msg(user: &str, text: &str) -> IncomingMessage {
        IncomingMessage::new("test", user, text)
    }

    #[tokio::test]
    async fn handle_message_runs_onboarding() {
        let engine = engine(Arc::new(MemoryStore::new()));
        let mut session = None;

        let welcome = handle_message(&engine, &mut session, &msg("u1", "/start")).await;
        assert!(welcome.choices.is_empty());

        let method = handle_message(&engine, &mut session, &msg("u1", "Anna")).await;
        assert_eq!(
            method.choices,
            vec![
                LevelMethod::KnowMyLevel.label().to_string(),
                LevelMethod::TakeTest.label().to_string()
            ]
        );
        assert_eq!(session.as_ref().unwrap().name, "Anna");
    }

    #[tokio::test]
    async fn handle_message_without_session_points_to_start() {
        let engine = engine(Arc::new(MemoryStore::new()));
        let mut session = None;

        let reply = handle_message(&engine, &mut session, &msg("u1", "hello")).await;
        assert_eq!(reply.content, prompts::no_session());
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn failed_save_apologizes_and_keeps_the_level_choice_open() {
        let engine = engine_over(Arc::new(BrokenStore { reads_fail: false }));
        let mut session = None;
        handle_message(&engine, &mut session, &msg("u1", "/start")).await;
        handle_message(&engine, &mut session, &msg("u1", "Anna")).await;
        handle_message(
            &engine,
            &mut session,
            &msg("u1", LevelMethod::KnowMyLevel.label()),
        )
        .await;
        let before = session.clone();

        let reply = handle_message(&engine, &mut session, &msg("u1", Tier::B2.label())).await;
        assert_eq!(reply.content, prompts::save_failed());
        assert!(reply.choices.is_empty());
        assert_eq!(session, before);
        assert_eq!(
            session.as_ref().unwrap().phase,
            Phase::AwaitingLevelChoice {
                choosing_level: true
            }
        );
        assert_eq!(session.as_ref().unwrap().confirmed_level, None);
    }

    #[tokio::test]
    async fn failed_lookup_on_menu_gets_its_own_apology() {
        let engine = engine_over(Arc::new(BrokenStore { reads_fail: true }));
        let mut session = None;

        let reply = handle_message(&engine, &mut session, &msg("u1", "/menu")).await;
        assert_eq!(reply.content, prompts::load_failed());
        assert_ne!(reply.content, prompts::save_failed());
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn run_serves_users_in_order_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let sent: Sent = Arc::new(Mutex::new(Vec::new()));
        let script = [
            ("u1", "/start"),
            ("u2", "/start"),
            ("u1", "Anna"),
            ("u2", "Ben"),
            ("u1", LevelMethod::KnowMyLevel.label()),
            ("u1", Tier::B2.label()),
            ("u2", "/cancel"),
        ];
        let mut manager = ChannelManager::new();
        manager.add(Box::new(ScriptedChannel {
            inbound: script.iter().map(|(u, t)| msg(u, t)).collect(),
            sent: Arc::clone(&sent),
        }));

        let dispatcher = Dispatcher::new(engine(Arc::clone(&store)), manager);
        let sessions = Arc::clone(dispatcher.sessions());
        dispatcher.run().await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), script.len());

        let u1: Vec<&OutgoingResponse> = sent
            .iter()
            .filter(|(u, _)| u == "u1")
            .map(|(_, r)| r)
            .collect();
        assert_eq!(u1.len(), 4);
        assert!(u1[3].choices.contains(&MenuAction::StartLesson.label().to_string()));

        let u2_last = sent.iter().rev().find(|(u, _)| u == "u2").unwrap();
        assert!(u2_last.1.end_of_conversation);

        let record = store.get("u1").await.unwrap().unwrap();
        assert_eq!(record.name, "Anna");
        assert_eq!(record.level, Tier::B2);
        assert!(store.get("u2").await.unwrap().is_none());

        let slot = sessions.slot("test:u1").await;
        assert_eq!(slot.lock().await.as_ref().unwrap().phase, Phase::InMenu);
        assert!(sessions.slot("test:u2").await.lock().await.is_none());
    }
}
