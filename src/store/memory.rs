//! In-memory level store, for tests and throwaway runs.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::traits::{LevelStore, UserRecord, UserRecords};
use crate::error::StoreError;

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<UserRecords>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot.
    pub fn with_records(records: UserRecords) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl LevelStore for MemoryStore {
    async fn load(&self) -> Result<UserRecords, StoreError> {
        Ok(self.records.lock().await.clone())
    }

    async fn save(&self, records: &UserRecords) -> Result<(), StoreError> {
        *self.records.lock().await = records.clone();
        Ok(())
    }

    async fn upsert(&self, user_id: &str, record: UserRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .await
            .insert(user_id.to_string(), record);
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.records.lock().await.get(user_id).cloned())
    }
}
