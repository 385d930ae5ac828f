//! `LevelStore` trait — durable mapping from user id to confirmed level.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::placement::Tier;

/// What is remembered about a user once their level is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub level: Tier,
}

/// The whole persisted document, keyed by opaque user id.
pub type UserRecords = BTreeMap<String, UserRecord>;

/// Whole-document persistence for user records.
///
/// Implementations store a single snapshot. `upsert` is a read-modify-write cycle and must
/// hold an exclusive lock for its whole duration so that concurrent sessions never lose
/// each other's writes.
#[async_trait]
pub trait LevelStore: Send + Sync {
    /// Load every record. A store with no prior state returns an empty map.
    async fn load(&self) -> Result<UserRecords, StoreError>;

    /// Replace the whole document.
    async fn save(&self, records: &UserRecords) -> Result<(), StoreError>;

    /// Set one user's record, keeping everyone else's.
    async fn upsert(&self, user_id: &str, record: UserRecord) -> Result<(), StoreError>;

    /// Look up one user's record.
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.load().await?.remove(user_id))
    }
}
