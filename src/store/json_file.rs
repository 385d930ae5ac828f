//! JSON file backend for the level store.
//!
//! The document is a flat object `{ "<user id>": { "name": ..., "level": "B2" } }`.
//! Writes go to a sibling temp file which is synced and renamed over the target, so a
//! reader never sees a half-written document.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::traits::{LevelStore, UserRecord, UserRecords};
use crate::error::StoreError;

/// File-backed level store.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Read the document. Caller must hold `lock`.
    async fn read_unlocked(&self) -> Result<UserRecords, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(UserRecords::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        if raw.trim().is_empty() {
            return Ok(UserRecords::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the document atomically. Caller must hold `lock`.
    async fn write_unlocked(&self, records: &UserRecords) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let tmp = self.temp_path();
        let mut file = fs::File::create(&tmp).await.map_err(|e| self.io_error(e))?;
        file.write_all(&json).await.map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;
        file.sync_all().await.map_err(|e| self.io_error(e))?;
        drop(file);

        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

#[async_trait]
impl LevelStore for JsonFileStore {
    async fn load(&self) -> Result<UserRecords, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    async fn save(&self, records: &UserRecords) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.write_unlocked(records).await
    }

    async fn upsert(&self, user_id: &str, record: UserRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_unlocked().await?;
        records.insert(user_id.to_string(), record);
        self.write_unlocked(&records).await?;
        tracing::debug!(path = %self.path.display(), users = records.len(), "User data saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::placement::Tier;

    fn record(name: &str, level: Tier) -> UserRecord {
        UserRecord {
            name: name.to_string(),
            level,
        }
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("users_data.json"));
        assert!(store.load().await.unwrap().is_empty());
        assert!(store.get("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");
        tokio::fs::write(&path, "  \n").await.unwrap();
        let store = JsonFileStore::new(path);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn roundtrip_through_fresh_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("users_data.json");

        let store = JsonFileStore::new(&path);
        store.upsert("101", record("Anna", Tier::B2)).await.unwrap();
        store.upsert("101", record("Anna", Tier::C1)).await.unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(
            reopened.get("101").await.unwrap(),
            Some(record("Anna", Tier::C1))
        );
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn file_layout_is_flat_keyed_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");
        let store = JsonFileStore::new(&path);
        store.upsert("55", record("Bob", Tier::A2)).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({"55": {"name": "Bob", "level": "A2"}}));
    }

    #[tokio::test]
    async fn save_replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("users_data.json"));
        store.upsert("1", record("A", Tier::A1)).await.unwrap();

        let mut replacement = UserRecords::new();
        replacement.insert("2".to_string(), record("B", Tier::B1));
        store.save(&replacement).await.unwrap();

        assert_eq!(store.load().await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");
        tokio::fs::write(&path, "{not json").await.unwrap();
        let store = JsonFileStore::new(path);

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert!(store.upsert("1", record("A", Tier::A1)).await.is_err());
    }

    #[tokio::test]
    async fn unwritable_location_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory sitting where the file should be.
        let path = dir.path().join("users_data.json");
        tokio::fs::create_dir(&path).await.unwrap();
        let store = JsonFileStore::new(path);

        let err = store.upsert("1", record("A", Tier::A1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[tokio::test]
    async fn concurrent_upserts_keep_every_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("users_data.json")));

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .upsert(&i.to_string(), record(&format!("user{i}"), Tier::B1))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 32);
        assert_eq!(records["17"].name, "user17");
    }
}
