//! In-memory backend for tests and ephemeral sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use klash_mechanics::CharacterSheet;
use tokio::sync::RwLock;

use super::{Backend, Collection};
use crate::error::StoreResult;
use crate::record::{CharacterId, StoredCharacter};

#[derive(Debug, Default)]
struct MemoryState {
    collection: Collection,
    marker: Option<String>,
}

/// A backend that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    /// Create an empty backend with no version marker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend that already carries a version marker.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                collection: Collection::default(),
                marker: Some(marker.into()),
            }),
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn insert(
        &self,
        sheet: CharacterSheet,
        created_at: DateTime<Utc>,
    ) -> StoreResult<StoredCharacter> {
        let mut state = self.state.write().await;
        Ok(state.collection.insert(sheet, created_at))
    }

    async fn insert_many(
        &self,
        sheets: Vec<CharacterSheet>,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Vec<StoredCharacter>> {
        let mut state = self.state.write().await;
        Ok(state.collection.insert_many(sheets, created_at))
    }

    async fn get(&self, id: CharacterId) -> StoreResult<Option<StoredCharacter>> {
        Ok(self.state.read().await.collection.get(id))
    }

    async fn put(&self, record: StoredCharacter) -> StoreResult<()> {
        self.state.write().await.collection.put(record)
    }

    async fn remove(&self, id: CharacterId) -> StoreResult<bool> {
        Ok(self.state.write().await.collection.remove(id))
    }

    async fn list(&self) -> StoreResult<Vec<StoredCharacter>> {
        Ok(self.state.read().await.collection.list())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.state.write().await.collection.clear();
        Ok(())
    }

    async fn marker(&self) -> StoreResult<Option<String>> {
        Ok(self.state.read().await.marker.clone())
    }

    async fn set_marker(&self, marker: &str) -> StoreResult<()> {
        self.state.write().await.marker = Some(marker.to_string());
        Ok(())
    }
}
