//! JSON-file backend.
//!
//! Keeps two files in a data directory: `version` holds the marker and
//! `characters.json` holds the collection. The collection is only decoded on
//! first use, so a file written in an older, unreadable shape can still be
//! wiped by the startup version check. Every mutation rewrites the
//! collection through a temporary file and a rename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use klash_mechanics::CharacterSheet;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{Backend, Collection};
use crate::error::{StoreError, StoreResult};
use crate::record::{CharacterId, StoredCharacter};

const MARKER_FILE: &str = "version";
const COLLECTION_FILE: &str = "characters.json";

/// A backend persisted as files under one directory.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    collection: Mutex<Option<Collection>>,
}

/// Just enough of the collection file to keep the key counter across a wipe.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionHeader {
    #[serde(default)]
    next_id: u64,
}

impl FileBackend {
    /// Open (creating if needed) a data directory.
    pub async fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            collection: Mutex::new(None),
        })
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self) -> PathBuf {
        self.dir.join(COLLECTION_FILE)
    }

    fn marker_path(&self) -> PathBuf {
        self.dir.join(MARKER_FILE)
    }

    async fn read_collection(&self) -> StoreResult<Collection> {
        match tokio::fs::read_to_string(self.collection_path()).await {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Collection::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_collection(&self, collection: &Collection) -> StoreResult<()> {
        let text = serde_json::to_string_pretty(collection)?;
        write_atomic(&self.collection_path(), &text).await
    }

    /// Run `f` against a copy of the collection and persist the copy. The
    /// cached collection only changes once the write has succeeded.
    async fn mutate<T: Send>(
        &self,
        f: impl FnOnce(&mut Collection) -> StoreResult<T> + Send,
    ) -> StoreResult<T> {
        let mut guard = self.collection.lock().await;
        let mut next = match guard.as_ref() {
            Some(c) => c.clone(),
            None => self.read_collection().await?,
        };
        let out = f(&mut next)?;
        self.write_collection(&next).await?;
        *guard = Some(next);
        Ok(out)
    }

    async fn read<T: Send>(&self, f: impl FnOnce(&Collection) -> T + Send) -> StoreResult<T> {
        let mut guard = self.collection.lock().await;
        if guard.is_none() {
            *guard = Some(self.read_collection().await?);
        }
        match guard.as_ref() {
            Some(c) => Ok(f(c)),
            None => Err(StoreError::Persistence("collection not loaded".to_string())),
        }
    }
}

async fn write_atomic(path: &Path, contents: &str) -> StoreResult<()> {
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl Backend for FileBackend {
    async fn insert(
        &self,
        sheet: CharacterSheet,
        created_at: DateTime<Utc>,
    ) -> StoreResult<StoredCharacter> {
        self.mutate(|c| Ok(c.insert(sheet, created_at))).await
    }

    async fn insert_many(
        &self,
        sheets: Vec<CharacterSheet>,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Vec<StoredCharacter>> {
        self.mutate(|c| Ok(c.insert_many(sheets, created_at))).await
    }

    async fn get(&self, id: CharacterId) -> StoreResult<Option<StoredCharacter>> {
        self.read(|c| c.get(id)).await
    }

    async fn put(&self, record: StoredCharacter) -> StoreResult<()> {
        self.mutate(|c| c.put(record)).await
    }

    async fn remove(&self, id: CharacterId) -> StoreResult<bool> {
        self.mutate(|c| Ok(c.remove(id))).await
    }

    async fn list(&self) -> StoreResult<Vec<StoredCharacter>> {
        self.read(Collection::list).await
    }

    async fn clear(&self) -> StoreResult<()> {
        let mut guard = self.collection.lock().await;
        let next_id = match guard.as_ref() {
            Some(c) => c.next_id(),
            None => match tokio::fs::read_to_string(self.collection_path()).await {
                Ok(text) => serde_json::from_str::<CollectionHeader>(&text)
                    .map(|h| h.next_id)
                    .unwrap_or(1),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => 1,
                Err(e) => return Err(e.into()),
            },
        };
        let empty = Collection::starting_at(next_id);
        self.write_collection(&empty).await?;
        *guard = Some(empty);
        Ok(())
    }

    async fn marker(&self) -> StoreResult<Option<String>> {
        match tokio::fs::read_to_string(self.marker_path()).await {
            Ok(text) => Ok(Some(text.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_marker(&self, marker: &str) -> StoreResult<()> {
        write_atomic(&self.marker_path(), marker).await
    }
}
