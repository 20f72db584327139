//! Persistence backends for character records and the version marker.
//!
//! A backend is a plain keyed collection. It does not check names or run
//! migrations; [`CharacterStore`](crate::CharacterStore) layers those rules
//! on top.

pub mod file;
pub mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use klash_mechanics::CharacterSheet;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::record::{CharacterId, StoredCharacter};

/// An async keyed store of characters plus one scalar version marker.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Store a new record under a freshly assigned key.
    async fn insert(
        &self,
        sheet: CharacterSheet,
        created_at: DateTime<Utc>,
    ) -> StoreResult<StoredCharacter>;

    /// Store several new records in one step. Either every record is stored
    /// or none is.
    async fn insert_many(
        &self,
        sheets: Vec<CharacterSheet>,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Vec<StoredCharacter>>;

    /// Fetch a record by key.
    async fn get(&self, id: CharacterId) -> StoreResult<Option<StoredCharacter>>;

    /// Overwrite an existing record. Fails with `NotFound` if the key is absent.
    async fn put(&self, record: StoredCharacter) -> StoreResult<()>;

    /// Delete a record. Returns false if the key was absent.
    async fn remove(&self, id: CharacterId) -> StoreResult<bool>;

    /// All records in key order.
    async fn list(&self) -> StoreResult<Vec<StoredCharacter>>;

    /// Delete every record.
    async fn clear(&self) -> StoreResult<()>;

    /// The persisted version marker, if any.
    async fn marker(&self) -> StoreResult<Option<String>>;

    /// Persist a new version marker.
    async fn set_marker(&self, marker: &str) -> StoreResult<()>;
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn insert(
        &self,
        sheet: CharacterSheet,
        created_at: DateTime<Utc>,
    ) -> StoreResult<StoredCharacter> {
        (**self).insert(sheet, created_at).await
    }

    async fn insert_many(
        &self,
        sheets: Vec<CharacterSheet>,
        created_at: DateTime<Utc>,
    ) -> StoreResult<Vec<StoredCharacter>> {
        (**self).insert_many(sheets, created_at).await
    }

    async fn get(&self, id: CharacterId) -> StoreResult<Option<StoredCharacter>> {
        (**self).get(id).await
    }

    async fn put(&self, record: StoredCharacter) -> StoreResult<()> {
        (**self).put(record).await
    }

    async fn remove(&self, id: CharacterId) -> StoreResult<bool> {
        (**self).remove(id).await
    }

    async fn list(&self) -> StoreResult<Vec<StoredCharacter>> {
        (**self).list().await
    }

    async fn clear(&self) -> StoreResult<()> {
        (**self).clear().await
    }

    async fn marker(&self) -> StoreResult<Option<String>> {
        (**self).marker().await
    }

    async fn set_marker(&self, marker: &str) -> StoreResult<()> {
        (**self).set_marker(marker).await
    }
}

/// The character table shared by the built-in backends.
///
/// Keys come from a counter that only ever grows, so a deleted key is never
/// handed out again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Collection {
    next_id: u64,
    #[serde(with = "records_as_list")]
    characters: BTreeMap<CharacterId, StoredCharacter>,
}

impl Default for Collection {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl Collection {
    pub(crate) fn starting_at(next_id: u64) -> Self {
        Self {
            next_id: next_id.max(1),
            characters: BTreeMap::new(),
        }
    }

    pub(crate) fn next_id(&self) -> u64 {
        self.next_id
    }

    pub(crate) fn insert(
        &mut self,
        sheet: CharacterSheet,
        created_at: DateTime<Utc>,
    ) -> StoredCharacter {
        let id = CharacterId(self.next_id);
        self.next_id += 1;
        let record = StoredCharacter {
            id,
            created_at,
            sheet,
        };
        self.characters.insert(id, record.clone());
        record
    }

    pub(crate) fn insert_many(
        &mut self,
        sheets: Vec<CharacterSheet>,
        created_at: DateTime<Utc>,
    ) -> Vec<StoredCharacter> {
        sheets
            .into_iter()
            .map(|sheet| self.insert(sheet, created_at))
            .collect()
    }

    pub(crate) fn get(&self, id: CharacterId) -> Option<StoredCharacter> {
        self.characters.get(&id).cloned()
    }

    pub(crate) fn put(&mut self, record: StoredCharacter) -> StoreResult<()> {
        let slot = self
            .characters
            .get_mut(&record.id)
            .ok_or(StoreError::NotFound(record.id))?;
        *slot = record;
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: CharacterId) -> bool {
        self.characters.remove(&id).is_some()
    }

    pub(crate) fn list(&self) -> Vec<StoredCharacter> {
        self.characters.values().cloned().collect()
    }

    pub(crate) fn clear(&mut self) {
        self.characters.clear();
    }
}

mod records_as_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::record::{CharacterId, StoredCharacter};

    pub(super) fn serialize<S: Serializer>(
        map: &BTreeMap<CharacterId, StoredCharacter>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let list: Vec<&StoredCharacter> = map.values().collect();
        list.serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<CharacterId, StoredCharacter>, D::Error> {
        let list = Vec::<StoredCharacter>::deserialize(deserializer)?;
        Ok(list.into_iter().map(|r| (r.id, r)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klash_mechanics::RuleSet;

    fn sheet(name: &str) -> CharacterSheet {
        CharacterSheet::new(name, 4, &[], &RuleSet::default()).unwrap()
    }

    #[test]
    fn keys_are_never_reused() {
        let mut c = Collection::default();
        let a = c.insert(sheet("A"), Utc::now());
        let b = c.insert(sheet("B"), Utc::now());
        assert_eq!(a.id, CharacterId(1));
        assert_eq!(b.id, CharacterId(2));
        assert!(c.remove(b.id));
        let d = c.insert(sheet("D"), Utc::now());
        assert_eq!(d.id, CharacterId(3));
    }

    #[test]
    fn insert_many_assigns_consecutive_keys() {
        let mut c = Collection::default();
        c.insert(sheet("A"), Utc::now());
        let batch = c.insert_many(vec![sheet("B"), sheet("C")], Utc::now());
        let ids: Vec<u64> = batch.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(c.next_id(), 4);
    }

    #[test]
    fn put_requires_existing_key() {
        let mut c = Collection::default();
        let mut a = c.insert(sheet("A"), Utc::now());
        a.id = CharacterId(99);
        assert!(matches!(c.put(a), Err(StoreError::NotFound(CharacterId(99)))));
    }

    #[test]
    fn list_is_key_ordered() {
        let mut c = Collection::default();
        for name in ["Zed", "Amy", "Moe"] {
            c.insert(sheet(name), Utc::now());
        }
        let ids: Vec<u64> = c.list().iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn serializes_characters_as_list() {
        let mut c = Collection::default();
        c.insert(sheet("A"), Utc::now());
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["nextId"], 2);
        assert!(json["characters"].is_array());
        let back: Collection = serde_json::from_value(json).unwrap();
        assert_eq!(back.list().len(), 1);
    }
}
