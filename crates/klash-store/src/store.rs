//! The character store: a version-checked backend plus the name and sheet
//! rules every write must satisfy.

use std::sync::Arc;

use klash_mechanics::{
    Abilities, AbilityCode, CharacterSheet, Inventory, MechResult, RuleSet, SheetEdit,
    StepDirection,
};

use crate::backend::Backend;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::export;
use crate::import::{self, fold};
use crate::record::{CharacterId, Clock, StoredCharacter, SystemClock};
use crate::version::{self, ResetOutcome};

/// Optional field updates merged onto a stored character.
///
/// Every present field is validated before anything is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterPatch {
    /// New name; must stay unique.
    pub name: Option<String>,
    /// New ability record.
    pub abilities: Option<Abilities>,
    /// New maximum hit points.
    pub max_hp: Option<u32>,
    /// New current hit points.
    pub current_hp: Option<u32>,
    /// New current wounds.
    pub current_wounds: Option<u32>,
    /// New inventory.
    pub inventory: Option<Inventory>,
}

impl CharacterPatch {
    fn apply(&self, sheet: &mut CharacterSheet, rules: &RuleSet) -> MechResult<()> {
        if let Some(name) = &self.name {
            sheet.rename(name)?;
        }
        if let Some(abilities) = &self.abilities {
            sheet.set_abilities(abilities.clone());
        }
        if let Some(max_hp) = self.max_hp {
            sheet.set_max_hp(max_hp, rules)?;
        }
        if let Some(hp) = self.current_hp {
            sheet.set_current_hp(i64::from(hp))?;
        }
        if let Some(wounds) = self.current_wounds {
            sheet.set_current_wounds(i64::from(wounds))?;
        }
        if let Some(inventory) = &self.inventory {
            sheet.set_inventory(inventory.clone(), rules)?;
        }
        Ok(())
    }
}

/// Result of committing an import batch.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// The newly stored characters, in batch order.
    pub accepted: Vec<StoredCharacter>,
    /// Number of records skipped.
    pub skipped: usize,
}

/// Characters persisted through a [`Backend`].
///
/// Only obtainable through [`CharacterStore::open`], so the version check
/// always runs before the first read or write.
pub struct CharacterStore<B> {
    backend: B,
    rules: RuleSet,
    clock: Arc<dyn Clock>,
}

impl<B: Backend> CharacterStore<B> {
    /// Run the startup version check against `backend` and return a store
    /// ready for use.
    pub async fn open(backend: B, config: &StoreConfig) -> StoreResult<(Self, ResetOutcome)> {
        let outcome = version::check_and_reset(&backend, config).await?;
        let store = Self {
            backend,
            rules: RuleSet::default(),
            clock: Arc::new(SystemClock),
        };
        Ok((store, outcome))
    }

    /// Use a different ruleset for validation.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Use a different clock for creation timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The ruleset in use.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Store a new character. Fails if the name is taken (case-insensitive).
    pub async fn create(&self, sheet: CharacterSheet) -> StoreResult<StoredCharacter> {
        self.ensure_unique(sheet.name(), None).await?;
        let record = self.backend.insert(sheet, self.clock.now()).await?;
        tracing::debug!(id = %record.id, name = record.sheet.name(), "created character");
        Ok(record)
    }

    /// Fetch one character.
    pub async fn get(&self, id: CharacterId) -> StoreResult<StoredCharacter> {
        self.backend
            .get(id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    /// All characters in key order.
    pub async fn list(&self) -> StoreResult<Vec<StoredCharacter>> {
        self.backend.list().await
    }

    /// Number of stored characters.
    pub async fn count(&self) -> StoreResult<usize> {
        Ok(self.backend.list().await?.len())
    }

    /// Apply a read-modify-write change to one sheet. If `change` fails the
    /// record is left as it was.
    pub async fn modify<F>(&self, id: CharacterId, change: F) -> StoreResult<StoredCharacter>
    where
        F: FnOnce(&mut CharacterSheet) -> MechResult<()> + Send,
    {
        let mut record = self.get(id).await?;
        let previous_name = fold(record.sheet.name());
        change(&mut record.sheet)?;
        if fold(record.sheet.name()) != previous_name {
            self.ensure_unique(record.sheet.name(), Some(id)).await?;
        }
        self.backend.put(record.clone()).await?;
        tracing::debug!(id = %id, "updated character");
        Ok(record)
    }

    /// Merge a partial update.
    pub async fn update(
        &self,
        id: CharacterId,
        patch: &CharacterPatch,
    ) -> StoreResult<StoredCharacter> {
        let rules = self.rules.clone();
        self.modify(id, |sheet| patch.apply(sheet, &rules)).await
    }

    /// Apply an edit-form submission.
    pub async fn edit(&self, id: CharacterId, edit: &SheetEdit) -> StoreResult<StoredCharacter> {
        let rules = self.rules.clone();
        self.modify(id, |sheet| sheet.apply_edit(edit, &rules)).await
    }

    /// Step one ability and persist the result. A blocked step is a no-op,
    /// not an error.
    pub async fn step_ability(
        &self,
        id: CharacterId,
        code: AbilityCode,
        direction: StepDirection,
    ) -> StoreResult<StoredCharacter> {
        let record = self.get(id).await?;
        let mut sheet = record.sheet.clone();
        if !sheet.step(code, direction) {
            return Ok(record);
        }
        self.modify(id, |s| {
            *s = sheet;
            Ok(())
        })
        .await
    }

    /// Set current hit points; rejected outside `0..=max_hp`.
    pub async fn set_current_hp(
        &self,
        id: CharacterId,
        value: i64,
    ) -> StoreResult<StoredCharacter> {
        self.modify(id, |sheet| sheet.set_current_hp(value).map(drop)).await
    }

    /// Set current wounds; rejected outside `0..=wound_capacity`.
    pub async fn set_current_wounds(
        &self,
        id: CharacterId,
        value: i64,
    ) -> StoreResult<StoredCharacter> {
        self.modify(id, |sheet| sheet.set_current_wounds(value).map(drop)).await
    }

    /// Delete one character.
    pub async fn delete(&self, id: CharacterId) -> StoreResult<()> {
        if !self.backend.remove(id).await? {
            return Err(StoreError::NotFound(id));
        }
        tracing::debug!(id = %id, "deleted character");
        Ok(())
    }

    /// Merge a batch of raw records into the store.
    ///
    /// Names are de-duplicated against existing characters and each other;
    /// every accepted record gets the current time as its creation time.
    /// Accepted records are committed together: if the backend fails, none
    /// of them is stored.
    pub async fn import(&self, batch: Vec<serde_json::Value>) -> StoreResult<ImportReport> {
        let existing: Vec<String> = self
            .list()
            .await?
            .into_iter()
            .map(|r| r.sheet.name().to_string())
            .collect();
        let plan = import::reconcile(batch, existing, &self.rules);

        let skipped = plan.skipped();
        let accepted = self
            .backend
            .insert_many(plan.accepted, self.clock.now())
            .await?;
        tracing::info!(
            accepted = accepted.len(),
            skipped,
            "imported characters"
        );
        Ok(ImportReport { accepted, skipped })
    }

    /// Parse an export file and import it. The top level must be a JSON array.
    pub async fn import_json(&self, text: &str) -> StoreResult<ImportReport> {
        let batch: Vec<serde_json::Value> = serde_json::from_str(text)?;
        self.import(batch).await
    }

    /// Export every character as JSON.
    pub async fn export_json(&self) -> StoreResult<String> {
        export::export_json(&self.list().await?)
    }

    async fn ensure_unique(&self, name: &str, except: Option<CharacterId>) -> StoreResult<()> {
        let wanted = fold(name);
        let clash = self
            .backend
            .list()
            .await?
            .into_iter()
            .any(|r| Some(r.id) != except && fold(r.sheet.name()) == wanted);
        if clash {
            return Err(StoreError::DuplicateName(name.trim().to_string()));
        }
        Ok(())
    }
}
