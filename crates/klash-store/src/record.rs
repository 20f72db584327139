//! Stored character records, their keys, and the clock that stamps them.

use chrono::{DateTime, Utc};
use klash_mechanics::CharacterSheet;
use serde::{Deserialize, Serialize};

/// Store-assigned numeric key of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub u64);

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A character as persisted: its sheet plus key and creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCharacter {
    /// Store key.
    pub id: CharacterId,
    /// When the record was created (or imported).
    pub created_at: DateTime<Utc>,
    /// The character's mechanical state.
    #[serde(flatten)]
    pub sheet: CharacterSheet,
}

/// Source of creation timestamps.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stuck at one instant, for deterministic timestamps.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
