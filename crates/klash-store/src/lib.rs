//! Local character storage for the Klash tabletop companion.
//!
//! Characters live in a keyed [`Backend`] guarded by a single data-version
//! marker. Opening a [`CharacterStore`] compares that marker with
//! [`DATA_VERSION`] and wipes the collection on mismatch. Import files are
//! reconciled against existing names and normalized from older record
//! shapes; exports drop store keys and timestamps.

pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod record;
pub mod store;
pub mod version;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use config::{DATA_VERSION, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use export::{export_file_name, export_json};
pub use import::{ImportPlan, LooseCharacter, SkipReason, reconcile, resolve_name};
pub use record::{CharacterId, Clock, FixedClock, StoredCharacter, SystemClock};
pub use store::{CharacterPatch, CharacterStore, ImportReport};
pub use version::{ResetOutcome, check_and_reset};
