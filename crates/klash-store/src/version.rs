//! Startup data-version check.
//!
//! The store has no per-record migrations. When the persisted marker is
//! missing or differs from the compiled-in version, every character is
//! deleted and the marker rewritten.

use crate::backend::Backend;
use crate::config::StoreConfig;
use crate::error::StoreResult;

/// What the startup check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// The collection was wiped. `previous` is the stale marker, if any.
    Reset {
        /// The marker found before the wipe.
        previous: Option<String>,
    },
    /// The marker matched; nothing changed.
    Unchanged,
}

impl ResetOutcome {
    /// Returns true if a wipe happened.
    pub fn was_reset(&self) -> bool {
        matches!(self, Self::Reset { .. })
    }
}

/// Compare the persisted marker to the configured version and wipe on
/// mismatch.
pub async fn check_and_reset<B: Backend + ?Sized>(
    backend: &B,
    config: &StoreConfig,
) -> StoreResult<ResetOutcome> {
    let current = config.marker();
    let stored = backend.marker().await?;
    if stored.as_deref() == Some(current.as_str()) {
        tracing::debug!(version = %current, "data version up to date");
        return Ok(ResetOutcome::Unchanged);
    }

    tracing::info!(
        stored = stored.as_deref().unwrap_or("none"),
        current = %current,
        "data version mismatch, wiping characters"
    );
    backend.clear().await?;
    backend.set_marker(&current).await?;
    Ok(ResetOutcome::Reset { previous: stored })
}
