//! Error types for the mechanics engine.

use thiserror::Error;

use crate::dice::DieRank;

/// Errors raised when a sheet mutation or character definition is invalid.
///
/// Every operation returning one of these leaves its target untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MechError {
    /// The character name is empty after trimming.
    #[error("character name must not be empty")]
    EmptyName,

    /// A proposed resource value lies outside `0..=max`.
    #[error("{resource} value {value} is outside 0..={max}")]
    OutOfRange {
        /// Which resource was being set (e.g. "hp", "wounds").
        resource: &'static str,
        /// The rejected value.
        value: i64,
        /// The inclusive upper bound at the time of the request.
        max: u32,
    },

    /// A maximum hit point value lies outside the allowed range.
    #[error("max hit points {value} must be within {min}..={max}")]
    HitPointsOutOfRange {
        /// The rejected value.
        value: u32,
        /// Lowest allowed value.
        min: u32,
        /// Highest allowed value.
        max: u32,
    },

    /// A die rank is not selectable in the current context.
    #[error("{0} is not an allowed choice here")]
    DieNotAllowed(DieRank),

    /// A die symbol is not on the ladder.
    #[error("unknown die rank: {0}")]
    UnknownDie(String),

    /// The inventory already holds the maximum number of items.
    #[error("inventory is full ({0} items)")]
    InventoryFull(usize),

    /// No item exists at the given inventory slot.
    #[error("no inventory item at slot {0}")]
    ItemNotFound(usize),

    /// An item quality tier is outside the allowed range.
    #[error("item quality {value} must be at most {max}")]
    QualityOutOfRange {
        /// The rejected tier.
        value: u8,
        /// Highest allowed tier.
        max: u8,
    },

    /// An item name is empty after trimming.
    #[error("item name must not be empty")]
    EmptyItemName,
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
