//! Die ranks, the die ladder, and single-die notation rolls.
//!
//! Ability values are expressed as die ranks drawn from a fixed ladder that
//! runs from a four-sided die reduced by two up to a twenty-sided die. Ranks
//! are only ever compared by their ladder position: the symbols are not
//! lexically ordered ("d10" sorts before "d6" as a string).

pub mod notation;
pub mod roll;

pub use notation::{Notation, NotationError};
pub use roll::{FixedRandom, RandomSource, RollResult, SeededRandom, SystemRandom};

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MechError;

/// A symbolic die rank: face count plus a flat modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DieRank {
    /// Four-sided die, minus two.
    D4Minus2,
    /// Four-sided die, minus one.
    D4Minus1,
    /// Four-sided die.
    D4,
    /// Six-sided die.
    D6,
    /// Eight-sided die.
    D8,
    /// Ten-sided die.
    D10,
    /// Twelve-sided die.
    D12,
    /// Twelve-sided die, plus one.
    D12Plus1,
    /// Twelve-sided die, plus two.
    D12Plus2,
    /// Twelve-sided die, plus three.
    D12Plus3,
    /// Twenty-sided die.
    D20,
}

impl DieRank {
    /// The rank's position on the ladder.
    pub fn index(self) -> usize {
        DieLadder::index_of(self)
    }

    /// The canonical notation symbol, e.g. `"d12+1"`.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::D4Minus2 => "d4-2",
            Self::D4Minus1 => "d4-1",
            Self::D4 => "d4",
            Self::D6 => "d6",
            Self::D8 => "d8",
            Self::D10 => "d10",
            Self::D12 => "d12",
            Self::D12Plus1 => "d12+1",
            Self::D12Plus2 => "d12+2",
            Self::D12Plus3 => "d12+3",
            Self::D20 => "d20",
        }
    }

    /// Number of faces on the underlying die, ignoring the modifier.
    pub fn faces(self) -> u32 {
        match self {
            Self::D4Minus2 | Self::D4Minus1 | Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 | Self::D12Plus1 | Self::D12Plus2 | Self::D12Plus3 => 12,
            Self::D20 => 20,
        }
    }

    /// Flat modifier applied to the die, e.g. `-2` for `d4-2`.
    pub fn modifier(self) -> i32 {
        match self {
            Self::D4Minus2 => -2,
            Self::D4Minus1 => -1,
            Self::D12Plus1 => 1,
            Self::D12Plus2 => 2,
            Self::D12Plus3 => 3,
            _ => 0,
        }
    }

    /// The rank as a rollable notation.
    pub fn notation(self) -> Notation {
        Notation {
            sides: self.faces(),
            modifier: self.modifier(),
        }
    }
}

impl PartialOrd for DieRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DieRank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index().cmp(&other.index())
    }
}

impl std::fmt::Display for DieRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for DieRank {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DieLadder::position(s)
            .and_then(DieLadder::at)
            .ok_or_else(|| MechError::UnknownDie(s.to_string()))
    }
}

impl Serialize for DieRank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for DieRank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The fixed, totally ordered scale of die ranks, weakest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct DieLadder;

impl DieLadder {
    /// Every rank in ascending order.
    pub const RANKS: [DieRank; 11] = [
        DieRank::D4Minus2,
        DieRank::D4Minus1,
        DieRank::D4,
        DieRank::D6,
        DieRank::D8,
        DieRank::D10,
        DieRank::D12,
        DieRank::D12Plus1,
        DieRank::D12Plus2,
        DieRank::D12Plus3,
        DieRank::D20,
    ];

    /// Position of a rank on the ladder.
    pub fn index_of(rank: DieRank) -> usize {
        match rank {
            DieRank::D4Minus2 => 0,
            DieRank::D4Minus1 => 1,
            DieRank::D4 => 2,
            DieRank::D6 => 3,
            DieRank::D8 => 4,
            DieRank::D10 => 5,
            DieRank::D12 => 6,
            DieRank::D12Plus1 => 7,
            DieRank::D12Plus2 => 8,
            DieRank::D12Plus3 => 9,
            DieRank::D20 => 10,
        }
    }

    /// Position of a rank given by its symbol (case-insensitive), or `None`
    /// if the symbol is not on the ladder.
    pub fn position(symbol: &str) -> Option<usize> {
        let symbol = symbol.trim().to_lowercase();
        Self::RANKS.iter().position(|r| r.symbol() == symbol)
    }

    /// The rank at a ladder position, or `None` when out of range.
    pub fn at(index: usize) -> Option<DieRank> {
        Self::RANKS.get(index).copied()
    }

    /// Number of ranks on the ladder.
    pub fn len() -> usize {
        Self::RANKS.len()
    }
}
