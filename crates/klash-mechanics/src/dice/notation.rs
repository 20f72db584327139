//! Parsing of single-die notation such as `d6`, `d4-2`, or `D12+1`.
//!
//! The grammar is the letter `d` followed by one or more digits, optionally
//! followed by a sign and one or more digits. Matching is case-insensitive
//! and anchored at both ends; surrounding whitespace is not accepted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a notation string does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    /// The input string is empty.
    #[error("empty dice notation")]
    Empty,
    /// The input does not match `d<sides>[<sign><modifier>]`.
    #[error("invalid dice notation: '{0}'")]
    InvalidFormat(String),
    /// A die needs at least one side.
    #[error("a die must have at least one side")]
    ZeroSides,
    /// A number in the notation does not fit its integer type.
    #[error("number too large in dice notation: '{0}'")]
    Overflow(String),
}

/// A parsed single-die notation: side count and signed modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notation {
    /// Number of sides on the die.
    pub sides: u32,
    /// Flat modifier added to the raw roll.
    pub modifier: i32,
}

impl Notation {
    /// Parse a notation string.
    pub fn parse(text: &str) -> Result<Self, NotationError> {
        if text.is_empty() {
            return Err(NotationError::Empty);
        }
        let invalid = || NotationError::InvalidFormat(text.to_string());

        let rest = text
            .strip_prefix('d')
            .or_else(|| text.strip_prefix('D'))
            .ok_or_else(invalid)?;

        let sides_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (sides_str, tail) = rest.split_at(sides_end);
        if sides_str.is_empty() {
            return Err(invalid());
        }

        let modifier = match tail.chars().next() {
            None => 0,
            Some(sign @ ('+' | '-')) => {
                let digits = &tail[1..];
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                let overflow = || NotationError::Overflow(text.to_string());
                let magnitude: i64 = digits.parse().map_err(|_| overflow())?;
                let value = if sign == '-' { -magnitude } else { magnitude };
                i32::try_from(value).map_err(|_| overflow())?
            }
            Some(_) => return Err(invalid()),
        };

        let sides: u32 = sides_str
            .parse()
            .map_err(|_| NotationError::Overflow(text.to_string()))?;
        if sides == 0 {
            return Err(NotationError::ZeroSides);
        }

        Ok(Self { sides, modifier })
    }
}

impl std::str::FromStr for Notation {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Notation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}
