//! Ability codes, per-ability ranks, and the fixed ability record.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dice::DieRank;

/// The closed set of ability codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbilityCode {
    /// Strength. Its max rank sets wound capacity.
    #[serde(rename = "STR")]
    Str,
    /// Dexterity.
    #[serde(rename = "DEX")]
    Dex,
    /// Willpower. Its current rank sets the magic dice count.
    #[serde(rename = "WIL")]
    Wil,
}

impl AbilityCode {
    /// Every code, in sheet order.
    pub const ALL: [AbilityCode; 3] = [Self::Str, Self::Dex, Self::Wil];

    /// Three-letter code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Dex => "DEX",
            Self::Wil => "WIL",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Str => "Strength",
            Self::Dex => "Dexterity",
            Self::Wil => "Willpower",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Str => 0,
            Self::Dex => 1,
            Self::Wil => 2,
        }
    }
}

impl std::fmt::Display for AbilityCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AbilityCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown ability code: {s}"))
    }
}

/// One ability's current and max rank, with `current <= max` on the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AbilityRanks")]
pub struct Ability {
    current: DieRank,
    max: DieRank,
}

#[derive(Deserialize)]
struct AbilityRanks {
    current: DieRank,
    max: DieRank,
}

impl From<AbilityRanks> for Ability {
    fn from(r: AbilityRanks) -> Self {
        Self::ranked(r.current, r.max)
    }
}

impl Ability {
    /// A fresh ability with `current == max`.
    pub fn new(max: DieRank) -> Self {
        Self { current: max, max }
    }

    /// An ability with an explicit current rank, lowered to `max` if above it.
    pub fn ranked(current: DieRank, max: DieRank) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    /// Current rank.
    pub fn current(&self) -> DieRank {
        self.current
    }

    /// Max rank.
    pub fn max(&self) -> DieRank {
        self.max
    }

    /// The same ability with a new current rank (still capped at max).
    pub fn stepped_to(self, current: DieRank) -> Self {
        Self::ranked(current, self.max)
    }

    /// The same ability with a new max rank; current is re-clamped to it.
    pub fn with_max(self, max: DieRank) -> Self {
        Self::ranked(self.current, max)
    }
}

/// The ability record of a character, one optional slot per [`AbilityCode`].
///
/// Slots are only empty for records imported from older shapes; sheets
/// created here always fill all three.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<AbilityCode, Ability>",
    into = "BTreeMap<AbilityCode, Ability>"
)]
pub struct Abilities {
    slots: [Option<Ability>; 3],
}

impl Abilities {
    /// Every ability set to the same fresh rank.
    pub fn uniform(rank: DieRank) -> Self {
        Self {
            slots: [Some(Ability::new(rank)); 3],
        }
    }

    /// The ability for `code`, if present.
    pub fn get(&self, code: AbilityCode) -> Option<&Ability> {
        self.slots[code.slot()].as_ref()
    }

    /// Set one ability in place.
    pub fn set(&mut self, code: AbilityCode, ability: Ability) {
        self.slots[code.slot()] = Some(ability);
    }

    /// A copy with one ability replaced.
    pub fn with(&self, code: AbilityCode, ability: Ability) -> Self {
        let mut next = self.clone();
        next.set(code, ability);
        next
    }

    /// Present abilities in sheet order.
    pub fn iter(&self) -> impl Iterator<Item = (AbilityCode, &Ability)> {
        AbilityCode::ALL
            .into_iter()
            .filter_map(|code| self.get(code).map(|a| (code, a)))
    }

    /// Returns true if every code has an ability.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}

impl From<BTreeMap<AbilityCode, Ability>> for Abilities {
    fn from(map: BTreeMap<AbilityCode, Ability>) -> Self {
        let mut abilities = Self::default();
        for (code, ability) in map {
            abilities.set(code, ability);
        }
        abilities
    }
}

impl From<Abilities> for BTreeMap<AbilityCode, Ability> {
    fn from(abilities: Abilities) -> Self {
        abilities.iter().map(|(code, a)| (code, *a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_clamps_current() {
        let a = Ability::ranked(DieRank::D12, DieRank::D8);
        assert_eq!(a.current(), DieRank::D8);
        assert_eq!(a.max(), DieRank::D8);
    }

    #[test]
    fn with_max_reclamps() {
        let a = Ability::new(DieRank::D10).with_max(DieRank::D6);
        assert_eq!(a.current(), DieRank::D6);

        let a = Ability::ranked(DieRank::D4, DieRank::D6).with_max(DieRank::D12);
        assert_eq!(a.current(), DieRank::D4);
        assert_eq!(a.max(), DieRank::D12);
    }

    #[test]
    fn code_parsing() {
        assert_eq!("str".parse::<AbilityCode>(), Ok(AbilityCode::Str));
        assert_eq!("WIL".parse::<AbilityCode>(), Ok(AbilityCode::Wil));
        assert!("CHA".parse::<AbilityCode>().is_err());
        assert_eq!(AbilityCode::Dex.name(), "Dexterity");
    }

    #[test]
    fn serializes_as_code_map() {
        let abilities = Abilities::default()
            .with(AbilityCode::Str, Ability::ranked(DieRank::D6, DieRank::D8))
            .with(AbilityCode::Wil, Ability::new(DieRank::D4));
        let json = serde_json::to_value(&abilities).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "STR": { "current": "d6", "max": "d8" },
                "WIL": { "current": "d4", "max": "d4" }
            })
        );
        let back: Abilities = serde_json::from_value(json).unwrap();
        assert_eq!(back, abilities);
        assert!(!back.is_complete());
    }

    #[test]
    fn deserialize_reclamps_current() {
        let a: Ability =
            serde_json::from_str(r#"{ "current": "d20", "max": "d6" }"#).unwrap();
        assert_eq!(a.current(), DieRank::D6);
    }

    #[test]
    fn uniform_is_complete() {
        let a = Abilities::uniform(DieRank::D6);
        assert!(a.is_complete());
        assert_eq!(a.iter().count(), 3);
    }
}
