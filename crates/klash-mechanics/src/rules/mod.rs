//! Progression rules: ability stepping and derived secondary stats.
//!
//! Everything here is pure. Callers persist the returned values themselves.
//! A [`RuleSet`] carries the limits used when creating and editing
//! characters; [`preset::klash`] builds the default one.

pub mod preset;

use std::ops::RangeInclusive;

use crate::dice::{DieLadder, DieRank};
use crate::sheet::{Abilities, AbilityCode};

/// Wound capacity used when STR is missing.
pub const DEFAULT_WOUND_CAPACITY: u32 = 6;

/// The rank magic dice are counted from.
pub const MAGIC_BASELINE: DieRank = DieRank::D4;

/// Limits and choices a game system imposes on character sheets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    /// Ranks selectable for an ability at creation.
    pub creation_dice: Vec<DieRank>,
    /// Ranks selectable as an ability maximum when editing.
    pub editing_dice: Vec<DieRank>,
    /// Rank given to an ability that was not picked at creation.
    pub default_die: DieRank,
    /// Allowed hit points at creation.
    pub creation_hp: RangeInclusive<u32>,
    /// Starting hit points when the creation form leaves them unset.
    pub default_hp: u32,
    /// Allowed maximum hit points when editing.
    pub edit_hp: RangeInclusive<u32>,
    /// Maximum number of inventory items.
    pub inventory_cap: usize,
    /// Highest item quality tier (the lowest is 0).
    pub max_quality: u8,
}

impl Default for RuleSet {
    fn default() -> Self {
        preset::klash()
    }
}

impl RuleSet {
    /// Returns true if `die` may be chosen when creating a character.
    pub fn allows_creation_die(&self, die: DieRank) -> bool {
        self.creation_dice.contains(&die)
    }

    /// Returns true if `die` may be set as an ability maximum when editing.
    pub fn allows_edit_die(&self, die: DieRank) -> bool {
        self.editing_dice.contains(&die)
    }
}

/// Direction of an ability step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    /// One rank stronger, capped at the ability's max.
    Up,
    /// One rank weaker, floored at the bottom of the ladder.
    Down,
}

/// Move one ability's current rank a single ladder step.
///
/// Returns the input unchanged when the step is blocked by the max rank or
/// the bottom of the ladder, or when the ability is absent. Only `current`
/// ever changes.
pub fn step_ability(
    abilities: &Abilities,
    code: AbilityCode,
    direction: StepDirection,
) -> Abilities {
    let Some(ability) = abilities.get(code) else {
        return abilities.clone();
    };

    let current = DieLadder::index_of(ability.current());
    let max = DieLadder::index_of(ability.max());
    let next = match direction {
        StepDirection::Up => (current + 1).min(max),
        StepDirection::Down => current.saturating_sub(1),
    };
    if next == current {
        return abilities.clone();
    }

    match DieLadder::at(next) {
        Some(rank) => abilities.with(code, ability.stepped_to(rank)),
        None => abilities.clone(),
    }
}

/// Wound capacity: the face count of STR's max rank, or
/// [`DEFAULT_WOUND_CAPACITY`] when STR is missing.
pub fn wound_capacity(abilities: &Abilities) -> u32 {
    abilities
        .get(AbilityCode::Str)
        .map_or(DEFAULT_WOUND_CAPACITY, |strength| strength.max().faces())
}

/// Number of magic dice: ladder steps WIL's current rank sits above
/// [`MAGIC_BASELINE`], never negative. Zero when WIL is missing.
// An older ruleset counted floor((sides - 4) / 2) on the raw face count instead.
pub fn magic_dice_count(abilities: &Abilities) -> u32 {
    let Some(wil) = abilities.get(AbilityCode::Wil) else {
        return 0;
    };
    let steps =
        DieLadder::index_of(wil.current()).saturating_sub(DieLadder::index_of(MAGIC_BASELINE));
    u32::try_from(steps).unwrap_or(u32::MAX)
}
