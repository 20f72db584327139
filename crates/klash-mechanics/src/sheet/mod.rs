//! Character sheets: abilities, hit points, wounds, and inventory.
//!
//! A [`CharacterSheet`] is the persistable state of one character, without
//! any store key or timestamp. All mutators validate first and leave the
//! sheet unchanged on error.

pub mod ability;
pub mod inventory;
pub mod track;

pub use ability::{Abilities, Ability, AbilityCode};
pub use inventory::{Inventory, Item};
pub use track::Track;

use serde::{Deserialize, Serialize};

use crate::dice::{DieRank, RandomSource, RollResult};
use crate::error::{MechError, MechResult};
use crate::rules::{self, RuleSet, StepDirection};

/// A character's mechanical state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSheet {
    name: String,
    abilities: Abilities,
    max_hp: u32,
    current_hp: u32,
    #[serde(default)]
    current_wounds: u32,
    #[serde(default)]
    inventory: Inventory,
}

/// Changes submitted from the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEdit {
    /// New name.
    pub name: String,
    /// New maximum hit points.
    pub max_hp: u32,
    /// New max rank per ability; abilities not listed keep their max.
    pub ability_max: Vec<(AbilityCode, DieRank)>,
}

impl CharacterSheet {
    /// Create a new character.
    ///
    /// Abilities not listed in `picks` get the ruleset's default die. Every
    /// ability starts at its max, hit points start full, and wounds at zero.
    pub fn new(
        name: &str,
        max_hp: u32,
        picks: &[(AbilityCode, DieRank)],
        rules: &RuleSet,
    ) -> MechResult<Self> {
        let name = clean_name(name)?;
        if !rules.creation_hp.contains(&max_hp) {
            return Err(MechError::HitPointsOutOfRange {
                value: max_hp,
                min: *rules.creation_hp.start(),
                max: *rules.creation_hp.end(),
            });
        }

        let mut abilities = Abilities::uniform(rules.default_die);
        for &(code, die) in picks {
            if !rules.allows_creation_die(die) {
                return Err(MechError::DieNotAllowed(die));
            }
            abilities.set(code, Ability::new(die));
        }

        Ok(Self {
            name,
            abilities,
            max_hp,
            current_hp: max_hp,
            current_wounds: 0,
            inventory: Inventory::new(),
        })
    }

    /// Create a new character with the ruleset's default starting hit points.
    pub fn with_default_hp(
        name: &str,
        picks: &[(AbilityCode, DieRank)],
        rules: &RuleSet,
    ) -> MechResult<Self> {
        Self::new(name, rules.default_hp, picks, rules)
    }

    /// Assemble a sheet from stored or imported parts.
    ///
    /// Only the name is validated. Current hit points and wounds are lowered
    /// into range so the result always satisfies the sheet invariants.
    pub fn from_parts(
        name: &str,
        abilities: Abilities,
        max_hp: u32,
        current_hp: u32,
        current_wounds: u32,
        inventory: Inventory,
    ) -> MechResult<Self> {
        let name = clean_name(name)?;
        let capacity = rules::wound_capacity(&abilities);
        Ok(Self {
            name,
            abilities,
            max_hp,
            current_hp: current_hp.min(max_hp),
            current_wounds: current_wounds.min(capacity),
            inventory,
        })
    }

    /// Character name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All abilities.
    pub fn abilities(&self) -> &Abilities {
        &self.abilities
    }

    /// One ability, if present.
    pub fn ability(&self, code: AbilityCode) -> Option<&Ability> {
        self.abilities.get(code)
    }

    /// Maximum hit points.
    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Current hit points.
    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    /// Current wounds.
    pub fn current_wounds(&self) -> u32 {
        self.current_wounds
    }

    /// Carried items.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Hit points as a track.
    pub fn hp(&self) -> Track {
        Track::new("hp", self.current_hp, self.max_hp)
    }

    /// Wounds as a track bounded by the current wound capacity.
    pub fn wounds(&self) -> Track {
        Track::new("wounds", self.current_wounds, self.wound_capacity())
    }

    /// Wound capacity derived from STR.
    pub fn wound_capacity(&self) -> u32 {
        rules::wound_capacity(&self.abilities)
    }

    /// Magic dice derived from WIL.
    pub fn magic_dice(&self) -> u32 {
        rules::magic_dice_count(&self.abilities)
    }

    /// Roll an ability at its current rank. `None` if the ability is missing.
    pub fn roll_ability(
        &self,
        code: AbilityCode,
        rng: &mut impl RandomSource,
    ) -> Option<RollResult> {
        self.ability(code).map(|a| a.current().notation().roll(rng))
    }

    /// Change the name.
    pub fn rename(&mut self, name: &str) -> MechResult<()> {
        self.name = clean_name(name)?;
        Ok(())
    }

    /// Step one ability. Returns true if its current rank changed.
    pub fn step(&mut self, code: AbilityCode, direction: StepDirection) -> bool {
        let next = rules::step_ability(&self.abilities, code, direction);
        if next == self.abilities {
            return false;
        }
        self.abilities = next;
        true
    }

    /// Set current hit points; rejected outside `0..=max_hp`.
    pub fn set_current_hp(&mut self, value: i64) -> MechResult<u32> {
        let mut hp = self.hp();
        let v = hp.set(value)?;
        self.current_hp = v;
        Ok(v)
    }

    /// Move current hit points by `delta`; rejected if it would leave range.
    pub fn adjust_hp(&mut self, delta: i64) -> MechResult<u32> {
        let mut hp = self.hp();
        let v = hp.adjust(delta)?;
        self.current_hp = v;
        Ok(v)
    }

    /// Set current wounds; rejected outside `0..=wound_capacity`.
    pub fn set_current_wounds(&mut self, value: i64) -> MechResult<u32> {
        let mut wounds = self.wounds();
        let v = wounds.set(value)?;
        self.current_wounds = v;
        Ok(v)
    }

    /// Move current wounds by `delta`; rejected if it would leave range.
    pub fn adjust_wounds(&mut self, delta: i64) -> MechResult<u32> {
        let mut wounds = self.wounds();
        let v = wounds.adjust(delta)?;
        self.current_wounds = v;
        Ok(v)
    }

    /// Change maximum hit points, lowering current hit points if needed.
    pub fn set_max_hp(&mut self, max_hp: u32, rules: &RuleSet) -> MechResult<()> {
        check_edit_hp(max_hp, rules)?;
        self.max_hp = max_hp;
        self.current_hp = self.current_hp.min(max_hp);
        Ok(())
    }

    /// Change one ability's max rank, re-clamping its current rank and the
    /// wound count.
    pub fn set_ability_max(
        &mut self,
        code: AbilityCode,
        max: DieRank,
        rules: &RuleSet,
    ) -> MechResult<()> {
        if !rules.allows_edit_die(max) {
            return Err(MechError::DieNotAllowed(max));
        }
        let ability = match self.abilities.get(code) {
            Some(existing) => existing.with_max(max),
            None => Ability::new(max),
        };
        self.abilities.set(code, ability);
        self.clamp_wounds();
        Ok(())
    }

    /// Replace the whole ability record, re-clamping wounds.
    pub fn set_abilities(&mut self, abilities: Abilities) {
        self.abilities = abilities;
        self.clamp_wounds();
    }

    /// Apply an edit-form submission. Nothing changes unless every field
    /// is valid.
    pub fn apply_edit(&mut self, edit: &SheetEdit, rules: &RuleSet) -> MechResult<()> {
        let mut next = self.clone();
        next.rename(&edit.name)?;
        next.set_max_hp(edit.max_hp, rules)?;
        for &(code, max) in &edit.ability_max {
            next.set_ability_max(code, max, rules)?;
        }
        *self = next;
        Ok(())
    }

    /// Add an item. Returns its slot.
    pub fn add_item(&mut self, item: Item, rules: &RuleSet) -> MechResult<usize> {
        self.inventory.add(item, rules)
    }

    /// Replace the item in `slot`.
    pub fn update_item(&mut self, slot: usize, item: Item, rules: &RuleSet) -> MechResult<()> {
        self.inventory.update(slot, item, rules)
    }

    /// Remove the item in `slot`.
    pub fn remove_item(&mut self, slot: usize) -> MechResult<Item> {
        self.inventory.remove(slot)
    }

    /// Replace the whole inventory. Every item is checked first.
    pub fn set_inventory(&mut self, inventory: Inventory, rules: &RuleSet) -> MechResult<()> {
        inventory.validate(rules)?;
        self.inventory = inventory;
        Ok(())
    }

    fn clamp_wounds(&mut self) {
        self.current_wounds = self.current_wounds.min(self.wound_capacity());
    }
}

fn clean_name(name: &str) -> MechResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MechError::EmptyName);
    }
    Ok(name.to_string())
}

fn check_edit_hp(max_hp: u32, rules: &RuleSet) -> MechResult<()> {
    if rules.edit_hp.contains(&max_hp) {
        Ok(())
    } else {
        Err(MechError::HitPointsOutOfRange {
            value: max_hp,
            min: *rules.edit_hp.start(),
            max: *rules.edit_hp.end(),
        })
    }
}
