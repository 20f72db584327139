//! Rules engine for the Klash tabletop companion.
//!
//! Provides the die ladder used to rank abilities, single-die notation
//! parsing and rolling, ability progression with derived wound capacity and
//! magic dice, and the character sheet those rules operate on.

pub mod dice;
pub mod error;
pub mod rules;
pub mod sheet;

pub use dice::{
    DieLadder, DieRank, FixedRandom, Notation, NotationError, RandomSource, RollResult,
    SeededRandom, SystemRandom,
};
pub use dice::roll::{roll, roll_notation};
pub use error::{MechError, MechResult};
pub use rules::{RuleSet, StepDirection, magic_dice_count, step_ability, wound_capacity};
pub use sheet::{Abilities, Ability, AbilityCode, CharacterSheet, Inventory, Item, SheetEdit, Track};
