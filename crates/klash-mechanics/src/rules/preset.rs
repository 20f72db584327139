//! The built-in Klash ruleset.

use crate::dice::{DieLadder, DieRank};
use crate::rules::RuleSet;

/// Klash, the only system the companion ships with.
///
/// Characters start with abilities chosen from d4 to d10 and 1 to 8 hit
/// points. Editing may raise an ability's maximum anywhere on the ladder and
/// hit points up to 20.
pub fn klash() -> RuleSet {
    RuleSet {
        creation_dice: vec![DieRank::D4, DieRank::D6, DieRank::D8, DieRank::D10],
        editing_dice: DieLadder::RANKS.to_vec(),
        default_die: DieRank::D6,
        creation_hp: 1..=8,
        default_hp: 4,
        edit_hp: 1..=20,
        inventory_cap: 10,
        max_quality: 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_dice_are_a_ladder_slice() {
        let rules = klash();
        let indices: Vec<usize> = rules.creation_dice.iter().map(|d| d.index()).collect();
        assert_eq!(indices, vec![2, 3, 4, 5]);
    }

    #[test]
    fn editing_covers_whole_ladder() {
        let rules = klash();
        assert_eq!(rules.editing_dice.len(), DieLadder::len());
        assert!(rules.allows_edit_die(DieRank::D20));
        assert!(!rules.allows_creation_die(DieRank::D20));
    }

    #[test]
    fn default_hp_is_in_creation_range() {
        let rules = klash();
        assert!(rules.creation_hp.contains(&rules.default_hp));
    }
}
