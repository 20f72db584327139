//! Rolling a single die and describing the outcome.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::notation::Notation;

/// A source of uniformly distributed die faces.
pub trait RandomSource {
    /// Draw one integer uniformly from `1..=sides`. `sides` is never zero.
    fn roll_die(&mut self, sides: u32) -> u32;
}

/// Thread-local entropy; the default source outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn roll_die(&mut self, sides: u32) -> u32 {
        rand::rng().random_range(1..=sides)
    }
}

/// A reproducible source backed by a seeded [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    /// Create a source from a seed.
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededRandom {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.0.random_range(1..=sides)
    }
}

/// Always yields the same face, clamped to the die's range.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub u32);

impl RandomSource for FixedRandom {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.0.clamp(1, sides)
    }
}

/// The outcome of a single die roll.
///
/// A result with `sides == 0` is the sentinel for notation that could not
/// be parsed; every other field is zero in that case.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RollResult {
    /// Raw face rolled.
    pub roll: u32,
    /// Signed modifier applied to the face.
    pub modifier: i32,
    /// Number of sides on the die.
    pub sides: u32,
    /// `roll + modifier`.
    pub total: i64,
    /// Human-readable description, e.g. "Rolled 4 on d6+1".
    pub description: String,
}

impl RollResult {
    /// The sentinel returned for unparsable notation.
    pub fn invalid() -> Self {
        Self {
            description: "Error".to_string(),
            ..Self::default()
        }
    }

    /// Returns true if this is the invalid-notation sentinel.
    pub fn is_invalid(&self) -> bool {
        self.sides == 0
    }
}

impl std::fmt::Display for RollResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description)
    }
}

/// Roll one die of `sides` faces and add `modifier`.
///
/// A zero-sided die cannot be rolled and yields the invalid sentinel.
pub fn roll(sides: u32, modifier: i32, rng: &mut impl RandomSource) -> RollResult {
    if sides == 0 {
        return RollResult::invalid();
    }
    let face = rng.roll_die(sides);
    let notation = Notation { sides, modifier };
    RollResult {
        roll: face,
        modifier,
        sides,
        total: i64::from(face) + i64::from(modifier),
        description: format!("Rolled {face} on {notation}"),
    }
}

/// Parse `text` and roll it, recovering parse failures into the sentinel.
pub fn roll_notation(text: &str, rng: &mut impl RandomSource) -> RollResult {
    match Notation::parse(text) {
        Ok(n) => roll(n.sides, n.modifier, rng),
        Err(e) => {
            tracing::debug!(notation = text, error = %e, "unrollable dice notation");
            RollResult::invalid()
        }
    }
}

impl Notation {
    /// Roll this notation.
    pub fn roll(&self, rng: &mut impl RandomSource) -> RollResult {
        roll(self.sides, self.modifier, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn description_includes_modifier_only_when_nonzero() {
        let r = roll(6, 1, &mut FixedRandom(4));
        insta::assert_snapshot!(r.description, @"Rolled 4 on d6+1");
        assert_eq!(r.total, 5);

        let r = roll(4, -2, &mut FixedRandom(1));
        insta::assert_snapshot!(r.description, @"Rolled 1 on d4-2");
        assert_eq!(r.total, -1);

        let r = roll(20, 0, &mut FixedRandom(17));
        insta::assert_snapshot!(r.description, @"Rolled 17 on d20");
    }

    #[test]
    fn invalid_notation_yields_sentinel() {
        let r = roll_notation("banana", &mut FixedRandom(3));
        assert!(r.is_invalid());
        assert_eq!(r.total, 0);
        assert_eq!(r.roll, 0);
        assert_eq!(r.modifier, 0);
        assert_eq!(r.description, "Error");
    }

    #[test]
    fn zero_sided_roll_is_sentinel() {
        assert!(roll(0, 3, &mut FixedRandom(1)).is_invalid());
        assert!(roll_notation("d0", &mut FixedRandom(1)).is_invalid());
    }

    #[test]
    fn fixed_source_clamps_to_die() {
        assert_eq!(FixedRandom(9).roll_die(6), 6);
        assert_eq!(FixedRandom(0).roll_die(6), 1);
    }

    #[test]
    fn seeded_rolls_are_reproducible() {
        let mut a = SeededRandom::new(99);
        let mut b = SeededRandom::new(99);
        for _ in 0..20 {
            assert_eq!(roll_notation("d20", &mut a), roll_notation("d20", &mut b));
        }
    }

    #[test]
    fn notation_roll() {
        let n = Notation::parse("d8+2").unwrap();
        let r = n.roll(&mut FixedRandom(8));
        assert_eq!(r.total, 10);
        assert_eq!(r.sides, 8);
    }

    proptest! {
        #[test]
        fn d6_total_in_range(seed in any::<u64>()) {
            let r = roll_notation("d6", &mut SeededRandom::new(seed));
            prop_assert!((1..=6).contains(&r.total));
        }

        #[test]
        fn d4_minus_two_total_in_range(seed in any::<u64>()) {
            let r = roll_notation("d4-2", &mut SeededRandom::new(seed));
            prop_assert!((-1..=2).contains(&r.total));
            prop_assert!((1..=4).contains(&r.roll));
        }
    }
}
