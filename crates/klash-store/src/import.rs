//! Reconciling externally supplied character records.
//!
//! Import files may come from any earlier version of the app, so each
//! element is first decoded into a permissive [`LooseCharacter`] and then
//! normalized into a current [`CharacterSheet`]. Records that cannot be
//! normalized are skipped and counted; they never abort the batch.

use std::collections::{BTreeMap, HashSet};

use klash_mechanics::{
    Abilities, Ability, AbilityCode, CharacterSheet, DieRank, Inventory, Item, RuleSet,
};
use serde::Deserialize;
use serde_json::Number;
use thiserror::Error;

/// Why a record in an import batch was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The record has no usable name.
    #[error("record has no name")]
    MissingName,
    /// The record has no abilities mapping.
    #[error("record has no abilities")]
    MissingAbilities,
    /// An ability uses a die symbol that is not on the ladder.
    #[error("unknown die rank '{0}'")]
    UnknownDie(String),
    /// The record is not an object of the expected shape.
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// A character record in any shape the app has ever exported.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LooseCharacter {
    /// Character name.
    pub name: Option<String>,
    /// Abilities keyed by code.
    pub abilities: Option<BTreeMap<String, LooseAbility>>,
    /// Legacy single hit point value.
    pub hp: Option<Number>,
    /// Maximum hit points.
    pub max_hp: Option<Number>,
    /// Current hit points.
    pub current_hp: Option<Number>,
    /// Current wounds.
    pub current_wounds: Option<Number>,
    /// Carried items.
    pub inventory: Option<Vec<LooseItem>>,
}

/// An ability as either a bare die symbol or a current/max pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseAbility {
    /// Legacy shape: one die used as both current and max.
    Flat(String),
    /// Current shape.
    Ranked {
        /// Current rank; defaults to max.
        current: Option<String>,
        /// Max rank.
        max: String,
    },
}

/// An inventory item as either a bare name or a name/quality pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseItem {
    /// Legacy shape: just the name, quality 0.
    Name(String),
    /// Current shape.
    Item {
        /// Item name.
        name: String,
        /// Quality tier; clamped into the ruleset's range.
        #[serde(default)]
        quality: Option<Number>,
    },
}

impl LooseCharacter {
    /// Normalize into a current sheet, filling defaults for missing or
    /// legacy fields.
    pub fn normalize(self, rules: &RuleSet) -> Result<CharacterSheet, SkipReason> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or(SkipReason::MissingName)?;
        let loose_abilities = self.abilities.ok_or(SkipReason::MissingAbilities)?;

        let mut abilities = Abilities::default();
        for (key, loose) in loose_abilities {
            let Ok(code) = key.parse::<AbilityCode>() else {
                tracing::debug!(ability = %key, "ignoring unknown ability code");
                continue;
            };
            abilities.set(code, loose.normalize()?);
        }

        let hp = count(self.hp.as_ref());
        let max_hp = count(self.max_hp.as_ref()).or(hp).unwrap_or(0);
        let current_hp = count(self.current_hp.as_ref()).or(hp).unwrap_or(0);
        let items = self
            .inventory
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.normalize(rules))
            .collect();

        CharacterSheet::from_parts(
            &name,
            abilities,
            max_hp,
            current_hp,
            count(self.current_wounds.as_ref()).unwrap_or(0),
            Inventory::truncated(items, rules.inventory_cap),
        )
        .map_err(|e| SkipReason::Malformed(e.to_string()))
    }
}

impl LooseAbility {
    fn normalize(self) -> Result<Ability, SkipReason> {
        match self {
            Self::Flat(die) => Ok(Ability::new(parse_die(&die)?)),
            Self::Ranked { current, max } => {
                let max = parse_die(&max)?;
                let current = match current {
                    Some(c) => parse_die(&c)?,
                    None => max,
                };
                Ok(Ability::ranked(current, max))
            }
        }
    }
}

impl LooseItem {
    fn normalize(self, rules: &RuleSet) -> Option<Item> {
        let (name, quality) = match self {
            Self::Name(name) => (name, None),
            Self::Item { name, quality } => (name, quality),
        };
        let quality = count(quality.as_ref()).map_or(0, |q| {
            u8::try_from(q.min(u32::from(rules.max_quality))).unwrap_or(rules.max_quality)
        });
        Item::new(&name, quality, rules).ok()
    }
}

/// A non-negative whole number from any JSON number. Negative values become
/// 0, fractions are truncated, and anything past `u32::MAX` saturates.
fn count(number: Option<&Number>) -> Option<u32> {
    let number = number?;
    let whole = match number.as_i64() {
        Some(n) => n,
        None if number.is_u64() => i64::MAX,
        None => number.as_f64()? as i64,
    };
    Some(u32::try_from(whole.max(0)).unwrap_or(u32::MAX))
}

fn parse_die(symbol: &str) -> Result<DieRank, SkipReason> {
    symbol
        .parse()
        .map_err(|_| SkipReason::UnknownDie(symbol.to_string()))
}

/// The outcome of reconciling a batch, before anything is committed.
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    /// Normalized sheets with collision-free names, in batch order.
    pub accepted: Vec<CharacterSheet>,
    /// Batch positions that were skipped, with the reason.
    pub skips: Vec<(usize, SkipReason)>,
}

impl ImportPlan {
    /// Number of skipped records.
    pub fn skipped(&self) -> usize {
        self.skips.len()
    }
}

/// Normalize a batch and resolve name collisions against `existing_names`
/// and against names accepted earlier in the same batch.
pub fn reconcile<S: AsRef<str>>(
    batch: Vec<serde_json::Value>,
    existing_names: impl IntoIterator<Item = S>,
    rules: &RuleSet,
) -> ImportPlan {
    let mut taken: HashSet<String> = existing_names
        .into_iter()
        .map(|n| fold(n.as_ref()))
        .collect();
    let mut plan = ImportPlan::default();

    for (index, value) in batch.into_iter().enumerate() {
        let normalized = serde_json::from_value::<LooseCharacter>(value)
            .map_err(|e| SkipReason::Malformed(e.to_string()))
            .and_then(|loose| loose.normalize(rules));

        let mut sheet = match normalized {
            Ok(sheet) => sheet,
            Err(reason) => {
                tracing::warn!(index, %reason, "skipping import record");
                plan.skips.push((index, reason));
                continue;
            }
        };

        let name = resolve_name(sheet.name(), &taken);
        if name != sheet.name() {
            tracing::debug!(from = sheet.name(), to = %name, "renamed colliding import");
            if let Err(e) = sheet.rename(&name) {
                plan.skips.push((index, SkipReason::Malformed(e.to_string())));
                continue;
            }
        }
        taken.insert(fold(&name));
        plan.accepted.push(sheet);
    }

    plan
}

/// Find the first free name, starting from `name` and bumping a trailing
/// ` (n)` suffix (or appending ` (1)`) until no taken name matches
/// case-insensitively.
pub fn resolve_name(name: &str, taken: &HashSet<String>) -> String {
    let mut candidate = name.to_string();
    while taken.contains(&fold(&candidate)) {
        candidate = match split_suffix(&candidate) {
            Some((base, n)) => match n.checked_add(1) {
                Some(next) => format!("{base} ({next})"),
                None => format!("{candidate} (1)"),
            },
            None => format!("{candidate} (1)"),
        };
    }
    candidate
}

/// Split `"Foo (3)"` into `("Foo", 3)`.
fn split_suffix(name: &str) -> Option<(&str, u64)> {
    let inner = name.strip_suffix(')')?;
    let open = inner.rfind(" (")?;
    let digits = &inner[open + 2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((&inner[..open], digits.parse().ok()?))
}

/// Case-folded form used for name comparisons.
pub(crate) fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn taken(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| fold(n)).collect()
    }

    fn grim(extra: serde_json::Value) -> serde_json::Value {
        let mut base = json!({ "name": "Grim", "abilities": { "STR": "d6" } });
        if let (Some(obj), Some(more)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in more {
                obj.insert(k.clone(), v.clone());
            }
        }
        base
    }

    #[test]
    fn resolve_free_name_unchanged() {
        assert_eq!(resolve_name("Grim", &taken(&["Thorn"])), "Grim");
    }

    #[test]
    fn resolve_appends_and_increments() {
        assert_eq!(resolve_name("Grim", &taken(&["grim"])), "Grim (1)");
        assert_eq!(
            resolve_name("Grim", &taken(&["Grim", "Grim (1)", "GRIM (2)"])),
            "Grim (3)"
        );
        assert_eq!(resolve_name("Grim (4)", &taken(&["Grim (4)"])), "Grim (5)");
    }

    #[test]
    fn resolve_ignores_non_numeric_parens() {
        assert_eq!(
            resolve_name("Grim (the Bold)", &taken(&["Grim (the Bold)"])),
            "Grim (the Bold) (1)"
        );
    }

    #[test]
    fn split_suffix_shapes() {
        assert_eq!(split_suffix("Foo (12)"), Some(("Foo", 12)));
        assert_eq!(split_suffix("Foo(12)"), None);
        assert_eq!(split_suffix("Foo ()"), None);
        assert_eq!(split_suffix("Foo"), None);
    }

    #[test]
    fn batch_collisions_chain() {
        let plan = reconcile(vec![grim(json!({})), grim(json!({}))], ["Grim"], &RuleSet::default());
        let names: Vec<&str> = plan.accepted.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Grim (1)", "Grim (2)"]);
        assert_eq!(plan.skipped(), 0);
    }

    #[test]
    fn skips_missing_name_or_abilities() {
        let plan = reconcile(
            vec![
                json!({ "name": "NoAbilities" }),
                json!({ "abilities": { "STR": "d6" } }),
                json!({ "name": "   ", "abilities": {} }),
                json!("just a string"),
                grim(json!({})),
            ],
            Vec::<String>::new(),
            &RuleSet::default(),
        );
        assert_eq!(plan.accepted.len(), 1);
        assert_eq!(plan.skipped(), 4);
        assert_eq!(plan.skips[0], (0, SkipReason::MissingAbilities));
        assert_eq!(plan.skips[1], (1, SkipReason::MissingName));
        assert_eq!(plan.skips[2], (2, SkipReason::MissingName));
        assert!(matches!(plan.skips[3], (3, SkipReason::Malformed(_))));
    }

    #[test]
    fn legacy_hp_fills_both_fields() {
        let plan = reconcile(
            vec![grim(json!({ "hp": 5 }))],
            Vec::<String>::new(),
            &RuleSet::default(),
        );
        let sheet = &plan.accepted[0];
        assert_eq!(sheet.max_hp(), 5);
        assert_eq!(sheet.current_hp(), 5);
        assert_eq!(sheet.current_wounds(), 0);
        assert!(sheet.inventory().is_empty());
    }

    #[test]
    fn split_hp_wins_over_legacy() {
        let plan = reconcile(
            vec![grim(json!({ "hp": 5, "maxHp": 7, "currentHp": 3 }))],
            Vec::<String>::new(),
            &RuleSet::default(),
        );
        assert_eq!(plan.accepted[0].max_hp(), 7);
        assert_eq!(plan.accepted[0].current_hp(), 3);
    }

    #[test]
    fn no_hp_at_all_defaults_to_zero() {
        let plan = reconcile(vec![grim(json!({}))], Vec::<String>::new(), &RuleSet::default());
        assert_eq!(plan.accepted[0].max_hp(), 0);
        assert_eq!(plan.accepted[0].current_hp(), 0);
    }

    #[test]
    fn ability_shapes_normalize() {
        let plan = reconcile(
            vec![json!({
                "name": "Vex",
                "abilities": {
                    "STR": "D8",
                    "DEX": { "current": "d4", "max": "d10" },
                    "WIL": { "max": "d12+1" },
                    "CHA": "d6"
                }
            })],
            Vec::<String>::new(),
            &RuleSet::default(),
        );
        let sheet = &plan.accepted[0];
        assert_eq!(sheet.ability(AbilityCode::Str), Some(&Ability::new(DieRank::D8)));
        let dex = sheet.ability(AbilityCode::Dex).unwrap();
        assert_eq!((dex.current(), dex.max()), (DieRank::D4, DieRank::D10));
        assert_eq!(sheet.ability(AbilityCode::Wil), Some(&Ability::new(DieRank::D12Plus1)));
        assert_eq!(sheet.wound_capacity(), 8);
    }

    #[test]
    fn unknown_die_skips_record() {
        let plan = reconcile(
            vec![json!({ "name": "Odd", "abilities": { "STR": "d7" } })],
            Vec::<String>::new(),
            &RuleSet::default(),
        );
        assert_eq!(plan.skips, vec![(0, SkipReason::UnknownDie("d7".to_string()))]);
    }

    #[test]
    fn inventory_shapes_normalize() {
        let items: Vec<serde_json::Value> = (0..12).map(|i| json!(format!("Coin {i}"))).collect();
        let mut record = grim(json!({ "inventory": items }));
        record["inventory"][0] = json!({ "name": "Blade", "quality": 9 });
        record["inventory"][1] = json!({ "name": "Rag", "quality": -3 });
        record["inventory"][2] = json!("   ");

        let plan = reconcile(vec![record], Vec::<String>::new(), &RuleSet::default());
        let inv = plan.accepted[0].inventory();
        assert_eq!(inv.len(), 10);
        assert_eq!(inv.items()[0], Item::new("Blade", 3, &RuleSet::default()).unwrap());
        assert_eq!(inv.items()[1].quality(), 0);
        assert_eq!(inv.items()[2].name(), "Coin 3");
    }

    #[test]
    fn negative_and_fractional_numbers_are_clamped() {
        let plan = reconcile(
            vec![
                grim(json!({ "hp": 5, "currentWounds": -1 })),
                json!({
                    "name": "Vex",
                    "abilities": { "STR": "d6" },
                    "maxHp": 6.9,
                    "currentHp": -3,
                    "inventory": [{ "name": "Charm", "quality": 2.5 }]
                }),
            ],
            Vec::<String>::new(),
            &RuleSet::default(),
        );
        assert_eq!(plan.skipped(), 0);

        let grim = &plan.accepted[0];
        assert_eq!(grim.current_wounds(), 0);
        assert_eq!((grim.max_hp(), grim.current_hp()), (5, 5));

        let vex = &plan.accepted[1];
        assert_eq!((vex.max_hp(), vex.current_hp()), (6, 0));
        assert_eq!(vex.inventory().items()[0].quality(), 2);
    }

    #[test]
    fn count_handles_every_number_shape() {
        let n = |v: serde_json::Value| serde_json::from_value::<Number>(v).ok();
        assert_eq!(count(n(json!(7)).as_ref()), Some(7));
        assert_eq!(count(n(json!(-7)).as_ref()), Some(0));
        assert_eq!(count(n(json!(3.99)).as_ref()), Some(3));
        assert_eq!(count(n(json!(u64::MAX)).as_ref()), Some(u32::MAX));
        assert_eq!(count(None), None);
    }

    #[test]
    fn wounds_clamped_to_capacity() {
        let plan = reconcile(
            vec![grim(json!({ "currentWounds": 30 }))],
            Vec::<String>::new(),
            &RuleSet::default(),
        );
        assert_eq!(plan.accepted[0].current_wounds(), 6);
    }

    proptest::proptest! {
        #[test]
        fn resolved_name_is_always_free(
            base in "[A-Za-z]{1,8}",
            bumps in proptest::collection::vec(0u64..6, 0..6),
        ) {
            let mut names = vec![base.clone()];
            names.extend(bumps.iter().map(|n| format!("{base} ({n})")));
            let taken: HashSet<String> = names.iter().map(|n| fold(n)).collect();
            let resolved = resolve_name(&base, &taken);
            proptest::prop_assert!(!taken.contains(&fold(&resolved)));
            proptest::prop_assert!(resolved.starts_with(&base));
        }
    }
}
