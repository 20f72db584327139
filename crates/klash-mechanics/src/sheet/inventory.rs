//! Character inventory: a short, capped list of named items with a quality tier.

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};
use crate::rules::RuleSet;

/// A carried item.
///
/// Built through [`Item::new`]. Items that arrive any other way (for
/// example deserialized from storage) are checked again before they enter
/// an inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    name: String,
    quality: u8,
}

impl Item {
    /// Create an item, validating its name and quality tier.
    pub fn new(name: &str, quality: u8, rules: &RuleSet) -> MechResult<Self> {
        let name = name.trim();
        check_item(name, quality, rules)?;
        Ok(Self {
            name: name.to_string(),
            quality,
        })
    }

    /// Free-text name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quality tier, 0 up to the ruleset's maximum.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Check the item against `rules`.
    pub fn validate(&self, rules: &RuleSet) -> MechResult<()> {
        check_item(self.name.trim(), self.quality, rules)
    }
}

fn check_item(name: &str, quality: u8, rules: &RuleSet) -> MechResult<()> {
    if name.is_empty() {
        return Err(MechError::EmptyItemName);
    }
    if quality > rules.max_quality {
        return Err(MechError::QualityOutOfRange {
            value: quality,
            max: rules.max_quality,
        });
    }
    Ok(())
}

/// An ordered list of items addressed by slot index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory(Vec<Item>);

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an inventory from items made with [`Item::new`], keeping at
    /// most `cap` of them.
    pub fn truncated(mut items: Vec<Item>, cap: usize) -> Self {
        items.truncate(cap);
        Self(items)
    }

    /// Append an item. Returns the slot it landed in.
    pub fn add(&mut self, item: Item, rules: &RuleSet) -> MechResult<usize> {
        item.validate(rules)?;
        if self.0.len() >= rules.inventory_cap {
            return Err(MechError::InventoryFull(rules.inventory_cap));
        }
        self.0.push(item);
        Ok(self.0.len() - 1)
    }

    /// Replace the item in `slot`.
    pub fn update(&mut self, slot: usize, item: Item, rules: &RuleSet) -> MechResult<()> {
        item.validate(rules)?;
        let existing = self.0.get_mut(slot).ok_or(MechError::ItemNotFound(slot))?;
        *existing = item;
        Ok(())
    }

    /// Remove and return the item in `slot`.
    pub fn remove(&mut self, slot: usize) -> MechResult<Item> {
        if slot >= self.0.len() {
            return Err(MechError::ItemNotFound(slot));
        }
        Ok(self.0.remove(slot))
    }

    /// Check the item count and every item against `rules`.
    pub fn validate(&self, rules: &RuleSet) -> MechResult<()> {
        if self.0.len() > rules.inventory_cap {
            return Err(MechError::InventoryFull(rules.inventory_cap));
        }
        self.0.iter().try_for_each(|item| item.validate(rules))
    }

    /// All items in slot order.
    pub fn items(&self) -> &[Item] {
        &self.0
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the inventory is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
