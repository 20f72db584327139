//! Exporting characters for re-import elsewhere.

use chrono::NaiveDate;
use klash_mechanics::CharacterSheet;

use crate::error::StoreResult;
use crate::record::StoredCharacter;

/// Serialize records as a JSON array of sheets, without store keys or
/// creation timestamps.
pub fn export_json(records: &[StoredCharacter]) -> StoreResult<String> {
    let sheets: Vec<&CharacterSheet> = records.iter().map(|r| &r.sheet).collect();
    Ok(serde_json::to_string_pretty(&sheets)?)
}

/// Suggested file name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("klash-characters-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::reconcile;
    use crate::record::CharacterId;
    use chrono::{TimeZone, Utc};
    use klash_mechanics::{AbilityCode, DieRank, RuleSet};

    fn record(id: u64, name: &str) -> StoredCharacter {
        StoredCharacter {
            id: CharacterId(id),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            sheet: CharacterSheet::new(
                name,
                5,
                &[(AbilityCode::Str, DieRank::D10)],
                &RuleSet::default(),
            )
            .unwrap(),
        }
    }

    #[test]
    fn strips_key_and_timestamp() {
        let text = export_json(&[record(4, "Grim")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let first = &value[0];
        assert!(first.get("id").is_none());
        assert!(first.get("createdAt").is_none());
        assert_eq!(first["name"], "Grim");
        assert_eq!(first["maxHp"], 5);
        assert_eq!(first["abilities"]["STR"]["current"], "d10");
    }

    #[test]
    fn export_reimports_cleanly() {
        let text = export_json(&[record(1, "Grim"), record(2, "Thorn")]).unwrap();
        let batch: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
        let plan = reconcile(batch, Vec::<String>::new(), &RuleSet::default());
        assert_eq!(plan.skipped(), 0);
        assert_eq!(plan.accepted[0], record(1, "Grim").sheet);
        assert_eq!(plan.accepted[1], record(2, "Thorn").sheet);
    }

    #[test]
    fn empty_export() {
        assert_eq!(export_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn file_name_is_date_stamped() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        insta::assert_snapshot!(export_file_name(date), @"klash-characters-2026-10-19.json");
    }
}
