use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use magasin_core::EquipmentId;
use magasin_stock::Equipment;

/// Years in service after which replacement is suggested.
const REPLACEMENT_AGE_YEARS: f64 = 3.0;

/// Years in service after which the replacement suggestion becomes top
/// priority.
const URGENT_REPLACEMENT_AGE_YEARS: f64 = 5.0;

/// Usage record count above which a maintenance suggestion is raised.
const HEAVY_USAGE_THRESHOLD: usize = 100;

const SECS_PER_YEAR: f64 = 365.0 * 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Replacement,
    Maintenance,
    Upgrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageStatus {
    Active,
    Completed,
    Cancelled,
}

/// One recorded loan/usage of an equipment (append-only history).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentUsage {
    pub equipment_id: EquipmentId,
    pub user: String,
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    pub purpose: String,
    pub status: UsageStatus,
}

/// An age/usage-driven recommendation for one equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartSuggestion {
    pub id: Uuid,
    pub equipment_id: EquipmentId,
    pub kind: SuggestionKind,
    pub reason: String,
    /// 1 is most urgent.
    pub priority: u8,
    pub generated_at: DateTime<Utc>,
}

/// Derive the suggestion set from a snapshot plus the usage history.
///
/// Same wholesale-replacement contract as the alert set; runs on the daily
/// cycle.
pub fn generate_suggestions(
    snapshot: &[Equipment],
    usage: &[EquipmentUsage],
    now: DateTime<Utc>,
) -> Vec<SmartSuggestion> {
    let mut suggestions = Vec::new();

    for equipment in snapshot {
        if let Some(mise_en_marche) = equipment.date_mise_en_marche {
            let years_in_use = (now - mise_en_marche).num_seconds() as f64 / SECS_PER_YEAR;
            if years_in_use > REPLACEMENT_AGE_YEARS {
                suggestions.push(SmartSuggestion {
                    id: Uuid::now_v7(),
                    equipment_id: equipment.id,
                    kind: SuggestionKind::Replacement,
                    reason: format!(
                        "Équipement en service depuis {} ans",
                        years_in_use.floor() as i64
                    ),
                    priority: if years_in_use > URGENT_REPLACEMENT_AGE_YEARS {
                        1
                    } else {
                        2
                    },
                    generated_at: now,
                });
            }
        }

        let usage_count = usage
            .iter()
            .filter(|u| u.equipment_id == equipment.id)
            .count();
        if usage_count > HEAVY_USAGE_THRESHOLD {
            suggestions.push(SmartSuggestion {
                id: Uuid::now_v7(),
                equipment_id: equipment.id,
                kind: SuggestionKind::Maintenance,
                reason: format!("Forte utilisation détectée ({usage_count} utilisations)"),
                priority: 2,
                generated_at: now,
            });
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use magasin_stock::EquipmentDraft;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 4, 8, 0, 0).unwrap()
    }

    fn test_equipment(id: i64, years_in_use: Option<i64>) -> Equipment {
        let mut equipment = EquipmentDraft {
            code_imo: format!("IMO-{id}"),
            nom_testeur: "B. Haddad".to_string(),
            nom_equipement: format!("Station {id}"),
            designation: "Station de soudage".to_string(),
            categorie: "Outillage".to_string(),
            nombre: 3,
            ..EquipmentDraft::default()
        }
        .build(EquipmentId::new(id))
        .unwrap();
        equipment.date_mise_en_marche = years_in_use.map(|y| test_time() - Duration::days(y * 365 + 30));
        equipment
    }

    fn test_usage(id: i64, count: usize) -> Vec<EquipmentUsage> {
        (0..count)
            .map(|i| EquipmentUsage {
                equipment_id: EquipmentId::new(id),
                user: "technicien".to_string(),
                start: test_time() - Duration::days(i as i64),
                end: None,
                purpose: "essai".to_string(),
                status: UsageStatus::Completed,
            })
            .collect()
    }

    #[test]
    fn old_equipment_gets_a_replacement_suggestion() {
        let snapshot = vec![test_equipment(1, Some(4)), test_equipment(2, Some(1))];

        let suggestions = generate_suggestions(&snapshot, &[], test_time());

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::Replacement);
        assert_eq!(suggestions[0].equipment_id, EquipmentId::new(1));
        assert_eq!(suggestions[0].priority, 2);
        assert_eq!(suggestions[0].reason, "Équipement en service depuis 4 ans");
    }

    #[test]
    fn very_old_equipment_is_top_priority() {
        let snapshot = vec![test_equipment(1, Some(6))];

        let suggestions = generate_suggestions(&snapshot, &[], test_time());

        assert_eq!(suggestions[0].priority, 1);
    }

    #[test]
    fn heavy_usage_raises_a_maintenance_suggestion() {
        let snapshot = vec![test_equipment(1, None)];
        let usage = test_usage(1, 101);

        let suggestions = generate_suggestions(&snapshot, &usage, test_time());

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::Maintenance);
        assert_eq!(
            suggestions[0].reason,
            "Forte utilisation détectée (101 utilisations)"
        );
    }

    #[test]
    fn usage_at_threshold_is_silent() {
        let snapshot = vec![test_equipment(1, None)];
        let usage = test_usage(1, 100);

        let suggestions = generate_suggestions(&snapshot, &usage, test_time());
        assert!(suggestions.is_empty());
    }
}
