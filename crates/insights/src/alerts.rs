use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use magasin_core::EquipmentId;
use magasin_stock::Equipment;

/// Stock level at or below which a stock alert is raised.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Months in service (30-day months) after which preventive maintenance is due.
const MAINTENANCE_DUE_MONTHS: f64 = 6.0;

/// Days before warranty expiry at which a warranty alert is raised.
const WARRANTY_WINDOW_DAYS: f64 = 30.0;

const SECS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCategory {
    Stock,
    Maintenance,
    Warranty,
    /// Reserved for usage-driven signals; those currently surface as
    /// suggestions instead of alerts.
    Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

/// A prioritized alert derived from the current equipment state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartAlert {
    pub id: Uuid,
    pub category: AlertCategory,
    pub message: String,
    pub priority: AlertPriority,
    pub equipment_id: EquipmentId,
    pub generated_at: DateTime<Utc>,
}

/// Derive the full alert set from an equipment snapshot.
///
/// Invoked by the hourly scheduler and once at startup; the result replaces
/// the previous set entirely.
pub fn generate_alerts(snapshot: &[Equipment], now: DateTime<Utc>) -> Vec<SmartAlert> {
    let mut alerts = Vec::new();

    for equipment in snapshot {
        if equipment.nombre <= LOW_STOCK_THRESHOLD {
            alerts.push(SmartAlert {
                id: Uuid::now_v7(),
                category: AlertCategory::Stock,
                message: format!(
                    "Stock bas pour {} ({} restants)",
                    equipment.nom_equipement, equipment.nombre
                ),
                priority: if equipment.nombre == 0 {
                    AlertPriority::High
                } else {
                    AlertPriority::Medium
                },
                equipment_id: equipment.id,
                generated_at: now,
            });
        }

        if let Some(mise_en_marche) = equipment.date_mise_en_marche {
            let months_in_use =
                (now - mise_en_marche).num_seconds() as f64 / (30.0 * SECS_PER_DAY);
            if months_in_use > MAINTENANCE_DUE_MONTHS {
                alerts.push(SmartAlert {
                    id: Uuid::now_v7(),
                    category: AlertCategory::Maintenance,
                    message: format!(
                        "{} nécessite une maintenance préventive",
                        equipment.nom_equipement
                    ),
                    priority: AlertPriority::Medium,
                    equipment_id: equipment.id,
                    generated_at: now,
                });
            }
        }

        if let Some(garantie) = equipment.date_garantie {
            let days_until = (garantie - now).num_seconds() as f64 / SECS_PER_DAY;
            if days_until < WARRANTY_WINDOW_DAYS {
                let message = if days_until >= 0.0 {
                    format!(
                        "La garantie de {} expire dans {} jours",
                        equipment.nom_equipement,
                        days_until.ceil() as i64
                    )
                } else {
                    // Already expired: at least as urgent, reported with its
                    // own wording instead of a negative day count.
                    format!(
                        "La garantie de {} est expirée depuis {} jours",
                        equipment.nom_equipement,
                        (-days_until).ceil() as i64
                    )
                };
                alerts.push(SmartAlert {
                    id: Uuid::now_v7(),
                    category: AlertCategory::Warranty,
                    message,
                    priority: AlertPriority::High,
                    equipment_id: equipment.id,
                    generated_at: now,
                });
            }
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use magasin_stock::EquipmentDraft;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 4, 8, 0, 0).unwrap()
    }

    fn test_equipment(id: i64, nombre: u32) -> Equipment {
        EquipmentDraft {
            code_imo: format!("IMO-{id}"),
            nom_testeur: "B. Haddad".to_string(),
            nom_equipement: format!("Analyseur {id}"),
            designation: "Analyseur de spectre".to_string(),
            categorie: "Mesure".to_string(),
            nombre,
            ..EquipmentDraft::default()
        }
        .build(EquipmentId::new(id))
        .unwrap()
    }

    #[test]
    fn low_stock_raises_medium_and_empty_stock_raises_high() {
        let now = test_time();
        let snapshot = vec![
            test_equipment(1, 0),
            test_equipment(2, 5),
            test_equipment(3, 6),
        ];

        let alerts = generate_alerts(&snapshot, now);
        let stock: Vec<_> = alerts
            .iter()
            .filter(|a| a.category == AlertCategory::Stock)
            .collect();

        assert_eq!(stock.len(), 2);
        assert_eq!(stock[0].priority, AlertPriority::High);
        assert_eq!(stock[0].message, "Stock bas pour Analyseur 1 (0 restants)");
        assert_eq!(stock[1].priority, AlertPriority::Medium);
    }

    #[test]
    fn maintenance_is_due_after_six_thirty_day_months() {
        let now = test_time();

        let mut due = test_equipment(1, 10);
        due.date_mise_en_marche = Some(now - Duration::days(181));
        let mut fresh = test_equipment(2, 10);
        fresh.date_mise_en_marche = Some(now - Duration::days(179));

        let alerts = generate_alerts(&[due, fresh], now);
        let maintenance: Vec<_> = alerts
            .iter()
            .filter(|a| a.category == AlertCategory::Maintenance)
            .collect();

        assert_eq!(maintenance.len(), 1);
        assert_eq!(maintenance[0].equipment_id, EquipmentId::new(1));
        assert_eq!(
            maintenance[0].message,
            "Analyseur 1 nécessite une maintenance préventive"
        );
        assert_eq!(maintenance[0].priority, AlertPriority::Medium);
    }

    #[test]
    fn warranty_expiring_in_ten_days_raises_one_high_alert() {
        let now = test_time();
        let mut equipment = test_equipment(1, 10);
        equipment.date_garantie = Some(now + Duration::days(10));

        let alerts = generate_alerts(&[equipment], now);
        let warranty: Vec<_> = alerts
            .iter()
            .filter(|a| a.category == AlertCategory::Warranty)
            .collect();

        assert_eq!(warranty.len(), 1);
        assert_eq!(warranty[0].priority, AlertPriority::High);
        assert!(warranty[0].message.contains("10 jours"));
    }

    #[test]
    fn expired_warranty_still_alerts_with_dedicated_wording() {
        let now = test_time();
        let mut equipment = test_equipment(1, 10);
        equipment.date_garantie = Some(now - Duration::days(15));

        let alerts = generate_alerts(&[equipment], now);
        let warranty: Vec<_> = alerts
            .iter()
            .filter(|a| a.category == AlertCategory::Warranty)
            .collect();

        assert_eq!(warranty.len(), 1);
        assert_eq!(warranty[0].priority, AlertPriority::High);
        assert_eq!(
            warranty[0].message,
            "La garantie de Analyseur 1 est expirée depuis 15 jours"
        );
    }

    #[test]
    fn warranty_outside_window_is_silent() {
        let now = test_time();
        let mut equipment = test_equipment(1, 10);
        equipment.date_garantie = Some(now + Duration::days(45));

        let alerts = generate_alerts(&[equipment], now);
        assert!(alerts
            .iter()
            .all(|a| a.category != AlertCategory::Warranty));
    }

    #[test]
    fn each_cycle_regenerates_the_set_wholesale() {
        let now = test_time();
        let snapshot = vec![test_equipment(1, 2)];

        let first = generate_alerts(&snapshot, now);
        let second = generate_alerts(&snapshot, now + Duration::hours(1));

        assert_eq!(first.len(), second.len());
        // Fresh ids each cycle: nothing survives from the previous set.
        assert_ne!(first[0].id, second[0].id);
    }
}
