use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use magasin_core::EquipmentId;
use magasin_stock::Equipment;

/// Heuristic stock/maintenance projection for one equipment.
///
/// Bounded, plausible-looking values. Not a statistical model and not a
/// forecasted guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub equipment_id: EquipmentId,
    pub predicted_stock: u32,
    /// Always in `[0.8, 1.0)`.
    pub confidence: f64,
    pub next_maintenance: DateTime<Utc>,
}

/// Derive one projection per equipment from a snapshot.
///
/// Invoked by the daily scheduler and once at startup; the result replaces
/// the previous set entirely. The random source is injected so tests can
/// seed it.
pub fn generate_predictions(
    snapshot: &[Equipment],
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Vec<PredictionEntry> {
    snapshot
        .iter()
        .map(|equipment| {
            let drawdown = rng.gen_range(0u32..5);
            let in_days = rng.r#gen::<f64>() * 30.0;
            PredictionEntry {
                equipment_id: equipment.id,
                predicted_stock: equipment.nombre.saturating_sub(drawdown),
                confidence: 0.8 + rng.r#gen::<f64>() * 0.2,
                next_maintenance: now + Duration::seconds((in_days * 86_400.0) as i64),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use magasin_stock::EquipmentDraft;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 4, 8, 0, 0).unwrap()
    }

    fn test_equipment(id: i64, nombre: u32) -> Equipment {
        EquipmentDraft {
            code_imo: format!("IMO-{id}"),
            nom_testeur: "B. Haddad".to_string(),
            nom_equipement: format!("Banc {id}"),
            designation: "Banc de mesure".to_string(),
            categorie: "Mesure".to_string(),
            nombre,
            ..EquipmentDraft::default()
        }
        .build(EquipmentId::new(id))
        .unwrap()
    }

    #[test]
    fn one_entry_per_equipment() {
        let snapshot = vec![test_equipment(1, 4), test_equipment(2, 0)];
        let mut rng = StdRng::seed_from_u64(7);

        let predictions = generate_predictions(&snapshot, test_time(), &mut rng);

        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].equipment_id, EquipmentId::new(1));
        assert_eq!(predictions[1].equipment_id, EquipmentId::new(2));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: projections stay inside their documented bounds for any
        /// snapshot and seed.
        #[test]
        fn projections_stay_within_bounds(
            seed in any::<u64>(),
            quantities in prop::collection::vec(0u32..100, 1..10)
        ) {
            let snapshot: Vec<Equipment> = quantities
                .iter()
                .enumerate()
                .map(|(i, &n)| test_equipment(i as i64 + 1, n))
                .collect();
            let mut rng = StdRng::seed_from_u64(seed);
            let now = test_time();

            let predictions = generate_predictions(&snapshot, now, &mut rng);

            for (equipment, prediction) in snapshot.iter().zip(&predictions) {
                // Drawdown is at most 4 units and never below zero.
                prop_assert!(prediction.predicted_stock <= equipment.nombre);
                prop_assert!(
                    prediction.predicted_stock + 4 >= equipment.nombre
                        || prediction.predicted_stock == 0
                );
                prop_assert!(prediction.confidence >= 0.8);
                prop_assert!(prediction.confidence < 1.0);
                prop_assert!(prediction.next_maintenance >= now);
                prop_assert!(prediction.next_maintenance < now + Duration::days(30));
            }
        }
    }
}
