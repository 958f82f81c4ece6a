//! Aggregated in-memory store state.
//!
//! One `MagasinState` per session: the ledger plus every collection derived
//! from or reserved against it. All methods are synchronous and take the
//! business time explicitly, so the scheduler feeds them wall-clock time and
//! tests feed them virtual time.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use magasin_cart::Cart;
use magasin_core::{EquipmentId, RequestId};
use magasin_insights::{
    generate_alerts, generate_predictions, generate_suggestions, EquipmentUsage, PredictionEntry,
    SmartAlert, SmartSuggestion, LOW_STOCK_THRESHOLD,
};
use magasin_notify::{NotificationBus, Severity};
use magasin_stock::{Equipment, StockLedger, StockStats};
use magasin_workflow::{AssignmentPanel, RequestBoard, Technician};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceKind {
    Preventive,
    Corrective,
}

impl core::fmt::Display for MaintenanceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MaintenanceKind::Preventive => f.write_str("preventive"),
            MaintenanceKind::Corrective => f.write_str("corrective"),
        }
    }
}

/// One maintenance intervention (append-only history).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    pub equipment_id: EquipmentId,
    pub date: DateTime<Utc>,
    pub kind: MaintenanceKind,
    pub description: String,
    pub technicien: String,
}

/// One user rating (append-only history, no invariants).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRating {
    pub equipment_id: EquipmentId,
    pub rating: u8,
    pub comment: String,
    pub user: String,
    pub date: DateTime<Utc>,
}

/// Counters returned by one expiry sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub notifications: usize,
    pub requests: usize,
    pub confirmation_reset: bool,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.notifications == 0 && self.requests == 0 && !self.confirmation_reset
    }
}

/// The shared, mutable session state.
///
/// Single-threaded cooperative model: user operations and scheduler ticks
/// interleave on this state behind one lock; only the engine's collaborator
/// calls suspend, and those never hold the lock.
#[derive(Debug, Default)]
pub struct MagasinState {
    pub ledger: StockLedger,
    pub cart: Cart,
    pub notifications: NotificationBus,
    pub alerts: Vec<SmartAlert>,
    pub predictions: Vec<PredictionEntry>,
    pub suggestions: Vec<SmartSuggestion>,
    pub requests: RequestBoard,
    pub assignments: AssignmentPanel,
    pub roster: Vec<Technician>,
    pub favorites: BTreeSet<EquipmentId>,
    pub maintenance_history: Vec<MaintenanceRecord>,
    pub ratings: Vec<EquipmentRating>,
    pub usage: Vec<EquipmentUsage>,
}

impl MagasinState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the ledger with a fresh catalog listing and surface a
    /// low-stock warning per depleted record.
    pub fn load_catalog(&mut self, catalog: Vec<Equipment>, now: DateTime<Utc>) {
        self.ledger.load(catalog);
        for equipment in self.ledger.iter() {
            if equipment.nombre <= LOW_STOCK_THRESHOLD {
                self.notifications.push(
                    format!(
                        "Stock bas pour {} ({} restants)",
                        equipment.nom_equipement, equipment.nombre
                    ),
                    Severity::Warning,
                    now,
                );
            }
        }
    }

    /// Recompute the alert set from the current ledger (hourly cycle).
    pub fn refresh_alerts(&mut self, now: DateTime<Utc>) {
        self.alerts = generate_alerts(&self.ledger.snapshot(), now);
    }

    /// Recompute the prediction set from the current ledger (daily cycle).
    pub fn refresh_predictions(&mut self, now: DateTime<Utc>, rng: &mut impl Rng) {
        self.predictions = generate_predictions(&self.ledger.snapshot(), now, rng);
    }

    /// Recompute the suggestion set from ledger + usage history (daily cycle).
    pub fn refresh_suggestions(&mut self, now: DateTime<Utc>) {
        self.suggestions = generate_suggestions(&self.ledger.snapshot(), &self.usage, now);
    }

    /// Run every deadline sweep: notification TTL, terminal-request removal,
    /// order-confirmation reset.
    ///
    /// The sweeps are commutative and idempotent; calling this at any cadence
    /// (or twice at the same instant) yields the same steady state.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> SweepReport {
        SweepReport {
            notifications: self.notifications.sweep(now),
            requests: self.requests.sweep(now),
            confirmation_reset: self.cart.sweep(now),
        }
    }

    /// Create one pending request from the roster and the current catalog.
    pub fn generer_demande(
        &mut self,
        rng: &mut impl Rng,
        now: DateTime<Utc>,
    ) -> Option<RequestId> {
        let catalog = self.ledger.snapshot();
        self.requests
            .generate(&self.roster, &catalog, &mut self.notifications, rng, now)
            .map(|r| r.id)
    }

    /// Set an equipment's stock to an absolute value.
    ///
    /// Invariant rejections surface as a warning notification with the
    /// current availability; absent ids are a silent no-op.
    pub fn maj_stock(&mut self, id: EquipmentId, new_qty: i64, now: DateTime<Utc>) {
        match self.ledger.set_quantity(id, new_qty) {
            Ok(equipment) => {
                let message = format!("Stock mis à jour pour {}", equipment.nom_equipement);
                self.notifications.push(message, Severity::Success, now);
            }
            Err(magasin_core::DomainError::NegativeStock { current, .. }) => {
                self.notifications.push(
                    format!("Stock insuffisant. Disponible: {current}"),
                    Severity::Warning,
                    now,
                );
            }
            Err(_) => {}
        }
    }

    /// Toggle the favorite flag for an equipment; returns the new state.
    pub fn toggle_favorite(&mut self, id: EquipmentId) -> bool {
        if self.favorites.remove(&id) {
            false
        } else {
            self.favorites.insert(id);
            true
        }
    }

    /// Announce a planned maintenance date. Absent ids are a silent no-op.
    pub fn planifier_maintenance(
        &mut self,
        id: EquipmentId,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) {
        let Some(equipment) = self.ledger.get(id) else {
            return;
        };
        let message = format!(
            "Maintenance planifiée pour {} le {}",
            equipment.nom_equipement,
            date.format("%d/%m/%Y")
        );
        self.notifications.push(message, Severity::Info, now);
    }

    /// Append a maintenance intervention to the history.
    pub fn ajouter_maintenance(
        &mut self,
        id: EquipmentId,
        kind: MaintenanceKind,
        description: String,
        technicien: String,
        now: DateTime<Utc>,
    ) {
        self.maintenance_history.push(MaintenanceRecord {
            equipment_id: id,
            date: now,
            kind,
            description,
            technicien,
        });
        self.notifications.push(
            format!("Maintenance {kind} added for equipment #{id}"),
            Severity::Info,
            now,
        );
    }

    /// Append a rating to the history.
    pub fn noter_equipement(
        &mut self,
        id: EquipmentId,
        rating: u8,
        comment: String,
        user: String,
        now: DateTime<Utc>,
    ) {
        self.ratings.push(EquipmentRating {
            equipment_id: id,
            rating,
            comment,
            user,
            date: now,
        });
        self.notifications
            .push("Rating added successfully", Severity::Success, now);
    }

    /// Append a usage record (feeds the suggestion cycle).
    pub fn enregistrer_utilisation(&mut self, usage: EquipmentUsage) {
        self.usage.push(usage);
    }

    pub fn stats(&self) -> StockStats {
        self.ledger.stats()
    }
}
