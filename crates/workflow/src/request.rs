use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use magasin_core::RequestId;
use magasin_notify::{NotificationBus, Severity};
use magasin_stock::Equipment;

use crate::technician::Technician;

/// Delay between a terminal transition and removal from the active set,
/// in seconds.
pub const REQUEST_REMOVAL_DELAY_SECS: i64 = 3;

/// Request lifecycle status.
///
/// `approved` and `refused` are terminal: only removal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Refused,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// A technician's equipment request.
///
/// The equipment list is an intentional snapshot copy: the request reflects
/// what was available and chosen at creation time, even if the catalog moves
/// on afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRequest {
    pub id: RequestId,
    pub technicien: Technician,
    pub equipements: Vec<Equipment>,
    pub cree_le: DateTime<Utc>,
    pub statut: RequestStatus,
    /// Removal deadline, armed by the terminal transition.
    #[serde(default)]
    pub remove_at: Option<DateTime<Utc>>,
}

/// Active set of equipment requests.
#[derive(Debug, Clone, Default)]
pub struct RequestBoard {
    requests: Vec<EquipmentRequest>,
}

impl RequestBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[EquipmentRequest] {
        &self.requests
    }

    pub fn get(&self, id: RequestId) -> Option<&EquipmentRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| r.statut == RequestStatus::Pending)
            .count()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Create one pending request: a uniformly-drawn technician and 1–4
    /// distinct equipment snapshots from the current catalog.
    ///
    /// Returns `None` when the roster or the catalog is empty.
    pub fn generate(
        &mut self,
        roster: &[Technician],
        catalog: &[Equipment],
        bus: &mut NotificationBus,
        rng: &mut impl Rng,
        now: DateTime<Utc>,
    ) -> Option<&EquipmentRequest> {
        let technicien = roster.choose(rng)?.clone();
        if catalog.is_empty() {
            return None;
        }

        let count = rng.gen_range(1..=4usize).min(catalog.len());
        let equipements: Vec<Equipment> =
            catalog.choose_multiple(rng, count).cloned().collect();

        bus.push(
            format!("Nouvelle demande de {}", technicien.display_name()),
            Severity::Info,
            now,
        );

        self.requests.push(EquipmentRequest {
            id: RequestId::new(),
            technicien,
            equipements,
            cree_le: now,
            statut: RequestStatus::Pending,
            remove_at: None,
        });
        self.requests.last()
    }

    /// Approve a pending request and arm its delayed removal.
    ///
    /// Absent ids and already-terminal requests are a no-op; returns whether
    /// the transition happened.
    pub fn approve(
        &mut self,
        bus: &mut NotificationBus,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> bool {
        self.transition(
            bus,
            id,
            now,
            RequestStatus::Approved,
            "Demande approuvée avec succès",
            Severity::Success,
        )
    }

    /// Refuse a pending request and arm its delayed removal.
    ///
    /// Same no-op semantics as `approve`.
    pub fn refuse(
        &mut self,
        bus: &mut NotificationBus,
        id: RequestId,
        now: DateTime<Utc>,
    ) -> bool {
        self.transition(
            bus,
            id,
            now,
            RequestStatus::Refused,
            "Demande refusée",
            Severity::Error,
        )
    }

    fn transition(
        &mut self,
        bus: &mut NotificationBus,
        id: RequestId,
        now: DateTime<Utc>,
        to: RequestStatus,
        message: &str,
        severity: Severity,
    ) -> bool {
        let Some(request) = self.requests.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        if request.statut.is_terminal() {
            return false;
        }

        request.statut = to;
        request.remove_at = Some(now + Duration::seconds(REQUEST_REMOVAL_DELAY_SECS));
        bus.push(message, severity, now);
        true
    }

    /// Drop terminal requests past their removal deadline.
    ///
    /// Idempotent and safe to run after the entry was already removed by
    /// another path. Pending requests are never dropped.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.requests.len();
        self.requests
            .retain(|r| match r.remove_at {
                Some(deadline) => now < deadline,
                None => true,
            });
        before - self.requests.len()
    }
}
