use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use magasin_core::TechnicianId;
use magasin_notify::{NotificationBus, Severity};
use magasin_stock::Equipment;

use crate::technician::Technician;

/// Per-technician curated equipment lists (the technicians-panel path).
///
/// Independent of the pending/approved/refused request lifecycle: an operator
/// drafts a candidate list per technician, validates it locally, and later
/// resolves it through the roster collaborator. Local tracking is only
/// cleared once the collaborator delete succeeded.
#[derive(Debug, Clone, Default)]
pub struct AssignmentPanel {
    assignments: BTreeMap<TechnicianId, Vec<Equipment>>,
}

impl AssignmentPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: TechnicianId) -> Option<&[Equipment]> {
        self.assignments.get(&id).map(Vec::as_slice)
    }

    pub fn is_assigned(&self, id: TechnicianId) -> bool {
        self.assignments.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Draw 2–3 candidate equipment for a technician without an assignment.
    pub fn propose(catalog: &[Equipment], rng: &mut impl Rng) -> Vec<Equipment> {
        let count = rng.gen_range(2..=3usize).min(catalog.len());
        catalog.choose_multiple(rng, count).cloned().collect()
    }

    /// Store a validated selection for a technician.
    pub fn record(
        &mut self,
        bus: &mut NotificationBus,
        technicien: &Technician,
        items: Vec<Equipment>,
        now: DateTime<Utc>,
    ) {
        self.assignments.insert(technicien.id, items);
        bus.push(
            format!("Sélection validée pour {}", technicien.display_name()),
            Severity::Success,
            now,
        );
    }

    /// Drop a technician's local assignment.
    ///
    /// Callers invoke this only after the collaborator delete succeeded;
    /// absent ids are a no-op.
    pub fn clear(&mut self, id: TechnicianId) -> bool {
        self.assignments.remove(&id).is_some()
    }
}
