//! The engine facade exposed to the presentation layer.
//!
//! `Magasin` owns the session state behind one lock and brokers every
//! collaborator call. The lock is never held across an await: collaborator
//! calls are the only suspension points, and state is mutated strictly after
//! their outcome is known, so a failed call always leaves the pre-call state
//! intact.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use magasin_cart::CartLine;
use magasin_core::{DomainError, DomainResult, EquipmentId, RequestId, TechnicianId};
use magasin_insights::{EquipmentUsage, PredictionEntry, SmartAlert, SmartSuggestion};
use magasin_notify::{Notification, NotificationId, Severity};
use magasin_stock::{Equipment, EquipmentDraft, StockStats};
use magasin_workflow::{AssignmentPanel, EquipmentRequest, Technician};

use crate::repository::{
    EquipmentRepository, Note, NoteRepository, OrderGateway, TechnicianDirectory,
};
use crate::state::{MagasinState, MaintenanceKind, SweepReport};

/// Probability that one generator tick creates a new request.
pub const GENERATION_PROBABILITY: f64 = 0.3;

/// Session-scoped engine: shared state + collaborators.
pub struct Magasin {
    state: Mutex<MagasinState>,
    rng: Mutex<StdRng>,
    equipements: Arc<dyn EquipmentRepository>,
    notes: Arc<dyn NoteRepository>,
    techniciens: Arc<dyn TechnicianDirectory>,
    orders: Arc<dyn OrderGateway>,
}

impl Magasin {
    pub fn new(
        equipements: Arc<dyn EquipmentRepository>,
        notes: Arc<dyn NoteRepository>,
        techniciens: Arc<dyn TechnicianDirectory>,
        orders: Arc<dyn OrderGateway>,
    ) -> Self {
        Self::with_rng(
            equipements,
            notes,
            techniciens,
            orders,
            StdRng::from_entropy(),
        )
    }

    /// Build with an explicit random source (seeded in tests).
    pub fn with_rng(
        equipements: Arc<dyn EquipmentRepository>,
        notes: Arc<dyn NoteRepository>,
        techniciens: Arc<dyn TechnicianDirectory>,
        orders: Arc<dyn OrderGateway>,
        rng: StdRng,
    ) -> Self {
        Self {
            state: Mutex::new(MagasinState::new()),
            rng: Mutex::new(rng),
            equipements,
            notes,
            techniciens,
            orders,
        }
    }

    // Lock order is always rng before state; neither is ever held across an
    // await.
    fn state(&self) -> MutexGuard<'_, MagasinState> {
        self.state.lock().unwrap()
    }

    // ---- catalog & roster -------------------------------------------------

    /// Reload the catalog from the record store and recompute every derived
    /// collection. Returns the number of records loaded.
    pub async fn refresh_catalog(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        match self.equipements.list_equipement().await {
            Ok(catalog) => {
                let count = catalog.len();
                let mut rng = self.rng.lock().unwrap();
                let mut state = self.state();
                state.load_catalog(catalog, now);
                state.refresh_alerts(now);
                state.refresh_predictions(now, &mut *rng);
                state.refresh_suggestions(now);
                tracing::info!(count, "catalogue rechargé");
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "échec du chargement du catalogue");
                self.state().notifications.push(
                    "Erreur lors du chargement des équipements",
                    Severity::Error,
                    now,
                );
                Err(e)
            }
        }
    }

    /// Reload the technician roster. Returns the roster size.
    pub async fn refresh_roster(&self, now: DateTime<Utc>) -> DomainResult<usize> {
        match self.techniciens.list_techniciens().await {
            Ok(roster) => {
                let count = roster.len();
                self.state().roster = roster;
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "échec du chargement des techniciens");
                self.state().notifications.push(
                    "Erreur lors du chargement des techniciens",
                    Severity::Error,
                    now,
                );
                Err(e)
            }
        }
    }

    /// Create an equipment record upstream and mirror it into the ledger.
    pub async fn create_equipement(
        &self,
        draft: EquipmentDraft,
        now: DateTime<Utc>,
    ) -> DomainResult<Equipment> {
        match self.equipements.create_equipement(draft).await {
            Ok(equipment) => {
                let mut state = self.state();
                state.ledger.insert(equipment.clone());
                state
                    .notifications
                    .push("Équipement ajouté avec succès", Severity::Success, now);
                Ok(equipment)
            }
            Err(DomainError::Validation(msg)) => {
                self.state()
                    .notifications
                    .push(msg.clone(), Severity::Error, now);
                Err(DomainError::Validation(msg))
            }
            Err(e) => {
                tracing::warn!(error = %e, "échec de la création d'équipement");
                self.state().notifications.push(
                    "Impossible de créer l'équipement.",
                    Severity::Error,
                    now,
                );
                Err(e)
            }
        }
    }

    // ---- notes (side feature) --------------------------------------------

    pub async fn create_note(&self, content: &str, now: DateTime<Utc>) -> DomainResult<Note> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::validation("Le contenu est requis."));
        }
        match self.notes.create_note(content.to_string()).await {
            Ok(note) => Ok(note),
            Err(e) => {
                self.state()
                    .notifications
                    .push("Impossible de créer la note.", Severity::Error, now);
                Err(e)
            }
        }
    }

    pub async fn list_notes(&self) -> DomainResult<Vec<Note>> {
        self.notes.list_notes().await
    }

    // ---- cart -------------------------------------------------------------

    pub fn ajouter_au_panier(&self, id: EquipmentId, now: DateTime<Utc>) {
        let mut guard = self.state();
        let state = &mut *guard;
        if let Err(e) = state
            .cart
            .add(&mut state.ledger, &mut state.notifications, id, now)
        {
            tracing::warn!(%id, error = %e, "ajout au panier refusé");
        }
    }

    pub fn retirer_du_panier(&self, id: EquipmentId, now: DateTime<Utc>) {
        let mut guard = self.state();
        let state = &mut *guard;
        if let Err(e) = state
            .cart
            .remove(&mut state.ledger, &mut state.notifications, id, now)
        {
            tracing::warn!(%id, error = %e, "retrait du panier refusé");
        }
    }

    pub fn modifier_quantite(&self, id: EquipmentId, new_qty: u32, now: DateTime<Utc>) {
        let mut guard = self.state();
        let state = &mut *guard;
        if let Err(e) =
            state
                .cart
                .update_quantity(&mut state.ledger, &mut state.notifications, id, new_qty, now)
        {
            tracing::warn!(%id, error = %e, "mise à jour de quantité refusée");
        }
    }

    /// Place the order: snapshot the cart, cross the upstream suspension
    /// point, and only then commit.
    ///
    /// All-or-nothing: on upstream failure nothing is committed locally, the
    /// reservations stay in place and an error notification is emitted.
    /// Returns `Ok(false)` for an empty cart.
    pub async fn valider_commande(&self, now: DateTime<Utc>) -> DomainResult<bool> {
        let ticket = self.state().cart.begin_order();
        let Some(ticket) = ticket else {
            return Ok(false);
        };

        match self.orders.valider_panier(&ticket).await {
            Ok(()) => {
                let mut guard = self.state();
                let state = &mut *guard;
                state.cart.commit_order(&mut state.notifications, now);
                tracing::info!(items = ticket.items.len(), "commande validée");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(error = %e, "échec de la validation du panier");
                self.state().notifications.push(
                    "Erreur lors de la validation du panier.",
                    Severity::Error,
                    now,
                );
                Err(e)
            }
        }
    }

    // ---- request workflow -------------------------------------------------

    pub fn approuver_demande(&self, id: RequestId, now: DateTime<Utc>) -> bool {
        let mut guard = self.state();
        let state = &mut *guard;
        state.requests.approve(&mut state.notifications, id, now)
    }

    pub fn refuser_demande(&self, id: RequestId, now: DateTime<Utc>) -> bool {
        let mut guard = self.state();
        let state = &mut *guard;
        state.requests.refuse(&mut state.notifications, id, now)
    }

    /// Explicit trigger: create one pending request immediately.
    pub fn generer_demande(&self, now: DateTime<Utc>) -> Option<RequestId> {
        let mut rng = self.rng.lock().unwrap();
        self.state().generer_demande(&mut *rng, now)
    }

    /// One generator tick: with `GENERATION_PROBABILITY`, create a request.
    pub fn tick_generation(&self, now: DateTime<Utc>) -> Option<RequestId> {
        let draw: f64 = self.rng.lock().unwrap().r#gen();
        if draw < GENERATION_PROBABILITY {
            self.generer_demande(now)
        } else {
            None
        }
    }

    // ---- technician assignments -------------------------------------------

    /// Curate a candidate list for a technician without one (the panel's
    /// "Valider la sélection" step). Returns whether a list was recorded.
    pub fn valider_selection(&self, technicien_id: TechnicianId, now: DateTime<Utc>) -> bool {
        let mut rng = self.rng.lock().unwrap();
        let mut guard = self.state();
        let state = &mut *guard;

        if state.assignments.is_assigned(technicien_id) {
            return false;
        }
        let Some(technicien) = state
            .roster
            .iter()
            .find(|t| t.id == technicien_id)
            .cloned()
        else {
            return false;
        };

        let catalog = state.ledger.snapshot();
        let items = AssignmentPanel::propose(&catalog, &mut *rng);
        state
            .assignments
            .record(&mut state.notifications, &technicien, items, now);
        true
    }

    pub async fn valider_affectation(
        &self,
        technicien_id: TechnicianId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.resoudre_affectation(technicien_id, now, true).await
    }

    pub async fn refuser_affectation(
        &self,
        technicien_id: TechnicianId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.resoudre_affectation(technicien_id, now, false).await
    }

    /// Resolve a curated assignment through the roster collaborator.
    ///
    /// Local tracking is cleared only once the upstream delete succeeded; on
    /// failure the assignment stays and an error notification is emitted. No
    /// assignment is a silent no-op.
    async fn resoudre_affectation(
        &self,
        technicien_id: TechnicianId,
        now: DateTime<Utc>,
        accept: bool,
    ) -> DomainResult<()> {
        let technicien = {
            let state = self.state();
            if !state.assignments.is_assigned(technicien_id) {
                return Ok(());
            }
            state.roster.iter().find(|t| t.id == technicien_id).cloned()
        };
        let name = technicien
            .map(|t| t.display_name())
            .unwrap_or_else(|| format!("technicien #{technicien_id}"));

        match self.techniciens.supprimer_demande(technicien_id).await {
            Ok(()) => {
                let mut guard = self.state();
                let state = &mut *guard;
                state.assignments.clear(technicien_id);
                let (message, severity) = if accept {
                    (
                        format!("Demande validée et supprimée pour {name}"),
                        Severity::Success,
                    )
                } else {
                    (
                        format!("Demande refusée et supprimée pour {name}"),
                        Severity::Error,
                    )
                };
                state.notifications.push(message, severity, now);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(%technicien_id, error = %e, "échec de la suppression de demande");
                self.state().notifications.push(
                    format!("Erreur lors de la suppression: {e}"),
                    Severity::Error,
                    now,
                );
                Err(e)
            }
        }
    }

    // ---- scheduled recomputations & sweeps --------------------------------

    pub fn refresh_alerts(&self, now: DateTime<Utc>) {
        self.state().refresh_alerts(now);
    }

    pub fn refresh_predictions(&self, now: DateTime<Utc>) {
        let mut rng = self.rng.lock().unwrap();
        self.state().refresh_predictions(now, &mut *rng);
    }

    pub fn refresh_suggestions(&self, now: DateTime<Utc>) {
        self.state().refresh_suggestions(now);
    }

    /// Run every deadline sweep once.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let report = self.state().sweep(now);
        if !report.is_empty() {
            tracing::debug!(
                notifications = report.notifications,
                requests = report.requests,
                confirmation_reset = report.confirmation_reset,
                "expiration balayée"
            );
        }
        report
    }

    // ---- derived-state mutators -------------------------------------------

    pub fn toggle_favorite(&self, id: EquipmentId) -> bool {
        self.state().toggle_favorite(id)
    }

    pub fn maj_stock(&self, id: EquipmentId, new_qty: i64, now: DateTime<Utc>) {
        self.state().maj_stock(id, new_qty, now);
    }

    pub fn planifier_maintenance(&self, id: EquipmentId, date: DateTime<Utc>, now: DateTime<Utc>) {
        self.state().planifier_maintenance(id, date, now);
    }

    pub fn ajouter_maintenance(
        &self,
        id: EquipmentId,
        kind: MaintenanceKind,
        description: impl Into<String>,
        technicien: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.state()
            .ajouter_maintenance(id, kind, description.into(), technicien.into(), now);
    }

    pub fn noter_equipement(
        &self,
        id: EquipmentId,
        rating: u8,
        comment: impl Into<String>,
        user: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.state()
            .noter_equipement(id, rating, comment.into(), user.into(), now);
    }

    pub fn enregistrer_utilisation(&self, usage: EquipmentUsage) {
        self.state().enregistrer_utilisation(usage);
    }

    pub fn mark_notification_read(&self, id: NotificationId) {
        self.state().notifications.mark_read(id);
    }

    // ---- read accessors ---------------------------------------------------

    pub fn catalogue(&self) -> Vec<Equipment> {
        self.state().ledger.snapshot()
    }

    pub fn equipement(&self, id: EquipmentId) -> Option<Equipment> {
        self.state().ledger.get(id).cloned()
    }

    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.state().cart.lines().to_vec()
    }

    pub fn confirmation_pending(&self) -> bool {
        self.state().cart.confirmation_pending()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state().notifications.all().to_vec()
    }

    pub fn unread_notifications(&self) -> usize {
        self.state().notifications.unread_count()
    }

    pub fn alerts(&self) -> Vec<SmartAlert> {
        self.state().alerts.clone()
    }

    pub fn predictions(&self) -> Vec<PredictionEntry> {
        self.state().predictions.clone()
    }

    pub fn suggestions(&self) -> Vec<SmartSuggestion> {
        self.state().suggestions.clone()
    }

    pub fn demandes(&self) -> Vec<EquipmentRequest> {
        self.state().requests.all().to_vec()
    }

    pub fn affectation(&self, id: TechnicianId) -> Option<Vec<Equipment>> {
        self.state().assignments.get(id).map(<[Equipment]>::to_vec)
    }

    pub fn roster(&self) -> Vec<Technician> {
        self.state().roster.clone()
    }

    pub fn favoris(&self) -> Vec<EquipmentId> {
        self.state().favorites.iter().copied().collect()
    }

    pub fn stats(&self) -> StockStats {
        self.state().stats()
    }
}
