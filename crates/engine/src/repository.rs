//! Collaborator contracts (persistence layer, roster, order validation).
//!
//! Everything behind these traits is an external collaborator: the engine
//! only sees `Result`s, converts failures into error notifications at the
//! call boundary, and never mutates local state before the outcome is known.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use magasin_cart::OrderTicket;
use magasin_core::{DomainResult, TechnicianId};
use magasin_stock::{Equipment, EquipmentDraft};
use magasin_workflow::Technician;

/// Free-form note record (side feature of the store, unrelated to stock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub content: String,
    pub cree_le: DateTime<Utc>,
}

/// Equipment record store.
#[async_trait]
pub trait EquipmentRepository: Send + Sync {
    async fn list_equipement(&self) -> DomainResult<Vec<Equipment>>;

    /// Validate and persist a new record; the store assigns the id.
    async fn create_equipement(&self, draft: EquipmentDraft) -> DomainResult<Equipment>;
}

/// Note record store.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn list_notes(&self) -> DomainResult<Vec<Note>>;

    async fn create_note(&self, content: String) -> DomainResult<Note>;
}

/// Technician roster, including the upstream request-deletion call used by
/// the assignment panel.
#[async_trait]
pub trait TechnicianDirectory: Send + Sync {
    async fn list_techniciens(&self) -> DomainResult<Vec<Technician>>;

    async fn supprimer_demande(&self, id: TechnicianId) -> DomainResult<()>;
}

/// Upstream order validation (the `placeOrder` suspension point).
///
/// The gateway either applies the whole order or none of it.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn valider_panier(&self, ticket: &OrderTicket) -> DomainResult<()>;
}
