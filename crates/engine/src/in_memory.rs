//! In-memory collaborator implementations for dev/tests.
//!
//! Each implementation keeps its records behind a `Mutex` and offers failure
//! toggles so tests can exercise the degrade-to-notification error policy
//! without a real backend.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use magasin_cart::OrderTicket;
use magasin_core::{DomainError, DomainResult, EquipmentId, TechnicianId};
use magasin_stock::{Equipment, EquipmentDraft};
use magasin_workflow::Technician;

use crate::repository::{
    EquipmentRepository, Note, NoteRepository, OrderGateway, TechnicianDirectory,
};

/// In-memory equipment store with auto-assigned integer ids and a failure
/// toggle.
#[derive(Debug, Default)]
pub struct InMemoryEquipmentRepository {
    records: Mutex<Vec<Equipment>>,
    next_id: AtomicI64,
    fail_calls: AtomicBool,
}

impl InMemoryEquipmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Equipment>) -> Self {
        let next_id = records
            .iter()
            .map(|e| e.id.as_i64())
            .max()
            .unwrap_or(0);
        Self {
            records: Mutex::new(records),
            next_id: AtomicI64::new(next_id),
            fail_calls: AtomicBool::new(false),
        }
    }

    pub fn set_fail_calls(&self, fail: bool) {
        self.fail_calls.store(fail, Ordering::SeqCst);
    }

    fn check_available(&self) -> DomainResult<()> {
        if self.fail_calls.load(Ordering::SeqCst) {
            return Err(DomainError::upstream("magasin de données indisponible"));
        }
        Ok(())
    }
}

#[async_trait]
impl EquipmentRepository for InMemoryEquipmentRepository {
    async fn list_equipement(&self) -> DomainResult<Vec<Equipment>> {
        self.check_available()?;
        Ok(self.records.lock().unwrap().clone())
    }

    async fn create_equipement(&self, draft: EquipmentDraft) -> DomainResult<Equipment> {
        self.check_available()?;
        let id = EquipmentId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let equipment = draft.build(id)?;
        self.records.lock().unwrap().push(equipment.clone());
        Ok(equipment)
    }
}

/// In-memory note store.
#[derive(Debug, Default)]
pub struct InMemoryNoteRepository {
    notes: Mutex<Vec<Note>>,
    next_id: AtomicI64,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    async fn list_notes(&self) -> DomainResult<Vec<Note>> {
        Ok(self.notes.lock().unwrap().clone())
    }

    async fn create_note(&self, content: String) -> DomainResult<Note> {
        let note = Note {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            content,
            cree_le: Utc::now(),
        };
        self.notes.lock().unwrap().push(note.clone());
        Ok(note)
    }
}

/// In-memory roster with a failure toggle on the request-deletion call.
#[derive(Debug, Default)]
pub struct InMemoryTechnicianDirectory {
    roster: Mutex<Vec<Technician>>,
    deleted: Mutex<Vec<TechnicianId>>,
    fail_deletes: AtomicBool,
}

impl InMemoryTechnicianDirectory {
    pub fn with_roster(roster: Vec<Technician>) -> Self {
        Self {
            roster: Mutex::new(roster),
            deleted: Mutex::new(Vec::new()),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Ids whose upstream request deletion went through.
    pub fn deleted(&self) -> Vec<TechnicianId> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TechnicianDirectory for InMemoryTechnicianDirectory {
    async fn list_techniciens(&self) -> DomainResult<Vec<Technician>> {
        Ok(self.roster.lock().unwrap().clone())
    }

    async fn supprimer_demande(&self, id: TechnicianId) -> DomainResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(DomainError::upstream("suppression indisponible"));
        }
        self.deleted.lock().unwrap().push(id);
        Ok(())
    }
}

/// In-memory order gateway with a failure toggle.
#[derive(Debug, Default)]
pub struct InMemoryOrderGateway {
    orders: Mutex<Vec<OrderTicket>>,
    fail_orders: AtomicBool,
}

impl InMemoryOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_orders(&self, fail: bool) {
        self.fail_orders.store(fail, Ordering::SeqCst);
    }

    /// Orders the upstream accepted, in submission order.
    pub fn accepted(&self) -> Vec<OrderTicket> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn valider_panier(&self, ticket: &OrderTicket) -> DomainResult<()> {
        if self.fail_orders.load(Ordering::SeqCst) {
            return Err(DomainError::upstream("validation du panier indisponible"));
        }
        self.orders.lock().unwrap().push(ticket.clone());
        Ok(())
    }
}
