//! `magasin-engine` — service facade, collaborators and schedulers.
//!
//! Wires the domain crates (ledger, cart, insights, workflow, notifications)
//! into one session-scoped engine, brokers every external collaborator call,
//! and owns the background timer tasks.

pub mod in_memory;
pub mod repository;
pub mod scheduler;
pub mod service;
pub mod state;

#[cfg(test)]
mod integration_tests;

pub use in_memory::{
    InMemoryEquipmentRepository, InMemoryNoteRepository, InMemoryOrderGateway,
    InMemoryTechnicianDirectory,
};
pub use repository::{
    EquipmentRepository, Note, NoteRepository, OrderGateway, TechnicianDirectory,
};
pub use scheduler::{Scheduler, SchedulerConfig};
pub use service::{Magasin, GENERATION_PROBABILITY};
pub use state::{
    EquipmentRating, MagasinState, MaintenanceKind, MaintenanceRecord, SweepReport,
};
