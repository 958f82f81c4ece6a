//! Technician equipment-request workflow.
//!
//! Requests move through a small state machine (`pending` → `approved` or
//! `refused`, then removal after a fixed delay). Pending requests persist
//! until acted upon. A secondary per-technician assignment path lets an
//! operator curate candidate equipment lists outside that state machine.

pub mod assignment;
pub mod request;
pub mod technician;

pub use assignment::AssignmentPanel;
pub use request::{
    EquipmentRequest, RequestBoard, RequestStatus, REQUEST_REMOVAL_DELAY_SECS,
};
pub use technician::Technician;
