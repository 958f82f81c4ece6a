use serde::{Deserialize, Serialize};

use magasin_core::TechnicianId;

/// Roster entry, in the shape the roster collaborator exposes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub id: TechnicianId,
    pub prenom: String,
    pub nom: String,
    pub email: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Technician {
    /// "Prénom Nom", as shown in notifications.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }
}
