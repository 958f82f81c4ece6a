use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use magasin_core::{DomainError, DomainResult, EquipmentId};

/// Equipment record, in the shape the record store exposes it.
///
/// Field names follow the store contract (`nom_equipement`, `code_imo`, ...);
/// `disponible` is derived (`nombre > 0`) and kept in sync by every ledger
/// mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: EquipmentId,
    pub code_imo: String,
    pub nom_testeur: String,
    pub nom_equipement: String,
    pub designation: String,
    pub categorie: String,
    #[serde(default)]
    pub arborescence: Option<String>,
    #[serde(default)]
    pub date_mise_en_marche: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_garantie: Option<DateTime<Utc>>,
    pub nombre: u32,
    #[serde(default)]
    pub disponible: bool,
}

impl Equipment {
    /// Re-derive the availability flag from the current quantity.
    pub(crate) fn sync_disponible(&mut self) {
        self.disponible = self.nombre > 0;
    }
}

/// Unvalidated input for creating an equipment record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentDraft {
    pub code_imo: String,
    pub nom_testeur: String,
    pub nom_equipement: String,
    pub designation: String,
    pub categorie: String,
    #[serde(default)]
    pub arborescence: Option<String>,
    #[serde(default)]
    pub date_mise_en_marche: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_garantie: Option<DateTime<Utc>>,
    #[serde(default)]
    pub nombre: u32,
}

impl EquipmentDraft {
    /// Validate the draft and build an `Equipment` with the given id.
    ///
    /// `code_imo`, `nom_testeur`, `nom_equipement`, `designation` and
    /// `categorie` are required and must be non-blank. The quantity is
    /// non-negative by construction.
    pub fn build(self, id: EquipmentId) -> DomainResult<Equipment> {
        let required = [
            &self.code_imo,
            &self.nom_testeur,
            &self.nom_equipement,
            &self.designation,
            &self.categorie,
        ];
        if required.iter().any(|f| f.trim().is_empty()) {
            return Err(DomainError::validation("Champs requis manquants."));
        }

        let arborescence = self.arborescence.filter(|a| !a.trim().is_empty());

        let mut equipment = Equipment {
            id,
            code_imo: self.code_imo,
            nom_testeur: self.nom_testeur,
            nom_equipement: self.nom_equipement,
            designation: self.designation,
            categorie: self.categorie,
            arborescence,
            date_mise_en_marche: self.date_mise_en_marche,
            date_garantie: self.date_garantie,
            nombre: self.nombre,
            disponible: false,
        };
        equipment.sync_disponible();
        Ok(equipment)
    }
}
