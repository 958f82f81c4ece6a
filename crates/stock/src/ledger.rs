use std::collections::BTreeMap;

use serde::Serialize;

use magasin_core::{DomainError, DomainResult, EquipmentId};

use crate::equipment::Equipment;

/// Authoritative mapping of equipment id to available quantity.
///
/// The ledger is the single mutable resource shared by the cart, the insight
/// generators (read-only) and the request workflow (read-only). All mutations
/// go through `set_quantity`/`adjust_quantity` so the non-negative invariant
/// cannot be violated by interleaved callers; on failure the ledger is left
/// unchanged. Successful mutations update the derived `disponible` flag
/// before returning, so every reader observes a consistent record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockLedger {
    items: BTreeMap<EquipmentId, Equipment>,
}

/// Aggregate counters derived from the ledger (dashboard snapshot).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockStats {
    pub total: usize,
    pub par_categorie: BTreeMap<String, usize>,
    pub stock_bas: usize,
    pub indisponibles: usize,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole ledger content with a fresh catalog listing.
    pub fn load(&mut self, catalog: impl IntoIterator<Item = Equipment>) {
        self.items.clear();
        for mut equipment in catalog {
            equipment.sync_disponible();
            self.items.insert(equipment.id, equipment);
        }
    }

    /// Insert or replace a single record.
    pub fn insert(&mut self, mut equipment: Equipment) -> Option<Equipment> {
        equipment.sync_disponible();
        self.items.insert(equipment.id, equipment)
    }

    pub fn get(&self, id: EquipmentId) -> Option<&Equipment> {
        self.items.get(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Equipment> {
        self.items.values()
    }

    /// Owned snapshot of every record, for the wholesale-regeneration
    /// consumers (alerts, predictions, request candidates).
    pub fn snapshot(&self) -> Vec<Equipment> {
        self.items.values().cloned().collect()
    }

    /// Set an equipment's quantity to an absolute value.
    ///
    /// Accepts an `i64` so that a caller handing over out-of-range input gets
    /// the same `NegativeStock` rejection as a relative adjustment would.
    pub fn set_quantity(&mut self, id: EquipmentId, new_qty: i64) -> DomainResult<&Equipment> {
        let equipment = self.items.get_mut(&id).ok_or(DomainError::NotFound)?;
        if new_qty < 0 {
            let current = equipment.nombre;
            return Err(DomainError::negative_stock(
                current,
                new_qty - i64::from(current),
            ));
        }

        equipment.nombre = new_qty as u32;
        equipment.sync_disponible();
        Ok(equipment)
    }

    /// Adjust an equipment's quantity by a signed delta.
    ///
    /// Fails with `NegativeStock` if the result would drop below zero; the
    /// ledger is unchanged on failure.
    pub fn adjust_quantity(&mut self, id: EquipmentId, delta: i64) -> DomainResult<&Equipment> {
        let equipment = self.items.get_mut(&id).ok_or(DomainError::NotFound)?;
        let new_qty = i64::from(equipment.nombre) + delta;
        if new_qty < 0 {
            return Err(DomainError::negative_stock(equipment.nombre, delta));
        }

        equipment.nombre = new_qty as u32;
        equipment.sync_disponible();
        Ok(equipment)
    }

    /// Dashboard counters: total records, per-category counts, low-stock
    /// records (five or fewer remaining) and unavailable records.
    pub fn stats(&self) -> StockStats {
        let mut stats = StockStats {
            total: self.items.len(),
            ..StockStats::default()
        };
        for equipment in self.items.values() {
            *stats
                .par_categorie
                .entry(equipment.categorie.clone())
                .or_insert(0) += 1;
            if equipment.nombre <= 5 {
                stats.stock_bas += 1;
            }
            if !equipment.disponible {
                stats.indisponibles += 1;
            }
        }
        stats
    }
}
