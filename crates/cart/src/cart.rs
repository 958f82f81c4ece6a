use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use magasin_core::{DomainResult, EquipmentId};
use magasin_notify::{NotificationBus, Severity};
use magasin_stock::StockLedger;

/// How long the order confirmation stays up before the cart view resets,
/// in seconds.
pub const ORDER_CONFIRMATION_TTL_SECS: i64 = 3;

/// One reserved line: equipment reference by id plus the reserved quantity.
///
/// The line never caches equipment fields; display data is resolved against
/// the ledger at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub equipment_id: EquipmentId,
    pub quantity: u32,
}

/// Immutable order snapshot handed to the order gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTicket {
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: EquipmentId,
    pub quantity: u32,
}

/// Per-session reservation cart.
///
/// Reserve-at-add semantics: `add` decrements the ledger immediately and
/// `remove` restores the full line quantity, so the cart and the ledger can
/// never drift apart. Two sessions can no longer both hold the last unit;
/// the second `add` is rejected at reservation time.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    /// Confirmation-reset deadline armed by `commit_order`.
    confirmation_until: Option<DateTime<Utc>>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn get(&self, id: EquipmentId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.equipment_id == id)
    }

    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether an order confirmation is currently displayed.
    pub fn confirmation_pending(&self) -> bool {
        self.confirmation_until.is_some()
    }

    /// Reserve one unit of the given equipment.
    ///
    /// Out-of-stock equipment fails silently with a user-visible error
    /// notification; an absent id is a silent no-op (the caller may be acting
    /// on stale data).
    pub fn add(
        &mut self,
        ledger: &mut StockLedger,
        bus: &mut NotificationBus,
        id: EquipmentId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let Some(equipment) = ledger.get(id) else {
            return Ok(());
        };
        let nom = equipment.nom_equipement.clone();

        if equipment.nombre == 0 {
            bus.push(
                "Cet équipement n'est plus disponible en stock",
                Severity::Error,
                now,
            );
            return Ok(());
        }

        ledger.adjust_quantity(id, -1)?;

        match self.lines.iter_mut().find(|l| l.equipment_id == id) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine {
                equipment_id: id,
                quantity: 1,
            }),
        }

        bus.push(format!("{nom} ajouté au panier"), Severity::Success, now);
        Ok(())
    }

    /// Remove a line, restoring its full reserved quantity to the ledger.
    ///
    /// Absent lines are a no-op. If the restoration fails the cart is left
    /// unchanged and an error notification is emitted; the cart must never
    /// drift from the ledger.
    pub fn remove(
        &mut self,
        ledger: &mut StockLedger,
        bus: &mut NotificationBus,
        id: EquipmentId,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let Some(position) = self.lines.iter().position(|l| l.equipment_id == id) else {
            return Ok(());
        };
        let quantity = self.lines[position].quantity;

        match ledger.adjust_quantity(id, i64::from(quantity)) {
            Ok(equipment) => {
                let nom = equipment.nom_equipement.clone();
                self.lines.remove(position);
                bus.push(format!("{nom} retiré du panier"), Severity::Info, now);
                Ok(())
            }
            Err(e) => {
                bus.push(
                    "Erreur lors de la mise à jour du stock",
                    Severity::Error,
                    now,
                );
                Err(e)
            }
        }
    }

    /// Change a line's reserved quantity, moving the delta through the ledger.
    ///
    /// A target of zero behaves as `remove`. Growth beyond what the ledger
    /// can supply is rejected with a warning notification and no state
    /// change.
    pub fn update_quantity(
        &mut self,
        ledger: &mut StockLedger,
        bus: &mut NotificationBus,
        id: EquipmentId,
        new_qty: u32,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if new_qty == 0 {
            return self.remove(ledger, bus, id, now);
        }

        let Some(position) = self.lines.iter().position(|l| l.equipment_id == id) else {
            return Ok(());
        };
        let Some(equipment) = ledger.get(id) else {
            return Ok(());
        };
        let disponible = equipment.nombre;
        let nom = equipment.nom_equipement.clone();

        let delta = i64::from(new_qty) - i64::from(self.lines[position].quantity);
        if ledger.adjust_quantity(id, -delta).is_err() {
            bus.push(
                format!("Stock insuffisant. Disponible: {disponible}"),
                Severity::Warning,
                now,
            );
            return Ok(());
        }

        self.lines[position].quantity = new_qty;
        bus.push(
            format!("Quantité mise à jour pour {nom}"),
            Severity::Success,
            now,
        );
        Ok(())
    }

    /// Snapshot the cart for order placement.
    ///
    /// Returns `None` for an empty cart. The snapshot is what crosses the
    /// upstream suspension point; the cart itself is untouched until
    /// `commit_order`.
    pub fn begin_order(&self) -> Option<OrderTicket> {
        if self.lines.is_empty() {
            return None;
        }
        Some(OrderTicket {
            items: self
                .lines
                .iter()
                .map(|l| OrderItem {
                    id: l.equipment_id,
                    quantity: l.quantity,
                })
                .collect(),
        })
    }

    /// Apply a successful order: clear the cart and arm the confirmation
    /// flag, which auto-resets after `ORDER_CONFIRMATION_TTL_SECS`.
    pub fn commit_order(&mut self, bus: &mut NotificationBus, now: DateTime<Utc>) {
        self.lines.clear();
        self.confirmation_until = Some(now + Duration::seconds(ORDER_CONFIRMATION_TTL_SECS));
        bus.push("Commande envoyée avec succès!", Severity::Success, now);
    }

    /// Clear the confirmation flag once its deadline has passed.
    ///
    /// Safe to call at any time; returns whether the flag was reset.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> bool {
        match self.confirmation_until {
            Some(deadline) if now >= deadline => {
                self.confirmation_until = None;
                true
            }
            _ => false,
        }
    }
}
