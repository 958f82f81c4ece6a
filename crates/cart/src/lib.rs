//! Reservation cart.
//!
//! Cart lines hold stock reservations: adding a line takes the unit from the
//! ledger immediately, removing it gives the exact amount back. Order
//! placement is split around the upstream suspension point so local state is
//! only mutated once the outcome is known.

pub mod cart;

pub use cart::{Cart, CartLine, OrderItem, OrderTicket, ORDER_CONFIRMATION_TTL_SECS};
