//! Price level management for orders at the same price.
//!
//! ## Design
//!
//! A `PriceLevel` represents all orders resting at a single (side, price).
//! Orders are kept in a `Vec` sorted ascending by order id, so the head of
//! the vector is always the oldest order (time priority).
//!
//! ```text
//! [id 3 (oldest)] [id 8] [id 12] ... [id n (newest)]
//! ```
//!
//! - Inserts use a binary search for the insertion index
//! - Matching consumes orders from the head
//! - Removal finds the index first, then removes it in a separate step
//!
//! None of the operations fail. A duplicate insert or a removal of an
//! absent id is absorbed as a no-op, since both are expected under
//! at-least-once delivery.

use rust_decimal::Decimal;

use crate::types::{Order, Side};

/// A price level containing orders at a single price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLevel {
    side: Side,
    price: Decimal,
    /// Sorted ascending by id, ids unique
    orders: Vec<Order>,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new(side: Side, price: Decimal) -> Self {
        Self {
            side,
            price,
            orders: Vec::new(),
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Orders in time priority (oldest first)
    #[inline]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Add an order, keeping ascending id order.
    ///
    /// # Returns
    ///
    /// `false` if an order with the same id was already present, in which
    /// case the level is left untouched.
    pub fn add(&mut self, order: Order) -> bool {
        match self.position(order.id) {
            Ok(_) => false,
            Err(index) => {
                self.orders.insert(index, order);
                true
            }
        }
    }

    /// Remove the order with `order_id`, if present.
    pub fn remove(&mut self, order_id: u64) -> Option<Order> {
        let index = self.position(order_id).ok()?;
        Some(self.orders.remove(index))
    }

    /// The oldest order (lowest id), or `None` if the level is empty
    #[inline]
    pub fn top(&self) -> Option<&Order> {
        self.orders.first()
    }

    #[inline]
    pub fn top_mut(&mut self) -> Option<&mut Order> {
        self.orders.first_mut()
    }

    /// Look up a resting order by id
    pub fn get(&self, order_id: u64) -> Option<&Order> {
        let index = self.position(order_id).ok()?;
        self.orders.get(index)
    }

    pub fn contains(&self, order_id: u64) -> bool {
        self.position(order_id).is_ok()
    }

    /// Sum of unfilled quantity across all orders.
    ///
    /// Recomputed from the current order state on every call, so it can
    /// never drift from the members after fills. Saturates at `Decimal::MAX`.
    pub fn total(&self) -> Decimal {
        self.orders
            .iter()
            .map(Order::unfilled_quantity)
            .fold(Decimal::ZERO, |acc, qty| acc.saturating_add(qty))
    }

    /// Number of orders at this level
    #[inline]
    pub fn size(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn position(&self, order_id: u64) -> Result<usize, usize> {
        self.orders.binary_search_by_key(&order_id, |o| o.id)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
