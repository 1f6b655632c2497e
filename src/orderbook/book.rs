//! One side (bids or asks) of a market's order book.
//!
//! ## Price Ordering
//!
//! Levels are held in a `BTreeMap` keyed by price. The side decides which
//! end of the map is "best":
//!
//! - **Bids** (buy orders): best = highest price, visited high-to-low
//! - **Asks** (sell orders): best = lowest price, visited low-to-high
//!
//! Within a level, the lowest order id is first (see [`PriceLevel`]).
//!
//! ## Invariants
//!
//! - A price appears at most once
//! - A level left with zero orders is removed immediately
//!
//! ## Example
//!
//! ```
//! use market_matcher::orderbook::Book;
//! use market_matcher::types::{Order, Side};
//! use rust_decimal::Decimal;
//!
//! let mut bids = Book::new(Side::Buy);
//! bids.upsert(Order::new(1, Side::Buy, "btcusd", Decimal::from(99), Decimal::ONE));
//! bids.upsert(Order::new(2, Side::Buy, "btcusd", Decimal::from(101), Decimal::ONE));
//!
//! assert_eq!(bids.best().map(|l| l.price()), Some(Decimal::from(101)));
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::orderbook::PriceLevel;
use crate::types::{Order, Side};

/// Aggregated view of one price level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepthLevel {
    pub price: Decimal,
    /// Sum of unfilled quantity at this price
    pub quantity: Decimal,
    /// Number of resting orders at this price
    pub orders: usize,
}

/// The set of price levels for one direction of one market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    side: Side,
    levels: BTreeMap<Decimal, PriceLevel>,
    order_count: usize,
}

impl Book {
    /// Create an empty book for `side`
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            order_count: 0,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    // ========================================================================
    // Sizes
    // ========================================================================

    /// Number of price levels
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of resting orders across all levels
    #[inline]
    pub fn order_count(&self) -> usize {
        self.order_count
    }

    /// Unfilled quantity across all levels
    pub fn total_quantity(&self) -> Decimal {
        self.levels
            .values()
            .fold(Decimal::ZERO, |acc, level| acc.saturating_add(level.total()))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Add an order to the level at its price, creating the level if needed.
    ///
    /// # Returns
    ///
    /// `false` if the order was already resting at that price (no-op).
    pub fn upsert(&mut self, order: Order) -> bool {
        debug_assert_eq!(order.side, self.side, "order placed on the wrong side");

        let side = self.side;
        let level = self
            .levels
            .entry(order.price)
            .or_insert_with(|| PriceLevel::new(side, order.price));

        let added = level.add(order);
        if added {
            self.order_count += 1;
        }
        added
    }

    /// Remove an order (located by its id and price).
    ///
    /// The level is dropped if it becomes empty. Removing an order that is
    /// not resting is a no-op and returns `None`.
    pub fn remove(&mut self, order: &Order) -> Option<Order> {
        self.remove_by_id(order.id, order.price)
    }

    /// Remove the order with `order_id` resting at `price`.
    pub fn remove_by_id(&mut self, order_id: u64, price: Decimal) -> Option<Order> {
        let level = self.levels.get_mut(&price)?;
        let removed = level.remove(order_id)?;

        // Remove empty price levels
        if level.is_empty() {
            self.levels.remove(&price);
        }
        self.order_count -= 1;

        Some(removed)
    }

    /// Clear all levels
    pub fn clear(&mut self) {
        self.levels.clear();
        self.order_count = 0;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The best-priority level, or `None` if the book is empty
    pub fn best(&self) -> Option<&PriceLevel> {
        match self.side {
            Side::Buy => self.levels.values().next_back(),
            Side::Sell => self.levels.values().next(),
        }
    }

    pub fn best_mut(&mut self) -> Option<&mut PriceLevel> {
        match self.side {
            Side::Buy => self.levels.values_mut().next_back(),
            Side::Sell => self.levels.values_mut().next(),
        }
    }

    /// Price of the best level
    #[inline]
    pub fn best_price(&self) -> Option<Decimal> {
        self.best().map(PriceLevel::price)
    }

    /// Levels in priority order
    pub fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev()),
            Side::Sell => Box::new(self.levels.values()),
        }
    }

    /// The level at exactly `price`
    pub fn level(&self, price: Decimal) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Look up a resting order by id and price
    pub fn get(&self, order_id: u64, price: Decimal) -> Option<&Order> {
        self.levels.get(&price)?.get(order_id)
    }

    pub fn contains(&self, order_id: u64, price: Decimal) -> bool {
        self.get(order_id, price).is_some()
    }

    /// Aggregated depth, best level first, at most `limit` levels
    pub fn depth(&self, limit: usize) -> Vec<DepthLevel> {
        self.levels()
            .take(limit)
            .map(|level| DepthLevel {
                price: level.price(),
                quantity: level.total(),
                orders: level.size(),
            })
            .collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
