//! External collaborators the registry reads from.
//!
//! - [`MarketSource`]: which markets are enabled, and their fee
//! - [`OrderStore`]: the persisted backlog of open orders per market
//!
//! The matching core never writes to persistence itself; updated order
//! states flow out through an [`OutcomeSink`]. [`MemoryStore`] implements
//! all three so a process (or a test) can run the full
//! submit → persist → reload cycle without a database.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::Error;
use crate::registry::ActionOutcome;
use crate::sink::OutcomeSink;
use crate::types::{Order, OrderPayload};

// ============================================================================
// Markets
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketState {
    #[default]
    Enabled,
    Disabled,
}

/// Market configuration as seen by the matching core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub symbol: String,
    #[serde(default)]
    pub state: MarketState,
    #[serde(default)]
    pub fee: Decimal,
}

impl Market {
    pub fn enabled(symbol: impl Into<String>, fee: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            state: MarketState::Enabled,
            fee,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state == MarketState::Enabled
    }
}

// ============================================================================
// Collaborator traits
// ============================================================================

/// Failure talking to a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Source of market configuration.
pub trait MarketSource: Send + Sync {
    /// Markets with state `enabled`
    fn enabled_markets(&self) -> Result<Vec<Market>, StoreError>;
}

/// Persisted order storage.
pub trait OrderStore: Send + Sync {
    /// Open (pending or partially filled) orders for `market`.
    ///
    /// Callers must not rely on the order of the returned vector; the
    /// registry sorts by id before replaying.
    fn open_orders(&self, market: &str) -> Result<Vec<Order>, StoreError>;
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// In-memory markets and orders.
///
/// As an [`OutcomeSink`] it records every updated order state, so a later
/// reload replays exactly the orders that are still open.
#[derive(Debug, Default)]
pub struct MemoryStore {
    markets: RwLock<Vec<Market>>,
    orders: RwLock<BTreeMap<u64, Order>>,
}

impl MemoryStore {
    pub fn new(markets: Vec<Market>) -> Self {
        Self {
            markets: RwLock::new(markets),
            orders: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load persisted orders from a JSON array of order payloads.
    pub fn load_backlog(&self, path: &Path) -> Result<usize, StoreError> {
        let raw = fs::read(path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {e}", path.display())))?;
        let payloads: Vec<OrderPayload> = serde_json::from_slice(&raw)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;

        let orders = payloads
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, Error>>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let count = orders.len();
        for order in orders {
            self.upsert_order(order);
        }
        Ok(count)
    }

    /// Insert or replace an order record
    pub fn upsert_order(&self, order: Order) {
        self.orders.write().insert(order.id, order);
    }

    pub fn order(&self, id: u64) -> Option<Order> {
        self.orders.read().get(&id).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.orders.read().len()
    }

    pub fn set_market(&self, market: Market) {
        let mut markets = self.markets.write();
        match markets.iter_mut().find(|m| m.symbol == market.symbol) {
            Some(existing) => *existing = market,
            None => markets.push(market),
        }
    }
}

impl MarketSource for MemoryStore {
    fn enabled_markets(&self) -> Result<Vec<Market>, StoreError> {
        Ok(self
            .markets
            .read()
            .iter()
            .filter(|m| m.is_enabled())
            .cloned()
            .collect())
    }
}

impl OrderStore for MemoryStore {
    fn open_orders(&self, market: &str) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .orders
            .read()
            .values()
            .filter(|o| o.market == market && o.state.is_open())
            .cloned()
            .collect())
    }
}

impl OutcomeSink for MemoryStore {
    fn publish(&self, outcome: &ActionOutcome) {
        let mut orders = self.orders.write();
        match outcome {
            // A redelivered copy may carry stale state
            ActionOutcome::Matched(matched) if matched.duplicate => {}
            ActionOutcome::Matched(matched) => {
                for order in matched.makers.iter().chain([&matched.order]) {
                    orders.insert(order.id, order.clone());
                }
            }
            ActionOutcome::Canceled { order: Some(order), .. } => {
                orders.insert(order.id, order.clone());
            }
            ActionOutcome::Canceled { order: None, .. } | ActionOutcome::Reloaded(_) => {}
        }
        debug!(orders = orders.len(), "store updated");
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
