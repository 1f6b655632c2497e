//! Market → engine registry.
//!
//! ## Ownership
//!
//! The registry is the single owner of the market map, kept behind a
//! `parking_lot::RwLock`. Each engine sits behind its own `Mutex`, so
//! markets never contend with each other; only a lookup touches the shared
//! map, and only for as long as it takes to clone the engine handle.
//!
//! ## Reload
//!
//! A reload never touches the live engine. It builds a fresh Cold engine,
//! replays the backlog into it (ascending id), marks it Ready and only then
//! swaps the handle in under the write lock. Callers therefore see either
//! the previous Ready engine or the new one, never a partial replay. A
//! market's very first load installs a Cold placeholder beforehand, so
//! early callers get `EngineNotReady` rather than `UnknownMarket`.
//!
//! If the backlog cannot be fetched the previous engine stays in place.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::engine::{MatchOutcome, MatchingEngine};
use crate::error::{Error, Result};
use crate::store::{Market, MarketSource, OrderStore};
use crate::types::{Action, Order, ReloadTarget, ReplayReceipt};

/// Shared handle to one market's engine
pub type EngineHandle = Arc<Mutex<MatchingEngine>>;

/// What applying one action produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ActionOutcome {
    Matched(MatchOutcome),
    Canceled {
        market: String,
        order_id: u64,
        /// The removed order, `None` if it was not resting
        order: Option<Order>,
    },
    Reloaded(Vec<ReplayReceipt>),
}

/// Registry of matching engines keyed by market symbol.
pub struct EngineRegistry {
    engines: RwLock<HashMap<String, EngineHandle>>,
    markets: Arc<dyn MarketSource>,
    store: Arc<dyn OrderStore>,
}

impl EngineRegistry {
    /// Create an empty registry; no engine exists until a reload.
    pub fn new(markets: Arc<dyn MarketSource>, store: Arc<dyn OrderStore>) -> Self {
        Self {
            engines: RwLock::new(HashMap::new()),
            markets,
            store,
        }
    }

    /// Create a registry and load every enabled market.
    pub fn bootstrap(markets: Arc<dyn MarketSource>, store: Arc<dyn OrderStore>) -> Result<Self> {
        let registry = Self::new(markets, store);
        registry.reload(&ReloadTarget::All)?;
        Ok(registry)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Handle to the live engine for `market`
    pub fn engine(&self, market: &str) -> Option<EngineHandle> {
        self.engines.read().get(market).cloned()
    }

    pub fn contains(&self, market: &str) -> bool {
        self.engines.read().contains_key(market)
    }

    /// Registered market symbols, sorted
    pub fn markets(&self) -> Vec<String> {
        let mut markets: Vec<String> = self.engines.read().keys().cloned().collect();
        markets.sort();
        markets
    }

    /// Run `f` against the live engine for `market`.
    pub fn with_engine<R>(&self, market: &str, f: impl FnOnce(&MatchingEngine) -> R) -> Result<R> {
        let handle = self
            .engine(market)
            .ok_or_else(|| Error::UnknownMarket(market.to_string()))?;
        let engine = handle.lock();
        Ok(f(&engine))
    }

    /// Enabled markets according to the market source
    pub fn enabled_markets(&self) -> Result<Vec<Market>> {
        self.markets.enabled_markets().map_err(|e| Error::Backlog {
            market: crate::types::action::RELOAD_ALL.to_string(),
            reason: e.to_string(),
        })
    }

    // ========================================================================
    // Order flow
    // ========================================================================

    /// Route a submit to the order's market.
    pub fn submit_order(&self, order: Order) -> Result<MatchOutcome> {
        let handle = self
            .engine(&order.market)
            .ok_or_else(|| Error::UnknownMarket(order.market.clone()))?;
        let mut engine = handle.lock();
        engine.submit(order)
    }

    /// Route a cancel to the order's market.
    pub fn cancel_order(&self, order: &Order) -> Result<Option<Order>> {
        let handle = self
            .engine(&order.market)
            .ok_or_else(|| Error::UnknownMarket(order.market.clone()))?;
        let mut engine = handle.lock();
        engine.cancel(order)
    }

    /// Decode a transport payload and apply it.
    pub fn process(&self, payload: &[u8]) -> Result<ActionOutcome> {
        let action = Action::decode(payload)?;
        self.execute(action)
    }

    /// Apply a decoded action.
    pub fn execute(&self, action: Action) -> Result<ActionOutcome> {
        match action {
            Action::Submit(order) => self.submit_order(order).map(ActionOutcome::Matched),
            Action::Cancel(order) => {
                let canceled = self.cancel_order(&order)?;
                Ok(ActionOutcome::Canceled {
                    market: order.market,
                    order_id: order.id,
                    order: canceled,
                })
            }
            Action::Reload(target) => self.reload(&target).map(ActionOutcome::Reloaded),
        }
    }

    // ========================================================================
    // Reload
    // ========================================================================

    /// Rebuild the targeted engines from the persisted backlog.
    ///
    /// A single-market reload propagates its failure. A reload of all
    /// markets attempts each one; failures are logged and left out of the
    /// returned receipts, and the affected markets keep their old engine.
    /// It also drops the engines of markets that are no longer enabled.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownMarket`] - the market is not enabled
    /// * [`Error::Backlog`] - market list or backlog could not be fetched
    pub fn reload(&self, target: &ReloadTarget) -> Result<Vec<ReplayReceipt>> {
        let enabled = self.enabled_markets()?;

        match target {
            ReloadTarget::Market(symbol) => {
                let market = enabled
                    .iter()
                    .find(|m| &m.symbol == symbol)
                    .ok_or_else(|| Error::UnknownMarket(symbol.clone()))?;
                Ok(vec![self.reload_market(market)?])
            }
            ReloadTarget::All => {
                let mut receipts = Vec::with_capacity(enabled.len());
                for market in &enabled {
                    match self.reload_market(market) {
                        Ok(receipt) => receipts.push(receipt),
                        Err(e) => error!(market = %market.symbol, error = %e, "engine reload failed"),
                    }
                }
                self.retire_disabled(&enabled);
                info!(markets = receipts.len(), "all engines reloaded");
                Ok(receipts)
            }
        }
    }

    /// Drop the engines of registered markets missing from `enabled`.
    ///
    /// Returns the removed symbols, sorted.
    pub fn retire_disabled(&self, enabled: &[Market]) -> Vec<String> {
        let mut engines = self.engines.write();
        let mut retired: Vec<String> = engines
            .keys()
            .filter(|symbol| !enabled.iter().any(|m| &m.symbol == *symbol))
            .cloned()
            .collect();
        retired.sort();

        for symbol in &retired {
            engines.remove(symbol);
            info!(market = %symbol, "engine retired, market no longer enabled");
        }
        retired
    }

    /// Rebuild one market's engine and install it.
    pub fn reload_market(&self, market: &Market) -> Result<ReplayReceipt> {
        let symbol = market.symbol.as_str();

        self.engines
            .write()
            .entry(symbol.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(MatchingEngine::new(symbol, market.fee))));

        let mut backlog = self.store.open_orders(symbol).map_err(|e| Error::Backlog {
            market: symbol.to_string(),
            reason: e.to_string(),
        })?;
        backlog.sort_by_key(|order| order.id);

        let mut engine = MatchingEngine::new(symbol, market.fee);
        let mut replayed = 0u64;
        let mut skipped = 0u64;
        let mut trades = 0u64;

        for order in backlog {
            let order_id = order.id;
            match engine.replay(order) {
                Ok(outcome) => {
                    replayed += 1;
                    trades += outcome.trades.len() as u64;
                }
                Err(e) => {
                    skipped += 1;
                    warn!(market = symbol, order_id, error = %e, "backlog order skipped");
                }
            }
        }
        if trades > 0 {
            warn!(market = symbol, trades, "backlog contained crossing orders");
        }

        engine.mark_ready();
        let receipt = ReplayReceipt {
            market: symbol.to_string(),
            orders_replayed: replayed,
            orders_skipped: skipped,
            trades_during_replay: trades,
            resting_orders: engine.order_count() as u64,
            state_root: engine.state_root(),
        };

        self.engines
            .write()
            .insert(symbol.to_string(), Arc::new(Mutex::new(engine)));

        info!(
            market = symbol,
            orders = replayed,
            resting = receipt.resting_orders,
            state_root = %receipt.state_root_hex(),
            "engine reloaded"
        );
        Ok(receipt)
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("markets", &self.markets())
            .finish()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
