//! # Market Matcher
//!
//! Per-market matching core of an exchange: live order books, strict
//! price-time priority matching, replay of persisted orders on (re)load, and
//! per-market serial dispatch of external actions.
//!
//! ## Architecture
//!
//! - **Types**: Order, Trade, ReplayReceipt and the decoded wire actions
//! - **OrderBook**: price levels and one-sided books
//! - **Engine**: one matching engine per market, with a readiness gate
//! - **Registry**: market → engine map, reload orchestration
//! - **Dispatcher**: one sequential worker per market
//!
//! ## Design Principles
//!
//! 1. **Determinism**: replaying the same backlog yields the same book and state root
//! 2. **No Floating Point**: prices and quantities are exact decimals
//! 3. **Isolation**: markets never share a lock on the hot path
//! 4. **Synchronous Execution**: plain threads and channels, no async runtime

// ============================================================================
// Module declarations
// ============================================================================

/// Error enum and result alias
pub mod error;

/// Core data types: Order, Trade, ReplayReceipt, Action
pub mod types;

/// Order book: price levels and sides
pub mod orderbook;

/// Matching engine: price-time priority matching for one market
pub mod engine;

/// Market and order collaborators, in-memory store
pub mod store;

/// Outcome sinks
pub mod sink;

/// Market → engine registry and reload
pub mod registry;

/// Per-market workers
pub mod dispatcher;

/// Layered configuration
pub mod config;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use dispatcher::{Dispatcher, Ticket};
pub use engine::{BookDepth, MatchOutcome, MatchingEngine};
pub use error::{Error, Result};
pub use orderbook::{Book, DepthLevel, PriceLevel};
pub use registry::{ActionOutcome, EngineRegistry};
pub use sink::{CollectingSink, JsonLinesSink, NullSink, OutcomeSink};
pub use store::{Market, MarketSource, MarketState, MemoryStore, OrderStore, StoreError};
pub use types::{Action, Order, OrderState, ReloadTarget, ReplayReceipt, Side, Trade};
