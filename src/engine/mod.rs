//! Matching engine module.
//!
//! ## Matching Rules
//!
//! - **Buy orders** match against asks (lowest price first)
//! - **Sell orders** match against bids (highest price first)
//! - Within a price, the lowest order id (oldest) matches first
//! - Trades execute at the resting (maker) order's price
//! - **Partial fills** are supported; the unfilled remainder rests on the book
//!
//! ## Example
//!
//! ```
//! use market_matcher::engine::MatchingEngine;
//! use market_matcher::types::{Order, Side};
//! use rust_decimal::Decimal;
//!
//! let mut engine = MatchingEngine::new("btcusd", Decimal::ZERO);
//! engine.mark_ready();
//!
//! // Resting sell order
//! let sell = Order::new(1, Side::Sell, "btcusd", Decimal::from(50_000), Decimal::ONE);
//! engine.submit(sell).unwrap();
//!
//! // Incoming buy order matches it
//! let buy = Order::new(2, Side::Buy, "btcusd", Decimal::from(50_000), Decimal::ONE);
//! let outcome = engine.submit(buy).unwrap();
//!
//! assert!(outcome.fully_filled());
//! assert_eq!(outcome.trades.len(), 1);
//! ```

pub mod matcher;

pub use matcher::{BookDepth, MatchOutcome, MatchingEngine};
