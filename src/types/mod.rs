//! Core data types for the matching core
//!
//! All prices and quantities are exact `rust_decimal::Decimal` values.
//!
//! ## Types
//!
//! - [`Order`]: A limit order, resting or incoming
//! - [`Side`]: Buy or Sell
//! - [`OrderState`]: Pending, partially filled, filled or canceled
//! - [`Trade`]: An executed match between a maker and a taker
//! - [`ReplayReceipt`]: Summary of one engine (re)load
//! - [`Action`]: A decoded submit / cancel / reload message

mod order;
mod trade;
mod receipt;
pub mod action;

// Re-export all types at module level
pub use order::{Order, OrderState, Side};
pub use trade::Trade;
pub use receipt::ReplayReceipt;
pub use action::{Action, ActionMessage, OrderPayload, ReloadTarget};
