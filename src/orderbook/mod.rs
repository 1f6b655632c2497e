//! Order book for one market.
//!
//! ## Components
//!
//! - [`PriceLevel`]: All orders resting at one (side, price), oldest first
//! - [`Book`]: All price levels for one side, best price first
//!
//! A market's engine owns one `Book` per side.
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Upsert order | O(log L + n) |
//! | Remove order by id and price | O(log L + n) |
//! | Best level | O(log L) |
//!
//! L = number of levels, n = orders at the touched level.

pub mod level;
pub mod book;

pub use level::PriceLevel;
pub use book::{Book, DepthLevel};
