//! Order types for the matching core.
//!
//! ## Exact Decimals
//!
//! Prices and quantities are `rust_decimal::Decimal` values. Fills are
//! tracked as `filled_quantity`; the unfilled remainder is always derived
//! from it, so the two can never drift apart.
//!
//! ## Time Priority
//!
//! Order ids are assigned upstream and strictly increase with submission
//! time. The id is the only time-priority key: a lower id is an older order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// On the wire: `"buy"` / `"sell"`, with `"bid"` / `"ask"` accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order (bid) - wants to purchase the asset
    #[serde(alias = "bid")]
    Buy,
    /// Sell order (ask) - wants to sell the asset
    #[serde(alias = "ask")]
    Sell,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Wire name of the side
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }

    /// Whether an order on this side at `price` crosses a resting order at `resting`.
    ///
    /// A bid crosses asks priced at or below it; an ask crosses bids priced at
    /// or above it.
    #[inline]
    pub fn crosses(self, price: Decimal, resting: Decimal) -> bool {
        match self {
            Side::Buy => price >= resting,
            Side::Sell => price <= resting,
        }
    }
}

// ============================================================================
// OrderState enum
// ============================================================================

/// Lifecycle state of an order.
///
/// `Pending` and `PartiallyFilled` orders are open and may rest in a book;
/// `Filled` and `Canceled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderState {
    #[default]
    Pending,
    PartiallyFilled,
    Filled,
    Canceled,
}

impl OrderState {
    /// Open orders can still trade
    pub fn is_open(self) -> bool {
        matches!(self, OrderState::Pending | OrderState::PartiallyFilled)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_open()
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A limit order, resting or incoming.
///
/// ## Example
///
/// ```
/// use market_matcher::types::{Order, OrderState, Side};
/// use rust_decimal::Decimal;
///
/// let mut order = Order::new(1, Side::Buy, "btcusd", Decimal::new(50_000, 0), Decimal::from(2));
/// order.fill(Decimal::ONE);
///
/// assert_eq!(order.unfilled_quantity(), Decimal::ONE);
/// assert_eq!(order.state, OrderState::PartiallyFilled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Upstream-assigned identifier, doubles as the time-priority key
    pub id: u64,

    /// Buy or Sell
    pub side: Side,

    /// Market symbol the order trades on
    pub market: String,

    /// Limit price
    pub price: Decimal,

    /// Original quantity
    pub quantity: Decimal,

    /// Quantity matched so far
    pub filled_quantity: Decimal,

    pub state: OrderState,
}

impl Order {
    /// Create a new pending, unfilled limit order
    pub fn new(
        id: u64,
        side: Side,
        market: impl Into<String>,
        price: Decimal,
        quantity: Decimal,
    ) -> Self {
        Self {
            id,
            side,
            market: market.into(),
            price,
            quantity,
            filled_quantity: Decimal::ZERO,
            state: OrderState::Pending,
        }
    }

    /// Remaining quantity not yet matched, never negative
    #[inline]
    pub fn unfilled_quantity(&self) -> Decimal {
        (self.quantity - self.filled_quantity).max(Decimal::ZERO)
    }

    /// Check if the order has no unfilled quantity left
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.unfilled_quantity().is_zero()
    }

    /// Fill a portion of this order
    ///
    /// # Returns
    ///
    /// The actual quantity filled (may be less if the order doesn't have
    /// enough unfilled quantity). The state moves to `PartiallyFilled` or
    /// `Filled` accordingly.
    pub fn fill(&mut self, quantity: Decimal) -> Decimal {
        let actual = quantity.min(self.unfilled_quantity()).max(Decimal::ZERO);
        self.filled_quantity += actual;
        self.refresh_state();
        actual
    }

    /// Mark the order canceled
    pub fn cancel(&mut self) {
        self.state = OrderState::Canceled;
    }

    // Derives the fill-based state; a canceled order stays canceled.
    fn refresh_state(&mut self) {
        if self.state == OrderState::Canceled {
            return;
        }
        self.state = if self.is_filled() {
            OrderState::Filled
        } else if self.filled_quantity.is_zero() {
            OrderState::Pending
        } else {
            OrderState::PartiallyFilled
        };
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_order(quantity: i64) -> Order {
        Order::new(1, Side::Buy, "btcusd", Decimal::from(100), Decimal::from(quantity))
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_side_crosses() {
        let hundred = Decimal::from(100);
        let ninety_nine = Decimal::from(99);

        assert!(Side::Buy.crosses(hundred, hundred));
        assert!(Side::Buy.crosses(hundred, ninety_nine));
        assert!(!Side::Buy.crosses(ninety_nine, hundred));

        assert!(Side::Sell.crosses(hundred, hundred));
        assert!(Side::Sell.crosses(ninety_nine, hundred));
        assert!(!Side::Sell.crosses(hundred, ninety_nine));
    }

    #[test]
    fn test_side_wire_names() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"buy\"");
        let ask: Side = serde_json::from_str("\"ask\"").unwrap();
        assert_eq!(ask, Side::Sell);
        assert!(serde_json::from_str::<Side>("\"hold\"").is_err());
    }

    #[test]
    fn test_state_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderState::PartiallyFilled).unwrap(),
            "\"partially-filled\""
        );
        assert!(OrderState::Pending.is_open());
        assert!(OrderState::PartiallyFilled.is_open());
        assert!(OrderState::Filled.is_terminal());
        assert!(OrderState::Canceled.is_terminal());
    }

    #[test]
    fn test_order_new() {
        let order = create_order(5);

        assert_eq!(order.id, 1);
        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.market, "btcusd");
        assert_eq!(order.filled_quantity, Decimal::ZERO);
        assert_eq!(order.unfilled_quantity(), Decimal::from(5));
        assert_eq!(order.state, OrderState::Pending);
        assert!(!order.is_filled());
    }

    #[test]
    fn test_order_fill() {
        let mut order = create_order(5);

        // Partial fill
        let filled = order.fill(Decimal::from(3));
        assert_eq!(filled, Decimal::from(3));
        assert_eq!(order.unfilled_quantity(), Decimal::from(2));
        assert_eq!(order.state, OrderState::PartiallyFilled);

        // Fill the rest
        let filled = order.fill(Decimal::from(2));
        assert_eq!(filled, Decimal::from(2));
        assert!(order.is_filled());
        assert_eq!(order.state, OrderState::Filled);
    }

    #[test]
    fn test_order_overfill() {
        let mut order = create_order(5);

        let filled = order.fill(Decimal::from(8));
        assert_eq!(filled, Decimal::from(5)); // Only fills what's available
        assert_eq!(order.unfilled_quantity(), Decimal::ZERO);
        assert_eq!(order.filled_quantity, Decimal::from(5));
    }

    #[test]
    fn test_order_fractional_fill_is_exact() {
        let mut order = Order::new(
            1,
            Side::Sell,
            "ethusd",
            Decimal::new(30_001, 1),
            Decimal::new(3, 1), // 0.3
        );

        order.fill(Decimal::new(1, 1));
        order.fill(Decimal::new(2, 1));

        assert!(order.is_filled());
        assert_eq!(order.unfilled_quantity(), Decimal::ZERO);
    }

    #[test]
    fn test_order_cancel_is_sticky() {
        let mut order = create_order(5);
        order.cancel();
        order.fill(Decimal::ONE);
        assert_eq!(order.state, OrderState::Canceled);
    }
}
