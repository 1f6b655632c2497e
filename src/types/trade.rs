//! Trade type representing an executed match between two orders.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::Side;

/// A trade represents a single match between a maker and taker order.
///
/// ## Terminology
///
/// - **Maker**: The resting order that was already in the book
/// - **Taker**: The incoming order that triggered the match
///
/// ## Price Discovery
///
/// The trade always executes at the maker's price (the resting order's price).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trade {
    /// Trade identifier, sequential per engine instance
    pub id: u64,

    /// Market symbol
    pub market: String,

    /// Maker order ID (the resting order)
    pub maker_order_id: u64,

    /// Taker order ID (the incoming order)
    pub taker_order_id: u64,

    /// Side of the taker; the maker is on the opposite side
    pub taker_side: Side,

    /// Execution price, always the maker's price
    pub price: Decimal,

    /// Executed quantity
    pub quantity: Decimal,
}

impl Trade {
    /// Notional value of this trade (price * quantity), `None` on overflow
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.quantity)
    }

    /// Order id on the buy side of the trade
    pub fn buy_order_id(&self) -> u64 {
        match self.taker_side {
            Side::Buy => self.taker_order_id,
            Side::Sell => self.maker_order_id,
        }
    }

    /// Order id on the sell side of the trade
    pub fn sell_order_id(&self) -> u64 {
        match self.taker_side {
            Side::Buy => self.maker_order_id,
            Side::Sell => self.taker_order_id,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_trade(taker_side: Side) -> Trade {
        Trade {
            id: 1,
            market: "btcusd".into(),
            maker_order_id: 100,
            taker_order_id: 200,
            taker_side,
            price: Decimal::new(50_000_5, 1), // 50000.5
            quantity: Decimal::new(2, 1),     // 0.2
        }
    }

    #[test]
    fn test_trade_notional() {
        let trade = create_trade(Side::Buy);
        assert_eq!(trade.notional(), Some(Decimal::new(10_000_1, 1)));
    }

    #[test]
    fn test_trade_notional_overflow() {
        let mut trade = create_trade(Side::Sell);
        trade.price = Decimal::MAX;
        trade.quantity = Decimal::TWO;
        assert_eq!(trade.notional(), None);
    }

    #[test]
    fn test_trade_buy_sell_ids() {
        let trade = create_trade(Side::Buy);
        assert_eq!(trade.buy_order_id(), 200);
        assert_eq!(trade.sell_order_id(), 100);

        let trade = create_trade(Side::Sell);
        assert_eq!(trade.buy_order_id(), 100);
        assert_eq!(trade.sell_order_id(), 200);
    }

    #[test]
    fn test_trade_serializes_decimals_as_strings() {
        let json = serde_json::to_value(create_trade(Side::Sell)).unwrap();
        assert_eq!(json["price"], "50000.5");
        assert_eq!(json["quantity"], "0.2");
        assert_eq!(json["taker_side"], "sell");
    }
}
