//! Per-market matching engine.
//!
//! ## Lifecycle
//!
//! ```text
//! Cold (initialized = false) --replay()*--> mark_ready() --> Ready
//! ```
//!
//! A reload never mutates a live engine: the registry builds a fresh Cold
//! instance, replays the backlog into it and swaps it in once it is Ready.
//! While Cold, `submit` and `cancel` fail with [`Error::EngineNotReady`] and
//! leave the books untouched.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::orderbook::{Book, DepthLevel};
use crate::types::{Order, ReplayReceipt, Side, Trade};

/// Result of submitting one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    /// Final state of the incoming (taker) order
    pub order: Order,

    /// Trades generated, in execution order
    pub trades: Vec<Trade>,

    /// Updated state of every resting order that traded
    pub makers: Vec<Order>,

    /// The id had already been processed; nothing changed
    pub duplicate: bool,
}

impl MatchOutcome {
    fn duplicate(order: Order) -> Self {
        Self {
            order,
            trades: Vec::new(),
            makers: Vec::new(),
            duplicate: true,
        }
    }

    /// Whether the incoming order was completely filled
    pub fn fully_filled(&self) -> bool {
        self.order.is_filled()
    }

    /// Quantity matched across all trades
    pub fn filled_quantity(&self) -> Decimal {
        self.trades
            .iter()
            .fold(Decimal::ZERO, |acc, trade| acc + trade.quantity)
    }
}

/// Aggregated view of both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDepth {
    pub market: String,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

/// Matching engine for a single market.
///
/// Single writer: every mutating call takes `&mut self`. Callers that share
/// an engine across threads wrap it in a lock (see `EngineRegistry`).
#[derive(Debug)]
pub struct MatchingEngine {
    market: String,

    /// Carried for downstream settlement, never applied here
    fee: Decimal,

    bids: Book,
    asks: Book,

    /// Resting order id -> (side, price), for idempotent submits and cancels
    index: HashMap<u64, (Side, Decimal)>,

    /// Readiness gate
    initialized: bool,

    /// Highest order id accepted so far
    last_order_id: Option<u64>,

    next_trade_id: u64,
}

impl MatchingEngine {
    /// Create a Cold engine with empty books
    pub fn new(market: impl Into<String>, fee: Decimal) -> Self {
        Self {
            market: market.into(),
            fee,
            bids: Book::new(Side::Buy),
            asks: Book::new(Side::Sell),
            index: HashMap::new(),
            initialized: false,
            last_order_id: None,
            next_trade_id: 1,
        }
    }

    #[inline]
    pub fn market(&self) -> &str {
        &self.market
    }

    #[inline]
    pub fn fee(&self) -> Decimal {
        self.fee
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Open the readiness gate once replay is complete
    pub fn mark_ready(&mut self) {
        self.initialized = true;
    }

    // ========================================================================
    // Order flow
    // ========================================================================

    /// Submit an order and match it against the opposite side.
    ///
    /// The incoming order is the taker; each cross executes at the resting
    /// maker's price. Any remainder rests on the order's own side.
    ///
    /// # Errors
    ///
    /// * [`Error::EngineNotReady`] - the engine is still Cold
    /// * [`Error::InvalidOrder`] - the order failed validation; nothing changed
    ///
    /// A redelivered id is a no-op with `duplicate` set. Ids increase per
    /// market, so an id at or below the highest one seen that is no longer
    /// resting was already filled or canceled.
    pub fn submit(&mut self, order: Order) -> Result<MatchOutcome> {
        if !self.initialized {
            return Err(Error::EngineNotReady(self.market.clone()));
        }
        self.validate(&order)?;

        let seen = self.last_order_id.is_some_and(|last| order.id <= last);
        if seen && !self.index.contains_key(&order.id) {
            debug!(market = %self.market, order_id = order.id, "redelivered submit ignored");
            return Ok(MatchOutcome::duplicate(order));
        }
        Ok(self.execute(order))
    }

    /// Submit a backlog order while the engine is being rebuilt.
    ///
    /// Same validation and matching as [`submit`](Self::submit), without the
    /// readiness gate. Backlog order is not enforced, but every replayed id
    /// raises the redelivery mark.
    pub fn replay(&mut self, order: Order) -> Result<MatchOutcome> {
        self.validate(&order)?;
        Ok(self.execute(order))
    }

    /// Cancel a resting order.
    ///
    /// # Returns
    ///
    /// The removed order marked canceled, or `None` if it was not resting.
    /// A cancel of an absent order is a no-op, not an error.
    pub fn cancel(&mut self, order: &Order) -> Result<Option<Order>> {
        if !self.initialized {
            return Err(Error::EngineNotReady(self.market.clone()));
        }
        if order.market != self.market {
            return Err(Error::InvalidOrder(format!(
                "order {} is for market {}, not {}",
                order.id, order.market, self.market
            )));
        }

        let Some((side, price)) = self.index.get(&order.id).copied() else {
            debug!(market = %self.market, order_id = order.id, "cancel of order not in book");
            return Ok(None);
        };

        let removed = self.book_mut(side).remove_by_id(order.id, price);
        self.index.remove(&order.id);

        Ok(removed.map(|mut canceled| {
            canceled.cancel();
            debug!(market = %self.market, order_id = canceled.id, "order canceled");
            canceled
        }))
    }

    fn validate(&self, order: &Order) -> Result<()> {
        let reject =
            |reason: String| Err(Error::InvalidOrder(format!("order {}: {}", order.id, reason)));

        if order.market != self.market {
            return reject(format!("market {} routed to engine {}", order.market, self.market));
        }
        if order.price <= Decimal::ZERO {
            return reject(format!("non-positive price {}", order.price));
        }
        if order.quantity <= Decimal::ZERO {
            return reject(format!("non-positive quantity {}", order.quantity));
        }
        if order.filled_quantity < Decimal::ZERO || order.filled_quantity > order.quantity {
            return reject(format!("filled quantity {} out of range", order.filled_quantity));
        }
        if order.unfilled_quantity() <= Decimal::ZERO {
            return reject("nothing left to fill".into());
        }
        if order.state.is_terminal() {
            return reject(format!("terminal state {:?}", order.state));
        }
        Ok(())
    }

    fn execute(&mut self, mut taker: Order) -> MatchOutcome {
        // At-least-once delivery: a resting id is not matched twice
        if let Some(&(side, price)) = self.index.get(&taker.id) {
            debug!(market = %self.market, order_id = taker.id, "duplicate submit ignored");
            let resting = self.book(side).get(taker.id, price).cloned().unwrap_or(taker);
            return MatchOutcome::duplicate(resting);
        }
        self.last_order_id = Some(self.last_order_id.map_or(taker.id, |last| last.max(taker.id)));

        let mut trades = Vec::new();
        let mut makers = Vec::new();

        while !taker.is_filled() {
            let book = match taker.side {
                Side::Buy => &mut self.asks,
                Side::Sell => &mut self.bids,
            };
            let Some(level) = book.best_mut() else {
                break;
            };
            let price = level.price();
            if !taker.side.crosses(taker.price, price) {
                break;
            }
            let Some(maker) = level.top_mut() else {
                break;
            };

            let quantity = taker.unfilled_quantity().min(maker.unfilled_quantity());
            maker.fill(quantity);
            taker.fill(quantity);

            let maker_state = maker.clone();
            if maker_state.is_filled() {
                book.remove_by_id(maker_state.id, price);
                self.index.remove(&maker_state.id);
            }
            if quantity.is_zero() {
                continue;
            }

            let trade = Trade {
                id: self.next_trade_id(),
                market: self.market.clone(),
                maker_order_id: maker_state.id,
                taker_order_id: taker.id,
                taker_side: taker.side,
                price,
                quantity,
            };
            trace!(
                market = %self.market,
                trade_id = trade.id,
                maker = trade.maker_order_id,
                taker = trade.taker_order_id,
                price = %trade.price,
                quantity = %trade.quantity,
                "trade"
            );
            trades.push(trade);
            makers.push(maker_state);
        }

        if !taker.is_filled() {
            self.index.insert(taker.id, (taker.side, taker.price));
            self.book_mut(taker.side).upsert(taker.clone());
        }

        debug!(
            market = %self.market,
            order_id = taker.id,
            side = taker.side.as_str(),
            trades = trades.len(),
            state = ?taker.state,
            "order matched"
        );

        MatchOutcome {
            order: taker,
            trades,
            makers,
            duplicate: false,
        }
    }

    #[inline]
    fn next_trade_id(&mut self) -> u64 {
        let id = self.next_trade_id;
        self.next_trade_id += 1;
        id
    }

    // ========================================================================
    // Book access
    // ========================================================================

    #[inline]
    pub fn bids(&self) -> &Book {
        &self.bids
    }

    #[inline]
    pub fn asks(&self) -> &Book {
        &self.asks
    }

    /// Book for `side`
    pub fn book(&self, side: Side) -> &Book {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn book_mut(&mut self, side: Side) -> &mut Book {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Look up a resting order by id
    pub fn get_order(&self, order_id: u64) -> Option<&Order> {
        let (side, price) = self.index.get(&order_id)?;
        self.book(*side).get(order_id, *price)
    }

    /// Number of resting orders on both sides
    pub fn order_count(&self) -> usize {
        self.bids.order_count() + self.asks.order_count()
    }

    /// Highest bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    /// Lowest ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    /// Get the spread (best_ask - best_bid), or `None` if either side is empty
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    /// Aggregated depth, at most `limit` levels per side
    pub fn depth(&self, limit: usize) -> BookDepth {
        BookDepth {
            market: self.market.clone(),
            bids: self.bids.depth(limit),
            asks: self.asks.depth(limit),
        }
    }

    // ========================================================================
    // State root
    // ========================================================================

    /// SHA-256 over a canonical encoding of both books.
    ///
    /// Covers every level in priority order and every order in time order
    /// (id, quantities, state). Decimals are normalized first, so `50` and
    /// `50.00` encode identically.
    pub fn state_root(&self) -> [u8; 32] {
        let mut data = Vec::with_capacity(64 + self.order_count() * 56);
        data.extend_from_slice(self.market.as_bytes());

        for book in [&self.bids, &self.asks] {
            data.push(b'|');
            for level in book.levels() {
                data.extend_from_slice(&level.price().normalize().serialize());
                data.extend_from_slice(&(level.size() as u64).to_le_bytes());
                for order in level.orders() {
                    data.extend_from_slice(&order.id.to_le_bytes());
                    data.extend_from_slice(&order.quantity.normalize().serialize());
                    data.extend_from_slice(&order.filled_quantity.normalize().serialize());
                    data.push(order.state as u8);
                }
            }
        }

        ReplayReceipt::compute_hash(&data)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderState;

    const MARKET: &str = "btcusd";

    fn ready_engine() -> MatchingEngine {
        let mut engine = MatchingEngine::new(MARKET, Decimal::ZERO);
        engine.mark_ready();
        engine
    }

    fn buy(id: u64, price: i64, quantity: i64) -> Order {
        Order::new(id, Side::Buy, MARKET, Decimal::from(price), Decimal::from(quantity))
    }

    fn sell(id: u64, price: i64, quantity: i64) -> Order {
        Order::new(id, Side::Sell, MARKET, Decimal::from(price), Decimal::from(quantity))
    }

    #[test]
    fn test_engine_new_is_cold() {
        let engine = MatchingEngine::new(MARKET, Decimal::new(1, 3));

        assert!(!engine.is_initialized());
        assert_eq!(engine.market(), MARKET);
        assert_eq!(engine.fee(), Decimal::new(1, 3));
        assert_eq!(engine.order_count(), 0);
        assert!(engine.bids().is_empty());
        assert!(engine.asks().is_empty());
    }

    #[test]
    fn test_cold_engine_rejects_and_does_not_mutate() {
        let mut engine = MatchingEngine::new(MARKET, Decimal::ZERO);
        engine.replay(buy(1, 100, 5)).unwrap();
        let root = engine.state_root();

        let submit = engine.submit(sell(2, 100, 5));
        let cancel = engine.cancel(&buy(1, 100, 5));

        assert_eq!(submit, Err(Error::EngineNotReady(MARKET.into())));
        assert_eq!(cancel, Err(Error::EngineNotReady(MARKET.into())));
        assert_eq!(engine.state_root(), root);
        assert_eq!(engine.order_count(), 1);
    }

    #[test]
    fn test_no_cross_no_trade() {
        let mut engine = ready_engine();

        let bid = engine.submit(buy(1, 99, 1)).unwrap();
        let ask = engine.submit(sell(2, 100, 1)).unwrap();

        assert!(bid.trades.is_empty());
        assert!(ask.trades.is_empty());
        assert_eq!(engine.best_bid(), Some(Decimal::from(99)));
        assert_eq!(engine.best_ask(), Some(Decimal::from(100)));
        assert_eq!(engine.spread(), Some(Decimal::ONE));
        assert_eq!(ask.order.state, OrderState::Pending);
    }

    #[test]
    fn test_partial_fill() {
        let mut engine = ready_engine();
        engine.submit(buy(1, 100, 5)).unwrap();

        let outcome = engine.submit(sell(2, 100, 3)).unwrap();

        assert_eq!(outcome.trades.len(), 1);
        let trade = &outcome.trades[0];
        assert_eq!(trade.maker_order_id, 1);
        assert_eq!(trade.taker_order_id, 2);
        assert_eq!(trade.price, Decimal::from(100));
        assert_eq!(trade.quantity, Decimal::from(3));

        // Taker fully filled and absent from the book
        assert!(outcome.fully_filled());
        assert_eq!(outcome.order.state, OrderState::Filled);
        assert!(engine.get_order(2).is_none());
        assert!(engine.asks().is_empty());

        // Maker keeps resting with 2 left
        let resting = engine.get_order(1).unwrap();
        assert_eq!(resting.unfilled_quantity(), Decimal::from(2));
        assert_eq!(resting.state, OrderState::PartiallyFilled);
        assert_eq!(outcome.makers, vec![resting.clone()]);
        assert_eq!(engine.bids().best().unwrap().total(), Decimal::from(2));
    }

    #[test]
    fn test_price_time_priority() {
        let mut engine = ready_engine();
        engine.submit(sell(5, 100, 1)).unwrap();
        engine.submit(sell(7, 100, 1)).unwrap();

        let outcome = engine.submit(buy(9, 100, 1)).unwrap();

        assert_eq!(outcome.trades.len(), 1);
        assert_eq!(outcome.trades[0].maker_order_id, 5);
        assert!(engine.get_order(7).is_some());
    }

    #[test]
    fn test_lower_id_wins_even_if_added_later() {
        let mut engine = MatchingEngine::new(MARKET, Decimal::ZERO);
        engine.replay(sell(7, 100, 1)).unwrap();
        engine.replay(sell(5, 100, 1)).unwrap();
        engine.mark_ready();

        let outcome = engine.submit(buy(9, 100, 1)).unwrap();
        assert_eq!(outcome.trades[0].maker_order_id, 5);
    }

    #[test]
    fn test_best_price_first_and_maker_price_wins() {
        let mut engine = ready_engine();
        engine.submit(sell(1, 102, 1)).unwrap();
        engine.submit(sell(2, 101, 1)).unwrap();

        // Aggressive bid at 105 pays the resting prices
        let outcome = engine.submit(buy(3, 105, 2)).unwrap();

        let prices: Vec<Decimal> = outcome.trades.iter().map(|t| t.price).collect();
        assert_eq!(prices, vec![Decimal::from(101), Decimal::from(102)]);
        assert_eq!(outcome.trades[0].maker_order_id, 2);
        assert!(engine.asks().is_empty());
        assert!(engine.bids().is_empty());
    }

    #[test]
    fn test_sweep_levels_then_rest_remainder() {
        let mut engine = ready_engine();
        engine.submit(buy(1, 100, 2)).unwrap();
        engine.submit(buy(2, 99, 2)).unwrap();
        engine.submit(buy(3, 98, 2)).unwrap();

        let outcome = engine.submit(sell(4, 99, 6)).unwrap();

        assert_eq!(outcome.trades.len(), 2);
        assert_eq!(outcome.filled_quantity(), Decimal::from(4));
        assert_eq!(outcome.order.state, OrderState::PartiallyFilled);
        assert_eq!(outcome.order.unfilled_quantity(), Decimal::from(2));

        // Remainder rests at its own limit, bid at 98 untouched
        assert_eq!(engine.best_ask(), Some(Decimal::from(99)));
        assert_eq!(engine.best_bid(), Some(Decimal::from(98)));
        assert_eq!(
            outcome.makers.iter().map(|o| o.state).collect::<Vec<_>>(),
            vec![OrderState::Filled, OrderState::Filled]
        );
    }

    #[test]
    fn test_trade_ids_are_sequential() {
        let mut engine = ready_engine();
        engine.submit(sell(1, 100, 1)).unwrap();
        engine.submit(sell(2, 100, 1)).unwrap();
        engine.submit(sell(3, 100, 1)).unwrap();

        let first = engine.submit(buy(4, 100, 2)).unwrap();
        let second = engine.submit(buy(5, 100, 1)).unwrap();

        let ids: Vec<u64> = first.trades.iter().chain(&second.trades).map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_submit_is_noop() {
        let mut engine = ready_engine();
        engine.submit(buy(1, 100, 5)).unwrap();
        let root = engine.state_root();

        let outcome = engine.submit(buy(1, 100, 5)).unwrap();

        assert!(outcome.trades.is_empty());
        assert!(outcome.duplicate);
        assert_eq!(engine.order_count(), 1);
        assert_eq!(engine.state_root(), root);
    }

    #[test]
    fn test_redelivered_filled_taker_does_not_trade_again() {
        let mut engine = ready_engine();
        engine.submit(sell(1, 100, 10)).unwrap();

        let first = engine.submit(buy(2, 100, 3)).unwrap();
        let second = engine.submit(buy(2, 100, 3)).unwrap();
        let third = engine.submit(buy(2, 100, 3)).unwrap();

        assert_eq!(first.trades.len(), 1);
        assert!(!first.duplicate);
        assert!(second.trades.is_empty() && second.duplicate);
        assert!(third.trades.is_empty() && third.duplicate);
        assert_eq!(engine.get_order(1).map(Order::unfilled_quantity), Some(Decimal::from(7)));
    }

    #[test]
    fn test_redelivered_consumed_maker_is_not_relisted() {
        let mut engine = ready_engine();
        engine.submit(sell(1, 100, 2)).unwrap();
        engine.submit(buy(2, 100, 2)).unwrap();

        let outcome = engine.submit(sell(1, 100, 2)).unwrap();

        assert!(outcome.duplicate);
        assert!(engine.asks().is_empty());
        assert_eq!(engine.order_count(), 0);
    }

    #[test]
    fn test_replay_raises_redelivery_mark() {
        let mut engine = MatchingEngine::new(MARKET, Decimal::ZERO);
        engine.replay(sell(4, 100, 1)).unwrap();
        engine.mark_ready();

        // Id 3 precedes the backlog and is not resting: already processed
        let outcome = engine.submit(buy(3, 100, 1)).unwrap();
        assert!(outcome.duplicate);
        assert_eq!(engine.order_count(), 1);

        let outcome = engine.submit(buy(5, 100, 1)).unwrap();
        assert_eq!(outcome.trades.len(), 1);
    }

    #[test]
    fn test_cancel_resting_order() {
        let mut engine = ready_engine();
        engine.submit(buy(1, 100, 5)).unwrap();
        engine.submit(buy(2, 100, 5)).unwrap();

        let canceled = engine.cancel(&buy(1, 100, 5)).unwrap();

        let canceled = canceled.expect("order 1 was resting");
        assert_eq!(canceled.id, 1);
        assert_eq!(canceled.state, OrderState::Canceled);
        assert_eq!(engine.order_count(), 1);
        assert_eq!(engine.bids().best().unwrap().top().map(|o| o.id), Some(2));
    }

    #[test]
    fn test_cancel_absent_is_noop() {
        let mut engine = ready_engine();
        engine.submit(buy(1, 100, 5)).unwrap();
        let root = engine.state_root();

        let result = engine.cancel(&sell(42, 100, 1));

        assert_eq!(result, Ok(None));
        assert_eq!(engine.state_root(), root);
    }

    #[test]
    fn test_cancel_then_no_match() {
        let mut engine = ready_engine();
        let bid = buy(1, 100, 5);
        engine.submit(bid.clone()).unwrap();
        engine.cancel(&bid).unwrap();

        let outcome = engine.submit(sell(2, 100, 5)).unwrap();

        assert!(outcome.trades.is_empty());
        assert!(engine.bids().is_empty());
    }

    #[test]
    fn test_invalid_orders_rejected_without_mutation() {
        let mut engine = ready_engine();
        engine.submit(sell(1, 100, 5)).unwrap();
        let root = engine.state_root();

        let zero_quantity = buy(2, 100, 0);
        let zero_price = buy(3, 0, 1);
        let other_market = Order::new(4, Side::Buy, "ethusd", Decimal::from(100), Decimal::ONE);
        let mut filled = buy(5, 100, 1);
        filled.fill(Decimal::ONE);
        let mut canceled = buy(6, 100, 1);
        canceled.cancel();

        for order in [zero_quantity, zero_price, other_market, filled, canceled] {
            let id = order.id;
            let result = engine.submit(order);
            assert!(matches!(result, Err(Error::InvalidOrder(_))), "order {id}: {result:?}");
        }
        assert_eq!(engine.state_root(), root);
    }

    #[test]
    fn test_partially_filled_backlog_order_keeps_progress() {
        let mut engine = MatchingEngine::new(MARKET, Decimal::ZERO);
        let mut resting = sell(1, 100, 5);
        resting.fill(Decimal::from(2));
        engine.replay(resting).unwrap();
        engine.mark_ready();

        assert_eq!(engine.asks().best().unwrap().total(), Decimal::from(3));

        let outcome = engine.submit(buy(2, 100, 5)).unwrap();
        assert_eq!(outcome.filled_quantity(), Decimal::from(3));
        assert_eq!(outcome.makers[0].state, OrderState::Filled);
        assert_eq!(engine.best_bid(), Some(Decimal::from(100)));
    }

    #[test]
    fn test_fractional_quantities_are_exact() {
        let mut engine = ready_engine();
        let price = Decimal::new(30_005, 1);
        engine
            .submit(Order::new(1, Side::Sell, MARKET, price, Decimal::new(3, 1)))
            .unwrap();
        engine
            .submit(Order::new(2, Side::Buy, MARKET, price, Decimal::new(1, 1)))
            .unwrap();
        let outcome = engine
            .submit(Order::new(3, Side::Buy, MARKET, price, Decimal::new(2, 1)))
            .unwrap();

        assert!(outcome.fully_filled());
        assert!(engine.asks().is_empty());
    }

    #[test]
    fn test_state_root_tracks_book_contents() {
        let mut a = ready_engine();
        let mut b = ready_engine();
        assert_eq!(a.state_root(), b.state_root());

        a.submit(buy(1, 100, 5)).unwrap();
        assert_ne!(a.state_root(), b.state_root());

        // Same value, different decimal scale
        b.submit(Order::new(1, Side::Buy, MARKET, Decimal::new(10_000, 2), Decimal::from(5)))
            .unwrap();
        assert_eq!(a.state_root(), b.state_root());
    }

    #[test]
    fn test_depth() {
        let mut engine = ready_engine();
        engine.submit(buy(1, 99, 1)).unwrap();
        engine.submit(buy(2, 98, 2)).unwrap();
        engine.submit(sell(3, 101, 3)).unwrap();

        let depth = engine.depth(1);

        assert_eq!(depth.market, MARKET);
        assert_eq!(depth.bids.len(), 1);
        assert_eq!(depth.bids[0].price, Decimal::from(99));
        assert_eq!(depth.asks[0].quantity, Decimal::from(3));
    }
}
