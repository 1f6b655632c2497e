//! Action messages delivered by the external transport.
//!
//! ## Wire Format
//!
//! ```text
//! { "action": "submit" | "cancel" | "reload",
//!   "order":  Order | null,
//!   "market": string }
//! ```
//!
//! Payloads are decoded straight into [`ActionMessage`] / [`OrderPayload`]
//! and converted into domain types with explicit checks. A payload that
//! does not conform never yields a partially populated [`Order`]; it is
//! rejected with [`Error::InvalidOrder`]. An action tag outside the three
//! known ones is [`Error::UnrecognizedAction`].

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{Order, OrderState, Side};

/// Market value of a reload message that targets every enabled market.
pub const RELOAD_ALL: &str = "all";

// ============================================================================
// Wire types
// ============================================================================

/// Raw action envelope as delivered by the transport.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionMessage {
    pub action: String,
    #[serde(default)]
    pub order: Option<OrderPayload>,
    #[serde(default)]
    pub market: Option<String>,
}

/// Order fields required by the matching core.
///
/// Fill progress may be given either as `filled_quantity` or as
/// `unfilled_quantity`; if both are present they must agree.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderPayload {
    pub id: u64,
    pub side: Side,
    #[serde(default)]
    pub market: Option<String>,
    pub price: Decimal,
    pub quantity: Decimal,
    #[serde(default)]
    pub filled_quantity: Option<Decimal>,
    #[serde(default)]
    pub unfilled_quantity: Option<Decimal>,
    #[serde(default)]
    pub state: OrderState,
}

impl OrderPayload {
    /// Convert into an [`Order`], taking the market from the envelope when
    /// the payload itself carries none.
    pub fn into_order(self, envelope_market: Option<&str>) -> Result<Order> {
        let market = match (self.market.as_deref(), envelope_market) {
            (Some(own), Some(envelope)) if !envelope.is_empty() && own != envelope => {
                return Err(Error::InvalidOrder(format!(
                    "order {} names market {} but message targets {}",
                    self.id, own, envelope
                )));
            }
            (Some(own), _) => own.to_string(),
            (None, Some(envelope)) => envelope.to_string(),
            (None, None) => String::new(),
        };
        if market.is_empty() {
            return Err(Error::InvalidOrder(format!("order {} has no market", self.id)));
        }

        if self.price <= Decimal::ZERO {
            return Err(Error::InvalidOrder(format!(
                "order {} has non-positive price {}",
                self.id, self.price
            )));
        }
        if self.quantity <= Decimal::ZERO {
            return Err(Error::InvalidOrder(format!(
                "order {} has non-positive quantity {}",
                self.id, self.quantity
            )));
        }

        let overflow = |what: &str| {
            Error::InvalidOrder(format!("order {}: {} overflows", self.id, what))
        };
        let filled_quantity = match (self.filled_quantity, self.unfilled_quantity) {
            (Some(filled), Some(unfilled)) => {
                let total = filled
                    .checked_add(unfilled)
                    .ok_or_else(|| overflow("filled + unfilled quantity"))?;
                if total != self.quantity {
                    return Err(Error::InvalidOrder(format!(
                        "order {}: filled {} and unfilled {} do not add up to {}",
                        self.id, filled, unfilled, self.quantity
                    )));
                }
                filled
            }
            (Some(filled), None) => filled,
            (None, Some(unfilled)) => self
                .quantity
                .checked_sub(unfilled)
                .ok_or_else(|| overflow("quantity - unfilled quantity"))?,
            (None, None) => Decimal::ZERO,
        };
        if filled_quantity < Decimal::ZERO || filled_quantity > self.quantity {
            return Err(Error::InvalidOrder(format!(
                "order {} has filled quantity {} outside 0..={}",
                self.id, filled_quantity, self.quantity
            )));
        }

        Ok(Order {
            id: self.id,
            side: self.side,
            market,
            price: self.price,
            quantity: self.quantity,
            filled_quantity,
            state: self.state,
        })
    }
}

impl TryFrom<OrderPayload> for Order {
    type Error = Error;

    fn try_from(payload: OrderPayload) -> Result<Self> {
        payload.into_order(None)
    }
}

// ============================================================================
// Domain actions
// ============================================================================

/// Which engines a reload rebuilds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReloadTarget {
    All,
    Market(String),
}

impl ReloadTarget {
    pub fn parse(market: &str) -> Self {
        if market == RELOAD_ALL {
            ReloadTarget::All
        } else {
            ReloadTarget::Market(market.to_string())
        }
    }
}

/// A decoded action, ready to be routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Submit(Order),
    Cancel(Order),
    Reload(ReloadTarget),
}

impl Action {
    /// Decode a raw transport payload.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidOrder`] - malformed JSON, missing or invalid order
    /// * [`Error::UnrecognizedAction`] - unknown action tag
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let message: ActionMessage = serde_json::from_slice(payload)
            .map_err(|e| Error::InvalidOrder(format!("undecodable action payload: {e}")))?;
        Self::try_from(message)
    }

    /// Market this action is addressed to; `None` for a reload of all markets.
    pub fn market(&self) -> Option<&str> {
        match self {
            Action::Submit(order) | Action::Cancel(order) => Some(&order.market),
            Action::Reload(ReloadTarget::Market(market)) => Some(market),
            Action::Reload(ReloadTarget::All) => None,
        }
    }

    /// Action tag as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Action::Submit(_) => "submit",
            Action::Cancel(_) => "cancel",
            Action::Reload(_) => "reload",
        }
    }
}

impl TryFrom<ActionMessage> for Action {
    type Error = Error;

    fn try_from(message: ActionMessage) -> Result<Self> {
        let envelope_market = message.market.as_deref();

        match message.action.as_str() {
            "submit" | "cancel" => {
                let payload = message.order.ok_or_else(|| {
                    Error::InvalidOrder(format!("{} action without an order", message.action))
                })?;
                let order = payload.into_order(envelope_market)?;
                if message.action == "submit" {
                    Ok(Action::Submit(order))
                } else {
                    Ok(Action::Cancel(order))
                }
            }
            "reload" => match envelope_market {
                Some(market) if !market.is_empty() => {
                    Ok(Action::Reload(ReloadTarget::parse(market)))
                }
                _ => Err(Error::InvalidOrder("reload action without a market".into())),
            },
            other => Err(Error::UnrecognizedAction(other.to_string())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
