//! Error types for the matching core.
//!
//! Every variant is recoverable: a bad or misrouted message is reported to
//! the caller and the dispatcher keeps serving other markets and later
//! messages. Duplicate submissions and cancels of absent orders are not
//! errors at all; they are silent no-ops.

use thiserror::Error;

/// Errors surfaced by the engine, the registry and the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No engine is registered for the market.
    #[error("unknown market: {0}")]
    UnknownMarket(String),

    /// The market's engine has not finished its (re)load.
    #[error("engine for market {0} is not ready")]
    EngineNotReady(String),

    /// Non-positive quantity, malformed price/side or undecodable payload.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// Action tag outside submit/cancel/reload.
    #[error("unrecognized action: {0}")]
    UnrecognizedAction(String),

    /// The persisted backlog could not be fetched; the previous engine stays live.
    #[error("backlog unavailable for market {market}: {reason}")]
    Backlog { market: String, reason: String },

    /// The market's worker has shut down.
    #[error("worker for market {0} is gone")]
    WorkerGone(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::UnknownMarket("btcusd".into()).to_string(),
            "unknown market: btcusd"
        );
        assert_eq!(
            Error::EngineNotReady("btcusd".into()).to_string(),
            "engine for market btcusd is not ready"
        );
        let err = Error::Backlog {
            market: "ethusd".into(),
            reason: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "backlog unavailable for market ethusd: connection refused"
        );
    }
}
