//! Where outcomes go once an action has been applied.
//!
//! Trades and updated order states are handed to an [`OutcomeSink`]
//! (persistence, trade publication). The core never waits on a sink's
//! result; a sink that fails logs it.

use std::io::{self, Write};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::error;

use crate::error::Error;
use crate::registry::ActionOutcome;

/// Consumer of applied actions and rejected ones.
pub trait OutcomeSink: Send + Sync {
    fn publish(&self, outcome: &ActionOutcome);

    /// An action was rejected; `market` is `None` when it could not be decoded.
    fn reject(&self, _action: &str, _market: Option<&str>, _error: &Error) {}
}

impl<A: OutcomeSink, B: OutcomeSink> OutcomeSink for (A, B) {
    fn publish(&self, outcome: &ActionOutcome) {
        self.0.publish(outcome);
        self.1.publish(outcome);
    }

    fn reject(&self, action: &str, market: Option<&str>, error: &Error) {
        self.0.reject(action, market, error);
        self.1.reject(action, market, error);
    }
}

impl<S: OutcomeSink + ?Sized> OutcomeSink for std::sync::Arc<S> {
    fn publish(&self, outcome: &ActionOutcome) {
        (**self).publish(outcome);
    }

    fn reject(&self, action: &str, market: Option<&str>, error: &Error) {
        (**self).reject(action, market, error);
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutcomeSink for NullSink {
    fn publish(&self, _outcome: &ActionOutcome) {}
}

// ============================================================================
// JSON lines
// ============================================================================

#[derive(Serialize)]
struct Rejection<'a> {
    kind: &'static str,
    action: &'a str,
    market: Option<&'a str>,
    error: String,
}

/// Writes one JSON document per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonLinesSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_line<T: Serialize>(&self, value: &T) {
        let mut writer = self.writer.lock();
        let result = serde_json::to_writer(&mut *writer, value)
            .map_err(io::Error::from)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        if let Err(e) = result {
            error!(error = %e, "failed to write outcome");
        }
    }
}

impl<W: Write + Send> OutcomeSink for JsonLinesSink<W> {
    fn publish(&self, outcome: &ActionOutcome) {
        self.write_line(outcome);
    }

    fn reject(&self, action: &str, market: Option<&str>, error: &Error) {
        self.write_line(&Rejection {
            kind: "rejected",
            action,
            market,
            error: error.to_string(),
        });
    }
}

// ============================================================================
// Collecting
// ============================================================================

/// Keeps every outcome and rejection in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    outcomes: Mutex<Vec<ActionOutcome>>,
    rejections: Mutex<Vec<Error>>,
}

impl CollectingSink {
    pub fn outcomes(&self) -> Vec<ActionOutcome> {
        self.outcomes.lock().clone()
    }

    pub fn rejections(&self) -> Vec<Error> {
        self.rejections.lock().clone()
    }
}

impl OutcomeSink for CollectingSink {
    fn publish(&self, outcome: &ActionOutcome) {
        self.outcomes.lock().push(outcome.clone());
    }

    fn reject(&self, _action: &str, _market: Option<&str>, error: &Error) {
        self.rejections.lock().push(error.clone());
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
