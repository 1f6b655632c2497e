//! Replay receipt summarizing one engine (re)load.
//!
//! The receipt carries the book's state root after replay, so two reloads
//! from the same backlog can be compared without walking both books.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Summary of a completed replay for one market.
///
/// ## State Root
///
/// The 32-byte state root is a SHA-256 hash of the canonical encoding of
/// both books (see `MatchingEngine::state_root`). Identical books always
/// produce identical roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReceipt {
    /// Market symbol
    pub market: String,

    /// Number of backlog orders submitted during replay
    pub orders_replayed: u64,

    /// Backlog orders rejected by validation and skipped
    pub orders_skipped: u64,

    /// Trades produced while replaying (a clean backlog produces none)
    pub trades_during_replay: u64,

    /// Orders resting in the book once replay finished
    pub resting_orders: u64,

    /// State root after replay (SHA-256, 32 bytes)
    #[serde(serialize_with = "serialize_hex")]
    pub state_root: [u8; 32],
}

impl ReplayReceipt {
    /// Compute SHA-256 hash of the given data
    ///
    /// Returns a 32-byte array suitable for use as a state root.
    pub fn compute_hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    /// Check if replay left the book empty
    pub fn is_empty(&self) -> bool {
        self.resting_orders == 0
    }
}

fn serialize_hex<S: Serializer>(root: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(root))
}

// ============================================================================
// Unit Tests
// ============================================================================
