//! Query execution seam.
//!
//! The core never talks to a warehouse directly; it goes through
//! [`QueryExecutor`]. The default implementation is a simulator that
//! derives a value from a digest of the query text, so repeated calls with
//! identical SQL are idempotent. Any real engine substituted here must keep
//! a deterministic test double satisfying the same trait.

use sha2::{Digest, Sha256};

/// Capability interface for executing a query and returning a single
/// numeric result.
pub trait QueryExecutor: Send + Sync {
    fn execute(&self, sql: &str) -> f64;
}

/// Deterministic stand-in for a real query engine.
///
/// The detected aggregation shape selects a numeric band: COUNT-shaped
/// values land near counts, SUM-shaped near totals, AVG-shaped near small
/// averages. The contract to preserve is determinism given identical query
/// text, not the specific distribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedExecutor;

/// Stable 64-bit digest of arbitrary text.
pub(crate) fn text_hash(sql: &str) -> u64 {
    let digest = Sha256::digest(sql.as_bytes());
    u64::from_be_bytes(digest[..8].try_into().expect("digest has 32 bytes"))
}

impl QueryExecutor for SimulatedExecutor {
    fn execute(&self, sql: &str) -> f64 {
        let upper = sql.to_uppercase();
        let h = text_hash(sql);

        let value = if upper.contains("COUNT") {
            (1247 + h % 1000) as f64
        } else if upper.contains("SUM") {
            (50_000 + h % 50_000) as f64
        } else if upper.contains("AVG") {
            25.0 + (h % 100) as f64 / 10.0
        } else {
            (100 + h % 900) as f64
        };

        tracing::debug!(value, "simulated query execution");
        value
    }
}
