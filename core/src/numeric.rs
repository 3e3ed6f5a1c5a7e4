//! Numeric normalization for values coming back from the graph engine.
//!
//! Bolt hands integers back as signed 64-bit values and absent properties as
//! null. Everything the API serializes is a plain non-negative count.

use neo4rs::Row;
use tracing::debug;

/// Clamp an optional signed engine integer to a count; null becomes 0.
pub fn to_count(value: Option<i64>) -> u64 {
    value.map(|v| v.max(0) as u64).unwrap_or(0)
}

/// Read a numeric column from a row. Missing or null columns read as 0.
pub fn count_column(row: &Row, key: &str) -> u64 {
    match row.get::<i64>(key) {
        Ok(value) => to_count(Some(value)),
        Err(e) => {
            debug!(target: "store", column = %key, error = %e, "Non-integer count column read as 0");
            0
        }
    }
}

/// Read an optional string column from a row.
pub fn text_column(row: &Row, key: &str) -> Option<String> {
    row.get::<String>(key).ok()
}

/// Validate a caller-supplied message count.
pub fn message_count(value: Option<i64>) -> Option<std::result::Result<u64, i64>> {
    value.map(|v| if v < 0 { Err(v) } else { Ok(v as u64) })
}
