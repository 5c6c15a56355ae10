//! Utility helpers shared by the repository implementations.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Maximum number of parameters for SQLite `IN (...)` queries.
///
/// SQLite limits the number of bound parameters per statement (typically
/// 999). 500 leaves room for the other parameters in the query. Any query
/// with a potentially large `IN (...)` list should go through
/// `chunk_for_sqlite`.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Chunk a slice into smaller slices for batch SQLite queries.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Parses a stored decimal string, falling back through f64 for scientific
/// notation and to zero (logged) for garbage. Amounts are stored as text
/// so reads must never fail on a single bad row.
pub fn parse_stored_decimal(value_str: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value_str) {
        Ok(d) => d,
        Err(e_decimal) => match f64::from_str(value_str) {
            Ok(f_val) => Decimal::from_f64(f_val).unwrap_or_else(|| {
                log::error!(
                    "Failed to convert {} '{}' (parsed as f64: {}) to Decimal.",
                    field_name,
                    value_str,
                    f_val
                );
                Decimal::ZERO
            }),
            Err(e_f64) => {
                log::error!(
                    "Failed to parse {} '{}': as Decimal (err: {}), and as f64 (err: {}). Falling back to ZERO.",
                    field_name, value_str, e_decimal, e_f64
                );
                Decimal::ZERO
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_chunk_for_sqlite_empty() {
        let items: Vec<i32> = vec![];
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_chunk_for_sqlite_under_limit() {
        let items: Vec<i32> = (0..100).collect();
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 100);
    }

    #[test]
    fn test_chunk_for_sqlite_over_limit() {
        let items: Vec<i32> = (0..1200).collect();
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), SQLITE_MAX_PARAMS_CHUNK);
        assert_eq!(chunks[1].len(), SQLITE_MAX_PARAMS_CHUNK);
        assert_eq!(chunks[2].len(), 200);
    }

    #[test]
    fn test_parse_stored_decimal_plain() {
        assert_eq!(parse_stored_decimal("-42.50", "amount"), dec!(-42.50));
    }

    #[test]
    fn test_parse_stored_decimal_scientific_notation() {
        assert_eq!(parse_stored_decimal("1e2", "amount"), dec!(100));
    }

    #[test]
    fn test_parse_stored_decimal_garbage_is_zero() {
        assert_eq!(parse_stored_decimal("not-a-number", "amount"), Decimal::ZERO);
    }
}
