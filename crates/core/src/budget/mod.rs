//! Budget math - pure, side-effect-free functions over in-memory data.

mod period;


pub use period::{period_end, period_start};

use rust_decimal::Decimal;

/// Derived balance of a bucket: the plain signed sum of its ledger rows.
///
/// No rounding happens here; callers render to two decimal places.
pub fn bucket_balance(amounts: &[Decimal]) -> Decimal {
    amounts.iter().sum()
}
