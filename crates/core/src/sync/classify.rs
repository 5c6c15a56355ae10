//! Pure classification of incoming aggregator records against stored state.
//!
//! Everything here is side-effect free; the sync service batch-loads the
//! stored snapshot, classifies every incoming record, then applies the
//! writes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::sync_model::{ProviderPendingTransaction, ProviderTransaction};
use crate::constants::{
    amendment_tolerance, pending_amount_tolerance, DESCRIPTION_TOKEN_MIN_LEN,
    PENDING_DATE_TOLERANCE_DAYS,
};
use crate::transactions::Transaction;

/// What to do with one incoming settled record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Never seen and no pending candidate: insert as CONFIRMED.
    CreateConfirmed,
    /// Unseen, but a stored pending fuzzily matches: promote that row
    /// in place.
    PromotePending { pending_id: String },
    /// Stored under the same external id with changed amount or merchant.
    Amend { transaction_id: String },
    /// Stored and identical within tolerance; nothing to do.
    Unchanged,
}

/// Classifies one incoming settled record against the stored snapshot.
///
/// `stored_by_external_id` holds the account's confirmed rows keyed by
/// external id; `pendings` holds its stored PENDING rows. Pendings already
/// claimed by an earlier record in the same batch must be removed from the
/// slice by the caller.
pub fn classify_incoming(
    incoming: &ProviderTransaction,
    stored_by_external_id: &HashMap<String, Transaction>,
    pendings: &[Transaction],
) -> Classification {
    if let Some(stored) = stored_by_external_id.get(&incoming.external_id) {
        if is_amendment(stored, incoming) {
            return Classification::Amend {
                transaction_id: stored.id.clone(),
            };
        }
        return Classification::Unchanged;
    }

    match find_pending_match(incoming, pendings) {
        Some(pending) => Classification::PromotePending {
            pending_id: pending.id.clone(),
        },
        None => Classification::CreateConfirmed,
    }
}

/// Picks the stored pending a settled record most plausibly settles from.
/// Candidates are scanned in slice order; the first match wins, so callers
/// pass pendings in stored (oldest-first) order.
pub fn find_pending_match<'a>(
    incoming: &ProviderTransaction,
    pendings: &'a [Transaction],
) -> Option<&'a Transaction> {
    pendings.iter().find(|p| matches_pending(incoming, p))
}

/// Fuzzy pending match: ±5 days, ±30% amount, and related descriptions.
pub fn matches_pending(incoming: &ProviderTransaction, pending: &Transaction) -> bool {
    if days_between(incoming.date, pending.date).abs() > PENDING_DATE_TOLERANCE_DAYS {
        return false;
    }
    let tolerance = pending.amount.abs() * pending_amount_tolerance();
    if (incoming.amount - pending.amount).abs() > tolerance {
        return false;
    }
    descriptions_related(&incoming.description, &pending.description)
}

/// Whether a stored row and its re-fetched copy differ enough to count as
/// an amendment: amount moved by more than a cent, or the merchant name
/// changed (compared case-insensitively, only when both sides are present).
pub fn is_amendment(stored: &Transaction, incoming: &ProviderTransaction) -> bool {
    if (stored.amount - incoming.amount).abs() > amendment_tolerance() {
        return true;
    }
    if let (Some(stored_merchant), Some(incoming_merchant)) =
        (stored.merchant.as_deref(), incoming.merchant.as_deref())
    {
        if !stored_merchant.eq_ignore_ascii_case(incoming_merchant) {
            return true;
        }
    }
    false
}

/// Positional identity for pendings: same date, same description
/// (case-insensitive), and the same amount rounded to cents.
pub fn pending_equivalent(stored: &Transaction, incoming: &ProviderPendingTransaction) -> bool {
    stored.date == incoming.date
        && stored.description.eq_ignore_ascii_case(&incoming.description)
        && to_cents(stored.amount) == to_cents(incoming.amount)
}

/// Two bank descriptions describe the same event when they share a word
/// token of at least three characters, or one contains the other whole.
pub fn descriptions_related(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.contains(&b) || b.contains(&a) {
        return true;
    }
    let tokens_b: Vec<&str> = b
        .split_whitespace()
        .filter(|t| t.len() >= DESCRIPTION_TOKEN_MIN_LEN)
        .collect();
    a.split_whitespace()
        .filter(|t| t.len() >= DESCRIPTION_TOKEN_MIN_LEN)
        .any(|t| tokens_b.contains(&t))
}

fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days()
}

fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}
