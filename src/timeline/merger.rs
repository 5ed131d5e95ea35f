//! Timeline merging

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::timeline::normalizer::normalize;
use crate::types::*;

/// Merge any number of normalized lists into one newest-first sequence
///
/// Output length is the sum of the input lengths: entries from different
/// sources are never de-duplicated, so an order and the payment that paid
/// for it both appear. Ties on `date` keep no guaranteed relative order.
pub fn merge<I>(lists: I) -> Vec<DisplayRecord>
where
    I: IntoIterator<Item = Vec<DisplayRecord>>,
{
    let mut merged: Vec<DisplayRecord> = lists.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged
}

/// Merge, then keep only the first `limit` entries
///
/// Truncation always happens after the full sort.
pub fn merge_recent<I>(lists: I, limit: usize) -> Vec<DisplayRecord>
where
    I: IntoIterator<Item = Vec<DisplayRecord>>,
{
    let mut merged = merge(lists);
    merged.truncate(limit);
    merged
}

/// Normalize a batch of raw records, dropping the ones without a usable date
pub fn normalize_all(records: Vec<SourceRecord>, now: DateTime<Utc>) -> Vec<DisplayRecord> {
    let total = records.len();
    let normalized: Vec<DisplayRecord> = records
        .iter()
        .filter_map(|record| normalize(record, now))
        .collect();

    let dropped = total - normalized.len();
    if dropped > 0 {
        debug!(dropped, total, "excluded records without a parseable date");
    }
    normalized
}

/// Build the timeline straight from the three raw collections
pub fn build_timeline(
    transactions: Vec<TransactionRecord>,
    wallet_entries: Vec<WalletLedgerEntry>,
    orders: Vec<OrderRecord>,
    now: DateTime<Utc>,
) -> Vec<DisplayRecord> {
    let transactions = transactions
        .into_iter()
        .map(SourceRecord::Transaction)
        .collect();
    let wallet_entries = wallet_entries.into_iter().map(SourceRecord::Wallet).collect();
    let orders = orders.into_iter().map(SourceRecord::Order).collect();

    merge([
        normalize_all(transactions, now),
        normalize_all(wallet_entries, now),
        normalize_all(orders, now),
    ])
}
