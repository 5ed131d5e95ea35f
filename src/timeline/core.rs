//! Timeline service that runs one fetch cycle across all sources

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::timeline::merger::build_timeline;
use crate::traits::*;
use crate::types::*;

/// Non-fatal notice that one source could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceNotice {
    pub source: RecordKind,
    pub message: String,
}

/// Result of one fetch cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    /// Newest-first timeline rows
    pub entries: Vec<DisplayRecord>,
    /// Wallet balance, if the wallet source answered
    pub wallet_balance: Option<BigDecimal>,
    /// Sources that failed during this cycle
    pub notices: Vec<SourceNotice>,
    pub fetched_at: DateTime<Utc>,
}

impl TimelineSnapshot {
    /// Preview of the newest `limit` rows
    pub fn recent(&self, limit: usize) -> &[DisplayRecord] {
        &self.entries[..limit.min(self.entries.len())]
    }

    /// Whether every source answered
    pub fn is_complete(&self) -> bool {
        self.notices.is_empty()
    }
}

/// Orchestrates fetch, normalization and merge
pub struct TimelineService<S: TimelineSource> {
    source: S,
}

impl<S: TimelineSource> TimelineService<S> {
    /// Create a new service on top of a data source
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run a fetch cycle using the current time
    pub async fn load(&self) -> TimelineSnapshot {
        self.load_at(Utc::now()).await
    }

    /// Run a fetch cycle, computing relative ages against `now`
    ///
    /// The three requests run concurrently and the merge waits for all of
    /// them. A failed source contributes nothing and leaves a notice; there
    /// are no retries.
    pub async fn load_at(&self, now: DateTime<Utc>) -> TimelineSnapshot {
        let (transactions, wallet, orders) = tokio::join!(
            self.source.fetch_transactions(),
            self.source.fetch_wallet(),
            self.source.fetch_orders(),
        );

        let mut notices = Vec::new();
        let transactions = settle(RecordKind::Transaction, transactions, &mut notices);
        let wallet = settle(RecordKind::Wallet, wallet, &mut notices);
        let orders = settle(RecordKind::Order, orders, &mut notices);

        let wallet_balance = wallet.as_ref().map(|w| {
            w.balance
                .clone()
                .unwrap_or_else(|| BigDecimal::from(0))
        });
        let wallet_entries = wallet.map(|w| w.transactions).unwrap_or_default();

        let entries = build_timeline(
            transactions.unwrap_or_default(),
            wallet_entries,
            orders.unwrap_or_default(),
            now,
        );
        debug!(
            entries = entries.len(),
            failed_sources = notices.len(),
            "timeline cycle finished"
        );

        TimelineSnapshot {
            entries,
            wallet_balance,
            notices,
            fetched_at: now,
        }
    }
}

fn settle<T>(
    source: RecordKind,
    result: TimelineResult<T>,
    notices: &mut Vec<SourceNotice>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(?source, error = %err, "timeline source failed; continuing without it");
            notices.push(SourceNotice {
                source,
                message: err.to_string(),
            });
            None
        }
    }
}
