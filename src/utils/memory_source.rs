//! In-memory data source for testing

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::traits::*;
use crate::types::*;

#[derive(Debug, Default)]
struct SourceData {
    transactions: Vec<TransactionRecord>,
    wallet: WalletSnapshot,
    orders: Vec<OrderRecord>,
    failures: HashMap<RecordKind, String>,
    calls: HashMap<RecordKind, usize>,
    delay: Option<Duration>,
}

/// In-memory source for testing and development
///
/// Clones share the same data, so a test can keep a handle and mutate the
/// source after handing it to a service.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Arc<RwLock<SourceData>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_transaction(&self, record: TransactionRecord) {
        self.data.write().unwrap().transactions.push(record);
    }

    pub fn push_order(&self, record: OrderRecord) {
        self.data.write().unwrap().orders.push(record);
    }

    pub fn push_wallet_entry(&self, entry: WalletLedgerEntry) {
        self.data.write().unwrap().wallet.transactions.push(entry);
    }

    /// Record a wallet top-up of `amount` at `date`
    pub fn push_top_up(&self, amount: BigDecimal, date: DateTime<Utc>) {
        self.push_wallet_entry(WalletLedgerEntry {
            amount: Some(amount),
            date: Some(date),
            is_top_up: true,
        });
    }

    pub fn set_balance(&self, balance: BigDecimal) {
        self.data.write().unwrap().wallet.balance = Some(balance);
    }

    /// Make every fetch of `kind` fail with `message`
    pub fn fail(&self, kind: RecordKind, message: &str) {
        self.data
            .write()
            .unwrap()
            .failures
            .insert(kind, message.to_string());
    }

    /// Stop failing fetches of `kind`
    pub fn recover(&self, kind: RecordKind) {
        self.data.write().unwrap().failures.remove(&kind);
    }

    /// Delay every fetch, to simulate a slow backend
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.data.write().unwrap().delay = delay;
    }

    /// Number of fetches issued for `kind`
    pub fn calls(&self, kind: RecordKind) -> usize {
        self.data
            .read()
            .unwrap()
            .calls
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }

    /// Clear all data, failures and counters
    pub fn clear(&self) {
        *self.data.write().unwrap() = SourceData::default();
    }

    async fn begin(&self, kind: RecordKind) -> TimelineResult<()> {
        let delay = {
            let mut data = self.data.write().unwrap();
            *data.calls.entry(kind).or_insert(0) += 1;
            data.delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.data.read().unwrap().failures.get(&kind) {
            Some(message) => Err(TimelineError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TimelineSource for MemorySource {
    async fn fetch_transactions(&self) -> TimelineResult<Vec<TransactionRecord>> {
        self.begin(RecordKind::Transaction).await?;
        Ok(self.data.read().unwrap().transactions.clone())
    }

    async fn fetch_wallet(&self) -> TimelineResult<WalletSnapshot> {
        self.begin(RecordKind::Wallet).await?;
        Ok(self.data.read().unwrap().wallet.clone())
    }

    async fn fetch_orders(&self) -> TimelineResult<Vec<OrderRecord>> {
        self.begin(RecordKind::Order).await?;
        Ok(self.data.read().unwrap().orders.clone())
    }
}
