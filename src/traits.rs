//! Traits for data-source abstraction

use async_trait::async_trait;

use crate::types::*;

/// Asynchronous source of the three record kinds that make up the timeline
///
/// The HTTP client implements this against the SwiftShip backend; tests use
/// [`crate::utils::MemorySource`]. Implementations should not retry: a failed
/// call is reported back and the timeline degrades to the remaining sources.
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// All payment transactions visible to the authenticated user
    async fn fetch_transactions(&self) -> TimelineResult<Vec<TransactionRecord>>;

    /// The user's wallet, including its ledger entries
    async fn fetch_wallet(&self) -> TimelineResult<WalletSnapshot>;

    /// Orders created by the user
    async fn fetch_orders(&self) -> TimelineResult<Vec<OrderRecord>>;
}
