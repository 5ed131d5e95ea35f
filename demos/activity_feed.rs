//! Activity feed example
//!
//! Loads the timeline from the backend configured in the environment (or a
//! `.env` file) and prints it. Falls back to sample data when no backend is
//! configured.

use bigdecimal::BigDecimal;
use chrono::{Duration, Utc};
use swiftship_timeline::utils::MemorySource;
use swiftship_timeline::{
    patterns, ApiConfig, HttpTimelineSource, OrderQuote, OrderRecord, OrderStatus,
    PaymentMethod, TimelineService, TimelineSnapshot,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn sample_source() -> Result<MemorySource, Box<dyn std::error::Error>> {
    let source = MemorySource::new();
    let quote = OrderQuote::for_cost(BigDecimal::from(100))?;

    source.push_order(OrderRecord {
        order_id: Some("SS-1001".to_string()),
        status: Some(OrderStatus::Pending),
        total_amount: Some(quote.payable.clone()),
        created_at: Some(Utc::now() - Duration::minutes(20)),
    });
    source.push_transaction(patterns::completed_order_payment(
        "Asha",
        PaymentMethod::Upi,
        quote.payable,
        "SS-1001",
        Utc::now() - Duration::minutes(18),
    )?);
    source.push_top_up(BigDecimal::from(150), Utc::now() - Duration::hours(30));
    source.set_balance(BigDecimal::from(150));
    Ok(source)
}

fn print_snapshot(snapshot: &TimelineSnapshot) {
    if let Some(balance) = &snapshot.wallet_balance {
        println!("Wallet balance: ₹{}", balance);
    }
    for notice in &snapshot.notices {
        println!("  ! {:?} unavailable: {}", notice.source, notice.message);
    }
    for row in &snapshot.entries {
        println!(
            "  [{:?}] {:<20} {:<45} {}",
            row.icon_key, row.title, row.description, row.timestamp_ago
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("swiftship_timeline=debug".parse()?),
        )
        .with_target(true)
        .init();

    let snapshot = match ApiConfig::from_env() {
        Ok(config) => {
            info!(base_url = %config.base_url, "loading timeline from backend");
            let service = TimelineService::new(HttpTimelineSource::new(config)?);
            service.load().await
        }
        Err(err) => {
            warn!(error = %err, "no backend configured, using sample data");
            TimelineService::new(sample_source()?).load().await
        }
    };

    print_snapshot(&snapshot);
    Ok(())
}
