//! Core types and data structures for the activity timeline

use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Status-like enums that keep the backend's spelling
///
/// Known strings map to named variants; anything else is kept verbatim in
/// `Other` so the display row can still show what the backend sent.
macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            /// The string the backend uses for this value
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other(raw) => raw.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($wire => $name::$variant,)+
                    _ => $name::Other(raw),
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Direction of a payment transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    /// Money received (order payments made through the checkout)
    Credit,
    /// Money paid out
    Debit,
    /// Any type string the backend sends that we don't recognise
    Other(String),
}

wire_enum!(TransactionType {
    Credit => "Credit",
    Debit => "Debit",
});

/// Settlement state of a payment transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionStatus {
    Completed,
    Failed,
    Pending,
    Other(String),
}

wire_enum!(TransactionStatus {
    Completed => "Completed",
    Failed => "Failed",
    Pending => "Pending",
});

/// Lifecycle state of a shipping order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Completed,
    /// What the backend writes once a paid order is handed over
    Delivered,
    Cancelled,
    Other(String),
}

wire_enum!(OrderStatus {
    Pending => "Pending",
    Completed => "Completed",
    Delivered => "Delivered",
    Cancelled => "Cancelled",
});

impl OrderStatus {
    /// `Delivered` counts as completed
    pub fn is_completed(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Delivered)
    }
}

/// Payment transaction as returned by the transactions endpoint
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(rename = "type", default)]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    /// Payment method label ("UPI", "Wallet", "Card", ...)
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<BigDecimal>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date: Option<DateTime<Utc>>,
}

/// Wallet ledger entry; every entry is a credit to the wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletLedgerEntry {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_top_up: bool,
}

/// Wallet object returned by the wallet endpoint
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WalletSnapshot {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub balance: Option<BigDecimal>,
    #[serde(default)]
    pub transactions: Vec<WalletLedgerEntry>,
}

/// Shipping order as returned by the orders endpoint
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_amount: Option<BigDecimal>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Which endpoint a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Transaction,
    Wallet,
    Order,
}

/// A raw record tagged with its source kind
#[derive(Debug, Clone, PartialEq)]
pub enum SourceRecord {
    Transaction(TransactionRecord),
    Wallet(WalletLedgerEntry),
    Order(OrderRecord),
}

impl SourceRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            SourceRecord::Transaction(_) => RecordKind::Transaction,
            SourceRecord::Wallet(_) => RecordKind::Wallet,
            SourceRecord::Order(_) => RecordKind::Order,
        }
    }

    /// Timestamp used for ordering, if the record carries a parseable one
    pub fn date(&self) -> Option<DateTime<Utc>> {
        match self {
            SourceRecord::Transaction(t) => t.date,
            SourceRecord::Wallet(w) => w.date,
            SourceRecord::Order(o) => o.created_at,
        }
    }

    /// Raw amount, `0` when the source omitted it
    pub fn amount(&self) -> BigDecimal {
        let amount = match self {
            SourceRecord::Transaction(t) => t.amount.as_ref(),
            SourceRecord::Wallet(w) => w.amount.as_ref(),
            SourceRecord::Order(o) => o.total_amount.as_ref(),
        };
        amount.cloned().unwrap_or_else(|| BigDecimal::from(0))
    }

    /// Raw status string as the backend spells it
    pub fn status_label(&self) -> Option<String> {
        match self {
            SourceRecord::Transaction(t) => t.status.as_ref().map(|s| s.as_str().to_string()),
            SourceRecord::Wallet(_) => None,
            SourceRecord::Order(o) => o.status.as_ref().map(|s| s.as_str().to_string()),
        }
    }
}

/// Icon family the presentation layer picks an image for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconKey {
    Credit,
    Debit,
    Wallet,
    Order,
}

/// Normalized timeline row ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRecord {
    pub kind: RecordKind,
    pub title: String,
    pub description: String,
    pub icon_key: IconKey,
    /// Relative age such as "45 min ago"
    pub timestamp_ago: String,
    pub date: DateTime<Utc>,
    pub amount: BigDecimal,
    pub status: Option<String>,
}

/// Errors that can occur while building the timeline
#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Source unavailable: {0}")]
    Unavailable(String),
    #[error("Refresh cancelled")]
    Cancelled,
}

/// Result type for timeline operations
pub type TimelineResult<T> = Result<T, TimelineError>;

fn default_true() -> bool {
    true
}

/// Accepts numbers or numeric strings; anything else reads as absent
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.to_string().parse().ok(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// Accepts RFC 3339 strings or epoch milliseconds; anything else reads as absent
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => parse_timestamp(&s),
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }))
}

/// Parse a wire timestamp string
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
}
