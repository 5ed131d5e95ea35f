//! Record normalization: one raw record in, one display row out

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Utc};

use crate::types::*;

/// Fallback label when a transaction has no payment method
pub const UNKNOWN_METHOD: &str = "Unknown";

/// One entry of the title table
///
/// Rules are evaluated top to bottom and the first matching predicate wins.
#[derive(Clone, Copy)]
pub struct TitleRule {
    pub name: &'static str,
    pub applies: fn(&SourceRecord) -> bool,
    pub title: &'static str,
}

impl std::fmt::Debug for TitleRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleRule")
            .field("name", &self.name)
            .field("title", &self.title)
            .finish()
    }
}

impl TitleRule {
    pub fn matches(&self, record: &SourceRecord) -> bool {
        (self.applies)(record)
    }
}

fn order_status(record: &SourceRecord) -> Option<Option<&OrderStatus>> {
    match record {
        SourceRecord::Order(order) => Some(order.status.as_ref()),
        _ => None,
    }
}

fn transaction(record: &SourceRecord) -> Option<&TransactionRecord> {
    match record {
        SourceRecord::Transaction(txn) => Some(txn),
        _ => None,
    }
}

fn is_wallet_method(txn: &TransactionRecord) -> bool {
    txn.method
        .as_deref()
        .is_some_and(|m| m.trim().eq_ignore_ascii_case("wallet"))
}

/// Title precedence table
pub const TITLE_RULES: &[TitleRule] = &[
    TitleRule {
        name: "order_pending",
        applies: |r| order_status(r) == Some(Some(&OrderStatus::Pending)),
        title: "Order Placed",
    },
    TitleRule {
        name: "order_completed",
        applies: |r| order_status(r).flatten().is_some_and(OrderStatus::is_completed),
        title: "Order Delivered",
    },
    TitleRule {
        name: "order_cancelled",
        applies: |r| order_status(r) == Some(Some(&OrderStatus::Cancelled)),
        title: "Order Cancelled",
    },
    TitleRule {
        name: "order_other",
        applies: |r| order_status(r).is_some(),
        title: "Order Update",
    },
    TitleRule {
        name: "completed_credit",
        applies: |r| {
            transaction(r).is_some_and(|t| {
                t.status == Some(TransactionStatus::Completed)
                    && t.transaction_type == Some(TransactionType::Credit)
            })
        },
        title: "Payment Successful",
    },
    TitleRule {
        name: "failed",
        applies: |r| transaction(r).is_some_and(|t| t.status == Some(TransactionStatus::Failed)),
        title: "Payment Reversed",
    },
    TitleRule {
        name: "credit_for_order",
        applies: |r| {
            transaction(r).is_some_and(|t| {
                t.transaction_type == Some(TransactionType::Credit) && t.order_id.is_some()
            })
        },
        title: "New Order Made!",
    },
    TitleRule {
        name: "wallet_debit",
        applies: |r| {
            transaction(r).is_some_and(|t| {
                t.transaction_type == Some(TransactionType::Debit) && is_wallet_method(t)
            })
        },
        title: "Top Up Successful",
    },
    TitleRule {
        name: "top_up",
        applies: |r| matches!(r, SourceRecord::Wallet(entry) if entry.is_top_up),
        title: "Top Up Successful",
    },
    TitleRule {
        name: "fallback",
        applies: |_| true,
        title: "Transaction Update",
    },
];

/// Resolve the title for a record from [`TITLE_RULES`]
pub fn derive_title(record: &SourceRecord) -> &'static str {
    TITLE_RULES
        .iter()
        .find(|rule| rule.matches(record))
        .map(|rule| rule.title)
        .unwrap_or("Transaction Update")
}

/// Render an amount without trailing noise: whole rupees as integers, otherwise
/// rounded half-up to paise
pub fn format_amount(amount: &BigDecimal) -> String {
    if amount.is_integer() {
        amount.with_scale(0).to_string()
    } else {
        amount.with_scale_round(2, RoundingMode::HalfUp).to_string()
    }
}

/// Resolve the description line for a record
pub fn derive_description(record: &SourceRecord) -> String {
    match record {
        SourceRecord::Order(order) => {
            let total = order
                .total_amount
                .clone()
                .unwrap_or_else(|| BigDecimal::from(0));
            format!(
                "You have created a new shipping order worth ₹{}",
                format_amount(&total)
            )
        }
        SourceRecord::Wallet(entry) if entry.is_top_up => {
            "Your wallet has been credited".to_string()
        }
        SourceRecord::Wallet(_) => {
            format!("Received ₹{} via Wallet", format_amount(&record.amount()))
        }
        SourceRecord::Transaction(txn) => {
            let amount = format_amount(&record.amount());
            let method = txn
                .method
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(UNKNOWN_METHOD);
            match txn.transaction_type {
                Some(TransactionType::Credit) => format!("Received ₹{} via {}", amount, method),
                _ => format!("Paid ₹{} via {}", amount, method),
            }
        }
    }
}

/// Icon family for a record
pub fn icon_key(record: &SourceRecord) -> IconKey {
    match record {
        SourceRecord::Order(_) => IconKey::Order,
        SourceRecord::Wallet(_) => IconKey::Wallet,
        SourceRecord::Transaction(txn) => match txn.transaction_type {
            Some(TransactionType::Credit) => IconKey::Credit,
            _ => IconKey::Debit,
        },
    }
}

/// Relative age of `date` as seen from `now`
///
/// Floor division throughout; there is no weeks/months tier. Dates in the
/// future read as "0 min ago".
pub fn time_ago(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - date).num_minutes().max(0);
    if minutes < 60 {
        return format!("{} min ago", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{} hours ago", hours);
    }

    let days = hours / 24;
    if days == 1 {
        "1 day ago".to_string()
    } else {
        format!("{} days ago", days)
    }
}

/// Normalize one record into a display row
///
/// Returns `None` only when the record has no usable date; every other
/// missing field is replaced with its default.
pub fn normalize(record: &SourceRecord, now: DateTime<Utc>) -> Option<DisplayRecord> {
    let date = record.date()?;

    Some(DisplayRecord {
        kind: record.kind(),
        title: derive_title(record).to_string(),
        description: derive_description(record),
        icon_key: icon_key(record),
        timestamp_ago: time_ago(date, now),
        date,
        amount: record.amount(),
        status: record.status_label(),
    })
}
