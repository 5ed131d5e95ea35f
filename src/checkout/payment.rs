//! Payment records produced by the checkout and wallet screens

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checkout::CheckoutError;
use crate::types::*;

/// Top-up amounts offered on the wallet screen, in rupees
pub const TOP_UP_PRESETS: [i64; 9] = [10, 50, 100, 150, 200, 250, 300, 350, 450];

/// Payment method picked on the checkout screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Upi,
    Wallet,
    Card,
}

impl PaymentMethod {
    /// Label stored on transaction records
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Wallet => "Wallet",
            PaymentMethod::Card => "Card",
        }
    }

    /// Map the screen's selection key; anything unrecognised pays by card
    pub fn from_selection(selection: &str) -> Self {
        match selection.trim().to_ascii_lowercase().as_str() {
            "upi" => PaymentMethod::Upi,
            "wallet" => PaymentMethod::Wallet,
            _ => PaymentMethod::Card,
        }
    }
}

fn validate_amount(amount: &BigDecimal) -> Result<(), CheckoutError> {
    if *amount <= BigDecimal::from(0) {
        Err(CheckoutError::InvalidAmount(format!(
            "Payment amount must be positive, got {}",
            amount
        )))
    } else {
        Ok(())
    }
}

/// Check a custom top-up amount
pub fn validate_top_up_amount(amount: &BigDecimal) -> Result<(), CheckoutError> {
    validate_amount(amount)
}

/// Builders for the transaction records posted after a payment attempt
pub mod patterns {
    use super::*;

    fn base(customer: &str, method: PaymentMethod, amount: BigDecimal) -> TransactionRecord {
        TransactionRecord {
            customer: Some(customer.to_string()),
            method: Some(method.label().to_string()),
            amount: Some(amount),
            ..Default::default()
        }
    }

    /// Order payment that went through (credit, completed, linked to the order)
    pub fn completed_order_payment(
        customer: &str,
        method: PaymentMethod,
        amount: BigDecimal,
        order_id: &str,
        date: DateTime<Utc>,
    ) -> Result<TransactionRecord, CheckoutError> {
        validate_amount(&amount)?;
        if order_id.trim().is_empty() {
            return Err(CheckoutError::MissingOrder);
        }

        Ok(TransactionRecord {
            transaction_type: Some(TransactionType::Credit),
            status: Some(TransactionStatus::Completed),
            order_id: Some(order_id.to_string()),
            date: Some(date),
            ..base(customer, method, amount)
        })
    }

    /// Order payment that failed or was cancelled in the payment sheet
    pub fn failed_order_payment(
        customer: &str,
        method: PaymentMethod,
        amount: BigDecimal,
        error_message: &str,
        date: DateTime<Utc>,
    ) -> Result<TransactionRecord, CheckoutError> {
        validate_amount(&amount)?;

        Ok(TransactionRecord {
            transaction_type: Some(TransactionType::Credit),
            status: Some(TransactionStatus::Failed),
            error_message: Some(error_message.to_string()),
            date: Some(date),
            ..base(customer, method, amount)
        })
    }

    /// Wallet top-up settled through the wallet
    pub fn wallet_top_up_payment(
        customer: &str,
        amount: BigDecimal,
        date: DateTime<Utc>,
    ) -> Result<TransactionRecord, CheckoutError> {
        validate_top_up_amount(&amount)?;

        Ok(TransactionRecord {
            transaction_type: Some(TransactionType::Debit),
            status: Some(TransactionStatus::Completed),
            date: Some(date),
            ..base(customer, PaymentMethod::Wallet, amount)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::patterns::*;
    use super::*;
    use crate::timeline::normalizer::derive_title;

    #[test]
    fn test_method_labels_and_selection() {
        assert_eq!(PaymentMethod::from_selection("upi").label(), "UPI");
        assert_eq!(PaymentMethod::from_selection("Wallet").label(), "Wallet");
        assert_eq!(PaymentMethod::from_selection("card"), PaymentMethod::Card);
        assert_eq!(PaymentMethod::from_selection("netbanking"), PaymentMethod::Card);
    }

    #[test]
    fn test_completed_payment_reads_as_successful() {
        let record = completed_order_payment(
            "Asha",
            PaymentMethod::Upi,
            BigDecimal::from(138),
            "SS-1001",
            Utc::now(),
        )
        .unwrap();

        assert_eq!(record.order_id.as_deref(), Some("SS-1001"));
        assert_eq!(
            derive_title(&SourceRecord::Transaction(record)),
            "Payment Successful"
        );
    }

    #[test]
    fn test_failed_payment_reads_as_reversed() {
        let record = failed_order_payment(
            "Asha",
            PaymentMethod::Card,
            BigDecimal::from(138),
            "The payment flow has been canceled",
            Utc::now(),
        )
        .unwrap();

        assert!(record.order_id.is_none());
        assert_eq!(
            derive_title(&SourceRecord::Transaction(record)),
            "Payment Reversed"
        );
    }

    #[test]
    fn test_wallet_top_up_reads_as_top_up() {
        let record =
            wallet_top_up_payment("Asha", BigDecimal::from(TOP_UP_PRESETS[2]), Utc::now()).unwrap();
        assert_eq!(
            derive_title(&SourceRecord::Transaction(record)),
            "Top Up Successful"
        );
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(wallet_top_up_payment("Asha", BigDecimal::from(0), Utc::now()).is_err());
        assert!(matches!(
            completed_order_payment("Asha", PaymentMethod::Upi, BigDecimal::from(10), " ", Utc::now()),
            Err(CheckoutError::MissingOrder)
        ));
    }

    #[test]
    fn test_payment_serializes_with_wire_names() {
        let record = completed_order_payment(
            "Asha",
            PaymentMethod::Upi,
            BigDecimal::from(138),
            "SS-1001",
            Utc::now(),
        )
        .unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "Credit");
        assert_eq!(json["status"], "Completed");
        assert_eq!(json["orderId"], "SS-1001");
        assert_eq!(json["method"], "UPI");
    }
}
