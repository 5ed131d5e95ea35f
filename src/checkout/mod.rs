//! Checkout helpers: order pricing and the payment records the app posts

pub mod payment;
pub mod quote;

pub use payment::*;
pub use quote::*;

/// Checkout-related errors
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Payment is not linked to an order")]
    MissingOrder,
}
