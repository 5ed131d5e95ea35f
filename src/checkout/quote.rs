//! Order quote: shipping cost plus insurance and GST

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

use crate::checkout::CheckoutError;

/// Flat insurance charge added to every order, in rupees
pub const INSURANCE_FEE: i64 = 20;

/// GST percentage applied to the shipping cost
pub const GST_PERCENT: i64 = 18;

/// Price breakdown shown on the review-and-pay screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderQuote {
    /// Shipping cost quoted by the backend
    pub base_cost: BigDecimal,
    /// Flat insurance line
    pub insurance: BigDecimal,
    /// GST on the base cost only; insurance is not taxed
    pub gst_amount: BigDecimal,
    /// Exact sum before rounding
    pub subtotal: BigDecimal,
    /// Amount charged, rounded half-up to whole rupees
    pub payable: BigDecimal,
}

impl OrderQuote {
    /// Build the quote for a shipping cost
    pub fn for_cost(base_cost: BigDecimal) -> Result<Self, CheckoutError> {
        if base_cost <= BigDecimal::from(0) {
            return Err(CheckoutError::InvalidAmount(format!(
                "Shipping cost must be positive, got {}",
                base_cost
            )));
        }

        let insurance = BigDecimal::from(INSURANCE_FEE);
        let gst_amount = (&base_cost * BigDecimal::from(GST_PERCENT)) / BigDecimal::from(100);
        let subtotal = &base_cost + &insurance + &gst_amount;
        let payable = subtotal.with_scale_round(0, RoundingMode::HalfUp);

        Ok(Self {
            base_cost,
            insurance,
            gst_amount,
            subtotal,
            payable,
        })
    }
}
