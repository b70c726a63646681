//! Response DTOs for booking endpoints.

use serde::Serialize;

use crate::pricing::PriceBreakdown;
use crate::refunds::RefundTier;

use super::models::{Booking, Payment};

/// Result of booking creation
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking: Booking,
    pub payment: Payment,
    pub breakdown: PriceBreakdown,
    pub checkout_url: Option<String>,
    /// Set when the booking committed but the checkout session could not be
    /// created; retry via the checkout-link endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_error: Option<String>,
}

/// One row of the refund-policy preview shown with a quote
#[derive(Debug, Serialize)]
pub struct RefundPreviewTier {
    pub tier: RefundTier,
    pub min_days_before: i64,
    pub cash_refund_cents: i64,
    pub voucher_cents: i64,
}

/// Result of the quote operation; nothing is persisted or consumed
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub nights: i64,
    pub breakdown: PriceBreakdown,
    pub total_cents: i64,
    pub currency: String,
    pub effective_max_guests: i32,
    pub credit_applicable_cents: i64,
    pub payable_cents: i64,
    pub refund_preview: Vec<RefundPreviewTier>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutLinkResponse {
    pub checkout_url: String,
}
