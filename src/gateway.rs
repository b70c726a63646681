//! Payment gateway port.
//!
//! The engine only needs an opaque charge/refund capability: create a hosted
//! checkout session for an amount, refund part of a charge. The Stripe
//! adapter below is deliberately thin; confirmation arrives later through the
//! gateway callback endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct RefundReceipt {
    pub refund_id: String,
    pub status: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        booking_id: Uuid,
        amount_cents: i64,
        currency: &str,
        description: &str,
    ) -> Result<CheckoutSession>;

    async fn refund(&self, charge_ref: &str, amount_cents: i64) -> Result<RefundReceipt>;
}

/// Stripe Checkout adapter.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    success_url: String,
    cancel_url: String,
}

impl StripeGateway {
    pub fn new(secret_key: String, success_url: String, cancel_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            success_url,
            cancel_url,
        }
    }
}

#[derive(Deserialize)]
struct StripeSession {
    id: String,
    url: String,
}

#[derive(Deserialize)]
struct StripeRefund {
    id: String,
    status: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        booking_id: Uuid,
        amount_cents: i64,
        currency: &str,
        description: &str,
    ) -> Result<CheckoutSession> {
        let booking_ref = booking_id.to_string();
        let amount = amount_cents.to_string();
        let currency_lower = currency.to_lowercase();
        let params: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("success_url", &self.success_url),
            ("cancel_url", &self.cancel_url),
            ("client_reference_id", &booking_ref),
            ("metadata[booking_id]", &booking_ref),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", &currency_lower),
            ("line_items[0][price_data][unit_amount]", &amount),
            ("line_items[0][price_data][product_data][name]", description),
        ];

        let response = self
            .client
            .post("https://api.stripe.com/v1/checkout/sessions")
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("checkout session request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Gateway(format!(
                "checkout session rejected ({status}): {body}"
            )));
        }

        let session: StripeSession = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("malformed checkout session response: {e}")))?;

        Ok(CheckoutSession {
            session_id: session.id,
            url: session.url,
        })
    }

    async fn refund(&self, charge_ref: &str, amount_cents: i64) -> Result<RefundReceipt> {
        let amount = amount_cents.to_string();
        let params: Vec<(&str, &str)> = vec![("payment_intent", charge_ref), ("amount", &amount)];

        let response = self
            .client
            .post("https://api.stripe.com/v1/refunds")
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("refund request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Gateway(format!("refund rejected ({status}): {body}")));
        }

        let refund: StripeRefund = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("malformed refund response: {e}")))?;

        Ok(RefundReceipt {
            refund_id: refund.id,
            status: refund.status,
        })
    }
}

/// Gateway used when no Stripe key is configured (admin-only deployments,
/// local development). Any attempt to charge fails loudly.
pub struct DisabledGateway;

#[async_trait]
impl PaymentGateway for DisabledGateway {
    async fn create_checkout_session(
        &self,
        _booking_id: Uuid,
        _amount_cents: i64,
        _currency: &str,
        _description: &str,
    ) -> Result<CheckoutSession> {
        Err(AppError::Gateway("payment gateway is not configured".to_string()))
    }

    async fn refund(&self, _charge_ref: &str, _amount_cents: i64) -> Result<RefundReceipt> {
        Err(AppError::Gateway("payment gateway is not configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_gateway_rejects_charges() {
        let gateway = DisabledGateway;
        let result = gateway
            .create_checkout_session(Uuid::new_v4(), 10_000, "EUR", "Villa Test")
            .await;
        assert!(matches!(result, Err(AppError::Gateway(_))));

        let result = gateway.refund("pi_123", 5_000).await;
        assert!(matches!(result, Err(AppError::Gateway(_))));
    }

    #[tokio::test]
    async fn test_mock_gateway_drives_the_trait() {
        let mut mock = MockPaymentGateway::new();
        mock.expect_create_checkout_session()
            .withf(|_, amount, currency, _| *amount == 63_000 && currency == "EUR")
            .returning(|booking_id, _, _, _| {
                Ok(CheckoutSession {
                    session_id: format!("cs_{booking_id}"),
                    url: "https://checkout.example/cs".to_string(),
                })
            });

        let session = mock
            .create_checkout_session(Uuid::new_v4(), 63_000, "EUR", "Villa Test")
            .await
            .unwrap();
        assert!(session.session_id.starts_with("cs_"));
    }
}
