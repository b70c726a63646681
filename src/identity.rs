//! Caller identity, as supplied by the upstream identity provider.
//!
//! Authentication itself happens upstream; this service trusts the
//! `X-Customer-Id` and `X-Role` headers completely.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Anonymous,
    Customer,
    Admin,
}

#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub customer_id: Option<Uuid>,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The authenticated customer id, or 401 for anonymous callers.
    pub fn require_customer(&self) -> Result<Uuid, AppError> {
        self.customer_id.ok_or(AppError::Unauthenticated)
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("administrator role required"))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer_id = match parts.headers.get("x-customer-id") {
            Some(value) => {
                let raw = value.to_str().map_err(|_| {
                    AppError::invalid_input("INVALID_IDENTITY", "malformed X-Customer-Id header")
                })?;
                Some(Uuid::parse_str(raw).map_err(|_| {
                    AppError::invalid_input("INVALID_IDENTITY", "malformed X-Customer-Id header")
                })?)
            }
            None => None,
        };

        let role = match parts.headers.get("x-role").and_then(|v| v.to_str().ok()) {
            Some("admin") => Role::Admin,
            _ if customer_id.is_some() => Role::Customer,
            _ => Role::Anonymous,
        };

        Ok(Identity { customer_id, role })
    }
}
