//! Identity consumption.
//!
//! Authentication happens upstream (gateway or middleware); by the time a
//! request reaches this service the caller's identity has been resolved
//! and is carried in the `x-user-id` header. Handlers take the identity
//! through the [`Owner`] extractor and never authenticate themselves.

use crate::errors::ServiceError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

pub const OWNER_HEADER: &str = "x-user-id";

/// The resolved identity whose cart/orders a request operates on.
#[derive(Debug, Clone)]
pub struct Owner(pub String);

impl Owner {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                ServiceError::Unauthorized(format!("missing {} header", OWNER_HEADER))
            })?;

        Ok(Owner(owner.to_string()))
    }
}
