//! Extractors that validate requests before a handler runs.
//!
//! Rejections surface as [`ApiError::Validation`], so malformed input gets
//! the same JSON error body as every other failure.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::error::ApiError;

pub type FieldErrors = BTreeMap<String, String>;

/// Constraints serde cannot express. The default accepts everything.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors> {
        Ok(())
    }
}

/// JSON body deserialized into `T` and then checked with [`Validate`].
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        value
            .validate()
            .map_err(|field_errors| ApiError::validation("Validation error", Some(field_errors)))?;

        Ok(Self(value))
    }
}

/// Path parameters deserialized into `T` (e.g. a `Uuid` field).
#[derive(Debug)]
pub struct ValidPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Minimal structural e-mail check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("ragnar@floki.dev"));
        assert!(is_valid_email("first.last+tag@mail.example.com"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "ragnar", "@floki.dev", "ragnar@", "ragnar@floki", "rag nar@floki.dev", "a@b@c.d", "a@.dev", "a@floki."] {
            assert!(!is_valid_email(email), "{email} should be rejected");
        }
    }
}
