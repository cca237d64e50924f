//! API handlers for Alexandria REST endpoints

pub mod books;
pub mod health;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use validator::Validate;

use crate::{error::AppError, AppState};

/// Request header carrying the shared API secret
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Extractor guarding an endpoint behind the static API key.
///
/// The header value is compared for exact equality against the configured
/// secret; the rejection message deliberately does not say whether the
/// header was missing or wrong.
pub struct ApiKey;

#[async_trait]
impl FromRequestParts<AppState> for ApiKey {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Invalid API key".to_string()))?;

        if provided != state.config.auth.api_key {
            return Err(AppError::Authentication("Invalid API key".to_string()));
        }

        Ok(ApiKey)
    }
}

/// JSON extractor that runs payload validation after deserialization.
///
/// Structural problems (malformed JSON, missing or read-only fields) reject
/// with the deserializer's message; constraint violations are collected into
/// a field-to-message map so one response enumerates every problem.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T> FromRequest<AppState> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        payload.validate()?;

        Ok(ValidatedJson(payload))
    }
}
