//! Error handling utilities for the HTTP store
//!
//! Failures are classified through `AppError` and then folded into the
//! domain error the port speaks, keeping transient ones transient.

use convo_common::AppError;
use convo_core::{DomainError, StoreResult};
use reqwest::Response;
use serde::de::DeserializeOwned;

/// Convert a reqwest error to DomainError
pub fn map_transport_error(e: reqwest::Error) -> DomainError {
    let err = if e.is_timeout() {
        AppError::Timeout
    } else if e.is_decode() {
        AppError::Decode(e.to_string())
    } else {
        AppError::transport(e)
    };
    err.into()
}

/// Pass successful responses through; turn the rest into errors
pub async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::from_status(status.as_u16(), body).into())
}

/// Decode a JSON body
pub async fn decode<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let bytes = response.bytes().await.map_err(map_transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| AppError::Decode(e.to_string()).into())
}
