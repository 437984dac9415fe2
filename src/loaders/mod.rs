//! Route data loaders.
//!
//! ERROR HANDLING
//! ==============
//! Loaders never degrade: a non-200 upstream status, a body that fails typed
//! validation, or a transport failure all abort the load. At the HTTP boundary
//! a [`LoadError`] becomes a `502` so the page fails instead of rendering
//! stale or partial data.

pub mod tenure;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::Response as UpstreamResponse;
use serde::de::DeserializeOwned;

use crate::fetch::FetchError;

pub use tenure::{LayoutData, Tenure, fetch_tenures, load_layout};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{route}: upstream returned status {status}")]
    Status { route: String, status: u16 },

    #[error("{route}: failed to read response body: {source}")]
    Body { route: String, source: reqwest::Error },

    #[error("{route}: invalid response data: {source}")]
    Validation { route: String, source: serde_json::Error },
}

impl IntoResponse for LoadError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "page load failed");
        (StatusCode::BAD_GATEWAY, self.to_string()).into_response()
    }
}

/// Require a 200 from `response` and decode its body as `T`.
///
/// # Errors
///
/// Returns [`LoadError::Status`] for any other status, [`LoadError::Body`] if
/// the body cannot be read, and [`LoadError::Validation`] if it does not
/// decode as `T`.
pub async fn expect_json<T: DeserializeOwned>(route: &str, response: UpstreamResponse) -> Result<T, LoadError> {
    let status = response.status().as_u16();
    if status != 200 {
        return Err(LoadError::Status { route: route.to_owned(), status });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|source| LoadError::Body { route: route.to_owned(), source })?;
    serde_json::from_slice(&bytes).map_err(|source| LoadError::Validation { route: route.to_owned(), source })
}
