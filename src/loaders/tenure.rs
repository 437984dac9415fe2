//! Tenure loader for the authenticated layout.

use serde::{Deserialize, Serialize};

use super::{LoadError, expect_json};
use crate::fetch::{ApiClient, RequestOptions};

const TENURE_ROUTE: &str = "/tenure";

/// One member tenure as served by the backend. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenure {
    pub id: String,
    pub year: i32,
    pub is_active: bool,
}

/// Data handed to the authenticated layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutData {
    pub tenures: Vec<Tenure>,
}

/// Fetch all tenures. A single invalid element rejects the whole batch.
///
/// # Errors
///
/// Returns [`LoadError`] on transport failure, non-200 status, or invalid data.
pub async fn fetch_tenures(client: &ApiClient) -> Result<Vec<Tenure>, LoadError> {
    let response = client.fetch_anonymous(TENURE_ROUTE, RequestOptions::get()).await?;
    expect_json(TENURE_ROUTE, response).await
}

/// Load everything the authenticated layout needs.
///
/// # Errors
///
/// Propagates any [`LoadError`] from the underlying loaders.
pub async fn load_layout(client: &ApiClient) -> Result<LayoutData, LoadError> {
    Ok(LayoutData { tenures: fetch_tenures(client).await? })
}

#[cfg(test)]
#[path = "tenure_test.rs"]
mod tests;
