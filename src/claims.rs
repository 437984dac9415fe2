//! Custom claims carried in the identity provider's user metadata.
//!
//! These shapes mirror what the backend embeds under
//! `app_metadata.custom_claims` in the session JWT. Only extraction lives
//! here; permission checks are the backend's job.

use serde::{Deserialize, Serialize};

pub type Permission = String;

/// A member group and the permissions it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CustomClaims {
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppMetadata {
    #[serde(default)]
    pub custom_claims: Option<CustomClaims>,
}

/// Authenticated user as returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(rename = "sub", alias = "id")]
    pub user_id: String,
    #[serde(default)]
    pub app_metadata: AppMetadata,
}

/// Custom claims of `user`, or `None` when there is no user or the metadata
/// carries none.
#[must_use]
pub fn custom_claims(user: Option<&AuthUser>) -> Option<&CustomClaims> {
    user?.app_metadata.custom_claims.as_ref()
}

#[cfg(test)]
#[path = "claims_test.rs"]
mod tests;
