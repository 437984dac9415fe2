//! Portal configuration parsed from environment variables.

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Backend API base, trailing slashes already stripped.
    pub backend_url: String,
    pub port: u16,
    /// Turn on the access guard's redirect for unauthenticated page requests.
    pub guard_enforce: bool,
}

impl PortalConfig {
    /// Build config from the process environment.
    ///
    /// Required:
    /// - `PUBLIC_BACKEND_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `AUTH_GUARD_ENFORCE`: boolean, default false
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required var is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`PortalConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_url = lookup("PUBLIC_BACKEND_URL")
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("PUBLIC_BACKEND_URL"))?;

        let port = match lookup("PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw.clone() })?,
        };

        let guard_enforce = match lookup("AUTH_GUARD_ENFORCE") {
            None => false,
            Some(raw) => {
                parse_bool(&raw).ok_or(ConfigError::Invalid { var: "AUTH_GUARD_ENFORCE", value: raw.clone() })?
            }
        };

        Ok(Self { backend_url, port, guard_enforce })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
