//! Authenticated fetch dispatcher.
//!
//! Three entry points share one request builder and differ only in where the
//! bearer credential comes from:
//! - browser: the session store's current snapshot
//! - server: the session cookie in the incoming request's jar
//! - anonymous: no credential at all
//!
//! None of them interpret the response status; non-2xx responses are handed
//! back to the caller unchanged. Only transport failures become errors.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use reqwest::{Method, Response};
use serde::Serialize;

use crate::session::{JWT_TOKEN_NAME, TokenStore};

/// Errors produced while building or sending an outbound request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    #[error("request body encode failed: {0}")]
    Body(#[from] serde_json::Error),
}

/// Join `base` and `route` with exactly one `/`, whatever slashes either side carries.
#[must_use]
pub fn build_url(base: &str, route: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), route.trim_start_matches('/'))
}

// =============================================================================
// REQUEST OPTIONS
// =============================================================================

/// Caller-supplied method, headers, and body for one outbound call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a JSON body and its content type.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Body`] if `body` fails to serialize.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, FetchError> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers
            .insert(reqwest::header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Outbound client bound to the backend base URL. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    /// Trailing slashes are stripped from `base_url` once, here.
    #[must_use]
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Self {
        Self { http, base_url: Arc::from(base_url.trim_end_matches('/')) }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request for `route`. Caller headers go in first and
    /// `Authorization` last, so callers cannot override the credential.
    /// With no token the caller's headers are sent as-is.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the URL is invalid or the token is not a
    /// valid header value.
    pub fn build_request(
        &self,
        route: &str,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<reqwest::Request, FetchError> {
        let RequestOptions { method, mut headers, body } = options;
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self
            .http
            .request(method, build_url(&self.base_url, route))
            .headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        Ok(builder.build()?)
    }

    /// Call `route` with the token held by `store`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on request construction or transport failure.
    pub async fn fetch_as_browser_client(
        &self,
        store: &TokenStore,
        route: &str,
        options: RequestOptions,
    ) -> Result<Response, FetchError> {
        let token = store.get();
        self.execute(route, options, token.as_deref()).await
    }

    /// Call `route` with the session cookie from an incoming request's jar.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on request construction or transport failure.
    pub async fn fetch_as_server_client(
        &self,
        cookies: &CookieJar,
        route: &str,
        options: RequestOptions,
    ) -> Result<Response, FetchError> {
        let token = server_token(cookies);
        self.execute(route, options, token).await
    }

    /// Call `route` without a credential.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on request construction or transport failure.
    pub async fn fetch_anonymous(&self, route: &str, options: RequestOptions) -> Result<Response, FetchError> {
        self.execute(route, options, None).await
    }

    async fn execute(
        &self,
        route: &str,
        options: RequestOptions,
        token: Option<&str>,
    ) -> Result<Response, FetchError> {
        let request = self.build_request(route, options, token)?;
        tracing::debug!(method = %request.method(), url = %request.url(), authenticated = token.is_some(), "backend request");
        Ok(self.http.execute(request).await?)
    }
}

/// Session token carried by a request's cookies. Empty values count as absent.
#[must_use]
pub fn server_token(cookies: &CookieJar) -> Option<&str> {
    cookies
        .get(JWT_TOKEN_NAME)
        .map(Cookie::value)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
