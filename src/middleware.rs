//! Ordered request interceptors.
//!
//! DESIGN
//! ======
//! A [`Sequence`] is an explicit list of [`Interceptor`]s folded so the first
//! listed runs outermost and the route handler runs innermost. Each stage
//! receives a one-shot [`Resolve`] continuation: it is consumed by value, so
//! a stage can call through at most once. A stage that neither resolves nor
//! short-circuits with a non-success response is a contract violation and is
//! turned into a `500`.
//!
//! The chain is mounted on an axum router with
//! `axum::middleware::from_fn_with_state(sequence, run_sequence)`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::fetch::{ApiClient, server_token};
use crate::session::store::CLEARED_SENTINEL;

/// Paths under this prefix bypass the access guard.
pub const API_PREFIX: &str = "/api";

/// Authentication entry point unauthenticated page requests are sent to.
pub const AUTH_PATH: &str = "/auth";

#[async_trait::async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Handle `request`, either calling `resolve` or answering directly.
    async fn handle(&self, request: Request, resolve: Resolve<'_>) -> Response;
}

/// Continuation to the rest of the chain.
pub struct Resolve<'a> {
    rest: &'a [Arc<dyn Interceptor>],
    next: Next,
    resolved: Option<Arc<AtomicBool>>,
}

impl Resolve<'_> {
    /// Run the remaining stages and then the route handler.
    pub async fn run(self, request: Request) -> Response {
        if let Some(flag) = &self.resolved {
            flag.store(true, Ordering::SeqCst);
        }

        let Some((stage, rest)) = self.rest.split_first() else {
            return self.next.run(request).await;
        };

        let resolved = Arc::new(AtomicBool::new(false));
        let continuation = Resolve { rest, next: self.next, resolved: Some(Arc::clone(&resolved)) };
        let response = stage.handle(request, continuation).await;

        if !resolved.load(Ordering::SeqCst) && response.status().is_success() {
            tracing::error!(stage = stage.name(), "interceptor returned success without resolving");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        response
    }
}

/// Ordered interceptor chain.
#[derive(Clone)]
pub struct Sequence {
    stages: Arc<[Arc<dyn Interceptor>]>,
}

impl Sequence {
    #[must_use]
    pub fn new(stages: Vec<Arc<dyn Interceptor>>) -> Self {
        Self { stages: stages.into() }
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

/// Axum middleware entry point for a [`Sequence`].
pub async fn run_sequence(State(sequence): State<Sequence>, request: Request, next: Next) -> Response {
    Resolve { rest: &sequence.stages, next, resolved: None }
        .run(request)
        .await
}

// =============================================================================
// BACKEND CONTEXT
// =============================================================================

/// Makes the backend [`ApiClient`] available to handlers as
/// `Extension<ApiClient>`. Always resolves.
#[derive(Debug, Clone)]
pub struct BackendContext {
    client: ApiClient,
}

impl BackendContext {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Interceptor for BackendContext {
    fn name(&self) -> &'static str {
        "backend-context"
    }

    async fn handle(&self, mut request: Request, resolve: Resolve<'_>) -> Response {
        request.extensions_mut().insert(self.client.clone());
        resolve.run(request).await
    }
}

// =============================================================================
// ACCESS GUARD
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    RedirectToAuth,
}

/// Decide what the guard does with a request for `path`.
///
/// Anything starting with [`API_PREFIX`] passes, matching by plain string
/// prefix. With enforcement off every request passes.
#[must_use]
pub fn guard_decision(path: &str, has_session: bool, enforce: bool) -> GuardDecision {
    if path.starts_with(API_PREFIX) || !enforce || has_session || path.starts_with(AUTH_PATH) {
        return GuardDecision::Pass;
    }
    GuardDecision::RedirectToAuth
}

/// Access guard for page requests.
///
/// Enforcement is off unless explicitly enabled: the portal does not yet
/// decide who may see which pages, so by default every request passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGuard {
    enforce: bool,
}

impl AccessGuard {
    #[must_use]
    pub fn new(enforce: bool) -> Self {
        Self { enforce }
    }

    #[must_use]
    pub fn enforcing(&self) -> bool {
        self.enforce
    }
}

#[async_trait::async_trait]
impl Interceptor for AccessGuard {
    fn name(&self) -> &'static str {
        "access-guard"
    }

    async fn handle(&self, request: Request, resolve: Resolve<'_>) -> Response {
        let jar = CookieJar::from_headers(request.headers());
        let has_session = server_token(&jar).is_some_and(|token| token != CLEARED_SENTINEL);

        match guard_decision(request.uri().path(), has_session, self.enforce) {
            GuardDecision::Pass => resolve.run(request).await,
            GuardDecision::RedirectToAuth => {
                tracing::debug!(path = request.uri().path(), "redirecting unauthenticated request");
                Redirect::to(AUTH_PATH).into_response()
            }
        }
    }
}

#[cfg(test)]
#[path = "middleware_test.rs"]
mod tests;
