//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every request passes through the interceptor chain (backend context, then
//! access guard) before reaching a handler. Page routes run loaders and fail
//! the whole load on any upstream or validation error; `/api` routes relay
//! the backend with the caller's session credential.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::Extension;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum_extra::extract::cookie::CookieJar;
use tower_http::trace::TraceLayer;

use crate::fetch::{ApiClient, FetchError, RequestOptions};
use crate::loaders::{self, LayoutData, LoadError};
use crate::middleware::{AccessGuard, BackendContext, Interceptor, Sequence, run_sequence};

/// The fixed request pipeline: backend context first, then the guard.
#[must_use]
pub fn pipeline(client: ApiClient, guard: AccessGuard) -> Sequence {
    let stages: Vec<Arc<dyn Interceptor>> = vec![Arc::new(BackendContext::new(client)), Arc::new(guard)];
    Sequence::new(stages)
}

#[must_use]
pub fn app(client: ApiClient, guard: AccessGuard) -> Router {
    Router::new()
        .route("/", get(layout))
        .route("/api/tenure", get(proxy_tenure))
        .route("/healthz", get(healthz))
        .layer(axum::middleware::from_fn_with_state(pipeline(client, guard), run_sequence))
        .layer(TraceLayer::new_for_http())
}

/// `GET /`: data for the authenticated layout.
async fn layout(Extension(client): Extension<ApiClient>) -> Result<Json<LayoutData>, LoadError> {
    Ok(Json(loaders::load_layout(&client).await?))
}

/// `GET /api/tenure`: relay the backend's tenure list with the caller's credential.
async fn proxy_tenure(Extension(client): Extension<ApiClient>, jar: CookieJar) -> Response {
    let upstream = match client.fetch_as_server_client(&jar, "tenure", RequestOptions::get()).await {
        Ok(resp) => resp,
        Err(e) => return relay_failure(&e),
    };

    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let body = match upstream.bytes().await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "tenure relay body read failed");
            return (StatusCode::BAD_GATEWAY, "backend body unreadable").into_response();
        }
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    response
}

/// Map a failed outbound call to the response the caller sees.
fn relay_failure(err: &FetchError) -> Response {
    match err {
        FetchError::Request(e) => {
            tracing::error!(error = %e, "tenure relay failed");
            (StatusCode::BAD_GATEWAY, "backend unreachable").into_response()
        }
        FetchError::Header(e) => {
            tracing::warn!(error = %e, "session credential is not a valid header value");
            (StatusCode::BAD_REQUEST, "invalid session credential").into_response()
        }
        FetchError::Body(e) => {
            tracing::error!(error = %e, "tenure relay request encode failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
