use super::*;
use axum::Router;
use axum::body::Body;
use axum::extract::Extension;
use axum::http::header;
use axum::routing::get;
use http_body_util::BodyExt;
use std::sync::Mutex;
use tower::ServiceExt;

use crate::session::JWT_TOKEN_NAME;

fn router(stages: Vec<Arc<dyn Interceptor>>) -> Router {
    Router::new()
        .route("/", get(|| async { "home" }))
        .route("/auth", get(|| async { "login" }))
        .route("/api/ping", get(|| async { "pong" }))
        .route("/apiary", get(|| async { "bees" }))
        .route("/backend", get(|Extension(client): Extension<ApiClient>| async move { client.base_url().to_owned() }))
        .layer(axum::middleware::from_fn_with_state(Sequence::new(stages), run_sequence))
}

fn guarded(enforce: bool) -> Router {
    router(vec![Arc::new(AccessGuard::new(enforce))])
}

async fn get_path(app: Router, path: &str, cookie: Option<&str>) -> Response {
    let mut builder = axum::http::Request::builder().uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// guard_decision
// =============================================================================

#[test]
fn api_paths_always_pass() {
    for (session, enforce) in [(false, false), (false, true), (true, false), (true, true)] {
        assert_eq!(guard_decision("/api/tenure", session, enforce), GuardDecision::Pass);
    }
}

#[test]
fn api_prefix_is_plain_string_prefix() {
    assert_eq!(guard_decision("/apiary", false, true), GuardDecision::Pass);
}

#[test]
fn disabled_guard_passes_everything() {
    assert_eq!(guard_decision("/members", false, false), GuardDecision::Pass);
}

#[test]
fn enforced_guard_redirects_without_session() {
    assert_eq!(guard_decision("/members", false, true), GuardDecision::RedirectToAuth);
    assert_eq!(guard_decision("/members", true, true), GuardDecision::Pass);
    assert_eq!(guard_decision("/auth/callback", false, true), GuardDecision::Pass);
}

#[test]
fn access_guard_defaults_to_not_enforcing() {
    assert!(!AccessGuard::default().enforcing());
}

// =============================================================================
// chain behavior
// =============================================================================

#[tokio::test]
async fn api_request_reaches_handler_with_enforced_guard_and_no_session() {
    let response = get_path(guarded(true), "/api/ping", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "pong");
}

#[tokio::test]
async fn stubbed_guard_lets_page_through_without_session() {
    let response = get_path(guarded(false), "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "home");
}

#[tokio::test]
async fn enforced_guard_redirects_page_to_auth() {
    let response = get_path(guarded(true), "/", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/auth");
}

#[tokio::test]
async fn enforced_guard_passes_with_session_cookie() {
    let cookie = format!("{JWT_TOKEN_NAME}=tok");
    let response = get_path(guarded(true), "/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn enforced_guard_treats_cleared_sentinel_as_no_session() {
    let cookie = format!("{JWT_TOKEN_NAME}=null");
    let response = get_path(guarded(true), "/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn enforced_guard_lets_auth_page_through() {
    let response = get_path(guarded(true), "/auth", None).await;
    assert_eq!(body_text(response).await, "login");
}

#[tokio::test]
async fn backend_context_exposes_client_to_handlers() {
    let client = ApiClient::new("http://backend.test/");
    let app = router(vec![Arc::new(BackendContext::new(client)), Arc::new(AccessGuard::default())]);
    let response = get_path(app, "/backend", None).await;
    assert_eq!(body_text(response).await, "http://backend.test");
}

// =============================================================================
// ordering and contract
// =============================================================================

struct Recorder {
    label: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait::async_trait]
impl Interceptor for Recorder {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn handle(&self, request: Request, resolve: Resolve<'_>) -> Response {
        self.log.lock().unwrap().push(format!("{}:before", self.label));
        let response = resolve.run(request).await;
        self.log.lock().unwrap().push(format!("{}:after", self.label));
        response
    }
}

struct SwallowsRequest;

#[async_trait::async_trait]
impl Interceptor for SwallowsRequest {
    fn name(&self) -> &'static str {
        "swallow"
    }

    async fn handle(&self, _request: Request, _resolve: Resolve<'_>) -> Response {
        "handled without resolving".into_response()
    }
}

struct Rejects;

#[async_trait::async_trait]
impl Interceptor for Rejects {
    fn name(&self) -> &'static str {
        "reject"
    }

    async fn handle(&self, _request: Request, _resolve: Resolve<'_>) -> Response {
        StatusCode::FORBIDDEN.into_response()
    }
}

#[tokio::test]
async fn stages_run_in_listed_order_around_handler() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let stages: Vec<Arc<dyn Interceptor>> = vec![
        Arc::new(Recorder { label: "first", log: Arc::clone(&log) }),
        Arc::new(Recorder { label: "second", log: Arc::clone(&log) }),
    ];
    let response = get_path(router(stages), "/", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["first:before", "second:before", "second:after", "first:after"]
    );
}

#[tokio::test]
async fn success_without_resolving_is_contract_violation() {
    let response = get_path(router(vec![Arc::new(SwallowsRequest)]), "/", None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn short_circuit_with_error_is_allowed() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let stages: Vec<Arc<dyn Interceptor>> =
        vec![Arc::new(Rejects), Arc::new(Recorder { label: "inner", log: Arc::clone(&log) })];
    let response = get_path(router(stages), "/", None).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn empty_sequence_goes_straight_to_handler() {
    let response = get_path(router(Vec::new()), "/", None).await;
    assert_eq!(body_text(response).await, "home");
}

#[test]
fn sequence_reports_stage_names() {
    let stages: Vec<Arc<dyn Interceptor>> =
        vec![Arc::new(BackendContext::new(ApiClient::new("http://x"))), Arc::new(AccessGuard::default())];
    assert_eq!(Sequence::new(stages).names(), vec!["backend-context", "access-guard"]);
}
