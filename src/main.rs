use member_portal::config::PortalConfig;
use member_portal::fetch::ApiClient;
use member_portal::middleware::AccessGuard;
use member_portal::routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let config = PortalConfig::from_env()?;
    let client = ApiClient::new(&config.backend_url);
    if !config.guard_enforce {
        tracing::warn!("access guard enforcement disabled; page requests are not authenticated");
    }

    let app = routes::app(client, AccessGuard::new(config.guard_enforce));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, backend = %config.backend_url, "member portal listening");
    axum::serve(listener, app).await?;
    Ok(())
}
