// Authgate server
// Decision: Development mode runs on the in-memory credential store, seeded from AUTH_DEV_API_KEYS

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use authgate_core::telemetry::{init_tracing, TelemetryConfig};
use authgate_core::{InMemoryCredentialStore, JwtConfig};
use authgate_server::{
    build_router, config::ServerConfig, routes, seed_dev_keys, AppState, DEV_USER_ID,
};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Configure via environment variables:
    // - RUST_LOG: Log filter (default: "authgate_server=debug,authgate_core=debug,tower_http=debug")
    // - LOG_FORMAT=json: Structured output
    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.service_name == "authgate" {
        telemetry_config.service_name = "authgate-server".to_string();
    }
    init_tracing(&telemetry_config)?;

    tracing::info!("authgate-server starting...");

    let jwt_config = JwtConfig::from_env();
    let config = ServerConfig::from_env()?;
    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }

    let store = Arc::new(InMemoryCredentialStore::new());
    match seed_dev_keys(&store, &config.dev_api_keys) {
        Some(generated) => tracing::warn!(
            user_id = DEV_USER_ID,
            key = %generated.key,
            prefix = %generated.key_prefix,
            "AUTH_DEV_API_KEYS not set, generated a development API key"
        ),
        None => tracing::warn!(count = store.len(), "Seeded development API keys"),
    }

    let route_policy =
        routes::route_policy(&config.api_prefix).context("Failed to build route policy")?;
    let state = AppState::new(&jwt_config, store, route_policy);

    let app = build_router(state, &config.api_prefix).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("HTTP server listening on {}", config.addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
