// Authgate HTTP server library
// Decision: Shared library for the binary and the HTTP-level tests
// Decision: The gate middleware wraps the whole router, public routes are decided by RoutePolicy

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

use authgate_core::{ApiKeyRecord, GeneratedApiKey, InMemoryCredentialStore};
use axum::{middleware::from_fn_with_state, routing::get, Router};

use config::DevApiKey;

pub use error::AuthError;
pub use state::AppState;

/// Build the application router with the gate applied to every route
pub fn build_router(state: AppState, api_prefix: &str) -> Router {
    let app = Router::new()
        .route("/health", get(routes::health))
        .merge(build_router_with_prefix(routes::routes(state.clone()), api_prefix));

    app.layer(from_fn_with_state(state, middleware::auth_gate))
}

/// Owner of the key generated when no development keys are configured
pub const DEV_USER_ID: &str = "dev";

/// Seed the development store with the configured keys.
/// With none configured, a fresh key is generated for DEV_USER_ID and returned.
pub fn seed_dev_keys(
    store: &InMemoryCredentialStore,
    dev_keys: &[DevApiKey],
) -> Option<GeneratedApiKey> {
    for dev_key in dev_keys {
        store.insert_opaque(&dev_key.key, ApiKeyRecord::new(&dev_key.user_id, "dev"));
    }
    if !dev_keys.is_empty() {
        return None;
    }

    let (generated, _) = store.issue_opaque(ApiKeyRecord::new(DEV_USER_ID, "dev-generated"));
    Some(generated)
}

/// Build router with optional API prefix
fn build_router_with_prefix(api_routes: Router, api_prefix: &str) -> Router {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}
