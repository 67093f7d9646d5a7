// HTTP-level tests for the authentication gate
// Drives the full router in-process with tower::ServiceExt::oneshot

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use authgate_core::{
    ApiKeyRecord, InMemoryCredentialStore, JwtConfig, TokenClaims, TokenCodec, TokenIssuer,
    TokenPair,
};
use authgate_server::{build_router, routes, AppState};
use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

const DEV_KEY: &str = "dev-opaque-key";

struct TestApp {
    router: Router,
    issuer: TokenIssuer,
    config: JwtConfig,
}

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-access-secret".to_string(),
        refresh_secret: Some("test-refresh-secret".to_string()),
        ..Default::default()
    }
}

fn test_app_with_prefix(api_prefix: &str) -> TestApp {
    let config = jwt_config();
    let store = Arc::new(InMemoryCredentialStore::new());
    let mut record = ApiKeyRecord::new("7", "ci");
    record.owner_email = Some("ci@example.com".to_string());
    store.insert_opaque(DEV_KEY, record);

    let mut expired = ApiKeyRecord::new("8", "old");
    expired.expires_at = Some(chrono::Utc::now() - chrono::Duration::days(1));
    store.insert_opaque("expired-key", expired);

    let state = AppState::new(&config, store, routes::route_policy(api_prefix).unwrap());
    TestApp {
        router: build_router(state, api_prefix),
        issuer: TokenIssuer::new(config.clone()),
        config,
    }
}

fn test_app() -> TestApp {
    test_app_with_prefix("")
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_public_route_ignores_garbage_credentials() {
    let app = test_app();
    let request = get("/health")
        .header(header::AUTHORIZATION, "Bearer garbage")
        .header("x-api-key", "garbage")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_credentials() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/v1/me").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "missing_credentials");
    assert_eq!(
        body["error"],
        "Authentication required. Provide either Authorization Bearer token or X-API-Key header."
    );
}

#[tokio::test]
async fn test_unknown_route_is_protected() {
    let app = test_app();
    let (status, _) = send(&app.router, get("/v1/nope").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_bearer_token() {
    let app = test_app();
    let token = app
        .issuer
        .generate_access_token("42", Some("neo@example.com"), Some("neo"))
        .unwrap();

    let request = get("/v1/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "42");
    assert_eq!(body["email"], "neo@example.com");
    assert_eq!(body["auth_method"], "jwt");
    assert!(body.get("api_key").is_none());
}

#[tokio::test]
async fn test_both_credentials_is_bad_request() {
    let app = test_app();
    let token = app.issuer.generate_access_token("42", None, None).unwrap();

    let request = get("/v1/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header("x-api-key", DEV_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "ambiguous_credentials");
    assert_eq!(
        body["error"],
        "Cannot use both Authorization and X-API-Key headers simultaneously. Use only one authentication method."
    );
}

#[tokio::test]
async fn test_opaque_api_key_header() {
    let app = test_app();
    let request = get("/v1/me")
        .header("x-api-key", DEV_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "7");
    assert_eq!(body["email"], "ci@example.com");
    assert_eq!(body["auth_method"], "api_key");
    assert_eq!(body["api_key"]["name"], "ci");
    assert!(body["api_key"]["last_used_at"].is_string());
}

#[tokio::test]
async fn test_api_key_query_parameter() {
    let app = test_app();
    let uri = format!("/v1/me?apiKey={DEV_KEY}");
    let (status, body) = send(&app.router, get(&uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "7");
}

#[tokio::test]
async fn test_unknown_and_expired_api_keys() {
    let app = test_app();
    let request = get("/v1/me")
        .header("x-api-key", "not-a-key")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "invalid_credentials");
    assert_eq!(body["error"], "Invalid API key");

    let request = get("/v1/me")
        .header("x-api-key", "expired-key")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "API key expired");
}

#[tokio::test]
async fn test_expired_bearer_token() {
    let app = test_app();
    let now = chrono::Utc::now().timestamp();
    let token = TokenCodec::new(&app.config.secret, 0, true)
        .sign(&TokenClaims {
            sub: Some("42".to_string()),
            token_type: Some("access".to_string()),
            iat: Some(now - 7200),
            exp: Some(now - 3600),
            ..Default::default()
        })
        .unwrap();

    let request = get("/v1/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "invalid_credentials");
    assert!(body["error"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn test_refresh_token_rejected_as_bearer() {
    let app = test_app();
    let refresh = app.issuer.generate_refresh_token("42", None, None).unwrap();

    let request = get("/v1/me")
        .header(header::AUTHORIZATION, format!("Bearer {refresh}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token type. Expected access token.");
}

fn refresh_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let app = test_app();
    let refresh = app
        .issuer
        .generate_refresh_token("42", None, Some("neo"))
        .unwrap();

    let request = refresh_request("/v1/auth/refresh", json!({ "refreshToken": refresh }));
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);

    let pair: TokenPair = serde_json::from_value(body).unwrap();
    assert_eq!(pair.token_type, "Bearer");

    // The new access token passes the gate
    let request = get("/v1/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", pair.access_token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "neo");
}

#[tokio::test]
async fn test_refresh_from_bearer_header() {
    let app = test_app();
    let refresh = app.issuer.generate_refresh_token("42", None, None).unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/refresh")
        .header(header::AUTHORIZATION, format!("Bearer {refresh}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_access_token_and_missing_token() {
    let app = test_app();
    let access = app.issuer.generate_access_token("42", None, None).unwrap();

    let request = refresh_request("/v1/auth/refresh", json!({ "refreshToken": access }));
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "invalid_credentials");

    let request = refresh_request("/v1/auth/refresh", json!({}));
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "missing_credentials");
    assert_eq!(body["error"], "Refresh token required");
}

/// Collects formatted log output in memory
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn test_refresh_rejections_are_logged_with_request_context() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = test_app();
    let client: SocketAddr = "203.0.113.9:4711".parse().unwrap();
    let router = app.router.layer(MockConnectInfo(client));

    let request = refresh_request("/v1/auth/refresh", json!({}));
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Refresh token required");

    let output = logs.contents();
    assert!(output.contains("authentication rejected"), "{output}");
    assert!(output.contains("method=POST"), "{output}");
    assert!(output.contains("path=\"/v1/auth/refresh\""), "{output}");
    assert!(output.contains("203.0.113.9:4711"), "{output}");
    assert!(output.contains("kind=missing_credentials"), "{output}");

    let request = refresh_request("/v1/auth/refresh", json!({ "refreshToken": "garbage" }));
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(logs.contents().contains("kind=invalid_credentials"));
}

#[tokio::test]
async fn test_api_prefix() {
    let app = test_app_with_prefix("/api");
    let refresh = app.issuer.generate_refresh_token("42", None, None).unwrap();

    let request = refresh_request("/api/v1/auth/refresh", json!({ "refreshToken": refresh }));
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);

    let request = get("/api/v1/me")
        .header("x-api-key", DEV_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app.router, get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
}

fn upgrade_request(uri: &str) -> axum::http::request::Builder {
    get(uri)
        .header(header::CONNECTION, "upgrade")
        .header(header::UPGRADE, "websocket")
        .header(header::SEC_WEBSOCKET_VERSION, "13")
        .header(header::SEC_WEBSOCKET_KEY, "dGhlIHNhbXBsZSBub25jZQ==")
}

#[tokio::test]
async fn test_websocket_upgrade_goes_through_gate() {
    let app = test_app();

    let request = upgrade_request("/v1/ws").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "missing_credentials");

    // Authenticated via query parameter; the in-process request cannot actually upgrade
    let uri = format!("/v1/ws?apiKey={DEV_KEY}");
    let request = upgrade_request(&uri).body(Body::empty()).unwrap();
    let (status, _) = send(&app.router, request).await;
    assert_ne!(status, StatusCode::UNAUTHORIZED);
    assert_ne!(status, StatusCode::BAD_REQUEST);
}
