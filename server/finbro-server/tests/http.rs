use async_trait::async_trait;
use auth_gateway::{
    AuthComponents, AuthOrchestrator, JwtSessionService, OrchestratorConfig, SessionConfig,
};
use auth_identity::{Argon2PasswordHasher, DomainAllowlist, InMemoryCredentialStore, ManualClock};
use auth_oauth::{
    FederatedIdentityClient, FederatedProfile, OAuthError, ProviderToken, StateTokenRegistry,
};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration as ChronoDuration;
use finbro_server::{create_app, FinbroServer, ServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Provider double: a fixed profile, or an exchange that always fails
struct StubProvider {
    profile: Option<FederatedProfile>,
}

#[async_trait]
impl FederatedIdentityClient for StubProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://accounts.example.test/auth?state={state}")
    }

    async fn exchange_code(&self, _code: &str) -> Result<ProviderToken, OAuthError> {
        match self.profile {
            Some(_) => Ok(ProviderToken::new("provider-access-token")),
            None => Err(OAuthError::ExchangeFailed("invalid_grant".to_string())),
        }
    }

    async fn fetch_profile(&self, _token: &ProviderToken) -> Result<FederatedProfile, OAuthError> {
        self.profile
            .clone()
            .ok_or_else(|| OAuthError::ProfileFetchFailed("no profile".to_string()))
    }
}

struct TestApp {
    router: Router,
    clock: Arc<ManualClock>,
}

fn test_app(profile: Option<FederatedProfile>) -> TestApp {
    let clock = Arc::new(ManualClock::starting_now());
    let sessions = JwtSessionService::with_clock(
        SessionConfig::new("http-test-secret-0123456789abcdef", ChronoDuration::hours(24)),
        clock.clone(),
    );

    let orchestrator = AuthOrchestrator::new(
        AuthComponents {
            store: Arc::new(InMemoryCredentialStore::with_clock(clock.clone())),
            hasher: Arc::new(Argon2PasswordHasher::with_params(1024, 1, 1).unwrap()),
            sessions: Arc::new(sessions),
            provider: Arc::new(StubProvider { profile }),
            states: Arc::new(StateTokenRegistry::new(ChronoDuration::minutes(5), clock.clone())),
            classification: Arc::new(DomainAllowlist::new(["acme.com"])),
        },
        OrchestratorConfig {
            upstream_timeout: Duration::from_secs(2),
            ..OrchestratorConfig::default()
        },
    );

    let config = ServerConfig::from_lookup(|_| None).unwrap();
    TestApp {
        router: create_app(FinbroServer::from_parts(config, orchestrator)),
        clock,
    }
}

fn jane() -> FederatedProfile {
    FederatedProfile {
        email: "Jane.Doe@Example.com".to_string(),
        display_name: "Jane Doe".to_string(),
        picture_url: None,
        email_verified: true,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            Method::POST,
            "/api/v1/auth/register",
            &json!({
                "email": email,
                "password": password,
                "first_name": "Jane",
                "last_name": "Doe"
            }),
            None,
        ),
    )
    .await
}

#[tokio::test]
async fn welcome_and_health_respond() {
    let app = test_app(None);

    let (status, body) = send(&app.router, get("/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to Finbro API");

    let (status, body) = send(&app.router, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn register_creates_user_and_session() {
    let app = test_app(None);

    let (status, body) = register(&app.router, "Jane@Example.com", "correct horse").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["data"]["expires_at"].is_string());

    let user = &body["data"]["user"];
    assert_eq!(user["email"], "jane@example.com");
    assert_eq!(user["first_name"], "Jane");
    assert_eq!(user["user_type"], "individual");
    assert!(user.get("password_hash").is_none());
}

#[tokio::test]
async fn business_domains_register_as_business() {
    let app = test_app(None);
    let (status, body) = register(&app.router, "ceo@acme.com", "correct horse").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["user_type"], "business");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app(None);
    register(&app.router, "jane@example.com", "correct horse").await;

    let (status, body) = register(&app.router, "JANE@example.com", "another pass").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error_type"], "conflict");
    assert_eq!(body["code"], "CONFLICT_3001");
    assert!(body["error_id"].is_string());
}

#[tokio::test]
async fn invalid_registration_is_a_validation_error() {
    let app = test_app(None);

    let (status, body) = register(&app.router, "not-an-email", "correct horse").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");

    let (status, _) = register(&app.router, "jane@example.com", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, body) = send(&app.router, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = test_app(None);
    register(&app.router, "jane@example.com", "correct horse").await;

    let (ok_status, ok_body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            &json!({"email": "jane@example.com", "password": "correct horse"}),
            None,
        ),
    )
    .await;
    assert_eq!(ok_status, StatusCode::OK);
    assert!(ok_body["data"]["token"].is_string());

    let (wrong_status, wrong_body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            &json!({"email": "jane@example.com", "password": "wrong horse"}),
            None,
        ),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            &json!({"email": "nobody@example.com", "password": "wrong horse"}),
            None,
        ),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["message"], "Invalid credentials");
    assert_eq!(wrong_body["message"], unknown_body["message"]);
    assert_eq!(wrong_body["code"], unknown_body["code"]);
}

#[tokio::test]
async fn refresh_requires_a_valid_bearer_token() {
    let app = test_app(None);
    let (_, body) = register(&app.router, "jane@example.com", "correct horse").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app.router,
        json_request(Method::POST, "/api/v1/auth/refresh", &json!({}), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app.router,
        json_request(Method::POST, "/api/v1/auth/refresh", &json!({}), Some("garbage")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app.router,
        json_request(Method::POST, "/api/v1/auth/refresh", &json!({}), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn expired_sessions_are_rejected() {
    let app = test_app(None);
    let (_, body) = register(&app.router, "jane@example.com", "correct horse").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    app.clock.advance(ChronoDuration::hours(24) + ChronoDuration::seconds(1));

    let (status, body) = send(&app.router, get("/api/v1/users/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTH_2002");
}

#[tokio::test]
async fn profile_can_be_read_and_updated() {
    let app = test_app(None);
    let (_, body) = register(&app.router, "jane@example.com", "correct horse").await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app.router, get("/api/v1/users/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "jane@example.com");

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/api/v1/users/profile",
            &json!({"first_name": "  Janet ", "last_name": "Smith"}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["first_name"], "Janet");
    assert_eq!(body["data"]["last_name"], "Smith");

    let (status, _) = send(
        &app.router,
        json_request(
            Method::PUT,
            "/api/v1/users/profile",
            &json!({"first_name": "x".repeat(51), "last_name": "Smith"}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app.router, get("/api/v1/users/profile", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn google_flow_end_to_end() {
    let app = test_app(Some(jane()));

    let (status, start) = send(&app.router, get("/api/v1/auth/google", None)).await;
    assert_eq!(status, StatusCode::OK);
    let state = start["state"].as_str().unwrap().to_string();
    assert_eq!(state.len(), 64);
    assert!(start["authorization_url"]
        .as_str()
        .unwrap()
        .contains(&state));

    let callback = format!("/api/v1/auth/google/callback?code=abc&state={state}");
    let (status, body) = send(&app.router, get(&callback, None)).await;
    assert_eq!(status, StatusCode::OK);
    let user = &body["data"]["user"];
    assert_eq!(user["email"], "jane.doe@example.com");
    assert_eq!(user["first_name"], "Jane");
    assert_eq!(user["last_name"], "Doe");
    assert_eq!(user["provider"], "google");

    let (status, body) = send(&app.router, get(&callback, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTH_2004");
}

#[tokio::test]
async fn callback_errors_map_to_statuses() {
    let app = test_app(None);

    let (status, _) = send(
        &app.router,
        get("/api/v1/auth/google/callback?code=abc&state=unknown", None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, start) = send(&app.router, get("/api/v1/auth/google", None)).await;
    let state = start["state"].as_str().unwrap().to_string();
    let (status, body) = send(
        &app.router,
        get(&format!("/api/v1/auth/google/callback?state={state}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");

    let (_, start) = send(&app.router, get("/api/v1/auth/google", None)).await;
    let state = start["state"].as_str().unwrap().to_string();
    let (status, body) = send(
        &app.router,
        get(&format!("/api/v1/auth/google/callback?code=abc&state={state}"), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error_type"], "network_error");
    assert_eq!(body["code"], "UPSTREAM_5001");
}
