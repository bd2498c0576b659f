use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use posturator::auth::{
    AuthError, AuthSession, AuthState, Destination, FileTokenStore, HttpAuthClient,
    MemoryTokenStore, RegistrationForm, Role, TokenStore,
};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Backend {
    authorization: Arc<Mutex<Vec<Option<String>>>>,
}

impl Backend {
    fn seen_authorization(&self) -> Vec<Option<String>> {
        self.authorization.lock().expect("backend mutex poisoned").clone()
    }

    fn record(&self, headers: &HeaderMap) {
        let value = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.authorization
            .lock()
            .expect("backend mutex poisoned")
            .push(value);
    }
}

fn mint(username: &str, role: &str, exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    encode(
        &Header::default(),
        &json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "role": role,
            "_id": format!("id-{username}"),
            "iat": now,
            "exp": now + exp_offset_secs,
        }),
        &EncodingKey::from_secret(b"backend-only-secret"),
    )
    .expect("token encodes")
}

async fn login(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    backend.record(&headers);
    match body["username"].as_str().unwrap_or_default() {
        "sam" => Json(json!({ "token": mint("sam", "USER", 3600) })).into_response(),
        "root" => Json(json!({ "token": mint("root", "ADMIN", 3600) })).into_response(),
        "stale" => Json(json!({ "token": mint("stale", "USER", -60) })).into_response(),
        "mute" => StatusCode::BAD_GATEWAY.into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response(),
    }
}

async fn register(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    backend.record(&headers);
    match body["username"].as_str().unwrap_or_default() {
        "taken" => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Username already exists" })),
        )
            .into_response(),
        "instant" => (
            StatusCode::CREATED,
            Json(json!({ "token": mint("instant", "USER", 3600), "message": "User registered" })),
        )
            .into_response(),
        _ => (
            StatusCode::CREATED,
            Json(json!({ "message": "User registered" })),
        )
            .into_response(),
    }
}

async fn spawn_backend() -> (String, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/user/login", post(login))
        .route("/api/user/register", post(register))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("backend serves");
    });

    (format!("http://{addr}/api"), backend)
}

fn client(base_url: &str) -> Arc<HttpAuthClient> {
    Arc::new(HttpAuthClient::new(base_url, Duration::from_secs(5)).expect("client builds"))
}

#[tokio::test]
async fn login_stores_token_and_routes_by_role() {
    let (base_url, backend) = spawn_backend().await;
    let api = client(&base_url);
    let store = Arc::new(MemoryTokenStore::default());
    let mut session = AuthSession::load(api.clone(), store.clone()).expect("session loads");
    assert_eq!(session.destination(), Destination::Login);

    let claims = session.login("sam", "hunter22").await.expect("login succeeds");
    assert_eq!(claims.username, "sam");
    assert_eq!(claims.role, Role::User);

    assert_eq!(session.destination(), Destination::Questionnaire);
    let stored = store.get().expect("store readable").expect("token stored");
    assert_eq!(api.bearer().as_deref(), Some(stored.as_str()));

    // later calls carry the bearer header
    let form = RegistrationForm {
        username: "friend".to_string(),
        email: "friend@example.com".to_string(),
        password: "pw".to_string(),
        confirm_password: "pw".to_string(),
    };
    let registered = session.register(&form).await.expect("registration succeeds");
    assert!(registered.is_none());
    let seen = backend.seen_authorization();
    assert_eq!(seen[0], None);
    assert_eq!(seen[1], Some(format!("Bearer {stored}")));
}

#[tokio::test]
async fn admin_login_routes_to_admin_area() {
    let (base_url, _) = spawn_backend().await;
    let mut session = AuthSession::load(client(&base_url), Arc::new(MemoryTokenStore::default()))
        .expect("session loads");

    session.login("root", "pw").await.expect("login succeeds");

    assert_eq!(session.destination(), Destination::Admin);
}

#[tokio::test]
async fn expired_login_token_is_refused() {
    let (base_url, _) = spawn_backend().await;
    let store = Arc::new(MemoryTokenStore::default());
    let mut session =
        AuthSession::load(client(&base_url), store.clone()).expect("session loads");

    let error = session.login("stale", "pw").await.expect_err("token expired");

    assert!(matches!(error, AuthError::TokenExpired));
    assert_eq!(error.to_string(), "Token expired");
    assert_eq!(store.get().expect("store readable"), None);
    assert_eq!(session.state(), &AuthState::SignedOut);
}

#[tokio::test]
async fn unauthorized_response_clears_the_stored_token() {
    let (base_url, _) = spawn_backend().await;
    let api = client(&base_url);
    let store = Arc::new(MemoryTokenStore::with_token(mint("sam", "USER", 3600)));
    let mut session = AuthSession::load(api.clone(), store.clone()).expect("session loads");
    assert!(session.state().is_signed_in());

    let error = session.login("mallory", "guess").await.expect_err("rejected");

    assert_eq!(error.to_string(), "Invalid credentials");
    assert_eq!(store.get().expect("store readable"), None);
    assert!(api.bearer().is_none());
    assert_eq!(session.destination(), Destination::Login);
}

#[tokio::test]
async fn failure_without_message_uses_fallback() {
    let (base_url, _) = spawn_backend().await;
    let mut session = AuthSession::load(client(&base_url), Arc::new(MemoryTokenStore::default()))
        .expect("session loads");

    let error = session.login("mute", "pw").await.expect_err("backend error");

    assert!(matches!(error, AuthError::Rejected(_)));
    assert_eq!(error.to_string(), "Login failed");
}

#[tokio::test]
async fn registration_errors_surface_backend_message() {
    let (base_url, _) = spawn_backend().await;
    let mut session = AuthSession::load(client(&base_url), Arc::new(MemoryTokenStore::default()))
        .expect("session loads");
    let form = RegistrationForm {
        username: "taken".to_string(),
        email: "taken@example.com".to_string(),
        password: "pw".to_string(),
        confirm_password: "pw".to_string(),
    };

    let error = session.register(&form).await.expect_err("duplicate");

    assert_eq!(error.to_string(), "Username already exists");
}

#[tokio::test]
async fn registration_token_signs_the_user_in() {
    let (base_url, _) = spawn_backend().await;
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(FileTokenStore::new(dir.path().join("token.json")));
    let mut session =
        AuthSession::load(client(&base_url), store.clone()).expect("session loads");
    let form = RegistrationForm {
        username: "instant".to_string(),
        email: "instant@example.com".to_string(),
        password: "pw".to_string(),
        confirm_password: "pw".to_string(),
    };

    let claims = session
        .register(&form)
        .await
        .expect("registration succeeds")
        .expect("token returned");
    assert_eq!(claims.username, "instant");

    // a fresh process picks the stored token back up
    let reloaded =
        AuthSession::load(client(&base_url), store.clone()).expect("session reloads");
    assert_eq!(reloaded.destination(), Destination::Questionnaire);
}

#[tokio::test]
async fn stale_or_garbled_stored_tokens_are_discarded_on_load() {
    let (base_url, _) = spawn_backend().await;

    for token in [mint("sam", "USER", -1), "garbled".to_string()] {
        let store = Arc::new(MemoryTokenStore::with_token(token));
        let session = AuthSession::load(client(&base_url), store.clone()).expect("session loads");
        assert_eq!(session.state(), &AuthState::SignedOut);
        assert_eq!(store.get().expect("store readable"), None);
    }
}

#[tokio::test]
async fn logout_forgets_everything() {
    let (base_url, _) = spawn_backend().await;
    let api = client(&base_url);
    let store = Arc::new(MemoryTokenStore::default());
    let mut session = AuthSession::load(api.clone(), store.clone()).expect("session loads");
    session.login("sam", "pw").await.expect("login succeeds");

    session.logout().expect("logout succeeds");

    assert_eq!(store.get().expect("store readable"), None);
    assert!(api.bearer().is_none());
    assert_eq!(session.destination(), Destination::Login);
}
