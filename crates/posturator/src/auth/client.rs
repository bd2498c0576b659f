use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::store::TokenStoreError;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body returned by the account backend. Registration may omit the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
}

/// Outbound calls to the account backend.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError>;
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AuthError>;
    /// Bearer credential attached to every later request; `None` removes it.
    fn set_bearer(&self, token: Option<&str>);
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("auth backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Token expired")]
    TokenExpired,
    #[error("token could not be decoded: {0}")]
    MalformedToken(#[from] jsonwebtoken::errors::Error),
    #[error("login response did not include a token")]
    MissingToken,
    #[error("{0}")]
    InvalidForm(String),
    #[error(transparent)]
    Store(#[from] TokenStoreError),
}

/// reqwest-backed client for the `/user/*` endpoints.
pub struct HttpAuthClient {
    http: reqwest::Client,
    base_url: String,
    bearer: RwLock<Option<String>>,
}

impl HttpAuthClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn bearer(&self) -> Option<String> {
        self.bearer.read().expect("bearer lock poisoned").clone()
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<AuthResponse, AuthError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.post(&url).json(body);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }

        debug!(%url, "calling auth backend");
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let parsed: AuthResponse = serde_json::from_str(&text).unwrap_or_default();

        if status.is_success() {
            return Ok(parsed);
        }

        let message = parsed.message.unwrap_or_else(|| fallback.to_string());
        if status == StatusCode::UNAUTHORIZED {
            Err(AuthError::Unauthorized(message))
        } else {
            Err(AuthError::Rejected(message))
        }
    }
}

#[async_trait]
impl AuthApi for HttpAuthClient {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        self.post("/user/login", request, "Login failed").await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AuthError> {
        self.post("/user/register", request, "Registration failed")
            .await
    }

    fn set_bearer(&self, token: Option<&str>) {
        *self.bearer.write().expect("bearer lock poisoned") = token.map(str::to_string);
    }
}
