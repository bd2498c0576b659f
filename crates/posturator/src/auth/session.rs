use std::sync::Arc;

use tracing::{info, warn};

use super::client::{AuthApi, AuthError, LoginRequest, RegisterRequest};
use super::store::{TokenStore, TokenStoreError};
use super::token::{decode_claims, DecodedToken, Destination};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedOut,
    SignedIn {
        token: String,
        claims: DecodedToken,
    },
}

impl AuthState {
    pub fn claims(&self) -> Option<&DecodedToken> {
        match self {
            AuthState::SignedOut => None,
            AuthState::SignedIn { claims, .. } => Some(claims),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn { .. })
    }
}

/// Sign-up input as typed, before it is sent to the backend.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<RegisterRequest, AuthError> {
        let username = self.username.trim();
        let email = self.email.trim();
        if username.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(AuthError::InvalidForm(
                "Please fill in all fields".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(AuthError::InvalidForm("Passwords do not match".to_string()));
        }

        Ok(RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Client-side sign-in state backed by a token store and the account API.
pub struct AuthSession<A, S> {
    api: Arc<A>,
    store: Arc<S>,
    state: AuthState,
}

impl<A, S> AuthSession<A, S>
where
    A: AuthApi,
    S: TokenStore,
{
    /// Restore the stored credential. Expired or unreadable tokens are discarded.
    pub fn load(api: Arc<A>, store: Arc<S>) -> Result<Self, AuthError> {
        Self::load_at(api, store, chrono::Utc::now().timestamp())
    }

    pub fn load_at(api: Arc<A>, store: Arc<S>, now_epoch_secs: i64) -> Result<Self, AuthError> {
        let mut session = Self {
            api,
            store,
            state: AuthState::SignedOut,
        };

        let token = match session.store.get() {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(session),
            Err(error @ TokenStoreError::Corrupt { .. }) => {
                warn!(%error, "stored token unreadable; signing out");
                session.logout()?;
                return Ok(session);
            }
            Err(error) => return Err(error.into()),
        };

        match decode_claims(&token) {
            Ok(claims) if claims.is_active_at(now_epoch_secs) => {
                session.api.set_bearer(Some(&token));
                session.state = AuthState::SignedIn { token, claims };
            }
            Ok(_) => {
                info!("stored token expired; signing out");
                session.logout()?;
            }
            Err(error) => {
                warn!(%error, "stored token unreadable; signing out");
                session.logout()?;
            }
        }

        Ok(session)
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn claims(&self) -> Option<&DecodedToken> {
        self.state.claims()
    }

    pub fn destination(&self) -> Destination {
        Destination::for_claims(self.claims())
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<&DecodedToken, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidForm(
                "Please fill in all fields".to_string(),
            ));
        }
        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let result = self.api.login(&request).await;
        let response = self.guard(result)?;
        let token = response.token.ok_or(AuthError::MissingToken)?;
        self.accept(token)
    }

    /// Create an account. The backend may sign the user in straight away by returning a token.
    pub async fn register(
        &mut self,
        form: &RegistrationForm,
    ) -> Result<Option<&DecodedToken>, AuthError> {
        let request = form.validate()?;
        let result = self.api.register(&request).await;
        let response = self.guard(result)?;
        info!(username = %request.username, "account registered");
        match response.token {
            Some(token) => self.accept(token).map(Some),
            None => Ok(None),
        }
    }

    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.store.clear()?;
        self.api.set_bearer(None);
        if self.state.is_signed_in() {
            info!("signed out");
        }
        self.state = AuthState::SignedOut;
        Ok(())
    }

    fn accept(&mut self, token: String) -> Result<&DecodedToken, AuthError> {
        let claims = decode_claims(&token)?;
        if !claims.is_active() {
            return Err(AuthError::TokenExpired);
        }

        self.store.set(&token)?;
        self.api.set_bearer(Some(&token));
        info!(username = %claims.username, role = %claims.role, "signed in");
        self.state = AuthState::SignedIn { token, claims };

        match &self.state {
            AuthState::SignedIn { claims, .. } => Ok(claims),
            AuthState::SignedOut => Err(AuthError::MissingToken),
        }
    }

    /// A 401 from the backend invalidates whatever credential is held locally.
    fn guard<T>(&mut self, result: Result<T, AuthError>) -> Result<T, AuthError> {
        if let Err(AuthError::Unauthorized(_)) = &result {
            self.logout()?;
        }
        result
    }
}
