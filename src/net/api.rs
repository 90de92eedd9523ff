//! HTTP client for the remote auth API.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wraps `POST /auth/register`, `POST /auth/login` and `POST /auth/logout`,
//! plus a local `restore` that rehydrates the persisted session without
//! touching the network. Each call is independent; the only shared state is
//! the on-device store.
//!
//! ERROR HANDLING
//! ==============
//! Register and login return [`AuthFailure`] values, never panics. Storage is
//! written only after the response envelope is fully parsed, and the token
//! and user entries always move together. Logout failures are logged and
//! swallowed: clearing local storage is authoritative.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::types::{ApiEnvelope, AuthFailure, AuthPayload, SignInRequest, SignUpRequest, User};
use crate::config::ClientConfig;
use crate::state::storage::{KeyValueStore, TOKEN_KEY, USER_KEY};

const REGISTER_PATH: &str = "/auth/register";
const LOGIN_PATH: &str = "/auth/login";
const LOGOUT_PATH: &str = "/auth/logout";

#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Session rehydrated from on-device storage. Either half may be missing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredSession {
    pub token: Option<String>,
    pub user: Option<User>,
}

pub struct AuthClient<S> {
    http: reqwest::Client,
    base_url: String,
    store: S,
}

impl<S: KeyValueStore> AuthClient<S> {
    /// Build a client against `config.base_url`, persisting into `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig, store: S) -> Result<Self, ClientBuildError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ClientBuildError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), store })
    }

    /// Register a new account and persist the returned session.
    ///
    /// # Errors
    ///
    /// Returns server field errors or message, [`AuthFailure::Network`],
    /// [`AuthFailure::InvalidResponse`], or [`AuthFailure::Storage`].
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<User, AuthFailure> {
        let body = self.post_json(REGISTER_PATH, request).await?;
        let payload = ApiEnvelope::parse(&body)?.into_registration()?;
        self.persist(&payload).await?;
        info!(user_id = payload.user.id, role = %payload.user.role, "registration succeeded");
        Ok(payload.user)
    }

    /// Log in and persist the returned session.
    ///
    /// # Errors
    ///
    /// Returns the server message (default `"Invalid credentials"`),
    /// [`AuthFailure::Network`], [`AuthFailure::InvalidResponse`], or
    /// [`AuthFailure::Storage`].
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<User, AuthFailure> {
        debug!(email = %request.email, "attempting sign in");
        let body = self.post_json(LOGIN_PATH, request).await?;
        let payload = ApiEnvelope::parse(&body)?.into_login()?;
        self.persist(&payload).await?;
        info!(user_id = payload.user.id, role = %payload.user.role, "sign in succeeded");
        Ok(payload.user)
    }

    /// Best-effort server logout, then unconditional local clear.
    pub async fn sign_out(&self) {
        let token = match self.store.get_many(&[TOKEN_KEY]).await {
            Ok(mut values) => values.pop().flatten(),
            Err(e) => {
                warn!(error = %e, "could not read stored token for logout");
                None
            }
        };

        if let Some(token) = token {
            let url = self.url(LOGOUT_PATH);
            match self.http.post(url).bearer_auth(&token).send().await {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = response.status().as_u16(), "logout endpoint rejected request");
                }
                Ok(_) => debug!("logout endpoint acknowledged"),
                Err(e) => warn!(error = %e, "logout request failed"),
            }
        }

        if let Err(e) = self.store.remove_many(&[TOKEN_KEY, USER_KEY]).await {
            warn!(error = %e, "failed to clear stored session");
        }
    }

    /// Read the persisted session. Never fails; absence is a valid outcome.
    pub async fn restore(&self) -> StoredSession {
        let values = match self.store.get_many(&[TOKEN_KEY, USER_KEY]).await {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "could not read stored session");
                return StoredSession::default();
            }
        };
        let mut values = values.into_iter();
        let token = values.next().flatten();
        let user = values.next().flatten().and_then(|raw| match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "stored user record is unreadable");
                None
            }
        });
        StoredSession { token, user }
    }

    async fn persist(&self, payload: &AuthPayload) -> Result<(), AuthFailure> {
        let user_json =
            serde_json::to_string(&payload.user).map_err(|e| AuthFailure::Storage(e.to_string()))?;
        self.store
            .set_many(&[(TOKEN_KEY, payload.token.as_str()), (USER_KEY, user_json.as_str())])
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to persist session");
                AuthFailure::Storage(e.to_string())
            })
    }

    async fn post_json(&self, path: &str, body: &impl Serialize) -> Result<String, AuthFailure> {
        let url = self.url(path);
        let response = self.http.post(&url).json(body).send().await.map_err(|e| {
            warn!(%url, error = %e, "auth request failed");
            AuthFailure::Network
        })?;

        let status = response.status().as_u16();
        debug!(%url, status, "auth response received");
        response.text().await.map_err(|e| {
            warn!(%url, status, error = %e, "auth response body unreadable");
            AuthFailure::InvalidResponse
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
