//! Session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Constructed once by the front end and passed by reference to the router
//! and screens. Publishes [`SessionState`] through a `watch` channel so the
//! router can re-render on every change.
//!
//! TRADE-OFFS
//! ==========
//! Overlapping operations are not serialized here. Two concurrent sign-ins
//! race on `loading` and `user`; screens guard against resubmission instead.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tokio::sync::{OnceCell, watch};
use tracing::{info, warn};

use super::storage::KeyValueStore;
use crate::net::api::AuthClient;
use crate::net::types::{AuthFailure, SignInRequest, SignUpRequest, User};

/// Authentication state tracking the current user and loading status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub loading: bool,
    /// Set once the startup restore has finished.
    pub restored: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self { user: None, loading: true, restored: false }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// Blocking message for the user after an operation completes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn success(title: &str, message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, title: title.to_owned(), message: message.into() }
    }

    fn failure(title: &str, message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Failure, title: title.to_owned(), message: message.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == NoticeKind::Success
    }
}

pub struct Session<S> {
    client: AuthClient<S>,
    state: watch::Sender<SessionState>,
    restored: OnceCell<()>,
}

impl<S: KeyValueStore> Session<S> {
    #[must_use]
    pub fn new(client: AuthClient<S>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { client, state, restored: OnceCell::new() }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Rehydrate the user from storage. Only the first call does any work.
    pub async fn init(&self) {
        self.restored
            .get_or_init(|| async {
                self.state.send_modify(|s| s.loading = true);
                let stored = self.client.restore().await;
                if let Some(user) = &stored.user {
                    info!(user_id = user.id, role = %user.role, "session restored");
                }
                self.state.send_modify(|s| {
                    s.user = stored.user;
                    s.loading = false;
                    s.restored = true;
                });
            })
            .await;
    }

    /// Log in. On failure the current user is left untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> Notice {
        self.state.send_modify(|s| s.loading = true);
        let request = SignInRequest { email: email.to_owned(), password: password.to_owned() };
        let result = self.client.sign_in(&request).await;

        match result {
            Ok(user) => {
                let notice =
                    Notice::success("Welcome Back!", format!("Successfully logged in as {}", user.display_name()));
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.user = Some(user);
                });
                notice
            }
            Err(failure) => {
                self.state.send_modify(|s| s.loading = false);
                let message = login_failure_message(&failure);
                warn!(%message, "sign in failed");
                Notice::failure("Login Failed", message)
            }
        }
    }

    /// Register an account. Does not authenticate the session; the user has
    /// to sign in afterwards.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Notice {
        self.state.send_modify(|s| s.loading = true);
        let result = self.client.sign_up(request).await;
        self.state.send_modify(|s| s.loading = false);

        match result {
            Ok(_) => Notice::success(
                "Account Created Successfully!",
                "Please sign in with your email and password to continue.",
            ),
            Err(failure) => {
                let message = failure.to_string();
                warn!(%message, "sign up failed");
                Notice::failure("Validation failed", message)
            }
        }
    }

    /// Log out remotely (best effort) and clear the local user.
    pub async fn sign_out(&self) {
        self.client.sign_out().await;
        self.state.send_modify(|s| s.user = None);
        info!("signed out");
    }
}

fn login_failure_message(failure: &AuthFailure) -> String {
    match failure {
        AuthFailure::FieldErrors(_) => "Invalid email or password".to_owned(),
        other => other.to_string(),
    }
}
