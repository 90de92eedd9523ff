use std::sync::Arc;

use super::*;
use crate::config::ClientConfig;
use crate::net::test_helpers::{
    MockBackend, failure_body, silent_base_url, success_body, unreachable_base_url, user_value,
};
use crate::net::types::Role;
use crate::state::storage::{MemoryStore, TOKEN_KEY, USER_KEY};

fn session_for(base_url: &str, store: &Arc<MemoryStore>) -> Session<Arc<MemoryStore>> {
    let config = ClientConfig::new(base_url).unwrap();
    Session::new(AuthClient::new(&config, Arc::clone(store)).unwrap())
}

fn registration() -> SignUpRequest {
    SignUpRequest {
        first_name: "Sam".to_owned(),
        last_name: "Fade".to_owned(),
        email: "sam@example.com".to_owned(),
        phone: "0334788231".to_owned(),
        password: "longenough1".to_owned(),
        password_confirmation: "longenough1".to_owned(),
        role: Role::Barber,
    }
}

// =============================================================
// init
// =============================================================

#[test]
fn state_starts_loading_and_unrestored() {
    let state = SessionState::default();
    assert!(state.loading);
    assert!(!state.restored);
    assert!(state.user.is_none());
}

#[tokio::test]
async fn init_with_empty_storage_settles_unauthenticated() {
    let store = Arc::new(MemoryStore::new());
    let session = session_for("http://127.0.0.1:9", &store);

    session.init().await;
    let state = session.state();
    assert!(state.user.is_none());
    assert!(!state.loading);
    assert!(state.restored);
}

#[tokio::test]
async fn init_restores_persisted_user() {
    let store = Arc::new(MemoryStore::new());
    let user = user_value(Role::Shop).to_string();
    store.set_many(&[(TOKEN_KEY, "abc"), (USER_KEY, user.as_str())]).await.unwrap();
    let session = session_for("http://127.0.0.1:9", &store);

    session.init().await;
    assert_eq!(session.state().user.map(|u| u.role), Some(Role::Shop));
}

#[tokio::test]
async fn init_runs_once() {
    let store = Arc::new(MemoryStore::new());
    let session = session_for("http://127.0.0.1:9", &store);
    session.init().await;

    let user = user_value(Role::Customer).to_string();
    store.set_many(&[(TOKEN_KEY, "late"), (USER_KEY, user.as_str())]).await.unwrap();
    session.init().await;
    assert!(session.state().user.is_none());
}

// =============================================================
// sign_in
// =============================================================

#[tokio::test]
async fn sign_in_success_sets_user() {
    let backend = MockBackend::start(&[("/auth/login", 200, success_body("tok", Role::Customer))]).await;
    let store = Arc::new(MemoryStore::new());
    let session = session_for(&backend.base_url, &store);
    session.init().await;

    let notice = session.sign_in("sam@example.com", "longenough1").await;
    assert!(notice.is_success());
    assert_eq!(notice.title, "Welcome Back!");
    assert_eq!(notice.message, "Successfully logged in as Sam Fade");

    let state = session.state();
    assert_eq!(state.user.map(|u| u.email), Some("sam@example.com".to_owned()));
    assert!(!state.loading);
}

#[tokio::test]
async fn sign_in_rejected_keeps_user_absent() {
    let backend = MockBackend::start(&[("/auth/login", 401, failure_body("Invalid credentials"))]).await;
    let store = Arc::new(MemoryStore::new());
    let session = session_for(&backend.base_url, &store);
    session.init().await;

    let notice = session.sign_in("sam@example.com", "wrongpass").await;
    assert_eq!(notice.kind, NoticeKind::Failure);
    assert_eq!(notice.title, "Login Failed");
    assert_eq!(notice.message, "Invalid credentials");

    let state = session.state();
    assert!(state.user.is_none());
    assert!(!state.loading);
}

#[tokio::test]
async fn sign_in_network_failure_reports_message() {
    let base = unreachable_base_url().await;
    let store = Arc::new(MemoryStore::new());
    let session = session_for(&base, &store);

    let notice = session.sign_in("sam@example.com", "longenough1").await;
    assert_eq!(notice.message, "Network error occurred");
    assert!(!session.is_loading());
}

#[tokio::test]
async fn sign_in_timeout_clears_loading() {
    let base = silent_base_url().await;
    let mut config = ClientConfig::new(&base).unwrap();
    config.timeouts.request_secs = 1;
    let store = Arc::new(MemoryStore::new());
    let session = Session::new(AuthClient::new(&config, Arc::clone(&store)).unwrap());
    session.init().await;

    let notice = session.sign_in("sam@example.com", "longenough1").await;
    assert!(!notice.is_success());
    assert_eq!(notice.message, "Network error occurred");
    assert!(!session.is_loading());
    assert!(session.state().user.is_none());
}

#[tokio::test]
async fn sign_in_publishes_loading_transitions() {
    let backend = MockBackend::start(&[("/auth/login", 200, success_body("tok", Role::Barber))]).await;
    let store = Arc::new(MemoryStore::new());
    let session = session_for(&backend.base_url, &store);
    session.init().await;
    let mut rx = session.subscribe();
    let _ = rx.borrow_and_update();

    session.sign_in("sam@example.com", "longenough1").await;
    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert!(!state.loading);
    assert!(state.user.is_some());
}

#[test]
fn field_errors_map_to_generic_login_message() {
    let mut errors = crate::net::types::FieldErrors::new();
    errors.insert("email".to_owned(), vec!["bad".to_owned()]);
    assert_eq!(login_failure_message(&AuthFailure::FieldErrors(errors)), "Invalid email or password");
    assert_eq!(login_failure_message(&AuthFailure::InvalidResponse), "Invalid server response");
}

// =============================================================
// sign_up
// =============================================================

#[tokio::test]
async fn sign_up_success_persists_but_does_not_authenticate() {
    let backend = MockBackend::start(&[("/auth/register", 201, success_body("abc", Role::Barber))]).await;
    let store = Arc::new(MemoryStore::new());
    let session = session_for(&backend.base_url, &store);
    session.init().await;

    let notice = session.sign_up(&registration()).await;
    assert!(notice.is_success());
    assert_eq!(notice.title, "Account Created Successfully!");
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("abc"));

    let state = session.state();
    assert!(state.user.is_none());
    assert!(!state.loading);
}

#[tokio::test]
async fn sign_up_then_sign_in_authenticates() {
    let backend = MockBackend::start(&[
        ("/auth/register", 201, success_body("abc", Role::Barber)),
        ("/auth/login", 200, success_body("def", Role::Barber)),
    ])
    .await;
    let store = Arc::new(MemoryStore::new());
    let session = session_for(&backend.base_url, &store);
    session.init().await;

    session.sign_up(&registration()).await;
    assert!(session.state().user.is_none());

    session.sign_in("sam@example.com", "longenough1").await;
    assert!(session.state().user.is_some());
    assert_eq!(store.get(TOKEN_KEY).as_deref(), Some("def"));
}

#[tokio::test]
async fn sign_up_field_errors_render_as_lines() {
    let body = serde_json::json!({
        "success": false,
        "message": "invalid",
        "errors": { "email": ["taken"], "phone": ["too short"] }
    })
    .to_string();
    let backend = MockBackend::start(&[("/auth/register", 422, body)]).await;
    let store = Arc::new(MemoryStore::new());
    let session = session_for(&backend.base_url, &store);

    let notice = session.sign_up(&registration()).await;
    assert_eq!(notice.title, "Validation failed");
    assert_eq!(notice.message, "email: taken\nphone: too short");
    assert!(store.is_empty());
}

// =============================================================
// sign_out
// =============================================================

#[tokio::test]
async fn sign_out_clears_user_even_when_server_fails() {
    let backend = MockBackend::start(&[
        ("/auth/login", 200, success_body("tok", Role::Shop)),
        ("/auth/logout", 503, "unavailable".to_owned()),
    ])
    .await;
    let store = Arc::new(MemoryStore::new());
    let session = session_for(&backend.base_url, &store);
    session.init().await;
    session.sign_in("sam@example.com", "longenough1").await;

    session.sign_out().await;
    assert!(session.state().user.is_none());
    assert!(store.is_empty());
}
