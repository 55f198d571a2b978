//! End-to-end sign-in against a local HTTP backend.
//!
//! A small axum server stands in for the library backend: a form-encoded
//! token endpoint, a bearer-protected profile endpoint and a resource that
//! always rejects the credential.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::tempdir;

use warden_application::ports::{HttpTransport, Navigator, StorageArea};
use warden_application::use_cases::{LoginError, PasswordCredentials};
use warden_domain::{ApiRequest, AuthSettings, GuardState};
use warden_infrastructure::{
    FileStorage, MemoryStorage, RecordingNavigator, ReqwestTransport, STORAGE_FILE_NAME,
    SessionRuntime, SystemClock,
};

/// Expires on 2100-01-01.
fn issued_token() -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"ada","exp":4102444800}"#);
    format!("{header}.{payload}.sig")
}

async fn token(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    let username = form.get("username").map(String::as_str);
    let password = form.get("password").map(String::as_str);
    if username == Some("ada") && password == Some("correct horse") {
        (
            StatusCode::OK,
            Json(json!({ "access_token": issued_token(), "token_type": "bearer" })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect username or password" })),
        )
    }
}

async fn profile(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let expected = format!("Bearer {}", issued_token());
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if authorized {
        (
            StatusCode::OK,
            Json(json!({
                "id": 7,
                "username": "ada",
                "full_name": "Ada Lovelace",
                "role": { "name": "Librarian" },
                "permissions": ["BOOK_EDIT"]
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Could not validate credentials" })),
        )
    }
}

async fn revoked() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Token has been revoked" })),
    )
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/token", post(token))
        .route("/api/profile/", get(profile))
        .route("/api/books", get(revoked));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test backend");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn runtime(
    settings: &AuthSettings,
    storage_path: &std::path::Path,
    navigator: Arc<RecordingNavigator>,
) -> SessionRuntime<ReqwestTransport> {
    SessionRuntime::assemble(
        settings.clone(),
        Arc::new(FileStorage::open(storage_path).unwrap()),
        Arc::new(MemoryStorage::new()),
        Arc::new(SystemClock::new()),
        navigator,
        ReqwestTransport::new(settings).unwrap(),
    )
}

async fn wait_for_navigation(navigator: &RecordingNavigator) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while navigator.history().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("no navigation happened");
}

#[tokio::test]
async fn sign_in_restore_and_rejection() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warden_application=debug,warden_infrastructure=debug")
        .with_test_writer()
        .try_init();

    let settings = AuthSettings {
        api_base_url: spawn_backend().await,
        ..AuthSettings::default()
    };
    let dir = tempdir().expect("Failed to create temp directory");
    let storage_path = dir.path().join(STORAGE_FILE_NAME);

    // First boot: nothing stored, the admin panel redirects to login.
    let navigator = Arc::new(RecordingNavigator::at("/admin/books"));
    let mut first = runtime(&settings, &storage_path, navigator.clone());
    let (snapshot, _signals) = first.start();
    assert!(!snapshot.is_authenticated());
    let return_to = match first.admin_guard().check("/admin/books") {
        GuardState::Unauthenticated { redirect_to, return_to } => {
            assert_eq!(redirect_to, "/login");
            return_to
        }
        other => panic!("unexpected guard state: {other:?}"),
    };
    navigator.visit("/login");

    // A wrong password is reported without any forced navigation.
    let err = first
        .password_sign_in()
        .execute(&PasswordCredentials::new("ada", "wrong"), Some(&return_to))
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::Rejected { status: 401, .. }));
    assert_eq!(err.user_message(), "Incorrect username or password");
    assert!(navigator.history().is_empty());

    // The right password fetches the profile and persists the session.
    let outcome = first
        .password_sign_in()
        .execute(&PasswordCredentials::new(" ada ", "correct horse"), Some(&return_to))
        .await
        .unwrap();
    assert_eq!(outcome.redirect_to, "/admin/books");
    assert_eq!(outcome.session.role.as_deref(), Some("librarian"));
    assert!(first.admin_guard().check("/admin/books").is_authorized());
    let on_disk = std::fs::read_to_string(&storage_path).unwrap();
    assert!(on_disk.contains(&issued_token()));
    drop(first);

    // Second boot: the remembered session is restored from disk.
    let navigator = Arc::new(RecordingNavigator::at("/admin/books"));
    let mut second = runtime(&settings, &storage_path, navigator.clone());
    let (snapshot, _signals) = second.start();
    assert!(snapshot.is_authenticated());
    assert_eq!(
        snapshot.user().and_then(|user| user.full_name.as_deref()),
        Some("Ada Lovelace")
    );
    let mut guard = second.admin_guard();
    assert!(guard.resolve("/admin/books").await.is_authorized());

    // A rejected credential on an ordinary request logs out and redirects.
    let response = second
        .transport()
        .send(ApiRequest::get("/api/books"))
        .await
        .unwrap();
    assert_eq!(response.status, 401);
    assert_eq!(response.error_message().as_deref(), Some("Token has been revoked"));

    wait_for_navigation(&navigator).await;
    assert_eq!(navigator.current_path(), "/login");
    assert!(!second.manager().snapshot().is_authenticated());
    assert!(!second.manager().is_authenticated());

    let reopened = FileStorage::open(&storage_path).unwrap();
    assert_eq!(reopened.get("access_token").unwrap(), None);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let settings = AuthSettings {
        api_base_url: "http://127.0.0.1:9".to_string(),
        request_timeout_ms: 2_000,
        ..AuthSettings::default()
    };
    let dir = tempdir().expect("Failed to create temp directory");
    let navigator = Arc::new(RecordingNavigator::at("/login"));
    let mut core = runtime(&settings, &dir.path().join(STORAGE_FILE_NAME), navigator);
    core.start();

    let err = core
        .password_sign_in()
        .execute(&PasswordCredentials::new("ada", "pw"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, LoginError::Transport(_)));
    assert!(!core.manager().snapshot().is_authenticated());
}
