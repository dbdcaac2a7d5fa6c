use super::*;
use crate::error::ApiErrorKind;
use crate::guard::{GuardDecision, RouteGuard};
use crate::route::Route;
use crate::test_support::{dead_backend, spawn_backend, test_config};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<Value>>>;

fn recording(path: &str, status: StatusCode, reply: Value) -> (Router, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let router = Router::new().route(
        path,
        post(move |Json(body): Json<Value>| {
            let sink = Arc::clone(&sink);
            let reply = reply.clone();
            async move {
                sink.lock().unwrap().push(body);
                (status, Json(reply))
            }
        }),
    );
    (router, seen)
}

async fn client_for(router: Router) -> AuthClient {
    let base = spawn_backend(router).await;
    AuthClient::new(ApiHttp::new(&test_config(&base)).unwrap(), SessionStore::in_memory())
}

#[tokio::test]
async fn login_populates_session_and_unlocks_guard() {
    let (router, seen) = recording(
        "/api/users/login",
        StatusCode::OK,
        json!({ "user": { "email": "a@b.com", "firstName": "A" }, "message": "Login successful" }),
    );
    let auth = client_for(router).await;
    let guard = RouteGuard::new(auth.session().clone());
    assert!(matches!(guard.check(&Route::Prediction), GuardDecision::Redirect(_)));

    let user = auth.login("a@b.com", "secret1").await.unwrap();

    assert_eq!(user.email, "a@b.com");
    assert_eq!(user.first_name, "A");
    assert_eq!(auth.current_user(), Some(user));
    assert_eq!(guard.check(&Route::Prediction), GuardDecision::Allow);
    assert_eq!(*seen.lock().unwrap(), vec![json!({ "email": "a@b.com", "password": "secret1" })]);
}

#[tokio::test]
async fn login_without_user_payload_fails_and_leaves_session() {
    let (router, _) = recording("/api/users/login", StatusCode::OK, json!({ "message": "ok" }));
    let auth = client_for(router).await;
    let err = auth.login("a@b.com", "secret1").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::InvalidResponse);
    assert_eq!(err.message, "Invalid response from server");
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn login_strips_password_hash_before_storing() {
    let (router, _) = recording(
        "/api/users/login",
        StatusCode::OK,
        json!({ "user": { "email": "a@b.com", "passwordHash": "$2a$10$abc" } }),
    );
    let auth = client_for(router).await;
    auth.login("a@b.com", "secret1").await.unwrap();
    assert_eq!(auth.current_user().unwrap().password_hash, None);
}

#[tokio::test]
async fn login_unverified_email_surfaces_flags() {
    let (router, _) = recording(
        "/api/users/login",
        StatusCode::FORBIDDEN,
        json!({ "error": "Please verify your email before logging in", "emailNotVerified": true, "email": "a@b.com" }),
    );
    let auth = client_for(router).await;
    let err = auth.login("a@b.com", "secret1").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Domain);
    assert!(err.email_not_verified);
    assert_eq!(err.email.as_deref(), Some("a@b.com"));
    assert_eq!(err.status, Some(403));
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn failed_login_keeps_existing_session() {
    let (router, _) = recording("/api/users/login", StatusCode::UNAUTHORIZED, json!({ "error": "Invalid email or password" }));
    let auth = client_for(router).await;
    auth.session()
        .set(Some(User { email: "old@b.com".to_owned(), ..User::default() }));
    let err = auth.login("a@b.com", "wrong").await.unwrap_err();
    assert_eq!(err.message, "Invalid email or password");
    assert_eq!(auth.current_user().map(|u| u.email), Some("old@b.com".to_owned()));
}

#[tokio::test]
async fn register_posts_user_and_does_not_touch_session() {
    let (router, seen) = recording(
        "/api/users/register",
        StatusCode::OK,
        json!({ "message": "Registration successful! Check your email for verification code.", "email": "a@b.com" }),
    );
    let auth = client_for(router).await;
    let user = User {
        email: "a@b.com".to_owned(),
        password_hash: Some("longpassword".to_owned()),
        first_name: "A".to_owned(),
        last_name: "B".to_owned(),
        ..User::default()
    };
    let ack = auth.register(&user).await.unwrap();
    assert_eq!(ack.message(), Some("Registration successful! Check your email for verification code."));
    assert!(!auth.is_authenticated());
    let body = seen.lock().unwrap()[0].clone();
    assert_eq!(body["passwordHash"], "longpassword");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn verify_email_sends_email_and_code() {
    let (router, seen) = recording("/api/users/verify", StatusCode::OK, json!({ "verified": true }));
    let auth = client_for(router).await;
    auth.verify_email("a@b.com", "123456").await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![json!({ "email": "a@b.com", "code": "123456" })]);
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn resend_and_forgot_send_email_only() {
    let (resend, resend_seen) = recording("/api/users/resend-verification", StatusCode::OK, json!({}));
    let (forgot, forgot_seen) = recording("/api/users/forgot-password", StatusCode::OK, json!({}));
    let auth = client_for(resend.merge(forgot)).await;
    auth.resend_verification_code("a@b.com").await.unwrap();
    auth.forgot_password("a@b.com").await.unwrap();
    assert_eq!(*resend_seen.lock().unwrap(), vec![json!({ "email": "a@b.com" })]);
    assert_eq!(*forgot_seen.lock().unwrap(), vec![json!({ "email": "a@b.com" })]);
}

#[tokio::test]
async fn reset_password_sends_code_as_token() {
    let (router, seen) = recording("/api/users/reset-password", StatusCode::OK, json!({ "message": "Password reset successfully!" }));
    let auth = client_for(router).await;
    auth.reset_password("a@b.com", "654321", "brandnewpass").await.unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![json!({ "email": "a@b.com", "token": "654321", "newPassword": "brandnewpass" })]
    );
}

#[tokio::test]
async fn reset_password_domain_error_passes_message() {
    let (router, _) = recording("/api/users/reset-password", StatusCode::BAD_REQUEST, json!({ "error": "Invalid reset code" }));
    let auth = client_for(router).await;
    let err = auth.reset_password("a@b.com", "000000", "brandnewpass").await.unwrap_err();
    assert_eq!(err.message, "Invalid reset code");
    assert_eq!(err.status, Some(400));
}

#[tokio::test]
async fn update_profile_puts_and_publishes() {
    let router = Router::new().route(
        "/api/users/{id}",
        put(|axum::extract::Path(id): axum::extract::Path<i64>, Json(mut body): Json<Value>| async move {
            body["userId"] = json!(id);
            Json(body)
        }),
    );
    let auth = client_for(router).await;
    let user = User { email: "a@b.com".to_owned(), first_name: "Renamed".to_owned(), ..User::default() };
    let updated = auth.update_profile(9, &user).await.unwrap();
    assert_eq!(updated.user_id, Some(9));
    assert_eq!(auth.current_user(), Some(updated));
}

#[tokio::test]
async fn logout_clears_session() {
    let auth = client_for(Router::new()).await;
    auth.session().set(Some(User { email: "a@b.com".to_owned(), ..User::default() }));
    auth.logout();
    assert!(!auth.is_authenticated());
}

#[tokio::test]
async fn network_failure_uses_generic_message() {
    let base = dead_backend().await;
    let auth = AuthClient::new(ApiHttp::new(&test_config(&base)).unwrap(), SessionStore::in_memory());
    let err = auth.forgot_password("a@b.com").await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Network);
    assert_eq!(err.message, "Cannot connect to server. Please check if the server is running.");
}
