use super::*;
use crate::model::SubscriptionTier;
use crate::pages::ViewState;
use crate::test_support::{PageEnv, gated_post, spawn_backend};
use crate::validate::FieldError;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::atomic::Ordering;

fn fill(page: &RegisterPage) {
    page.set_first_name("Ada");
    page.set_last_name("Lovelace");
    page.set_email("a@b.com");
    page.set_password("analytical");
    page.set_confirm_password("analytical");
}

#[tokio::test]
async fn successful_registration_heads_to_verification() {
    let (router, hits) = gated_post(
        "/api/users/register",
        StatusCode::OK,
        json!({ "message": "Registration successful! Check your email for verification code.", "email": "a@b.com" }),
        None,
    );
    let env = PageEnv::new(&spawn_backend(router).await);
    let page = RegisterPage::open(env.auth.clone(), env.navigator(), &env.config);
    fill(&page);

    assert_eq!(page.submit().await, SubmitOutcome::Succeeded);
    assert_eq!(page.view().status.success.as_deref(), Some(SUCCESS_MESSAGE));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!env.auth.is_authenticated());

    page.settle().await;
    assert_eq!(env.history.current(), Some(Route::Verify { email: Some("a@b.com".to_owned()) }));
}

#[tokio::test]
async fn password_travels_in_password_hash_field() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let router = Router::new().route(
        "/api/users/register",
        post(move |Json(body): Json<Value>| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(body);
                Json(json!({ "message": "ok", "email": "a@b.com" }))
            }
        }),
    );
    let env = PageEnv::new(&spawn_backend(router).await);
    let page = RegisterPage::open(env.auth.clone(), env.navigator(), &env.config);
    fill(&page);

    assert_eq!(page.submit().await, SubmitOutcome::Succeeded);

    let body = seen.lock().unwrap()[0].clone();
    assert_eq!(body["passwordHash"], "analytical");
    assert!(body.get("password").is_none());
    assert_eq!(body["subscriptionTier"], "FREE");
    assert_eq!(body["notificationPreferences"], true);
}

#[tokio::test]
async fn duplicate_email_shows_backend_message() {
    let (router, _) = gated_post("/api/users/register", StatusCode::CONFLICT, json!({ "error": "Email already registered" }), None);
    let env = PageEnv::new(&spawn_backend(router).await);
    let page = RegisterPage::open(env.auth.clone(), env.navigator(), &env.config);
    fill(&page);

    assert_eq!(page.submit().await, SubmitOutcome::Failed);
    let view = page.view();
    assert_eq!(view.status.state, ViewState::Failed);
    assert_eq!(view.status.error.as_deref(), Some("Email already registered"));
}

#[tokio::test]
async fn invalid_fields_are_reported_inline() {
    let (router, hits) = gated_post("/api/users/register", StatusCode::OK, json!({}), None);
    let env = PageEnv::new(&spawn_backend(router).await);
    let page = RegisterPage::open(env.auth.clone(), env.navigator(), &env.config);
    page.set_email("bad");
    page.set_password("short");
    page.set_confirm_password("different");

    assert_eq!(page.submit().await, SubmitOutcome::Invalid);
    let errors = page.view().status.field_errors;
    assert_eq!(errors.get("firstName"), Some(&FieldError::Required));
    assert_eq!(errors.get("lastName"), Some(&FieldError::Required));
    assert_eq!(errors.get("email"), Some(&FieldError::InvalidEmail));
    assert_eq!(errors.get("password"), Some(&FieldError::TooShort(8)));
    assert_eq!(errors.get("confirmPassword"), Some(&FieldError::Mismatch));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn build_user_trims_names_and_defaults_plan() {
    let view = RegisterView {
        first_name: " Ada ".to_owned(),
        last_name: "Lovelace".to_owned(),
        email: "a@b.com ".to_owned(),
        password: "analytical".to_owned(),
        confirm_password: "analytical".to_owned(),
        notification_preferences: false,
        status: PageStatus::default(),
    };
    let user = build_user(&view).unwrap();
    assert_eq!(user.first_name, "Ada");
    assert_eq!(user.email, "a@b.com");
    assert_eq!(user.subscription_tier, Some(SubscriptionTier::Free));
    assert_eq!(user.notification_preferences, Some(false));
    assert_eq!(user.password_hash.as_deref(), Some("analytical"));
    assert_eq!(user.password, None);
}
