//! Shared fixtures for unit tests: scratch directories and an in-process
//! backend built from an `axum::Router`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::{ClientConfig, HttpTimeouts};

static NEXT_DIR: AtomicU64 = AtomicU64::new(0);

/// Fresh, empty scratch directory unique to this test process.
pub fn temp_dir(label: &str) -> PathBuf {
    let n = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("traintrack-test-{label}-{}-{n}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Serve `router` on an ephemeral local port; returns its base URL.
pub async fn spawn_backend(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Base URL of a local port with nothing listening on it.
pub async fn dead_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

/// Client config pointed at `base_url` with short timeouts and redirects.
pub fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        api_base_url: base_url.to_owned(),
        timeouts: HttpTimeouts { request_secs: 5, connect_secs: 2 },
        session_dir: PathBuf::from("unused"),
        redirect_delay: Duration::from_millis(20),
    }
}

/// Everything a page controller needs, wired to one backend and session.
pub struct PageEnv {
    pub auth: crate::auth::AuthClient,
    pub predictions: crate::prediction::PredictionClient,
    pub history: std::sync::Arc<crate::guard::History>,
    pub config: ClientConfig,
}

impl PageEnv {
    pub fn new(base_url: &str) -> Self {
        let config = test_config(base_url);
        let http = crate::http::ApiHttp::new(&config).unwrap();
        let session = crate::session::SessionStore::in_memory();
        let history = std::sync::Arc::new(crate::guard::History::new(crate::guard::RouteGuard::new(session.clone())));
        Self {
            auth: crate::auth::AuthClient::new(http.clone(), session),
            predictions: crate::prediction::PredictionClient::new(http),
            history,
            config,
        }
    }

    pub fn navigator(&self) -> std::sync::Arc<dyn crate::guard::Navigator> {
        self.history.clone()
    }

    pub fn sign_in(&self, email: &str) {
        self.auth.session().set(Some(crate::model::User { email: email.to_owned(), ..crate::model::User::default() }));
    }
}

/// POST route replying with `status` and `reply` once `gate` is opened
/// (or immediately when `gate` is `None`). Returns the request counter.
pub fn gated_post(
    path: &str,
    status: axum::http::StatusCode,
    reply: serde_json::Value,
    gate: Option<std::sync::Arc<tokio::sync::Notify>>,
) -> (axum::Router, std::sync::Arc<AtomicU64>) {
    let hits = std::sync::Arc::new(AtomicU64::new(0));
    let counter = std::sync::Arc::clone(&hits);
    let router = axum::Router::new().route(
        path,
        axum::routing::post(move || {
            let counter = std::sync::Arc::clone(&counter);
            let reply = reply.clone();
            let gate = gate.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                (status, axum::Json(reply))
            }
        }),
    );
    (router, hits)
}

/// Yield until `done` holds; the spawned task under test runs meanwhile.
pub async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
