use super::*;
use crate::model::User;

fn signed_in() -> SessionStore {
    let session = SessionStore::in_memory();
    session.set(Some(User { email: "a@b.com".to_owned(), ..User::default() }));
    session
}

#[test]
fn denies_protected_route_when_signed_out() {
    let guard = RouteGuard::new(SessionStore::in_memory());
    assert_eq!(
        guard.check(&Route::Dashboard),
        GuardDecision::Redirect(Route::Login { return_url: Some("/dashboard".to_owned()) })
    );
}

#[test]
fn allows_protected_route_when_signed_in() {
    let guard = RouteGuard::new(signed_in());
    for route in [Route::Home, Route::Prediction, Route::Dashboard, Route::Report] {
        assert_eq!(guard.check(&route), GuardDecision::Allow);
    }
}

#[test]
fn public_routes_always_allowed() {
    let guard = RouteGuard::new(SessionStore::in_memory());
    assert_eq!(guard.check(&Route::login()), GuardDecision::Allow);
    assert_eq!(guard.check(&Route::Verify { email: None }), GuardDecision::Allow);
}

#[test]
fn decision_tracks_session_changes() {
    let session = SessionStore::in_memory();
    let guard = RouteGuard::new(session.clone());
    assert_ne!(guard.check(&Route::Report), GuardDecision::Allow);
    session.set(Some(User { email: "a@b.com".to_owned(), ..User::default() }));
    assert_eq!(guard.check(&Route::Report), GuardDecision::Allow);
    session.clear();
    assert_ne!(guard.check(&Route::Report), GuardDecision::Allow);
}

#[test]
fn decision_is_deterministic() {
    let guard = RouteGuard::new(SessionStore::in_memory());
    let first = guard.check(&Route::Prediction);
    for _ in 0..10 {
        assert_eq!(guard.check(&Route::Prediction), first);
    }
}

#[test]
fn history_records_redirect_for_denied_navigation() {
    let history = History::new(RouteGuard::new(SessionStore::in_memory()));
    assert_eq!(history.current(), None);
    history.navigate(Route::Prediction);
    assert_eq!(history.current(), Some(Route::Login { return_url: Some("/prediction".to_owned()) }));
}

#[test]
fn history_keeps_allowed_navigation_in_order() {
    let history = History::new(RouteGuard::new(signed_in()));
    history.navigate(Route::Prediction);
    history.navigate(Route::Report);
    assert_eq!(history.entries(), vec![Route::Prediction, Route::Report]);
}
