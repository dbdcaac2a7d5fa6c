use super::*;

#[test]
fn protected_routes_require_auth() {
    for route in [Route::Home, Route::Prediction, Route::Dashboard, Route::Report] {
        assert!(route.requires_auth(), "{route} should be protected");
    }
    for route in [
        Route::login(),
        Route::Register,
        Route::ForgotPassword,
        Route::Verify { email: None },
        Route::ResetPassword { email: None },
    ] {
        assert!(!route.requires_auth(), "{route} should be public");
    }
}

#[test]
fn to_url_encodes_query_values() {
    let route = Route::Verify { email: Some("a+b@c.com".to_owned()) };
    assert_eq!(route.to_url(), "/verify?email=a%2Bb%40c.com");
    let login = Route::Login { return_url: Some("/dashboard".to_owned()) };
    assert_eq!(login.to_url(), "/login?returnUrl=%2Fdashboard");
}

#[test]
fn parse_inverts_to_url() {
    let routes = [
        Route::Login { return_url: Some("/report".to_owned()) },
        Route::Verify { email: Some("a+b@c.com".to_owned()) },
        Route::ResetPassword { email: Some("x@y.org".to_owned()) },
        Route::Prediction,
        Route::Home,
    ];
    for route in routes {
        assert_eq!(Route::parse(&route.to_url()), route);
    }
}

#[test]
fn parse_unknown_paths_fall_back_to_home() {
    assert_eq!(Route::parse("/nowhere"), Route::Home);
    assert_eq!(Route::parse(""), Route::Home);
}

#[test]
fn parse_ignores_trailing_slash_and_empty_params() {
    assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
    assert_eq!(Route::parse("/verify?email="), Route::Verify { email: None });
    assert_eq!(Route::parse("/verify?other=1&email=a%40b.com"), Route::Verify { email: Some("a@b.com".to_owned()) });
}
