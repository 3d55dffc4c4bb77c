mod helpers;

use helpers::*;
use uuid::Uuid;

#[tokio::test]
async fn test_preflight_never_reaches_session_or_authorization() {
    let app = setup_test_app();

    // Anonymous preflight to a private API route would be a 401 if the guards ran
    let response = app
        .server
        .method(
            axum::http::Method::OPTIONS,
            "/api/private/upload/get-signed-upload-url",
        )
        .add_header("origin", ORIGIN)
        .await;

    assert_eq!(response.status_code(), 204);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        ORIGIN
    );
    assert_eq!(
        response.headers().get("access-control-allow-methods").unwrap(),
        "GET,POST,PUT,PATCH,DELETE,OPTIONS"
    );
    assert!(response.text().is_empty());
}

#[tokio::test]
async fn test_evil_origin_gets_no_allow_origin_and_is_rejected() {
    let app = setup_test_app();

    let response = app
        .server
        .get("/api/csrf-token")
        .add_header("origin", "https://evil.example")
        .await;
    assert_eq!(response.status_code(), 200);
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());

    let response = app
        .server
        .post("/api/join")
        .add_header("host", HOST)
        .add_header("origin", "https://evil.example")
        .add_header("cookie", anonymous_cookie())
        .add_header("x-csrf-token", CSRF)
        .json(&serde_json::json!({"email": "a@b.co", "password": "longenough"}))
        .await;
    assert_eq!(response.status_code(), 403);
    assert_eq!(response.text(), "Forbidden: bad origin");
    assert!(app.accounts.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_csrf_header_is_rejected_even_with_trusted_origin() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/api/join")
        .add_header("host", HOST)
        .add_header("origin", ORIGIN)
        .add_header("cookie", anonymous_cookie())
        .json(&serde_json::json!({"email": "a@b.co", "password": "longenough"}))
        .await;

    assert_eq!(response.status_code(), 403);
    assert_eq!(response.text(), "Forbidden: CSRF");
}

#[tokio::test]
async fn test_csrf_rejection_runs_before_session_check() {
    let app = setup_test_app();

    // Anonymous and without a CSRF header: the origin guard answers first
    let response = app
        .server
        .post("/api/private/upload/get-signed-upload-url")
        .add_header("host", HOST)
        .add_header("origin", ORIGIN)
        .json(&serde_json::json!({"filename": "a.png", "contentType": "image/png", "bytes": 1}))
        .await;

    assert_eq!(response.status_code(), 403);
    assert_eq!(response.text(), "Forbidden: CSRF");
}

#[tokio::test]
async fn test_exempt_path_skips_csrf() {
    let app = setup_test_app();

    let response = app
        .server
        .post("/auth/callback")
        .add_header("host", HOST)
        .add_header("origin", ORIGIN)
        .await;

    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_anonymous_private_page_redirects_to_login() {
    let app = setup_test_app();

    for path in ["/explore", "/account", "/private/settings"] {
        let response = app.server.get(path).await;
        assert_eq!(response.status_code(), 303, "{}", path);
        assert_eq!(response.headers().get("location").unwrap(), "/auth/login");
    }
}

#[tokio::test]
async fn test_anonymous_public_pages_pass_through() {
    let app = setup_test_app();

    for path in ["/", "/about", "/auth/login", "/auth/join"] {
        let response = app.server.get(path).await;
        assert_eq!(response.status_code(), 200, "{}", path);
        assert_eq!(response.text(), "page");
    }
}

#[tokio::test]
async fn test_signed_in_user_is_sent_away_from_auth_pages() {
    let app = setup_test_app();
    let cookie = signed_in_cookie(Uuid::new_v4());

    let response = app
        .server
        .get("/auth/login")
        .add_header("cookie", cookie.clone())
        .await;
    assert_eq!(response.status_code(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/explore");

    let response = app.server.get("/").add_header("cookie", cookie.clone()).await;
    assert_eq!(response.status_code(), 302);
    assert_eq!(response.headers().get("location").unwrap(), "/explore");

    let response = app.server.get("/explore").add_header("cookie", cookie).await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_forged_session_is_anonymous() {
    let app = setup_test_app();
    let cookie = format!("{}=forged:{}", SESSION_COOKIE, Uuid::new_v4());

    let response = app.server.get("/account").add_header("cookie", cookie.clone()).await;
    assert_eq!(response.status_code(), 303);
    assert_eq!(response.headers().get("location").unwrap(), "/auth/login");

    let response = app.server.get("/auth/login").add_header("cookie", cookie).await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_anonymous_private_api_is_unauthorized_with_cors_headers() {
    let app = setup_test_app();

    let response = app
        .server
        .get("/api/private/anything")
        .add_header("origin", ORIGIN)
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(response.text(), "Unauthorized");
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        ORIGIN
    );
    assert_eq!(response.headers().get("vary").unwrap(), "Origin");
}

#[tokio::test]
async fn test_csrf_cookie_is_issued_once() {
    let app = setup_test_app();

    let first = app.server.get("/api/csrf-token").await;
    assert_eq!(first.status_code(), 200);
    let set_cookie = first
        .headers()
        .get("set-cookie")
        .expect("first visit issues a csrf cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=604800"));
    assert!(set_cookie.contains("Path=/"));
    assert!(!set_cookie.contains("HttpOnly"));

    let token = first.json::<serde_json::Value>()["token"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with(&format!("csrf={}", token)));

    let second = app
        .server
        .get("/api/csrf-token")
        .add_header("cookie", format!("csrf={}", token))
        .await;
    assert!(second.headers().get("set-cookie").is_none());
    assert_eq!(second.json::<serde_json::Value>()["token"], token.as_str());
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let app = setup_test_app();

    let response = app.server.get("/health").add_header("x-request-id", "req-42").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}
