mod helpers;

use helpers::*;
use serde_json::json;

const JOIN_PATH: &str = "/api/join";

#[tokio::test]
async fn test_join_creates_account_with_normalized_email() {
    let app = setup_test_app();

    let response = same_origin(app.server.post(JOIN_PATH), anonymous_cookie())
        .json(&json!({"email": "  New.User@Example.com ", "password": "correct horse"}))
        .await;

    assert_eq!(response.status_code(), 200);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Account created. You can now sign in.");
    assert_eq!(
        *app.accounts.created.lock().unwrap(),
        vec!["new.user@example.com".to_string()]
    );
}

#[tokio::test]
async fn test_join_validation_codes() {
    let app = setup_test_app();

    let cases = [
        (json!({}), "EMAIL_REQUIRED"),
        (json!({"email": "nope", "password": "longenough"}), "EMAIL_INVALID"),
        (json!({"email": "a@b.co"}), "PASSWORD_REQUIRED"),
        (json!({"email": "a@b.co", "password": "1234567"}), "PASSWORD_WEAK"),
    ];

    for (payload, code) in cases {
        let response = same_origin(app.server.post(JOIN_PATH), anonymous_cookie())
            .json(&payload)
            .await;
        assert_eq!(response.status_code(), 400, "{}", code);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], code);
    }
    assert!(app.accounts.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_join_without_json_body_is_treated_as_empty() {
    let app = setup_test_app();

    let response = same_origin(app.server.post(JOIN_PATH), anonymous_cookie())
        .text("email=a@b.co")
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<serde_json::Value>()["code"], "EMAIL_REQUIRED");
}

#[tokio::test]
async fn test_join_maps_provider_errors() {
    let app = setup_test_app();
    let payload = json!({"email": "a@b.co", "password": "longenough"});

    let cases = [
        (
            SignupOutcome::Rejected(
                "A user with this email address has already been registered".into(),
            ),
            409,
            "USER_EXISTS",
        ),
        (
            SignupOutcome::Rejected("Signups not allowed for this instance".into()),
            403,
            "SIGNUP_FORBIDDEN",
        ),
        (
            SignupOutcome::Rejected("Password should contain a digit".into()),
            400,
            "SIGNUP_FAILED",
        ),
        (SignupOutcome::Unreachable, 500, "SERVER_ERROR"),
    ];

    for (outcome, status, code) in cases {
        *app.accounts.outcome.lock().unwrap() = outcome;
        let response = same_origin(app.server.post(JOIN_PATH), anonymous_cookie())
            .json(&payload)
            .await;
        assert_eq!(response.status_code(), status, "{}", code);
        assert_eq!(response.json::<serde_json::Value>()["code"], code);
    }
}

#[tokio::test]
async fn test_join_is_public_but_csrf_protected() {
    let app = setup_test_app();

    let response = app
        .server
        .post(JOIN_PATH)
        .add_header("host", HOST)
        .add_header("origin", ORIGIN)
        .json(&json!({"email": "a@b.co", "password": "longenough"}))
        .await;

    assert_eq!(response.status_code(), 403);
    assert_eq!(response.text(), "Forbidden: CSRF");
}
