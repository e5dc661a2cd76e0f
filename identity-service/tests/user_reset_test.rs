mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, PASSWORD, PIN};
use identity_service::services::{OtpPurpose, TokenKind};
use serde_json::json;

const EMAIL: &str = "investor@example.com";

#[tokio::test]
async fn password_reset_with_code() {
    let app = TestApp::new();
    app.seed_user(EMAIL).await;

    let (status, _) = app
        .json(
            Method::POST,
            "/users/password-reset/request",
            &[],
            Some(json!({ "email": EMAIL })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.wait_for_emails(1).await, 1);
    assert!(app.email.delivered()[0].html_body.contains("reset your password"));

    app.set_otp(OtpPurpose::PasswordReset, EMAIL, "314159").await;
    let reset = json!({ "email": EMAIL, "password": "brand-new-password", "otp": "314159" });

    let (status, body) = app
        .json(Method::PUT, "/users/reset-password", &[], Some(reset.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password reset successfully");

    // Single use.
    let (status, _) = app
        .json(Method::PUT, "/users/reset-password", &[], Some(reset))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .json(
            Method::POST,
            "/users/login",
            &[],
            Some(json!({ "email": EMAIL, "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .json(
            Method::POST,
            "/users/login",
            &[],
            Some(json!({ "email": EMAIL, "password": "brand-new-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn password_reset_request_does_not_reveal_unknown_emails() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            Method::POST,
            "/users/password-reset/request",
            &[],
            Some(json!({ "email": "nobody@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(app.email.delivered().is_empty());
}

#[tokio::test]
async fn verification_code_does_not_reset_password() {
    let app = TestApp::new();
    app.seed_user(EMAIL).await;
    app.set_otp(OtpPurpose::Verification, EMAIL, "271828").await;

    let (status, _) = app
        .json(
            Method::PUT,
            "/users/reset-password",
            &[],
            Some(json!({ "email": EMAIL, "password": "brand-new-password", "otp": "271828" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pin_reset_flow() {
    let app = TestApp::new();
    let user = app.seed_user(EMAIL).await;
    let password_token = app.user_token(&user, TokenKind::UserPassword);
    let headers = [("X-Password-Authorization-Token", password_token.as_str())];

    let (status, _) = app
        .json(Method::POST, "/users/pin-reset/request", &headers, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.wait_for_emails(1).await, 1);

    app.set_otp(OtpPurpose::PinReset, EMAIL, "161803").await;

    // A malformed PIN is refused without spending the code.
    let (status, _) = app
        .json(
            Method::PUT,
            "/users/reset-pin",
            &headers,
            Some(json!({ "pin": "12", "otp": "161803" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            Method::PUT,
            "/users/reset-pin",
            &headers,
            Some(json!({ "pin": "1357", "otp": "161803" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .json(
            Method::POST,
            "/users/login/pin",
            &headers,
            Some(json!({ "pin": PIN })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .json(
            Method::POST,
            "/users/login/pin",
            &headers,
            Some(json!({ "pin": "1357" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn pin_reset_requires_password_stage_token() {
    let app = TestApp::new();
    let (status, body) = app
        .json(Method::POST, "/users/pin-reset/request", &[], None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Request not authorized");
}
