mod common;

use axum::http::{Method, StatusCode};
use common::{bearer, TestApp, PASSWORD, SUPERUSER_SECRET};
use identity_service::models::{AdminRole, Permissions};
use serde_json::json;

fn superuser_body() -> serde_json::Value {
    json!({
        "username": "root",
        "email": "Root@Example.com",
        "password": PASSWORD,
    })
}

#[tokio::test]
async fn superuser_signup_requires_bootstrap_secret() {
    let app = TestApp::new();

    let (status, body) = app
        .json(Method::POST, "/auth/superuser/signup", &[], Some(superuser_body()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .json(
            Method::POST,
            "/auth/superuser/signup",
            &[("Admin-Authorization", "wrong-secret")],
            Some(superuser_body()),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/superuser/signup",
            &[("Admin-Authorization", SUPERUSER_SECRET)],
            Some(superuser_body()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Superuser created successfully.");
    assert_eq!(body["data"]["role"], "superuser");
    assert_eq!(body["data"]["email"], "root@example.com");
    assert_eq!(body["data"]["permissions"]["delete"], true);
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_superuser_conflicts() {
    let app = TestApp::new();
    let headers = [("Admin-Authorization", SUPERUSER_SECRET)];

    let (status, _) = app
        .json(Method::POST, "/auth/superuser/signup", &headers, Some(superuser_body()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .json(Method::POST, "/auth/superuser/signup", &headers, Some(superuser_body()))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Admin already exists");
}

#[tokio::test]
async fn admin_login_issues_bearer_token() {
    let app = TestApp::new();
    let admin = app
        .seed_admin("editor", AdminRole::User, Permissions::default())
        .await;

    let (status, body) = app
        .form("/auth/admins/login", &format!("username=editor&password={}", PASSWORD))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Admin logged in successfully.");
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["data"]["id"], admin.admin_id.to_string());
    assert!(body["data"]["last_login"].is_string());

    let token = body["access_token"].as_str().unwrap();
    let (status, body) = app
        .json(Method::GET, "/admins/me", &[("Authorization", &bearer(token))], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "editor");
}

#[tokio::test]
async fn admin_login_rejects_wrong_password_and_unknown_user() {
    let app = TestApp::new();
    app.seed_admin("editor", AdminRole::User, Permissions::default())
        .await;

    let (status, body) = app
        .form("/auth/admins/login", "username=editor&password=not-the-password")
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, _) = app
        .form("/auth/admins/login", &format!("username=ghost&password={}", PASSWORD))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_superuser_registers_admins() {
    let app = TestApp::new();
    let root = app
        .seed_admin("root", AdminRole::Superuser, Permissions::all())
        .await;
    let manager = app
        .seed_admin("manager", AdminRole::Manager, Permissions::all())
        .await;

    let new_admin = json!({
        "username": "writer",
        "email": "writer@example.com",
        "password": PASSWORD,
        "role": "supervisor",
        "permissions": { "create": true, "read": true }
    });

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/admins/signup",
            &[("Authorization", &bearer(&app.admin_token(&manager)))],
            Some(new_admin.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You don't have access to this resource.");

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/admins/signup",
            &[("Authorization", &bearer(&app.admin_token(&root)))],
            Some(new_admin),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Admin created successfully.");
    assert_eq!(body["data"]["role"], "supervisor");
    assert_eq!(body["data"]["is_active"], true);
    assert_eq!(body["data"]["permissions"]["create"], true);
    assert_eq!(body["data"]["permissions"]["delete"], false);
}

#[tokio::test]
async fn admin_signup_cannot_mint_superusers() {
    let app = TestApp::new();
    let root = app
        .seed_admin("root", AdminRole::Superuser, Permissions::all())
        .await;

    let (status, _) = app
        .json(
            Method::POST,
            "/auth/admins/signup",
            &[("Authorization", &bearer(&app.admin_token(&root)))],
            Some(json!({
                "username": "second-root",
                "email": "second@example.com",
                "password": PASSWORD,
                "role": "superuser"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_signup_reports_first_validation_error() {
    let app = TestApp::new();
    let root = app
        .seed_admin("root", AdminRole::Superuser, Permissions::all())
        .await;

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/admins/signup",
            &[("Authorization", &bearer(&app.admin_token(&root)))],
            Some(json!({
                "username": "",
                "email": "writer@example.com",
                "password": PASSWORD
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Admin username must be 1 to 150 characters");

    let (status, body) = app
        .json(
            Method::POST,
            "/auth/admins/signup",
            &[("Authorization", &bearer(&app.admin_token(&root)))],
            Some(json!({
                "username": "w".repeat(151),
                "email": "writer@example.com",
                "password": PASSWORD
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Admin username must be 1 to 150 characters");
}
