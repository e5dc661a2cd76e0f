mod common;

use axum::http::{Method, StatusCode};
use common::{bearer, TestApp};
use identity_service::{
    models::{User, UserType},
    services::{Repository, TokenKind},
};
use serde_json::{json, Value};

fn registration() -> Value {
    json!({
        "is_registered": true,
        "country_of_incorporation": "Ghana",
        "type_of_company": "private",
        "company_number": "4455667",
        "company_name": "Kente Cloud",
        "year_established": 2019,
        "company_logo_url": "https://cdn.example.com/kente.png",
        "company_website_url": "https://kente.example.com",
        "headquarters_city": "Accra",
        "headquarters_country": "Ghana",
        "industry_sector": "software",
        "type_of_entity": "startup",
        "tax_identification_number": "GH-001"
    })
}

async fn call(app: &TestApp, method: Method, uri: &str, user: &User, body: Option<Value>) -> (StatusCode, Value) {
    let auth = bearer(&app.user_token(user, TokenKind::UserPin));
    app.json(method, uri, &[("Authorization", &auth)], body).await
}

#[tokio::test]
async fn create_then_fill_in_profile_sections() {
    let app = TestApp::new();
    let owner = app.seed_user("owner@example.com").await;

    let (status, body) = call(&app, Method::POST, "/companies/new", &owner, Some(registration())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Company created successfully");
    assert_eq!(body["data"]["user_id"], owner.user_id.to_string());
    assert_eq!(body["data"]["company_logo_url"], "https://cdn.example.com/kente.png");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::PUT,
        "/companies/update-company-contact-info",
        &owner,
        Some(json!({
            "company_contact_person_name": "Ama Mensah",
            "company_contact_person_position": "CEO",
            "company_contact_person_email": "ama@kente.example.com",
            "company_contact_person_phone_number": "+233200000000"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["company_contact_person_name"], "Ama Mensah");

    let (status, body) = call(
        &app,
        Method::PUT,
        "/companies/update-company-overview",
        &owner,
        Some(json!({
            "company_description": "Cloud tooling for West African retailers.",
            "company_mission_statement": "Ship faster",
            "company_vision_statement": "Everywhere",
            "company_core_values": "Care"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["company_mission_statement"], "Ship faster");

    let (status, body) = call(
        &app,
        Method::PUT,
        "/companies/update-company-products-services",
        &owner,
        Some(json!({
            "company_products_services": "POS, inventory",
            "company_value_proposition": "Offline first"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["company_value_proposition"], "Offline first");

    let (status, body) = call(&app, Method::GET, &format!("/companies/{}", id), &owner, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["company_products_services"], "POS, inventory");
    assert_eq!(body["data"]["company_contact_person_position"], "CEO");

    let (status, body) = call(&app, Method::GET, "/companies", &owner, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
}

#[tokio::test]
async fn registration_rules_are_enforced() {
    let app = TestApp::new();
    let owner = app.seed_user("owner@example.com").await;

    let mut unregistered = registration();
    unregistered["is_registered"] = json!(false);
    let (status, body) = call(&app, Method::POST, "/companies/new", &owner, Some(unregistered)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Company is not registered");

    let mut bad_number = registration();
    bad_number["company_number"] = json!("AB-12");
    let (status, body) = call(&app, Method::POST, "/companies/new", &owner, Some(bad_number)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Company number must be numeric");

    let mut long_name = registration();
    long_name["company_name"] = json!("x".repeat(256));
    let (status, body) = call(&app, Method::POST, "/companies/new", &owner, Some(long_name)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Company name must be at most 255 characters");
}

#[tokio::test]
async fn profile_updates_need_an_existing_company() {
    let app = TestApp::new();
    let owner = app.seed_user("owner@example.com").await;

    let (status, body) = call(
        &app,
        Method::PUT,
        "/companies/update-company-products-services",
        &owner,
        Some(json!({
            "company_products_services": "Consulting",
            "company_value_proposition": "Speed"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Company not found");
}

#[tokio::test]
async fn description_is_capped_at_three_hundred_words() {
    let app = TestApp::new();
    let owner = app.seed_user("owner@example.com").await;
    call(&app, Method::POST, "/companies/new", &owner, Some(registration())).await;

    let (status, body) = call(
        &app,
        Method::PUT,
        "/companies/update-company-overview",
        &owner,
        Some(json!({
            "company_description": vec!["word"; 301].join(" "),
            "company_mission_statement": "",
            "company_vision_statement": "",
            "company_core_values": ""
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Company description must be a maximum of 300 words");
}

#[tokio::test]
async fn unverified_user_and_wrong_token_stage_are_rejected() {
    let app = TestApp::new();
    let pending = User::new("pending@example.com".into(), UserType::Startup);
    app.repo.insert_user(&pending).await.unwrap();

    let (status, body) = call(&app, Method::POST, "/companies/new", &pending, Some(registration())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "You cannot access this resource because your account is not verified"
    );

    let owner = app.seed_user("owner@example.com").await;
    let password_stage = bearer(&app.user_token(&owner, TokenKind::UserPassword));
    let (status, _) = app
        .json(Method::GET, "/companies", &[("Authorization", &password_stage)], None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
