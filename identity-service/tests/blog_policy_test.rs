mod common;

use axum::http::{Method, StatusCode};
use common::{bearer, TestApp};
use identity_service::models::{Admin, AdminRole, Permissions};
use serde_json::{json, Value};

async fn create(app: &TestApp, author: &Admin, body: Value) -> (StatusCode, Value) {
    app.json(
        Method::POST,
        "/blogs/new",
        &[("Authorization", &bearer(&app.admin_token(author)))],
        Some(body),
    )
    .await
}

fn draft() -> Value {
    json!({ "title": "Seed round notes", "content": "Draft body", "tags": ["funding"] })
}

fn writer_permissions() -> Permissions {
    Permissions {
        create: true,
        read: true,
        update: true,
        delete: false,
    }
}

#[tokio::test]
async fn create_requires_create_bit() {
    let app = TestApp::new();
    let reader = app
        .seed_admin(
            "reader",
            AdminRole::User,
            Permissions {
                read: true,
                ..Permissions::default()
            },
        )
        .await;

    let (status, body) = create(&app, &reader, draft()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You do not have permission to create this resource");
}

#[tokio::test]
async fn create_validates_status() {
    let app = TestApp::new();
    let writer = app
        .seed_admin("writer", AdminRole::User, writer_permissions())
        .await;

    let (status, body) = create(&app, &writer, json!({ "title": "x", "status": "deleted" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot create a deleted blog");

    let (status, body) = create(&app, &writer, json!({ "title": "Only a title", "status": "published" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "To publish a blog, the title and content fields need to be filled"
    );
}

#[tokio::test]
async fn drafts_are_hidden_from_the_public() {
    let app = TestApp::new();
    let writer = app
        .seed_admin("writer", AdminRole::User, writer_permissions())
        .await;

    let (status, body) = create(&app, &writer, draft()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "draft");
    assert_eq!(body["data"]["author"], "writer");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.json(Method::GET, "/blogs/published/all", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 0);

    let (status, _) = app.json(Method::GET, &format!("/blogs/{}", id), &[], None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let auth = bearer(&app.admin_token(&writer));
    let (status, _) = app
        .json(Method::GET, &format!("/blogs/{}", id), &[("Authorization", &auth)], None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .json(Method::GET, "/blogs/drafts/all", &[("Authorization", &auth)], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
}

#[tokio::test]
async fn draft_listing_requires_read_bit() {
    let app = TestApp::new();
    let no_bits = app
        .seed_admin("nobits", AdminRole::Manager, Permissions::default())
        .await;

    let (status, body) = app
        .json(
            Method::GET,
            "/blogs/drafts/all",
            &[("Authorization", &bearer(&app.admin_token(&no_bits)))],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You do not have permission to read this resource");
}

#[tokio::test]
async fn update_rules() {
    let app = TestApp::new();
    let author = app
        .seed_admin("author", AdminRole::User, writer_permissions())
        .await;
    let stranger = app
        .seed_admin("stranger", AdminRole::Supervisor, Permissions::all())
        .await;
    let moderator = app
        .seed_admin("moderator", AdminRole::Admin, Permissions::all())
        .await;

    let (_, body) = create(&app, &author, draft()).await;
    let uri = format!("/blogs/{}/update", body["data"]["id"].as_str().unwrap());

    let (status, body) = app
        .json(
            Method::PUT,
            &uri,
            &[("Authorization", &bearer(&app.admin_token(&stranger)))],
            Some(json!({ "title": "Hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to update this blog");

    let (status, body) = app
        .json(
            Method::PUT,
            &uri,
            &[("Authorization", &bearer(&app.admin_token(&moderator)))],
            Some(json!({ "status": "published" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "published");

    let author_auth = bearer(&app.admin_token(&author));
    let (status, body) = app
        .json(
            Method::PUT,
            &uri,
            &[("Authorization", &author_auth)],
            Some(json!({ "status": "draft" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "You cannot convert an already published blog into a draft"
    );

    let (status, body) = app
        .json(
            Method::PUT,
            &uri,
            &[("Authorization", &author_auth)],
            Some(json!({ "status": "deleted" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "To delete a blog, use the delete endpoint");

    let (status, body) = app.json(Method::GET, "/blogs/published/all", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
}

#[tokio::test]
async fn delete_rules() {
    let app = TestApp::new();
    let author = app
        .seed_admin("author", AdminRole::User, writer_permissions())
        .await;
    let moderator = app
        .seed_admin("moderator", AdminRole::Admin, Permissions::all())
        .await;
    let root = app
        .seed_admin("root", AdminRole::Superuser, Permissions::all())
        .await;

    let (_, body) = create(&app, &author, draft()).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/blogs/{}/delete", id);

    // Admin role may edit others' posts but not delete them.
    let (status, body) = app
        .json(
            Method::DELETE,
            &uri,
            &[("Authorization", &bearer(&app.admin_token(&moderator)))],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to delete this blog");

    // The author owns the post but lacks the delete bit.
    let (status, body) = app
        .json(
            Method::DELETE,
            &uri,
            &[("Authorization", &bearer(&app.admin_token(&author)))],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You do not have permission to delete this resource");

    let root_auth = bearer(&app.admin_token(&root));
    let (status, body) = app
        .json(Method::DELETE, &uri, &[("Authorization", &root_auth)], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "deleted");

    let (status, body) = app
        .json(Method::DELETE, &uri, &[("Authorization", &root_auth)], None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Blog has been deleted");

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/blogs/{}/update", id),
            &[("Authorization", &root_auth)],
            Some(json!({ "title": "Back from the dead" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Blog has been deleted");

    let (status, body) = app
        .json(Method::GET, "/blogs/deleted/all", &[("Authorization", &root_auth)], None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
}

#[tokio::test]
async fn unknown_blog_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app
        .json(Method::GET, &format!("/blogs/{}", uuid::Uuid::new_v4()), &[], None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Blog not found");
}

#[tokio::test]
async fn deleted_state_is_hidden_from_unauthorized_editors() {
    let app = TestApp::new();
    let root = app
        .seed_admin("root", AdminRole::Superuser, Permissions::all())
        .await;
    let outsider = app
        .seed_admin("outsider", AdminRole::User, Permissions::default())
        .await;

    let (_, body) = create(&app, &root, draft()).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    app.json(
        Method::DELETE,
        &format!("/blogs/{}/delete", id),
        &[("Authorization", &bearer(&app.admin_token(&root)))],
        None,
    )
    .await;

    let auth = bearer(&app.admin_token(&outsider));
    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/blogs/{}/update", id),
            &[("Authorization", &auth)],
            Some(json!({ "title": "Edited" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to update this blog");

    let (status, body) = app
        .json(
            Method::DELETE,
            &format!("/blogs/{}/delete", id),
            &[("Authorization", &auth)],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to delete this blog");
}
