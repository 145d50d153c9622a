//! User API integration tests
//!
//! The /me family (profile update, photo upload, soft delete) and the
//! admin-only user management routes.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::{json, Value};
use serial_test::serial;

use common::database::TestDatabase;
use common::helpers::{set_role, signup_user, test_server};

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_update_me_changes_profile_fields() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    let token = signup_user(&server, "Old Name", "old@example.com", "password123").await;

    let form = MultipartForm::new()
        .add_text("name", "New Name")
        .add_text("email", "new@example.com");

    let response = server
        .patch("/api/v1/users/updateMe")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["user"]["name"], "New Name");
    assert_eq!(body["data"]["user"]["email"], "new@example.com");
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_update_me_rejects_password_fields() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    let token = signup_user(&server, "Test User", "test@example.com", "password123").await;

    let form = MultipartForm::new().add_text("password", "sneakychange");

    let response = server
        .patch("/api/v1/users/updateMe")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("/updateMyPassword"));
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_update_me_processes_photo() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    let token = signup_user(&server, "Test User", "test@example.com", "password123").await;

    let img = image::RgbImage::from_pixel(640, 480, image::Rgb([10, 120, 80]));
    let mut png = Vec::new();
    img.write_with_encoder(image::codecs::png::PngEncoder::new(&mut png))
        .unwrap();

    let form = MultipartForm::new().add_part(
        "photo",
        Part::bytes(png).file_name("me.png").mime_type("image/png"),
    );

    let response = server
        .patch("/api/v1/users/updateMe")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let photo = body["data"]["user"]["photo"].as_str().unwrap();
    assert!(photo.starts_with("user-"));
    assert!(photo.ends_with(".jpeg"));
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_update_me_rejects_non_image_photo() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    let token = signup_user(&server, "Test User", "test@example.com", "password123").await;

    let form = MultipartForm::new().add_part(
        "photo",
        Part::bytes(b"just text".to_vec())
            .file_name("notes.txt")
            .mime_type("text/plain"),
    );

    let response = server
        .patch("/api/v1/users/updateMe")
        .authorization_bearer(&token)
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_delete_me_is_a_soft_delete() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    let token = signup_user(&server, "Test User", "test@example.com", "password123").await;

    let response = server
        .delete("/api/v1/users/deleteMe")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    // The row still exists, deactivated
    let (count, active): (i64, bool) =
        sqlx::query_as("SELECT COUNT(*), BOOL_OR(active) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
    assert_eq!(count, 1);
    assert!(!active);

    // The session stops resolving once the account is inactive
    let me = server
        .get("/api/v1/users/me")
        .authorization_bearer(&token)
        .await;
    assert_eq!(me.status_code(), StatusCode::UNAUTHORIZED);

    // And the login path no longer sees the account
    let login = server
        .post("/api/v1/users/login")
        .json(&json!({ "email": "test@example.com", "password": "password123" }))
        .await;
    assert_eq!(login.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_user_management_is_admin_only() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    let user_token = signup_user(&server, "Plain User", "user@example.com", "password123").await;

    let forbidden = server
        .get("/api/v1/users")
        .authorization_bearer(&user_token)
        .await;
    assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

    let admin_token = signup_user(&server, "Admin", "admin@example.com", "password123").await;
    set_role(db.pool(), "admin@example.com", "admin").await;

    let allowed = server
        .get("/api/v1/users")
        .authorization_bearer(&admin_token)
        .await;
    assert_eq!(allowed.status_code(), StatusCode::OK);

    let body: Value = allowed.json();
    assert_eq!(body["results"], 2);
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_admin_delete_soft_deletes_and_hides_user() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    signup_user(&server, "Target", "target@example.com", "password123").await;
    let admin_token = signup_user(&server, "Admin", "admin@example.com", "password123").await;
    set_role(db.pool(), "admin@example.com", "admin").await;

    let listing: Value = server
        .get("/api/v1/users")
        .authorization_bearer(&admin_token)
        .await
        .json();
    let target_id = listing["data"]["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "target@example.com")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let deleted = server
        .delete(&format!("/api/v1/users/{target_id}"))
        .authorization_bearer(&admin_token)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);

    // Soft-deleted rows are excluded from default reads
    let after: Value = server
        .get("/api/v1/users")
        .authorization_bearer(&admin_token)
        .await
        .json();
    assert_eq!(after["results"], 1);

    let get_one = server
        .get(&format!("/api/v1/users/{target_id}"))
        .authorization_bearer(&admin_token)
        .await;
    assert_eq!(get_one.status_code(), StatusCode::NOT_FOUND);

    // But the row itself survives
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_admin_can_change_roles() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    signup_user(&server, "Future Guide", "guide@example.com", "password123").await;
    let admin_token = signup_user(&server, "Admin", "admin@example.com", "password123").await;
    set_role(db.pool(), "admin@example.com", "admin").await;

    let listing: Value = server
        .get("/api/v1/users")
        .authorization_bearer(&admin_token)
        .await
        .json();
    let guide_id = listing["data"]["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "guide@example.com")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .patch(&format!("/api/v1/users/{guide_id}"))
        .authorization_bearer(&admin_token)
        .json(&json!({ "role": "guide" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["user"]["role"], "guide");
}
