//! Tour API integration tests
//!
//! Listing grammar (filter/sort/paginate/project), role-restricted writes,
//! and the aggregation reports.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;

use common::database::TestDatabase;
use common::helpers::{count_rows, seed_tour, set_role, signup_user, test_server};

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_listing_sort_limit_page() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    seed_tour(db.pool(), "Cheap Tour", 100.0, 4.0).await;
    seed_tour(db.pool(), "Mid Tour", 500.0, 4.5).await;
    seed_tour(db.pool(), "Pricey Tour", 900.0, 5.0).await;

    let response = server.get("/api/v1/tours?sort=-price&limit=2&page=1").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["results"], 2);
    let tours = body["data"]["tours"].as_array().unwrap();
    assert_eq!(tours[0]["name"], "Pricey Tour");
    assert_eq!(tours[1]["name"], "Mid Tour");

    let page_two: Value = server
        .get("/api/v1/tours?sort=-price&limit=2&page=2")
        .await
        .json();
    assert_eq!(page_two["results"], 1);
    assert_eq!(page_two["data"]["tours"][0]["name"], "Cheap Tour");
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_listing_comparison_filter() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    seed_tour(db.pool(), "Cheap Tour", 100.0, 4.0).await;
    seed_tour(db.pool(), "Pricey Tour", 900.0, 5.0).await;

    let body: Value = server
        .get("/api/v1/tours")
        .add_query_param("price[gte]", "500")
        .await
        .json();
    assert_eq!(body["results"], 1);
    assert_eq!(body["data"]["tours"][0]["name"], "Pricey Tour");
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_listing_rejects_unknown_field_and_operator() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    let unknown_field = server.get("/api/v1/tours?secret=1").await;
    assert_eq!(unknown_field.status_code(), StatusCode::BAD_REQUEST);

    let unknown_op = server
        .get("/api/v1/tours")
        .add_query_param("price[regex]", "1")
        .await;
    assert_eq!(unknown_op.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_listing_projection() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    seed_tour(db.pool(), "Projected Tour", 100.0, 4.0).await;

    let body: Value = server.get("/api/v1/tours?fields=name,price").await.json();
    let tour = body["data"]["tours"][0].as_object().unwrap();
    let mut keys: Vec<&str> = tour.keys().map(|k| k.as_str()).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["id", "name", "price"]);
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_tour_writes_are_role_restricted() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    let new_tour = json!({
        "name": "The Forest Hiker",
        "duration": 5,
        "max_group_size": 25,
        "difficulty": "easy",
        "price": 397.0,
        "summary": "Breathtaking hike through the forest",
    });

    let anonymous = server.post("/api/v1/tours").json(&new_tour).await;
    assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);

    let user_token = signup_user(&server, "Plain User", "user@example.com", "password123").await;
    let forbidden = server
        .post("/api/v1/tours")
        .authorization_bearer(&user_token)
        .json(&new_tour)
        .await;
    assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

    let guide_token =
        signup_user(&server, "Lead Guide", "guide@example.com", "password123").await;
    set_role(db.pool(), "guide@example.com", "lead-guide").await;
    let created = server
        .post("/api/v1/tours")
        .authorization_bearer(&guide_token)
        .json(&new_tour)
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);

    let body: Value = created.json();
    assert_eq!(body["data"]["tour"]["name"], "The Forest Hiker");
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_create_tour_validates_body() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    let token = signup_user(&server, "Admin", "admin@example.com", "password123").await;
    set_role(db.pool(), "admin@example.com", "admin").await;

    let response = server
        .post("/api/v1/tours")
        .authorization_bearer(&token)
        .json(&json!({
            "name": "The Forest Hiker",
            "duration": 5,
            "max_group_size": 25,
            "difficulty": "extreme",
            "price": 397.0,
            "summary": "Bad difficulty",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(count_rows(db.pool(), "tours").await, 0);
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_patch_nonexistent_tour_is_not_found() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    seed_tour(db.pool(), "Existing Tour", 100.0, 4.0).await;

    let token = signup_user(&server, "Admin", "admin@example.com", "password123").await;
    set_role(db.pool(), "admin@example.com", "admin").await;

    let response = server
        .patch(&format!("/api/v1/tours/{}", uuid::Uuid::new_v4()))
        .authorization_bearer(&token)
        .json(&json!({ "price": 999.0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // Store unchanged
    assert_eq!(count_rows(db.pool(), "tours").await, 1);
    let body: Value = server.get("/api/v1/tours").await.json();
    assert_eq!(body["data"]["tours"][0]["price"], 100.0);
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_get_one_tour() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    let id = seed_tour(db.pool(), "Single Tour", 250.0, 4.2).await;

    let found: Value = server.get(&format!("/api/v1/tours/{id}")).await.json();
    assert_eq!(found["data"]["tour"]["name"], "Single Tour");

    let missing = server
        .get(&format!("/api/v1/tours/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_top_five_cheap_alias() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    for i in 0..7 {
        seed_tour(
            db.pool(),
            &format!("Tour {i}"),
            100.0 + f64::from(i) * 50.0,
            4.0 + f64::from(i % 5) * 0.2,
        )
        .await;
    }

    let body: Value = server.get("/api/v1/tours/top-5-cheap").await.json();
    assert_eq!(body["results"], 5);

    let tours = body["data"]["tours"].as_array().unwrap();
    // Best-rated first, and only the projected fields survive
    let first = tours[0].as_object().unwrap();
    assert!(first.contains_key("ratings_average"));
    assert!(!first.contains_key("duration"));
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_tour_stats_groups_by_difficulty() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    // Only well-rated tours count toward the report
    seed_tour(db.pool(), "Great Easy Tour", 100.0, 4.8).await;
    seed_tour(db.pool(), "Other Easy Tour", 300.0, 4.6).await;
    seed_tour(db.pool(), "Mediocre Tour", 50.0, 3.0).await;

    let body: Value = server.get("/api/v1/tours/tour-stats").await.json();
    let stats = body["data"]["stats"].as_array().unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0]["difficulty"], "EASY");
    assert_eq!(stats[0]["num_tours"], 2);
    assert_eq!(stats[0]["avg_price"], 200.0);
}

#[tokio::test]
#[serial]
#[ignore = "needs a running PostgreSQL"]
async fn test_monthly_plan_counts_starts() {
    let db = TestDatabase::new().await;
    let server = test_server(db.pool());

    let id = seed_tour(db.pool(), "Seasonal Tour", 100.0, 4.0).await;
    sqlx::query(
        "UPDATE tours SET start_dates = ARRAY['2025-06-01T00:00:00Z'::timestamptz, \
         '2025-06-15T00:00:00Z'::timestamptz, '2025-09-01T00:00:00Z'::timestamptz] WHERE id = $1",
    )
    .bind(id)
    .execute(db.pool())
    .await
    .unwrap();

    let body: Value = server.get("/api/v1/tours/monthly-plan/2025").await.json();
    let plan = body["data"]["plan"].as_array().unwrap();
    assert_eq!(plan.len(), 2);
    // Busiest month first
    assert_eq!(plan[0]["month"], 6);
    assert_eq!(plan[0]["num_tour_starts"], 2);
    assert_eq!(plan[1]["month"], 9);

    // A year with no starts is an empty plan
    let empty: Value = server.get("/api/v1/tours/monthly-plan/1999").await.json();
    assert_eq!(empty["data"]["plan"].as_array().unwrap().len(), 0);
}
