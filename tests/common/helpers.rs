//! API test helpers
//!
//! Builds a `TestServer` over the real router with a test configuration
//! (disabled mailer, no payment key), plus shortcuts for creating users,
//! roles, and tours.

use axum_test::TestServer;
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use trailhead::email::Mailer;
use trailhead::routes::create_router;
use trailhead::server::config::Config;
use trailhead::server::state::AppState;

/// Build a test server over the full application router
pub fn test_server(pool: &PgPool) -> TestServer {
    test_server_with_config(pool, Config::for_tests())
}

/// Build a test server with a customized configuration
pub fn test_server_with_config(pool: &PgPool, config: Config) -> TestServer {
    let mailer = Mailer::disabled("Trailhead <noreply@trailhead.test>");
    let state = AppState::new(pool.clone(), config, mailer);
    TestServer::new(create_router(state)).expect("Failed to build test server")
}

/// Sign a user up through the API and return their session token
pub async fn signup_user(server: &TestServer, name: &str, email: &str, password: &str) -> String {
    let response = server
        .post("/api/v1/users/signup")
        .json(&json!({
            "name": name,
            "email": email,
            "password": password,
            "passwordConfirm": password,
        }))
        .await;

    let body: Value = response.json();
    body["token"]
        .as_str()
        .expect("signup response carries a token")
        .to_string()
}

/// Directly set a user's role, bypassing the API
pub async fn set_role(pool: &PgPool, email: &str, role: &str) {
    sqlx::query("UPDATE users SET role = $1::user_role WHERE email = $2")
        .bind(role)
        .bind(email)
        .execute(pool)
        .await
        .expect("Failed to set role");
}

/// Seed a tour directly into the store
pub async fn seed_tour(pool: &PgPool, name: &str, price: f64, ratings_average: f64) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO tours (id, name, duration, max_group_size, difficulty,
                           price, summary, ratings_average, created_at)
        VALUES ($1, $2, 5, 25, 'easy', $3, 'A test tour for the suite', $4, now())
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(price)
    .bind(ratings_average)
    .execute(pool)
    .await
    .expect("Failed to seed tour");
    id
}

/// Count rows in a table
pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

/// Fetch a tour's rating aggregate (quantity, average)
pub async fn tour_ratings(pool: &PgPool, tour_id: Uuid) -> (i32, f64) {
    sqlx::query_as("SELECT ratings_quantity, ratings_average FROM tours WHERE id = $1")
        .bind(tour_id)
        .fetch_one(pool)
        .await
        .expect("Failed to fetch tour ratings")
}
