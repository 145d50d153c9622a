/**
 * Login and Logout Handlers
 *
 * POST /api/v1/users/login and GET /api/v1/users/logout.
 *
 * # Security
 *
 * A wrong password and an unknown email produce the identical 401 response
 * ("Incorrect email or password"), so the API gives no signal about which
 * accounts exist. bcrypt verification runs only when a user was found; the
 * uniform error keeps the response shape indistinguishable either way.
 */

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::auth::handlers::types::{create_send_token, logout_cookie, LoginRequest};
use crate::auth::password::verify_password;
use crate::error::ApiError;
use crate::server::state::AppState;
use crate::users::model::find_active_by_email;

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - email or password missing from the body
/// * `401 Unauthorized` - unknown email or wrong password, same shape for
///   both
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (email, password) = match (request.email, request.password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::validation("Please provide email and password!")),
    };

    let email = email.trim().to_lowercase();
    tracing::info!("Login request for: {}", email);

    let user = find_active_by_email(&state.pool, &email).await?;

    let valid = match &user {
        Some(user) => verify_password(&password, &user.password_hash)?,
        None => false,
    };

    let user = match (user, valid) {
        (Some(user), true) => user,
        _ => {
            tracing::warn!("Failed login attempt for: {}", email);
            return Err(ApiError::unauthorized("Incorrect email or password"));
        }
    };

    tracing::info!("User logged in successfully: {}", user.email);

    create_send_token(user.into(), StatusCode::OK, &state.config)
}

/// Logout handler
///
/// Overwrites the `jwt` cookie with a sentinel that expires in 10 seconds,
/// instructing the client to discard its credential. The server keeps no
/// session state to invalidate.
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = logout_cookie(&state.config);
    (
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(json!({ "status": "success" })),
    )
        .into_response()
}
