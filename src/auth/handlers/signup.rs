/**
 * Signup Handler
 *
 * This module implements user registration for POST /api/v1/users/signup.
 *
 * # Registration Process
 *
 * 1. Validate name, email format, password length, and confirmation match
 * 2. Hash the password with bcrypt
 * 3. Create the user (duplicate email surfaces as 409 Conflict)
 * 4. Send the welcome email (best-effort, failures are logged)
 * 5. Issue a session token and return it with the user record
 */

use axum::{extract::State, http::StatusCode, response::Response, Json};

use crate::auth::handlers::types::{create_send_token, validate_new_password, SignupRequest};
use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::server::state::AppState;
use crate::users::model::{insert_user, is_valid_email};

/// Sign up handler
///
/// # Errors
///
/// * `400 Bad Request` - missing name, invalid email, short password, or
///   mismatched confirmation; no record is created
/// * `409 Conflict` - a user with this email already exists
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    tracing::info!("Signup request for email: {}", request.email);

    if request.name.trim().is_empty() {
        return Err(ApiError::validation("Please tell us your name"));
    }

    let email = request.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::validation("Please provide a valid email"));
    }

    validate_new_password(&request.password, &request.password_confirm)?;

    let password_hash = hash_password(&request.password)?;

    let user = insert_user(&state.pool, request.name.trim(), &email, &password_hash).await?;

    // Welcome mail is best-effort: account creation should not fail because
    // SMTP is down.
    if let Err(e) = state.mailer.send_welcome(&user.name, &user.email).await {
        tracing::warn!("Failed to send welcome email to {}: {}", user.email, e);
    }

    tracing::info!("User created successfully: {}", user.email);

    create_send_token(user.into(), StatusCode::CREATED, &state.config)
}
