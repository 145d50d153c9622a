/**
 * Authentication Handler Types
 *
 * Request types for the authentication endpoints, shared input validation,
 * and the token-response builder used by every handler that logs a user in.
 *
 * Camel-case aliases are accepted on the confirmation fields so the
 * browser client can post `passwordConfirm`/`passwordCurrent` directly.
 */

use axum::{
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::sessions::create_token;
use crate::error::ApiError;
use crate::middleware::auth::LOGGED_OUT;
use crate::server::config::Config;
use crate::users::model::PublicUser;

/// Sign up request
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    /// Will be hashed before storage
    pub password: String,
    /// Write-only confirmation, must match `password`; never persisted
    #[serde(alias = "passwordConfirm")]
    pub password_confirm: String,
}

/// Login request
///
/// Both fields are optional so a missing one is reported as a validation
/// error rather than a body-parse rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Forgot-password request
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password request (the token travels in the path)
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
    #[serde(alias = "passwordConfirm")]
    pub password_confirm: String,
}

/// Update-password request for an authenticated user
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    #[serde(alias = "passwordCurrent")]
    pub password_current: String,
    pub password: String,
    #[serde(alias = "passwordConfirm")]
    pub password_confirm: String,
}

/// Validate a new password and its confirmation
///
/// Used by signup, reset, and update password alike.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }
    if password != confirm {
        return Err(ApiError::validation("Passwords do not match"));
    }
    Ok(())
}

/// Issue a session token and build the login response
///
/// Signs a JWT for the user, sets it as an HTTP-only `jwt` cookie (Secure
/// in production), and renders the success envelope with the token and the
/// public user record.
pub fn create_send_token(
    user: PublicUser,
    status: StatusCode,
    config: &Config,
) -> Result<Response, ApiError> {
    let token = create_token(user.id, &config.jwt_secret, config.jwt_expires_in_hours)
        .map_err(|e| {
            tracing::error!("Failed to create token: {:?}", e);
            ApiError::internal("Failed to create session token")
        })?;

    let cookie = session_cookie(&token, config.jwt_expires_in_hours * 3600, config);

    let body = json!({
        "status": "success",
        "token": token,
        "data": { "user": user },
    });

    Ok((status, [(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Build the cookie that discards the client's credential
pub fn logout_cookie(config: &Config) -> String {
    session_cookie(LOGGED_OUT, 10, config)
}

fn session_cookie(value: &str, max_age_secs: i64, config: &Config) -> String {
    let mut cookie = format!("jwt={value}; Path=/; HttpOnly; Max-Age={max_age_secs}");
    if config.environment.is_production() {
        cookie.push_str("; Secure");
    }
    cookie
}
