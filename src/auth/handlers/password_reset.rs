/**
 * Password Reset Flow
 *
 * POST /api/v1/users/forgotPassword and
 * PATCH /api/v1/users/resetPassword/{token}.
 *
 * # Flow
 *
 * 1. forgotPassword generates a high-entropy token, persists only its
 *    SHA-256 hash with a 10-minute expiry, and emails the plaintext. The
 *    token is never exposed over the API. If the email can not be sent the
 *    stored hash is rolled back and the request fails with 502.
 * 2. resetPassword hashes the incoming path token and looks up the user by
 *    the stored hash with an unexpired window. Setting the new password
 *    clears the reset fields, so a token can be consumed at most once.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Json, Response},
};
use serde_json::{json, Value};

use crate::auth::handlers::types::{
    create_send_token, validate_new_password, ForgotPasswordRequest, ResetPasswordRequest,
};
use crate::auth::password::{hash_password, hash_reset_token, ResetToken};
use crate::error::ApiError;
use crate::server::state::AppState;
use crate::users::model::{
    clear_reset_token, find_active_by_email, find_by_reset_token, set_password, set_reset_token,
};

/// Forgot-password handler
///
/// # Errors
///
/// * `404 Not Found` - no active user with that email
/// * `502 Bad Gateway` - the reset email could not be delivered; the
///   persisted token is rolled back so the failed attempt leaves no
///   outstanding credential
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = request.email.trim().to_lowercase();

    let user = find_active_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            message: "There is no user with that email address".to_string(),
        })?;

    let token = ResetToken::generate();
    set_reset_token(&state.pool, user.id, &token.hash, token.expires_at).await?;

    let reset_url = format!(
        "{}/api/v1/users/resetPassword/{}",
        state.config.public_url, token.plain
    );

    if let Err(e) = state
        .mailer
        .send_password_reset(&user.name, &user.email, &reset_url)
        .await
    {
        tracing::error!("Failed to send reset email to {}: {}", user.email, e);

        // Roll back so the undeliverable token is not left outstanding.
        if let Err(e) = clear_reset_token(&state.pool, user.id).await {
            tracing::error!("Failed to roll back reset token: {:?}", e);
        }

        return Err(ApiError::delivery_failed(
            "There was an error sending the email. Try again later!",
        ));
    }

    tracing::info!("Password reset token sent to {}", user.email);

    Ok(Json(json!({
        "status": "success",
        "message": "Token sent to email",
    })))
}

/// Reset-password handler
///
/// # Errors
///
/// * `400 Bad Request` - token unknown, already consumed, or expired; or
///   the new password fails validation
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Response, ApiError> {
    let token_hash = hash_reset_token(&token);

    let user = find_by_reset_token(&state.pool, &token_hash)
        .await?
        .ok_or(ApiError::InvalidOrExpired)?;

    validate_new_password(&request.password, &request.password_confirm)?;

    let password_hash = hash_password(&request.password)?;
    set_password(&state.pool, user.id, &password_hash).await?;

    tracing::info!("Password reset completed for {}", user.email);

    create_send_token(user.into(), StatusCode::OK, &state.config)
}
