/**
 * Update Password Handler
 *
 * PATCH /api/v1/users/updateMyPassword (protected). The authenticated user
 * rotates their own password by proving the current one first. A fresh
 * session token is issued because the old one becomes stale the moment
 * `password_changed_at` moves.
 */

use axum::{extract::State, http::StatusCode, response::Response, Json};

use crate::auth::handlers::types::{
    create_send_token, validate_new_password, UpdatePasswordRequest,
};
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::server::state::AppState;
use crate::users::model::{find_active_by_id, set_password};

/// Update-password handler
///
/// # Errors
///
/// * `401 Unauthorized` - the current password is wrong
/// * `400 Bad Request` - the new password fails validation
pub async fn update_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<Response, ApiError> {
    // Re-fetch for the stored hash; CurrentUser deliberately does not
    // carry credential fields.
    let user = find_active_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| {
            ApiError::unauthorized("The user belonging to this token does no longer exist")
        })?;

    if !verify_password(&request.password_current, &user.password_hash)? {
        return Err(ApiError::unauthorized("Your current password is wrong"));
    }

    validate_new_password(&request.password, &request.password_confirm)?;

    let password_hash = hash_password(&request.password)?;
    set_password(&state.pool, user.id, &password_hash).await?;

    tracing::info!("Password updated for {}", user.email);

    create_send_token(user.into(), StatusCode::OK, &state.config)
}
