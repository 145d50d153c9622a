/**
 * Current-User Handlers
 *
 * The /me family of endpoints: every route here acts on the authenticated
 * subject, so the id never comes from the URL.
 *
 * - GET    /users/me       - own profile
 * - PATCH  /users/updateMe - profile update (multipart, optional photo)
 * - DELETE /users/deleteMe - soft delete
 *
 * Password changes are explicitly rejected here and routed through
 * /updateMyPassword, which re-verifies the current password.
 */

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::crud::Resource;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::server::state::AppState;
use crate::users::model::{deactivate, is_valid_email, update_profile, Users};
use crate::users::photo::{delete_old_photo, photo_filename, process_photo, store_photo};

/// GET /users/me
///
/// The "current user" alias: resolves the id from the authenticated
/// context instead of a path parameter.
pub async fn get_me(
    State(pool): State<PgPool>,
    current_user: CurrentUser,
) -> Result<Json<Value>, ApiError> {
    let user = Users::find_by_id(&pool, current_user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("user"))?;

    Ok(Json(json!({
        "status": "success",
        "data": { "user": user },
    })))
}

/// PATCH /users/updateMe (multipart)
///
/// Accepts `name`, `email`, and an optional `photo` part. The photo is
/// validated as an image, resized to a 500x500 JPEG, and stored under the
/// public images directory; the previous file is removed best-effort after
/// the record points at the new one.
pub async fn update_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut name: Option<String> = None;
    let mut email: Option<String> = None;
    let mut photo_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::validation("Invalid name field"))?,
                );
            }
            "email" => {
                email = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::validation("Invalid email field"))?,
                );
            }
            "photo" => {
                let is_image = field
                    .content_type()
                    .map(|ct| ct.starts_with("image/"))
                    .unwrap_or(false);
                if !is_image {
                    return Err(ApiError::validation(
                        "Not an image! Please upload only images.",
                    ));
                }
                photo_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|_| ApiError::validation("Invalid photo upload"))?
                        .to_vec(),
                );
            }
            "password" | "passwordConfirm" | "password_confirm" => {
                return Err(ApiError::validation(
                    "This route is not for password updates. Please use /updateMyPassword",
                ));
            }
            other => {
                return Err(ApiError::validation(format!("Unknown field: {other}")));
            }
        }
    }

    if let Some(name) = &name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("Name can not be empty"));
        }
    }
    let email = match email {
        Some(email) => {
            let email = email.trim().to_lowercase();
            if !is_valid_email(&email) {
                return Err(ApiError::validation("Please provide a valid email"));
            }
            Some(email)
        }
        None => None,
    };

    // Process and store the photo before touching the record, so a failed
    // resize leaves the profile unchanged.
    let photo = match photo_bytes {
        Some(bytes) => {
            let processed = tokio::task::spawn_blocking(move || process_photo(&bytes))
                .await
                .map_err(|e| {
                    tracing::error!("Photo processing task failed: {:?}", e);
                    ApiError::internal("Failed to process photo")
                })??;

            let filename = photo_filename(current_user.id);
            store_photo(&state.config.upload_dir, &filename, processed).await?;
            Some(filename)
        }
        None => None,
    };

    let user = update_profile(
        &state.pool,
        current_user.id,
        name.as_deref().map(str::trim),
        email.as_deref(),
        photo.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::not_found("user"))?;

    if photo.is_some() && current_user.photo != user.photo {
        delete_old_photo(&state.config.upload_dir, &current_user.photo);
    }

    tracing::info!("Profile updated for {}", user.email);

    Ok(Json(json!({
        "status": "success",
        "data": { "user": user },
    })))
}

/// DELETE /users/deleteMe
///
/// Soft delete: flips the active flag, after which the account is excluded
/// from every default read and the session token stops resolving.
pub async fn delete_me(
    State(pool): State<PgPool>,
    current_user: CurrentUser,
) -> Result<StatusCode, ApiError> {
    deactivate(&pool, current_user.id).await?;
    tracing::info!("User {} deactivated", current_user.id);

    Ok(StatusCode::NO_CONTENT)
}
