/**
 * Authentication Middleware
 *
 * This module provides the `protect` middleware for routes that require an
 * authenticated user, and `restrict_to` for routes that additionally
 * require a role.
 *
 * # Request States
 *
 * Anonymous -> Authenticated (protect) -> Authorized-for-role (restrict_to)
 *
 * The resolved user rides the request as an immutable `CurrentUser`
 * extension; handlers receive it through the extractor rather than any
 * shared global.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::sessions::verify_token;
use crate::error::ApiError;
use crate::server::state::AppState;
use crate::users::model::{find_active_by_id, Role, User};

/// Sentinel value the logout endpoint writes into the jwt cookie
pub const LOGGED_OUT: &str = "loggedout";

/// Roles allowed to manage users
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Roles allowed to create, update, and delete tours
pub const TOUR_MANAGERS: &[Role] = &[Role::Admin, Role::LeadGuide];

/// Roles allowed to write reviews (guides can not review their own tours)
pub const REVIEWERS: &[Role] = &[Role::User];

/// The authenticated subject, attached to the request by `protect`
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub photo: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            photo: user.photo,
        }
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<CurrentUser>().cloned().ok_or_else(|| {
            tracing::warn!("CurrentUser missing from request extensions");
            ApiError::unauthorized("You are not logged in! Please log in to get access.")
        })
    }
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the token from the `Authorization: Bearer` header or the
///    `jwt` cookie (the logout sentinel is ignored)
/// 2. Verifies the token signature and expiry
/// 3. Loads the referenced user; rejects if the account is gone or inactive
/// 4. Rejects tokens issued before the user's last password change
/// 5. Attaches the resolved `CurrentUser` to the request extensions
///
/// Returns 401 Unauthorized on any failure.
pub async fn protect(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers()).ok_or_else(|| {
        ApiError::unauthorized("You are not logged in! Please log in to get access.")
    })?;

    let claims = verify_token(&token, &state.config.jwt_secret).map_err(|e| {
        tracing::warn!("Token verification failed: {:?}", e);
        ApiError::unauthorized("Invalid token. Please log in again.")
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
        tracing::warn!("Invalid user ID in token: {:?}", e);
        ApiError::unauthorized("Invalid token. Please log in again.")
    })?;

    let user = find_active_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| {
            ApiError::unauthorized("The user belonging to this token does no longer exist")
        })?;

    // A token issued before the last password change is stale, even if it
    // has not expired yet.
    if let Some(changed_at) = user.password_changed_at {
        if changed_at.timestamp() > claims.iat {
            return Err(ApiError::unauthorized(
                "User recently changed password! Please log in again.",
            ));
        }
    }

    request.extensions_mut().insert(CurrentUser::from(user));

    Ok(next.run(request).await)
}

/// Role restriction middleware
///
/// Must run after `protect`. Rejects with 403 Forbidden when the
/// authenticated user's role is not in the allowed set.
///
/// # Example
///
/// ```rust,ignore
/// router.layer(middleware::from_fn(|req, next| {
///     restrict_to(ADMIN_ONLY, req, next)
/// }))
/// ```
pub async fn restrict_to(
    roles: &'static [Role],
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request.extensions().get::<CurrentUser>().ok_or_else(|| {
        tracing::warn!("restrict_to ran without protect");
        ApiError::unauthorized("You are not logged in! Please log in to get access.")
    })?;

    if !roles.contains(&user.role) {
        return Err(ApiError::forbidden(
            "You do not have permission to perform this action",
        ));
    }

    Ok(next.run(request).await)
}

/// Extract the session token from the request headers
///
/// Checks the `Authorization: Bearer` header first, then the `jwt` cookie.
/// The logout sentinel cookie counts as no credential.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    headers
        .get(COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|cookie| cookie.strip_prefix("jwt="))
                .filter(|token| !token.is_empty() && *token != LOGGED_OUT)
                .map(str::to_string)
        })
}
