/**
 * User Model and Database Operations
 *
 * This module handles user data and database operations.
 *
 * # Soft Deletion
 *
 * Users are never hard-deleted; `deactivate` flips the `active` flag and
 * every read query here filters on `WHERE active` explicitly. Queries that
 * need deactivated rows would have to say so - there is no implicit hook
 * that can be bypassed.
 *
 * # Password Handling
 *
 * The full `User` struct carries the bcrypt hash and the reset-token
 * fields, and is deliberately not serializable. Anything that leaves the
 * API goes through `PublicUser`.
 */

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::crud::{Field, ListQuery, Resource};
use crate::error::ApiError;

/// User role, stored as the `user_role` Postgres enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    User,
    Guide,
    LeadGuide,
    Admin,
}

/// Full user row, including credential fields
///
/// Not `Serialize` on purpose: the password hash and reset-token fields
/// must never reach a response. Convert to `PublicUser` first.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo: String,
    pub role: Role,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    /// Set whenever the password changes; tokens issued before this are stale
    pub password_changed_at: Option<DateTime<Utc>>,
    /// SHA-256 hex of the outstanding reset token, if any
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// The user fields that are safe to serialize into responses
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            photo: user.photo,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, name, email, photo, role, password_hash, \
     password_changed_at, password_reset_token, password_reset_expires, active, created_at";

const PUBLIC_COLUMNS: &str = "id, name, email, photo, role, created_at";

/// Create a new user with the `user` role
///
/// A duplicate email surfaces as a unique-violation database error, which
/// the error layer renders as 409 Conflict.
pub async fn insert_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4();

    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, name, email, password_hash, created_at)
        VALUES ($1, $2, $3, $4, now())
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

/// Get an active user by email
pub async fn find_active_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE email = $1 AND active
        "#
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Get an active user by ID
pub async fn find_active_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE id = $1 AND active
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Find the active user holding an unexpired reset token
///
/// The lookup is by the stored SHA-256 hash of the token; expiry is checked
/// in SQL so a consumed or timed-out token never matches.
pub async fn find_by_reset_token(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT {USER_COLUMNS}
        FROM users
        WHERE password_reset_token = $1
          AND password_reset_expires > now()
          AND active
        "#
    ))
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

/// Persist a reset-token hash and its expiry
pub async fn set_reset_token(
    pool: &PgPool,
    id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_reset_token = $2, password_reset_expires = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Clear the reset-token fields
///
/// Called on successful reset and to roll back when the reset email could
/// not be delivered.
pub async fn clear_reset_token(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_reset_token = NULL, password_reset_expires = NULL
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Set a new password hash
///
/// Clears any outstanding reset token and stamps `password_changed_at` one
/// second in the past, so the session token issued immediately afterwards
/// is not itself considered stale.
pub async fn set_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<(), sqlx::Error> {
    let changed_at = Utc::now() - Duration::seconds(1);

    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2,
            password_changed_at = $3,
            password_reset_token = NULL,
            password_reset_expires = NULL
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(password_hash)
    .bind(changed_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update an active user's profile fields
///
/// Only the given fields change; `None` leaves a column untouched.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
    photo: Option<&str>,
) -> Result<Option<PublicUser>, sqlx::Error> {
    sqlx::query_as::<_, PublicUser>(&format!(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            email = COALESCE($3, email),
            photo = COALESCE($4, photo)
        WHERE id = $1 AND active
        RETURNING {PUBLIC_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(photo)
    .fetch_optional(pool)
    .await
}

/// Soft-delete a user
pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET active = FALSE
        WHERE id = $1 AND active
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Admin-side partial update body for PATCH /users/{id}
#[derive(Debug, Deserialize)]
pub struct UserAdminUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// The users entity as seen by the admin CRUD routes
///
/// Reads go through `PublicUser` and exclude deactivated rows; delete is
/// the soft delete. Creation is not served here - accounts only come into
/// existence through signup.
pub struct Users;

#[async_trait]
impl Resource for Users {
    const NAME: &'static str = "user";
    const TABLE: &'static str = "users";
    const FIELDS: &'static [Field] = &[
        Field::text("name"),
        Field::text("email"),
        Field::text("role"),
        Field::text("photo"),
        Field::timestamp("created_at"),
    ];

    type Record = PublicUser;
    type Create = serde_json::Value;
    type Update = UserAdminUpdate;

    async fn insert(_pool: &PgPool, _input: Self::Create) -> Result<Self::Record, ApiError> {
        Err(ApiError::validation(
            "This route is not defined! Please use /signup instead",
        ))
    }

    async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self::Record>, ApiError> {
        let user = sqlx::query_as::<_, PublicUser>(&format!(
            r#"
            SELECT {PUBLIC_COLUMNS}
            FROM users
            WHERE id = $1 AND active
            "#
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    async fn update_by_id(
        pool: &PgPool,
        id: Uuid,
        input: Self::Update,
    ) -> Result<Option<Self::Record>, ApiError> {
        if let Some(email) = &input.email {
            if !is_valid_email(email) {
                return Err(ApiError::validation("Please provide a valid email"));
            }
        }
        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(ApiError::validation("Name can not be empty"));
            }
        }

        let user = sqlx::query_as::<_, PublicUser>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role)
            WHERE id = $1 AND active
            RETURNING {PUBLIC_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name)
        .bind(input.email.map(|e| e.trim().to_lowercase()))
        .bind(input.role)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    async fn delete_by_id(pool: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        Ok(deactivate(pool, id).await?)
    }

    async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<Self::Record>, ApiError> {
        let mut qb = sqlx::QueryBuilder::new(format!(
            "SELECT {PUBLIC_COLUMNS} FROM users WHERE active"
        ));
        query.apply(&mut qb, true);

        let users = qb.build_query_as::<PublicUser>().fetch_all(pool).await?;
        Ok(users)
    }
}

/// Basic email shape check: local part, one '@', domain with a dot
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
