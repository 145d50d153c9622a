/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP
 * server: database pool creation, migrations, state assembly, and router
 * construction.
 *
 * # Initialization Process
 *
 * 1. Configure error-detail exposure from the deployment mode
 * 2. Connect the PostgreSQL pool (required - this application has no
 *    degraded database-less mode)
 * 3. Run pending migrations
 * 4. Build the mailer and application state
 * 5. Assemble the router
 */

use axum::Router;
use sqlx::PgPool;

use crate::email::Mailer;
use crate::error::{set_expose_internal, ApiError};
use crate::routes::create_router;
use crate::server::config::Config;
use crate::server::state::AppState;

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails when the database is unreachable or migrations can not be
/// applied; the server should not come up half-initialized.
pub async fn create_app(config: Config) -> Result<Router, ApiError> {
    set_expose_internal(config.environment.is_development());

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| ApiError::internal(format!("Migration failed: {e}")))?;
    tracing::info!("Database migrations completed");

    let mailer = Mailer::from_config(&config)?;
    let state = AppState::new(pool, config, mailer);

    Ok(create_router(state))
}
