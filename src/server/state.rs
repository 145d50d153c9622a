/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * `FromRef` so handlers can extract just the part they use.
 *
 * # Thread Safety
 *
 * Every field is cheaply cloneable and internally shared: `PgPool` and
 * `reqwest::Client` are handles over connection pools, the config is
 * behind an `Arc`, and the mailer clones its transport handle.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::email::Mailer;
use crate::server::config::Config;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Runtime configuration, loaded once at startup
    pub config: Arc<Config>,
    /// Outbound email transport
    pub mailer: Mailer,
    /// HTTP client for the payment provider
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config, mailer: Mailer) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            mailer,
            http: reqwest::Client::new(),
        }
    }
}

/// Lets handlers that only touch the database extract `State<PgPool>`
impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Mailer {
    fn from_ref(state: &AppState) -> Self {
        state.mailer.clone()
    }
}

impl FromRef<AppState> for reqwest::Client {
    fn from_ref(state: &AppState) -> Self {
        state.http.clone()
    }
}
