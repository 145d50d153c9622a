/**
 * Server Configuration
 *
 * This module loads all runtime configuration from environment variables
 * into a single `Config` struct at startup, so handlers never read the
 * environment directly.
 *
 * # Configuration Sources
 *
 * Required:
 * - `DATABASE_URL` - PostgreSQL connection string
 * - `JWT_SECRET`   - HS256 signing secret
 *
 * Optional (with defaults):
 * - `SERVER_PORT` (3000), `APP_ENV` (development), `PUBLIC_URL`,
 *   `JWT_EXPIRES_IN_HOURS` (2160 = 90 days), `EMAIL_FROM`,
 *   `UPLOAD_DIR` (public/img/users), `STRIPE_BASE_URL`
 * - `SMTP_HOST`/`SMTP_PORT`/`SMTP_USERNAME`/`SMTP_PASSWORD` - outbound
 *   email is disabled when the host is absent
 * - `STRIPE_SECRET_KEY` - payments are disabled when absent
 */

use std::path::PathBuf;

use crate::error::ApiError;

/// Deployment mode, from `APP_ENV`
///
/// Controls whether internal error details reach clients and whether the
/// session cookie is marked Secure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// SMTP relay settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Consolidated runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub environment: Environment,
    /// Externally visible base URL, used in reset links and checkout redirects
    pub public_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in_hours: i64,
    pub smtp: Option<SmtpConfig>,
    pub email_from: String,
    pub stripe_secret_key: Option<String>,
    pub stripe_base_url: String,
    pub upload_dir: PathBuf,
}

impl Config {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Fails fast when a required variable is missing or a value does not
    /// parse; a server with half a configuration should not come up.
    pub fn from_env() -> Result<Self, ApiError> {
        let port = env_or("SERVER_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ApiError::internal("SERVER_PORT must be a port number"))?;

        let database_url = require_env("DATABASE_URL")?;
        let jwt_secret = require_env("JWT_SECRET")?;

        let environment = match env_or("APP_ENV", "development").as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };

        let jwt_expires_in_hours = env_or("JWT_EXPIRES_IN_HOURS", "2160")
            .parse::<i64>()
            .map_err(|_| ApiError::internal("JWT_EXPIRES_IN_HOURS must be a number"))?;

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                port: env_or("SMTP_PORT", "587")
                    .parse::<u16>()
                    .map_err(|_| ApiError::internal("SMTP_PORT must be a port number"))?,
                username: std::env::var("SMTP_USERNAME").ok(),
                password: std::env::var("SMTP_PASSWORD").ok(),
            }),
            Err(_) => None,
        };

        Ok(Self {
            port,
            database_url,
            environment,
            public_url: env_or("PUBLIC_URL", &format!("http://localhost:{port}")),
            jwt_secret,
            jwt_expires_in_hours,
            smtp,
            email_from: env_or("EMAIL_FROM", "Trailhead <noreply@trailhead.dev>"),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY").ok(),
            stripe_base_url: env_or("STRIPE_BASE_URL", "https://api.stripe.com"),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "public/img/users")),
        })
    }

    /// A self-contained configuration for test servers
    ///
    /// No SMTP, no Stripe key, development mode, and a throwaway secret.
    /// Tests override individual fields with struct-update syntax.
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            database_url: String::new(),
            environment: Environment::Development,
            public_url: "http://localhost:3000".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expires_in_hours: 2,
            smtp: None,
            email_from: "Trailhead <noreply@trailhead.test>".to_string(),
            stripe_secret_key: None,
            stripe_base_url: "https://api.stripe.com".to_string(),
            upload_dir: std::env::temp_dir().join("trailhead-test-uploads"),
        }
    }
}

fn require_env(name: &str) -> Result<String, ApiError> {
    std::env::var(name).map_err(|_| {
        tracing::error!("Missing required environment variable: {}", name);
        ApiError::internal(format!("{name} must be set"))
    })
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
