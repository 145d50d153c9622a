//! Trailhead - Tour Booking Backend
//!
//! Trailhead is a tour-booking REST backend: JWT authentication, generic
//! CRUD over tours/users/reviews with a validated list-query grammar,
//! a password-reset flow over SMTP, profile photo upload with server-side
//! resizing, and Stripe checkout-session creation. A thin browser
//! front-end under `public/` calls the API.
//!
//! # Module Structure
//!
//! - **`server`** - Configuration, application state, and app assembly
//! - **`error`** - The `ApiError` taxonomy and its response rendering
//! - **`auth`** - Password hashing, reset tokens, JWT sessions, and the
//!   authentication handlers
//! - **`middleware`** - `protect` / `restrict_to` and the per-request
//!   `CurrentUser` context
//! - **`crud`** - The generic CRUD factory: `Resource` trait, query
//!   grammar, and parametrized handlers
//! - **`users`** / **`tours`** / **`reviews`** - Entity controllers built
//!   on the factory, plus the aggregation reports and the tour-rating
//!   recomputation
//! - **`email`** - Outbound SMTP (welcome and password-reset mail)
//! - **`payments`** - Stripe checkout-session creation
//! - **`routes`** - Route wiring under `/api/v1`
//!
//! # Request Flow
//!
//! ```text
//! request -> router -> [protect -> restrict_to] -> controller -> sqlx
//!         -> JSON envelope | ApiError -> centralized IntoResponse
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use trailhead::server::config::Config;
//! use trailhead::server::init::create_app;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let app = create_app(config).await?;
//! // Serve `app` with axum
//! # Ok(())
//! # }
//! ```

/// Runtime configuration, state, and app assembly
pub mod server;

/// Error taxonomy and response rendering
pub mod error;

/// Authentication: passwords, tokens, and handlers
pub mod auth;

/// Request middleware (protect, restrict_to)
pub mod middleware;

/// Generic CRUD factory
pub mod crud;

/// User entity
pub mod users;

/// Tour entity
pub mod tours;

/// Review entity
pub mod reviews;

/// Outbound email
pub mod email;

/// Payment-session creation
pub mod payments;

/// Route wiring
pub mod routes;
