/**
 * Router Configuration
 *
 * This module assembles the full route table under /api/v1 and the static
 * front-end service.
 *
 * # Route Map
 *
 * ## Users
 * - `POST /api/v1/users/signup`, `POST /users/login`, `GET /users/logout`
 * - `POST /users/forgotPassword`, `PATCH /users/resetPassword/{token}`
 * - Protected: `PATCH /users/updateMyPassword`, `GET /users/me`,
 *   `PATCH /users/updateMe`, `DELETE /users/deleteMe`
 * - Admin only: `GET /users`, `GET|PATCH|DELETE /users/{id}`
 *
 * ## Tours
 * - `GET /tours`, `GET /tours/{id}`, `GET /tours/top-5-cheap`,
 *   `GET /tours/tour-stats`, `GET /tours/monthly-plan/{year}`
 * - Admin/lead-guide: `POST /tours`, `PATCH|DELETE /tours/{id}`
 * - Nested reviews: `GET /tours/{id}/reviews`,
 *   `POST /tours/{id}/reviews` (user role)
 *
 * ## Reviews
 * - `GET /reviews`, `GET /reviews/{id}`
 * - Protected: `PATCH|DELETE /reviews/{id}`
 *
 * ## Bookings
 * - Protected: `GET /bookings/checkout-session/{tour_id}`
 *
 * # Middleware Layering
 *
 * Protected sub-routers are built separately and merged, with `protect`
 * layered outside `restrict_to` so authentication always runs first.
 * Everything that does not match the API falls through to the static
 * front-end under `public/`.
 */

use axum::{
    extract::Request,
    middleware::{self, Next},
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::auth::handlers::{
    forgot_password, login, logout, reset_password, signup, update_password,
};
use crate::crud::factory::{create_one, delete_one, get_all, get_one, update_one};
use crate::middleware::auth::{protect, restrict_to, ADMIN_ONLY, REVIEWERS, TOUR_MANAGERS};
use crate::payments::checkout_session;
use crate::reviews::handlers::{create_review, get_tour_reviews};
use crate::reviews::Reviews;
use crate::server::state::AppState;
use crate::tours::handlers::{monthly_plan, top_five_cheap, tour_stats};
use crate::tours::Tours;
use crate::users::handlers::{delete_me, get_me, update_me};
use crate::users::Users;

/// Create the Axum router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/users", user_routes(&state))
        .nest("/tours", tour_routes(&state))
        .nest("/reviews", review_routes(&state))
        .nest("/bookings", booking_routes(&state));

    Router::new()
        .nest("/api/v1", api)
        .fallback_service(ServeDir::new("public"))
        .with_state(state)
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/forgotPassword", post(forgot_password))
        .route("/resetPassword/{token}", patch(reset_password));

    let protected = Router::new()
        .route("/updateMyPassword", patch(update_password))
        .route("/me", get(get_me))
        .route("/updateMe", patch(update_me))
        .route("/deleteMe", delete(delete_me))
        .layer(middleware::from_fn_with_state(state.clone(), protect));

    let admin = Router::new()
        .route("/", get(get_all::<Users>))
        .route(
            "/{id}",
            get(get_one::<Users>)
                .patch(update_one::<Users>)
                .delete(delete_one::<Users>),
        )
        .layer(middleware::from_fn(|req: Request, next: Next| {
            restrict_to(ADMIN_ONLY, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), protect));

    public.merge(protected).merge(admin)
}

fn tour_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(get_all::<Tours>))
        .route("/top-5-cheap", get(top_five_cheap))
        .route("/tour-stats", get(tour_stats))
        .route("/monthly-plan/{year}", get(monthly_plan))
        .route("/{id}", get(get_one::<Tours>));

    let managed = Router::new()
        .route("/", post(create_one::<Tours>))
        .route(
            "/{id}",
            patch(update_one::<Tours>).delete(delete_one::<Tours>),
        )
        .layer(middleware::from_fn(|req: Request, next: Next| {
            restrict_to(TOUR_MANAGERS, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), protect));

    public
        .merge(managed)
        .nest("/{id}/reviews", nested_review_routes(state))
}

fn nested_review_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/", get(get_tour_reviews));

    let writing = Router::new()
        .route("/", post(create_review))
        .layer(middleware::from_fn(|req: Request, next: Next| {
            restrict_to(REVIEWERS, req, next)
        }))
        .layer(middleware::from_fn_with_state(state.clone(), protect));

    public.merge(writing)
}

fn review_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(get_all::<Reviews>))
        .route("/{id}", get(get_one::<Reviews>));

    let protected = Router::new()
        .route(
            "/{id}",
            patch(update_one::<Reviews>).delete(delete_one::<Reviews>),
        )
        .layer(middleware::from_fn_with_state(state.clone(), protect));

    public.merge(protected)
}

fn booking_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/checkout-session/{tour_id}", get(checkout_session))
        .layer(middleware::from_fn_with_state(state.clone(), protect))
}
