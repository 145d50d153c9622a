/**
 * Review Handlers
 *
 * The nested review endpoints under /tours/{id}/reviews. The flat
 * /reviews routes are served by the generic factory; these two exist
 * because they need the tour id from the path and (for creation) the
 * authenticated author from the request context.
 */

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::crud::{ListQuery, Resource};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::reviews::model::{insert_review, list_for_tour, ReviewCreate, Reviews};

/// POST /tours/{id}/reviews (protected, `user` role)
///
/// The author is always the authenticated user; a second review for the
/// same tour fails with 409.
pub async fn create_review(
    State(pool): State<PgPool>,
    current_user: CurrentUser,
    Path(tour_id): Path<Uuid>,
    Json(input): Json<ReviewCreate>,
) -> Result<Response, ApiError> {
    let review = insert_review(&pool, tour_id, current_user.id, input).await?;
    tracing::info!("User {} reviewed tour {}", current_user.id, tour_id);

    let body = json!({
        "status": "success",
        "data": { "review": review },
    });
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// GET /tours/{id}/reviews
///
/// The tour's reviews, run through the same list grammar as the flat
/// listing endpoints.
pub async fn get_tour_reviews(
    State(pool): State<PgPool>,
    Path(tour_id): Path<Uuid>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let query = ListQuery::parse(&params, Reviews::FIELDS)?;
    let reviews = list_for_tour(&pool, tour_id, &query).await?;

    Ok(Json(json!({
        "status": "success",
        "results": reviews.len(),
        "data": { "reviews": reviews },
    })))
}
