/**
 * Review Model and Database Operations
 *
 * A review is owned by exactly one user and references exactly one tour;
 * at most one review may exist per (tour, user) pair. The uniqueness is a
 * database index, so two concurrent attempts race at the store and the
 * loser fails with a unique violation (rendered as 409 Conflict).
 *
 * # Rating Recomputation
 *
 * Every successful review write or delete calls
 * `recalculate_tour_ratings` for the owning tour. The recomputation is a
 * named step invoked here in the data-access layer, not a hidden lifecycle
 * hook, and it is not transactional with the review write: a crash between
 * the two leaves a stale aggregate that self-heals on the next mutation.
 *
 * # Reads
 *
 * Reads go through the `review_details` view, which joins in the
 * reviewer's public name and photo.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::crud::{Field, ListQuery, Resource};
use crate::error::ApiError;

/// Rating assigned to a tour with no reviews
pub const DEFAULT_RATING: f64 = 4.5;

/// A review joined with its author's public fields
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReviewDetails {
    pub id: Uuid,
    pub review: String,
    pub rating: f64,
    pub tour_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_photo: String,
}

/// Request body for creating a review
///
/// The tour comes from the path and the author from the authenticated
/// context, so neither can be forged through the body.
#[derive(Debug, Deserialize)]
pub struct ReviewCreate {
    pub review: String,
    pub rating: f64,
}

/// Request body for partially updating a review
#[derive(Debug, Deserialize)]
pub struct ReviewUpdate {
    pub review: Option<String>,
    pub rating: Option<f64>,
}

fn validate_rating(rating: f64) -> Result<(), ApiError> {
    if !rating.is_finite() || !(1.0..=5.0).contains(&rating) {
        return Err(ApiError::validation("Rating must be between 1.0 and 5.0"));
    }
    Ok(())
}

fn validate_review_text(review: &str) -> Result<(), ApiError> {
    let len = review.trim().chars().count();
    if !(10..=500).contains(&len) {
        return Err(ApiError::validation(
            "Review must be between 10 and 500 characters",
        ));
    }
    Ok(())
}

/// Create a review for a tour and refresh the tour's rating aggregate
///
/// # Errors
///
/// * `404` - the tour does not exist
/// * `409` - this user already reviewed this tour (unique index)
pub async fn insert_review(
    pool: &PgPool,
    tour_id: Uuid,
    user_id: Uuid,
    input: ReviewCreate,
) -> Result<ReviewDetails, ApiError> {
    validate_rating(input.rating)?;
    validate_review_text(&input.review)?;

    let tour_exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tours WHERE id = $1)")
        .bind(tour_id)
        .fetch_one(pool)
        .await?;
    if !tour_exists {
        return Err(ApiError::not_found("tour"));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO reviews (id, review, rating, tour_id, user_id, created_at)
        VALUES ($1, $2, $3, $4, $5, now())
        "#,
    )
    .bind(id)
    .bind(input.review.trim())
    .bind(input.rating)
    .bind(tour_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    recalculate_tour_ratings(pool, tour_id).await?;

    let details = find_details_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::internal("Created review disappeared"))?;

    Ok(details)
}

/// Fetch a review (with author fields) by id
pub async fn find_details_by_id(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<ReviewDetails>, sqlx::Error> {
    sqlx::query_as::<_, ReviewDetails>("SELECT * FROM review_details WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Recompute a tour's rating aggregate from its current reviews
///
/// Sets count and mean; a tour with no reviews gets 0 reviews at the
/// default 4.5 average.
pub async fn recalculate_tour_ratings(pool: &PgPool, tour_id: Uuid) -> Result<(), sqlx::Error> {
    let (quantity, average): (i64, Option<f64>) = sqlx::query_as(
        r#"
        SELECT COUNT(*), AVG(rating)
        FROM reviews
        WHERE tour_id = $1
        "#,
    )
    .bind(tour_id)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        UPDATE tours
        SET ratings_quantity = $2, ratings_average = $3
        WHERE id = $1
        "#,
    )
    .bind(tour_id)
    .bind(quantity as i32)
    .bind(average.unwrap_or(DEFAULT_RATING))
    .execute(pool)
    .await?;

    tracing::debug!(
        "Recalculated ratings for tour {}: {} reviews",
        tour_id,
        quantity
    );

    Ok(())
}

/// List reviews for one tour through the validated list grammar
pub async fn list_for_tour(
    pool: &PgPool,
    tour_id: Uuid,
    query: &ListQuery,
) -> Result<Vec<ReviewDetails>, ApiError> {
    let mut qb = sqlx::QueryBuilder::new("SELECT * FROM review_details WHERE tour_id = ");
    qb.push_bind(tour_id);
    query.apply(&mut qb, true);

    let reviews = qb.build_query_as::<ReviewDetails>().fetch_all(pool).await?;
    Ok(reviews)
}

/// The reviews entity served by the generic CRUD routes
///
/// Creation is not served by the factory: it needs the authenticated
/// author and the tour from the nested path, see `reviews::handlers`.
pub struct Reviews;

#[async_trait]
impl Resource for Reviews {
    const NAME: &'static str = "review";
    const TABLE: &'static str = "reviews";
    const FIELDS: &'static [Field] = &[
        Field::number("rating"),
        Field::text("user_name"),
        Field::timestamp("created_at"),
    ];

    type Record = ReviewDetails;
    type Create = serde_json::Value;
    type Update = ReviewUpdate;

    async fn insert(_pool: &PgPool, _input: Self::Create) -> Result<Self::Record, ApiError> {
        Err(ApiError::validation(
            "Reviews are created through POST /tours/{id}/reviews",
        ))
    }

    async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self::Record>, ApiError> {
        Ok(find_details_by_id(pool, id).await?)
    }

    async fn update_by_id(
        pool: &PgPool,
        id: Uuid,
        input: Self::Update,
    ) -> Result<Option<Self::Record>, ApiError> {
        if let Some(rating) = input.rating {
            validate_rating(rating)?;
        }
        if let Some(review) = &input.review {
            validate_review_text(review)?;
        }

        let tour_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE reviews
            SET review = COALESCE($2, review),
                rating = COALESCE($3, rating)
            WHERE id = $1
            RETURNING tour_id
            "#,
        )
        .bind(id)
        .bind(input.review.map(|r| r.trim().to_string()))
        .bind(input.rating)
        .fetch_optional(pool)
        .await?;

        let Some(tour_id) = tour_id else {
            return Ok(None);
        };

        recalculate_tour_ratings(pool, tour_id).await?;

        Ok(find_details_by_id(pool, id).await?)
    }

    async fn delete_by_id(pool: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let tour_id: Option<Uuid> =
            sqlx::query_scalar("DELETE FROM reviews WHERE id = $1 RETURNING tour_id")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        let Some(tour_id) = tour_id else {
            return Ok(false);
        };

        recalculate_tour_ratings(pool, tour_id).await?;

        Ok(true)
    }

    async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<Self::Record>, ApiError> {
        let mut qb = sqlx::QueryBuilder::new("SELECT * FROM review_details");
        query.apply(&mut qb, false);

        let reviews = qb.build_query_as::<ReviewDetails>().fetch_all(pool).await?;
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(1.0).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(0.9).is_err());
        assert!(validate_rating(5.1).is_err());
        assert!(validate_rating(f64::NAN).is_err());
    }

    #[test]
    fn test_review_text_bounds() {
        assert!(validate_review_text("An amazing experience!").is_ok());
        assert!(validate_review_text("Too short").is_err());
        assert!(validate_review_text(&"x".repeat(501)).is_err());
    }
}
