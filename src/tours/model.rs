/**
 * Tour Model and Database Operations
 *
 * This module handles tour data: the record type, creation/update
 * validation, and the `Resource` implementation backing the generic CRUD
 * routes.
 *
 * # Rating Aggregate
 *
 * `ratings_average` and `ratings_quantity` are a derived projection over
 * the tour's reviews. They are never writable through this module; the
 * review data-access layer recomputes them on every review mutation.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::crud::{Field, ListQuery, Resource};
use crate::error::ApiError;

/// Accepted difficulty levels
pub const DIFFICULTIES: &[&str] = &["easy", "medium", "difficult"];

/// A bookable tour
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tour {
    pub id: Uuid,
    pub name: String,
    /// Duration in days
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: String,
    pub price: f64,
    pub summary: String,
    pub description: Option<String>,
    /// Derived: mean review rating, 4.5 when the tour has no reviews
    pub ratings_average: f64,
    /// Derived: review count
    pub ratings_quantity: i32,
    pub start_dates: Vec<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a tour
#[derive(Debug, Deserialize)]
pub struct TourCreate {
    pub name: String,
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: String,
    pub price: f64,
    pub summary: String,
    pub description: Option<String>,
    #[serde(default)]
    pub start_dates: Vec<DateTime<Utc>>,
}

impl TourCreate {
    fn validate(&self) -> Result<(), ApiError> {
        validate_name(&self.name)?;
        validate_difficulty(&self.difficulty)?;
        validate_price(self.price)?;
        if self.summary.trim().is_empty() {
            return Err(ApiError::validation("A tour must have a summary"));
        }
        if self.duration < 1 {
            return Err(ApiError::validation("A tour must have a duration"));
        }
        if self.max_group_size < 1 {
            return Err(ApiError::validation("A tour must have a group size"));
        }
        Ok(())
    }
}

/// Request body for partially updating a tour
///
/// Absent fields leave the stored value untouched; present fields re-run
/// the same validation as creation.
#[derive(Debug, Deserialize)]
pub struct TourUpdate {
    pub name: Option<String>,
    pub duration: Option<i32>,
    pub max_group_size: Option<i32>,
    pub difficulty: Option<String>,
    pub price: Option<f64>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
}

impl TourUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(difficulty) = &self.difficulty {
            validate_difficulty(difficulty)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(summary) = &self.summary {
            if summary.trim().is_empty() {
                return Err(ApiError::validation("A tour must have a summary"));
            }
        }
        if let Some(duration) = self.duration {
            if duration < 1 {
                return Err(ApiError::validation("A tour must have a duration"));
            }
        }
        if let Some(size) = self.max_group_size {
            if size < 1 {
                return Err(ApiError::validation("A tour must have a group size"));
            }
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    let len = name.trim().chars().count();
    if !(3..=60).contains(&len) {
        return Err(ApiError::validation(
            "A tour name must have between 3 and 60 characters",
        ));
    }
    Ok(())
}

fn validate_difficulty(difficulty: &str) -> Result<(), ApiError> {
    if !DIFFICULTIES.contains(&difficulty) {
        return Err(ApiError::validation(
            "Difficulty is either: easy, medium, difficult",
        ));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), ApiError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(ApiError::validation("A tour price must be above zero"));
    }
    Ok(())
}

/// The tours entity served by the generic CRUD routes
pub struct Tours;

#[async_trait]
impl Resource for Tours {
    const NAME: &'static str = "tour";
    const TABLE: &'static str = "tours";
    const FIELDS: &'static [Field] = &[
        Field::text("name"),
        Field::number("duration"),
        Field::number("max_group_size"),
        Field::text("difficulty"),
        Field::number("price"),
        Field::text("summary"),
        Field::number("ratings_average"),
        Field::number("ratings_quantity"),
        Field::timestamp("created_at"),
    ];

    type Record = Tour;
    type Create = TourCreate;
    type Update = TourUpdate;

    async fn insert(pool: &PgPool, input: Self::Create) -> Result<Self::Record, ApiError> {
        input.validate()?;

        let tour = sqlx::query_as::<_, Tour>(
            r#"
            INSERT INTO tours (id, name, duration, max_group_size, difficulty,
                               price, summary, description, start_dates, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.duration)
        .bind(input.max_group_size)
        .bind(&input.difficulty)
        .bind(input.price)
        .bind(input.summary.trim())
        .bind(&input.description)
        .bind(&input.start_dates)
        .fetch_one(pool)
        .await?;

        Ok(tour)
    }

    async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self::Record>, ApiError> {
        let tour = sqlx::query_as::<_, Tour>("SELECT * FROM tours WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(tour)
    }

    async fn update_by_id(
        pool: &PgPool,
        id: Uuid,
        input: Self::Update,
    ) -> Result<Option<Self::Record>, ApiError> {
        input.validate()?;

        let tour = sqlx::query_as::<_, Tour>(
            r#"
            UPDATE tours
            SET name = COALESCE($2, name),
                duration = COALESCE($3, duration),
                max_group_size = COALESCE($4, max_group_size),
                difficulty = COALESCE($5, difficulty),
                price = COALESCE($6, price),
                summary = COALESCE($7, summary),
                description = COALESCE($8, description),
                start_dates = COALESCE($9, start_dates)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.map(|n| n.trim().to_string()))
        .bind(input.duration)
        .bind(input.max_group_size)
        .bind(input.difficulty)
        .bind(input.price)
        .bind(input.summary.map(|s| s.trim().to_string()))
        .bind(input.description)
        .bind(input.start_dates)
        .fetch_optional(pool)
        .await?;

        Ok(tour)
    }

    async fn delete_by_id(pool: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<Self::Record>, ApiError> {
        let mut qb = sqlx::QueryBuilder::new("SELECT * FROM tours");
        query.apply(&mut qb, false);

        let tours = qb.build_query_as::<Tour>().fetch_all(pool).await?;
        Ok(tours)
    }
}
