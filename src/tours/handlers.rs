/**
 * Tour Handlers
 *
 * The tour endpoints that go beyond the generic CRUD factory: the
 * top-5-cheap alias and the two read-only aggregation reports.
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::{TimeZone, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::crud::factory::list_response;
use crate::crud::{ListQuery, Resource};
use crate::error::ApiError;
use crate::tours::model::Tours;

/// GET /tours/top-5-cheap
///
/// Alias for a canned list query: the five best-rated tours, cheapest
/// first among equals, trimmed to the headline fields. Runs through the
/// same grammar as a hand-written query string.
pub async fn top_five_cheap(State(pool): State<PgPool>) -> Result<Json<Value>, ApiError> {
    let params = [
        ("limit".to_string(), "5".to_string()),
        ("sort".to_string(), "-ratings_average,price".to_string()),
        (
            "fields".to_string(),
            "name,price,ratings_average,summary,difficulty".to_string(),
        ),
    ];
    let query = ListQuery::parse(&params, Tours::FIELDS)?;

    list_response::<Tours>(&pool, &query).await
}

/// One row of the ratings summary report
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TourStats {
    pub difficulty: String,
    pub num_tours: i64,
    pub num_ratings: i64,
    pub avg_rating: f64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// GET /tours/tour-stats
///
/// Ratings summary grouped by difficulty over well-rated tours
/// (ratings_average >= 4.5), cheapest group first.
pub async fn tour_stats(State(pool): State<PgPool>) -> Result<Json<Value>, ApiError> {
    let stats = sqlx::query_as::<_, TourStats>(
        r#"
        SELECT UPPER(difficulty) AS difficulty,
               COUNT(*) AS num_tours,
               SUM(ratings_quantity)::BIGINT AS num_ratings,
               AVG(ratings_average) AS avg_rating,
               AVG(price) AS avg_price,
               MIN(price) AS min_price,
               MAX(price) AS max_price
        FROM tours
        WHERE ratings_average >= 4.5
        GROUP BY UPPER(difficulty)
        ORDER BY avg_price
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "stats": stats },
    })))
}

/// One row of the monthly-plan report
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct MonthlyPlanEntry {
    pub month: i32,
    pub num_tour_starts: i64,
    pub tours: Vec<String>,
}

/// GET /tours/monthly-plan/{year}
///
/// Tour starts within the year, grouped by calendar month: start count and
/// the names of the starting tours, busiest months first, at most twelve
/// rows.
pub async fn monthly_plan(
    State(pool): State<PgPool>,
    Path(year): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    // Half-open window [Jan 1 year, Jan 1 year+1)
    let from = Utc
        .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ApiError::validation(format!("Invalid year: {year}")))?;
    let to = Utc
        .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ApiError::validation(format!("Invalid year: {year}")))?;

    let plan = sqlx::query_as::<_, MonthlyPlanEntry>(
        r#"
        SELECT EXTRACT(MONTH FROM start_date)::INT AS month,
               COUNT(*) AS num_tour_starts,
               ARRAY_AGG(name ORDER BY name) AS tours
        FROM tours, UNNEST(start_dates) AS start_date
        WHERE start_date >= $1 AND start_date < $2
        GROUP BY month
        ORDER BY num_tour_starts DESC
        LIMIT 12
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "status": "success",
        "data": { "plan": plan },
    })))
}
