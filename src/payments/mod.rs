/**
 * Payments
 *
 * Checkout-session creation against the Stripe HTTP API. The server never
 * touches card data: it creates a session describing the tour being booked
 * and hands the client Stripe's hosted checkout URL.
 *
 * The API base URL is configurable so tests can point the client at a
 * local mock.
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::crud::Resource;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::server::config::Config;
use crate::server::state::AppState;
use crate::tours::model::{Tour, Tours};

/// The subset of Stripe's checkout-session object the API returns
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// GET /bookings/checkout-session/{tour_id} (protected)
///
/// Creates a Stripe checkout session for the tour and returns its id and
/// hosted URL.
pub async fn checkout_session(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tour_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let tour = Tours::find_by_id(&state.pool, tour_id)
        .await?
        .ok_or_else(|| ApiError::not_found("tour"))?;

    let session =
        create_checkout_session(&state.http, &state.config, &tour, &current_user.email).await?;

    tracing::info!(
        "Created checkout session {} for tour {} ({})",
        session.id,
        tour.id,
        current_user.email
    );

    Ok(Json(json!({
        "status": "success",
        "session": { "id": session.id, "url": session.url },
    })))
}

/// Create a checkout session via Stripe's form-encoded API
///
/// # Errors
///
/// DeliveryFailed when payments are unconfigured, the request can not be
/// dispatched, or Stripe rejects it.
pub async fn create_checkout_session(
    client: &reqwest::Client,
    config: &Config,
    tour: &Tour,
    customer_email: &str,
) -> Result<CheckoutSession, ApiError> {
    let secret_key = config
        .stripe_secret_key
        .as_ref()
        .ok_or_else(|| ApiError::delivery_failed("Payments are not configured"))?;

    let unit_amount = (tour.price * 100.0).round() as i64;
    let params = checkout_params(tour, customer_email, unit_amount, &config.public_url);

    let response = client
        .post(format!("{}/v1/checkout/sessions", config.stripe_base_url))
        .bearer_auth(secret_key)
        .form(&params)
        .send()
        .await
        .map_err(|e| {
            tracing::error!("Stripe request failed: {:?}", e);
            ApiError::delivery_failed("Could not reach the payment provider")
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!("Stripe rejected checkout session ({}): {}", status, body);
        return Err(ApiError::delivery_failed(
            "The payment provider rejected the request",
        ));
    }

    response.json::<CheckoutSession>().await.map_err(|e| {
        tracing::error!("Invalid Stripe response: {:?}", e);
        ApiError::delivery_failed("Invalid response from the payment provider")
    })
}

fn checkout_params(
    tour: &Tour,
    customer_email: &str,
    unit_amount: i64,
    public_url: &str,
) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "payment".to_string()),
        ("success_url", format!("{public_url}/?booking=success")),
        ("cancel_url", format!("{public_url}/tours/{}", tour.id)),
        ("customer_email", customer_email.to_string()),
        ("client_reference_id", tour.id.to_string()),
        ("line_items[0][quantity]", "1".to_string()),
        (
            "line_items[0][price_data][currency]",
            "usd".to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            unit_amount.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            format!("{} Tour", tour.name),
        ),
        (
            "line_items[0][price_data][product_data][description]",
            tour.summary.clone(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_tour() -> Tour {
        Tour {
            id: Uuid::new_v4(),
            name: "The Forest Hiker".to_string(),
            duration: 5,
            max_group_size: 25,
            difficulty: "easy".to_string(),
            price: 397.0,
            summary: "Breathtaking hike".to_string(),
            description: None,
            ratings_average: 4.5,
            ratings_quantity: 0,
            start_dates: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn test_config(stripe_base_url: String) -> Config {
        Config {
            stripe_secret_key: Some("sk_test_123".to_string()),
            stripe_base_url,
            ..Config::for_tests()
        }
    }

    #[test]
    fn test_price_converts_to_cents() {
        let tour = test_tour();
        let params = checkout_params(&tour, "a@b.com", (tour.price * 100.0).round() as i64, "http://x");
        let amount = params
            .iter()
            .find(|(k, _)| *k == "line_items[0][price_data][unit_amount]")
            .unwrap();
        assert_eq!(amount.1, "39700");
    }

    #[tokio::test]
    async fn test_create_checkout_session_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(body_string_contains("mode=payment"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_abc",
                "url": "https://checkout.stripe.test/pay/cs_test_abc",
            })))
            .mount(&server)
            .await;

        let config = test_config(server.uri());
        let session = create_checkout_session(
            &reqwest::Client::new(),
            &config,
            &test_tour(),
            "user@example.com",
        )
        .await
        .unwrap();

        assert_eq!(session.id, "cs_test_abc");
    }

    #[tokio::test]
    async fn test_provider_rejection_is_delivery_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(402).set_body_string("card error"))
            .mount(&server)
            .await;

        let config = test_config(server.uri());
        let result = create_checkout_session(
            &reqwest::Client::new(),
            &config,
            &test_tour(),
            "user@example.com",
        )
        .await;

        assert!(matches!(result, Err(ApiError::DeliveryFailed { .. })));
    }

    #[tokio::test]
    async fn test_unconfigured_payments_fail_fast() {
        let config = Config {
            stripe_secret_key: None,
            ..Config::for_tests()
        };
        let result = create_checkout_session(
            &reqwest::Client::new(),
            &config,
            &test_tour(),
            "user@example.com",
        )
        .await;

        assert!(matches!(result, Err(ApiError::DeliveryFailed { .. })));
    }
}
