/**
 * Error Conversion
 *
 * Renders `ApiError` into the API's response envelope. All handlers return
 * `Result<_, ApiError>`, so this is the single place where handled errors
 * become HTTP responses:
 *
 * ```json
 * { "status": "fail",  "message": "No tour found with that ID" }   // 4xx
 * { "status": "error", "message": "Something went very wrong" }    // 5xx
 * ```
 *
 * Internal error details (database/driver text, dispatch failures) are only
 * exposed when development mode enables it at startup; in production the
 * client sees a generic message while the real error is logged.
 */

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::types::ApiError;

static EXPOSE_INTERNAL: AtomicBool = AtomicBool::new(false);

/// Enable or disable exposure of internal error details
///
/// Called once at startup based on the deployment mode. Defaults to off.
pub fn set_expose_internal(expose: bool) {
    EXPOSE_INTERNAL.store(expose, Ordering::Relaxed);
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if self.is_internal() {
            tracing::error!("request failed: {self:?}");
            if EXPOSE_INTERNAL.load(Ordering::Relaxed) {
                self.message()
            } else {
                "Something went very wrong".to_string()
            }
        } else {
            tracing::debug!("request rejected: {}", self.message());
            self.message()
        };

        // 4xx is a client failure, 5xx an operational error
        let envelope = if status.is_client_error() {
            "fail"
        } else {
            "error"
        };

        let body = serde_json::json!({
            "status": envelope,
            "message": message,
        });

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_else(|_| {
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Body::from("Internal Server Error"))
                    .unwrap()
            })
    }
}
