//! Application router assembly shared by `main` and the integration tests.

use crate::api::invoices::{self, InvoiceApiState};
use crate::health::HealthChecker;
use crate::middleware::request_id::UuidRequestId;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub fn app_router(invoice_state: InvoiceApiState, health_checker: Option<HealthChecker>) -> Router {
    let invoice_routes = Router::new()
        .route(
            "/api/invoices",
            post(invoices::create_invoice).get(invoices::list_invoices),
        )
        .route("/api/invoices/{id}", get(invoices::get_invoice))
        .with_state(invoice_state);

    let health_routes = Router::new()
        .route("/health", get(liveness))
        .route("/health/ready", get(readiness))
        .with_state(health_checker);

    Router::new()
        .merge(invoice_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

async fn liveness() -> impl IntoResponse {
    Json(json!({ "status": "alive" }))
}

async fn readiness(State(checker): State<Option<HealthChecker>>) -> impl IntoResponse {
    match checker {
        Some(checker) => {
            let status = checker.check().await;
            let code = if status.status == crate::health::HealthState::Healthy {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            (code, Json(json!(status))).into_response()
        }
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unhealthy", "details": "no database configured" })),
        )
            .into_response(),
    }
}
