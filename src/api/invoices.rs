//! Invoice API
//!
//! Endpoints used by the kiosk frontend: create an invoice for a checkout,
//! fetch one by id, and list the most recent ones.

use crate::database::invoice_repository::InvoiceRepository;
use crate::error::AppError;
use crate::invoices::error::InvoiceError;
use crate::invoices::types::{Invoice, RequestParameters};
use crate::invoices::workflow::CreateInvoiceWorkflow;
use crate::middleware::request_id::request_id_from_headers;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

const DEFAULT_LIST_LIMIT: i64 = 20;
const MAX_LIST_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct InvoiceApiState {
    pub workflow: Arc<CreateInvoiceWorkflow>,
    pub repository: Arc<dyn InvoiceRepository>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<Invoice>,
}

fn attach_request_id(error: InvoiceError, headers: &HeaderMap) -> AppError {
    let error = AppError::from(error);
    match request_id_from_headers(headers) {
        Some(id) => error.with_request_id(id),
        None => error,
    }
}

/// POST /api/invoices
pub async fn create_invoice(
    State(state): State<InvoiceApiState>,
    headers: HeaderMap,
    Json(params): Json<RequestParameters>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state
        .workflow
        .execute(&params)
        .await
        .map_err(|e| attach_request_id(e, &headers))?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// GET /api/invoices/{id}
pub async fn get_invoice(
    State(state): State<InvoiceApiState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, AppError> {
    let invoice = state
        .repository
        .find_by_id(&id)
        .await
        .map_err(|e| attach_request_id(e, &headers))?
        .ok_or_else(|| attach_request_id(InvoiceError::NotFound { id }, &headers))?;

    Ok(Json(invoice))
}

/// GET /api/invoices
pub async fn list_invoices(
    State(state): State<InvoiceApiState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<InvoiceListResponse>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let invoices = state
        .repository
        .list_recent(limit)
        .await
        .map_err(|e| attach_request_id(e, &headers))?;
    info!(count = invoices.len(), "listed invoices");

    Ok(Json(InvoiceListResponse { invoices }))
}
