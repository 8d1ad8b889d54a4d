//! HTTP-facing error type for the kiosk backend.
//!
//! Layer errors (invoice workflow, database) convert into [`AppError`], which
//! carries a machine-readable code and maps onto an HTTP status. The JSON
//! rendering lives in `middleware::error`.

use crate::invoices::error::InvoiceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable error codes returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError,
    #[serde(rename = "INVOICE_NOT_FOUND")]
    InvoiceNotFound,
    #[serde(rename = "PAYMENT_PROVIDER_ERROR")]
    PaymentProviderError,
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

/// Application error surfaced by HTTP handlers.
#[derive(Debug)]
pub struct AppError {
    pub kind: AppErrorKind,
    pub request_id: Option<String>,
}

#[derive(Debug)]
pub enum AppErrorKind {
    Invoice(InvoiceError),
    Internal(String),
}

impl AppError {
    pub fn new(kind: AppErrorKind) -> Self {
        Self {
            kind,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn error_code(&self) -> ErrorCode {
        match &self.kind {
            AppErrorKind::Invoice(err) => match err {
                InvoiceError::Validation { .. } => ErrorCode::ValidationError,
                InvoiceError::NotFound { .. } => ErrorCode::InvoiceNotFound,
                InvoiceError::ProviderInvoiceCreation { .. } => ErrorCode::PaymentProviderError,
                InvoiceError::Persistence { .. } => ErrorCode::DatabaseError,
                InvoiceError::Unexpected(_) => ErrorCode::InternalError,
            },
            AppErrorKind::Internal(_) => ErrorCode::InternalError,
        }
    }

    pub fn status_code(&self) -> u16 {
        match &self.kind {
            AppErrorKind::Invoice(err) => match err {
                InvoiceError::Validation { .. } => 400,
                InvoiceError::NotFound { .. } => 404,
                InvoiceError::ProviderInvoiceCreation { .. } => 502,
                InvoiceError::Persistence { .. } => 500,
                InvoiceError::Unexpected(_) => 500,
            },
            AppErrorKind::Internal(_) => 500,
        }
    }

    /// Message shown to the client. Internal details are not leaked for
    /// server-side failures.
    pub fn user_message(&self) -> String {
        match &self.kind {
            AppErrorKind::Invoice(err) => match err {
                InvoiceError::Validation { message, .. } => message.clone(),
                InvoiceError::NotFound { id } => format!("invoice not found: {}", id),
                InvoiceError::Unexpected(message) => message.clone(),
                InvoiceError::ProviderInvoiceCreation { .. } => {
                    "Payment provider is temporarily unavailable".to_string()
                }
                InvoiceError::Persistence { .. } => {
                    "An internal error occurred. Please try again later.".to_string()
                }
            },
            AppErrorKind::Internal(_) => {
                "An internal error occurred. Please try again later.".to_string()
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AppErrorKind::Invoice(err) => write!(f, "{}", err),
            AppErrorKind::Internal(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for AppError {}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        AppError::new(AppErrorKind::Invoice(err))
    }
}
