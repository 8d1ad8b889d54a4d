use thiserror::Error;

pub type InvoiceResult<T> = Result<T, InvoiceError>;

/// Errors raised while creating or loading invoices.
///
/// `ProviderInvoiceCreation` is the distinguished wrapper around a failed
/// provider call; the workflow strips it and surfaces the underlying cause's
/// message to the caller. Every other kind propagates unchanged.
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("failed to create invoice with payment provider")]
    ProviderInvoiceCreation {
        #[source]
        source: ProviderApiError,
    },

    #[error("{message}")]
    Persistence { message: String },

    #[error("invoice not found: {id}")]
    NotFound { id: String },

    #[error("{0}")]
    Unexpected(String),
}

impl InvoiceError {
    pub fn validation(message: impl Into<String>, field: Option<&str>) -> Self {
        InvoiceError::Validation {
            message: message.into(),
            field: field.map(|f| f.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InvoiceError::Validation { .. } => "validation",
            InvoiceError::ProviderInvoiceCreation { .. } => "provider_invoice_creation",
            InvoiceError::Persistence { .. } => "persistence",
            InvoiceError::NotFound { .. } => "not_found",
            InvoiceError::Unexpected(_) => "unexpected",
        }
    }
}

/// Concrete failure from the payment provider's REST API. Always carried as
/// the `source` of `InvoiceError::ProviderInvoiceCreation`.
#[derive(Debug, Error)]
pub enum ProviderApiError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("provider rejected invoice: {message}")]
    Rejected { message: String },

    #[error("could not decode provider response: {0}")]
    Decode(String),
}
