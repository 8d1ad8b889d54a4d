use crate::invoices::error::InvoiceError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Raw request parameters as they arrive from the kiosk frontend.
/// Keys the validator does not know about are ignored.
pub type RequestParameters = HashMap<String, Option<String>>;

/// Checkout parameters after validation. Only produced by a
/// [`ParamsValidator`](crate::invoices::validator::ParamsValidator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInvoiceParams {
    pub amount: Decimal,
    pub currency: String,
}

/// Lifecycle of an invoice as reported by the payment provider.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    New,
    Paid,
    Confirmed,
    Complete,
    Expired,
    Invalid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::New => "new",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Confirmed => "confirmed",
            InvoiceStatus::Complete => "complete",
            InvoiceStatus::Expired => "expired",
            InvoiceStatus::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = InvoiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "new" => Ok(InvoiceStatus::New),
            "paid" => Ok(InvoiceStatus::Paid),
            "confirmed" => Ok(InvoiceStatus::Confirmed),
            "complete" => Ok(InvoiceStatus::Complete),
            "expired" => Ok(InvoiceStatus::Expired),
            "invalid" => Ok(InvoiceStatus::Invalid),
            _ => Err(InvoiceError::validation(
                format!("unknown invoice status: {}", value),
                Some("status"),
            )),
        }
    }
}

/// Remote invoice as returned by the provider's create-invoice call.
/// Consumed immediately by the factory; never persisted as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderInvoice {
    pub id: String,
    pub status: InvoiceStatus,
    pub price: Decimal,
    pub currency: String,
    pub url: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Locally persisted invoice. `id` is the identifier generated for the
/// workflow run that created it and correlates this record with the
/// provider-side invoice (`provider_id`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: String,
    pub provider_id: String,
    pub price: Decimal,
    pub currency: String,
    pub status: InvoiceStatus,
    pub payment_url: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
