use crate::config::ConfigError;
use crate::invoices::error::{InvoiceError, InvoiceResult, ProviderApiError};
use crate::invoices::provider::ProviderInvoiceCreator;
use crate::invoices::types::{InvoiceStatus, ProviderInvoice, ValidatedInvoiceParams};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct BitPayConfig {
    pub api_token: String,
    pub base_url: String,
    pub notification_url: Option<String>,
    pub redirect_url: Option<String>,
    pub timeout_secs: u64,
}

impl BitPayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token = std::env::var("BITPAY_API_TOKEN")
            .map_err(|_| ConfigError::MissingVariable("BITPAY_API_TOKEN".to_string()))?;

        Ok(Self {
            api_token,
            base_url: std::env::var("BITPAY_BASE_URL")
                .unwrap_or_else(|_| "https://test.bitpay.com".to_string()),
            notification_url: std::env::var("BITPAY_NOTIFICATION_URL").ok(),
            redirect_url: std::env::var("BITPAY_REDIRECT_URL").ok(),
            timeout_secs: std::env::var("BITPAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "BITPAY_API_TOKEN cannot be empty".to_string(),
            ));
        }

        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "BITPAY_BASE_URL cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// REST client for BitPay's invoice API.
///
/// Any failure from this client surfaces as
/// `InvoiceError::ProviderInvoiceCreation` wrapping the concrete
/// [`ProviderApiError`], which is what the create-invoice workflow keys on.
pub struct BitPayProvider {
    config: BitPayConfig,
    http: Client,
}

impl BitPayProvider {
    pub fn new(config: BitPayConfig) -> InvoiceResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InvoiceError::ProviderInvoiceCreation {
                source: ProviderApiError::Transport(e),
            })?;
        Ok(Self { config, http })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    async fn post_invoice(
        &self,
        params: &ValidatedInvoiceParams,
        order_id: &str,
    ) -> Result<BitPayInvoiceData, ProviderApiError> {
        let payload = serde_json::json!({
            "token": self.config.api_token,
            "price": params.amount,
            "currency": params.currency,
            "orderId": order_id,
            "notificationURL": self.config.notification_url,
            "redirectURL": self.config.redirect_url,
            "extendedNotifications": true,
        });

        let response = self
            .http
            .post(self.endpoint("/invoices"))
            .header("Accept", "application/json")
            .header("X-Accept-Version", "2.0.0")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ProviderApiError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: BitPayEnvelope = serde_json::from_str(&text)
            .map_err(|e| ProviderApiError::Decode(format!("invalid invoice envelope: {}", e)))?;

        match envelope {
            BitPayEnvelope::Data { data } => Ok(data),
            BitPayEnvelope::Error { error } => Err(ProviderApiError::Rejected { message: error }),
        }
    }
}

#[async_trait]
impl ProviderInvoiceCreator for BitPayProvider {
    async fn create_invoice(
        &self,
        params: &ValidatedInvoiceParams,
        order_id: &str,
    ) -> InvoiceResult<ProviderInvoice> {
        let data = self
            .post_invoice(params, order_id)
            .await
            .map_err(|source| InvoiceError::ProviderInvoiceCreation { source })?;

        let invoice = data.into_provider_invoice().map_err(|source| {
            InvoiceError::ProviderInvoiceCreation { source }
        })?;

        info!(
            provider_invoice_id = %invoice.id,
            order_id = %order_id,
            "bitpay invoice created"
        );
        Ok(invoice)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BitPayEnvelope {
    Data { data: BitPayInvoiceData },
    Error { error: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BitPayInvoiceData {
    id: String,
    status: String,
    price: Decimal,
    currency: String,
    url: String,
    token: String,
    // epoch milliseconds
    invoice_time: i64,
    expiration_time: i64,
}

impl BitPayInvoiceData {
    fn into_provider_invoice(self) -> Result<ProviderInvoice, ProviderApiError> {
        let status = InvoiceStatus::from_str(&self.status)
            .map_err(|_| ProviderApiError::Decode(format!("unknown status: {}", self.status)))?;
        let created_at = millis_to_utc(self.invoice_time)?;
        let expires_at = millis_to_utc(self.expiration_time)?;

        Ok(ProviderInvoice {
            id: self.id,
            status,
            price: self.price,
            currency: self.currency,
            url: self.url,
            token: self.token,
            created_at,
            expires_at,
        })
    }
}

fn millis_to_utc(millis: i64) -> Result<DateTime<Utc>, ProviderApiError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| ProviderApiError::Decode(format!("timestamp out of range: {}", millis)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_envelope() {
        let raw = r#"{
            "data": {
                "id": "inv_123",
                "status": "new",
                "price": 10.00,
                "currency": "USD",
                "url": "https://test.bitpay.com/invoice?id=inv_123",
                "token": "tok_abc",
                "invoiceTime": 1700000000000,
                "expirationTime": 1700000900000
            }
        }"#;
        let envelope: BitPayEnvelope = serde_json::from_str(raw).unwrap();
        let BitPayEnvelope::Data { data } = envelope else {
            panic!("expected data envelope");
        };
        let invoice = data.into_provider_invoice().unwrap();
        assert_eq!(invoice.id, "inv_123");
        assert_eq!(invoice.status, InvoiceStatus::New);
        assert_eq!(invoice.currency, "USD");
        assert_eq!(
            invoice.expires_at - invoice.created_at,
            chrono::Duration::minutes(15)
        );
    }

    #[test]
    fn parses_error_envelope() {
        let raw = r#"{"error": "Invalid invoice price"}"#;
        let envelope: BitPayEnvelope = serde_json::from_str(raw).unwrap();
        assert!(matches!(envelope, BitPayEnvelope::Error { .. }));
    }

    #[test]
    fn config_rejects_blank_api_token() {
        let config = BitPayConfig {
            api_token: "  ".to_string(),
            base_url: "https://test.bitpay.com".to_string(),
            notification_url: None,
            redirect_url: None,
            timeout_secs: 30,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_status() {
        let data = BitPayInvoiceData {
            id: "inv_9".to_string(),
            status: "weird".to_string(),
            price: Decimal::new(500, 2),
            currency: "USD".to_string(),
            url: "https://example.com".to_string(),
            token: "tok".to_string(),
            invoice_time: 1700000000000,
            expiration_time: 1700000900000,
        };
        assert!(matches!(
            data.into_provider_invoice(),
            Err(ProviderApiError::Decode(_))
        ));
    }
}
