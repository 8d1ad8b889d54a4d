use crate::invoices::types::{Invoice, ProviderInvoice};

/// Builds the local domain invoice from the provider's representation.
/// Pure construction; the resulting invoice always carries the identifier
/// generated for the current workflow run, never a provider-assigned one.
#[derive(Debug, Default)]
pub struct InvoiceFactory;

impl InvoiceFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn create(&self, provider_invoice: ProviderInvoice, id: &str) -> Invoice {
        Invoice {
            id: id.to_string(),
            provider_id: provider_invoice.id,
            price: provider_invoice.price,
            currency: provider_invoice.currency,
            status: provider_invoice.status,
            payment_url: provider_invoice.url,
            token: provider_invoice.token,
            created_at: provider_invoice.created_at,
            expires_at: provider_invoice.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoices::types::InvoiceStatus;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    #[test]
    fn uses_generated_id_over_provider_id() {
        let provider_invoice = ProviderInvoice {
            id: "inv_123".to_string(),
            status: InvoiceStatus::New,
            price: Decimal::new(1000, 2),
            currency: "USD".to_string(),
            url: "https://test.bitpay.com/invoice?id=inv_123".to_string(),
            token: "tok_abc".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            expires_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 15, 0).unwrap(),
        };

        let invoice = InvoiceFactory::new().create(provider_invoice, "local-uuid");
        assert_eq!(invoice.id, "local-uuid");
        assert_eq!(invoice.provider_id, "inv_123");
        assert_eq!(invoice.price, Decimal::new(1000, 2));
        assert_eq!(invoice.status, InvoiceStatus::New);
    }
}
