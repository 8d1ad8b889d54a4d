use crate::invoices::error::InvoiceResult;
use crate::invoices::types::{ProviderInvoice, ValidatedInvoiceParams};
use async_trait::async_trait;

/// Creates an invoice on the remote payment provider.
///
/// Implementations must fail with
/// [`InvoiceError::ProviderInvoiceCreation`](crate::invoices::error::InvoiceError)
/// wrapping the concrete API failure, so callers can apply the unwrap rule
/// when surfacing the error.
#[async_trait]
pub trait ProviderInvoiceCreator: Send + Sync {
    async fn create_invoice(
        &self,
        params: &ValidatedInvoiceParams,
        order_id: &str,
    ) -> InvoiceResult<ProviderInvoice>;
}
