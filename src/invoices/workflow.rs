use crate::database::invoice_repository::InvoiceRepository;
use crate::invoices::error::{InvoiceError, InvoiceResult};
use crate::invoices::factory::InvoiceFactory;
use crate::invoices::id::generate_invoice_id;
use crate::invoices::provider::ProviderInvoiceCreator;
use crate::invoices::types::{Invoice, RequestParameters};
use crate::invoices::validator::ParamsValidator;
use crate::logging::{LogCode, WorkflowLogger};
use serde_json::json;
use std::sync::Arc;

/// Orchestrates one invoice creation end to end: validate the request, mint a
/// fresh identifier, create the invoice at the payment provider, build the
/// domain invoice, persist it, and log the outcome.
///
/// The steps run strictly in sequence and the first failure aborts the run.
/// Every invocation emits exactly one structured log event, success or
/// failure. A provider-creation failure is surfaced to the caller with the
/// underlying cause's message; all other failures propagate unchanged.
pub struct CreateInvoiceWorkflow {
    validator: Arc<dyn ParamsValidator>,
    provider: Arc<dyn ProviderInvoiceCreator>,
    factory: InvoiceFactory,
    repository: Arc<dyn InvoiceRepository>,
    logger: Arc<dyn WorkflowLogger>,
}

impl CreateInvoiceWorkflow {
    pub fn new(
        validator: Arc<dyn ParamsValidator>,
        provider: Arc<dyn ProviderInvoiceCreator>,
        factory: InvoiceFactory,
        repository: Arc<dyn InvoiceRepository>,
        logger: Arc<dyn WorkflowLogger>,
    ) -> Self {
        Self {
            validator,
            provider,
            factory,
            repository,
            logger,
        }
    }

    pub async fn execute(&self, request_parameters: &RequestParameters) -> InvoiceResult<Invoice> {
        match self.run(request_parameters).await {
            Ok(invoice) => {
                self.logger.info(
                    LogCode::InvoiceCreateSuccess,
                    "Successfully created invoice",
                    json!({ "id": invoice.id }),
                );
                Ok(invoice)
            }
            Err(error) => {
                self.log_failure(&error);
                match error {
                    // Strip the wrapper: the caller sees the cause's message.
                    InvoiceError::ProviderInvoiceCreation { source } => {
                        Err(InvoiceError::Unexpected(source.to_string()))
                    }
                    other => Err(other),
                }
            }
        }
    }

    async fn run(&self, request_parameters: &RequestParameters) -> InvoiceResult<Invoice> {
        let validated = self.validator.validate(request_parameters)?;
        let id = generate_invoice_id();
        let provider_invoice = self.provider.create_invoice(&validated, &id).await?;
        let invoice = self.factory.create(provider_invoice, &id);

        self.repository.save(&invoice).await?;

        Ok(invoice)
    }

    fn log_failure(&self, error: &InvoiceError) {
        let message = match error {
            InvoiceError::ProviderInvoiceCreation { source } => source.to_string(),
            other => other.to_string(),
        };
        self.logger.error(
            LogCode::InvoiceCreateFail,
            "Failed to create invoice",
            json!({
                "error_message": message,
                "trace": format!("{:?}", error),
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoices::error::ProviderApiError;
    use crate::invoices::types::{InvoiceStatus, ProviderInvoice, ValidatedInvoiceParams};
    use crate::invoices::validator::KioskParamsValidator;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use serde_json::Value as JsonValue;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct StubProvider {
        reject_with: Option<String>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn succeeding() -> Self {
            Self {
                reject_with: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reject_with: Some(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProviderInvoiceCreator for StubProvider {
        async fn create_invoice(
            &self,
            params: &ValidatedInvoiceParams,
            order_id: &str,
        ) -> InvoiceResult<ProviderInvoice> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.reject_with {
                return Err(InvoiceError::ProviderInvoiceCreation {
                    source: ProviderApiError::Rejected {
                        message: message.clone(),
                    },
                });
            }
            let now = Utc::now();
            Ok(ProviderInvoice {
                id: "inv_123".to_string(),
                status: InvoiceStatus::New,
                price: params.amount,
                currency: params.currency.clone(),
                url: format!("https://test.bitpay.com/invoice?orderId={}", order_id),
                token: "tok_abc".to_string(),
                created_at: now,
                expires_at: now + Duration::minutes(15),
            })
        }
    }

    struct StubRepository {
        fail_with: Option<String>,
        saved: Mutex<Vec<Invoice>>,
    }

    impl StubRepository {
        fn succeeding() -> Self {
            Self {
                fail_with: None,
                saved: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                saved: Mutex::new(Vec::new()),
            }
        }

        fn saved(&self) -> Vec<Invoice> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InvoiceRepository for StubRepository {
        async fn save(&self, invoice: &Invoice) -> InvoiceResult<()> {
            if let Some(message) = &self.fail_with {
                return Err(InvoiceError::Persistence {
                    message: message.clone(),
                });
            }
            self.saved.lock().unwrap().push(invoice.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &str) -> InvoiceResult<Option<Invoice>> {
            Ok(self.saved().into_iter().find(|i| i.id == id))
        }

        async fn list_recent(&self, _limit: i64) -> InvoiceResult<Vec<Invoice>> {
            Ok(self.saved())
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<(LogCode, String, JsonValue)>>,
    }

    impl RecordingLogger {
        fn events(&self) -> Vec<(LogCode, String, JsonValue)> {
            self.events.lock().unwrap().clone()
        }
    }

    impl WorkflowLogger for RecordingLogger {
        fn info(&self, code: LogCode, message: &str, fields: JsonValue) {
            self.events
                .lock()
                .unwrap()
                .push((code, message.to_string(), fields));
        }

        fn error(&self, code: LogCode, message: &str, fields: JsonValue) {
            self.events
                .lock()
                .unwrap()
                .push((code, message.to_string(), fields));
        }
    }

    struct Harness {
        provider: Arc<StubProvider>,
        repository: Arc<StubRepository>,
        logger: Arc<RecordingLogger>,
        workflow: CreateInvoiceWorkflow,
    }

    fn harness(provider: StubProvider, repository: StubRepository) -> Harness {
        let provider = Arc::new(provider);
        let repository = Arc::new(repository);
        let logger = Arc::new(RecordingLogger::default());
        let workflow = CreateInvoiceWorkflow::new(
            Arc::new(KioskParamsValidator::new()),
            provider.clone(),
            InvoiceFactory::new(),
            repository.clone(),
            logger.clone(),
        );
        Harness {
            provider,
            repository,
            logger,
            workflow,
        }
    }

    fn valid_params() -> RequestParameters {
        [
            ("amount".to_string(), Some("10.00".to_string())),
            ("currency".to_string(), Some("USD".to_string())),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn success_returns_persisted_invoice_with_fresh_uuid() {
        let h = harness(StubProvider::succeeding(), StubRepository::succeeding());

        let invoice = h.workflow.execute(&valid_params()).await.unwrap();

        assert!(Uuid::parse_str(&invoice.id).is_ok());
        assert_eq!(invoice.provider_id, "inv_123");
        assert_eq!(invoice.price, Decimal::from_str("10.00").unwrap());
        assert_eq!(invoice.currency, "USD");

        let saved = h.repository.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, invoice.id);
    }

    #[tokio::test]
    async fn success_emits_exactly_one_success_event_with_invoice_id() {
        let h = harness(StubProvider::succeeding(), StubRepository::succeeding());

        let invoice = h.workflow.execute(&valid_params()).await.unwrap();

        let events = h.logger.events();
        assert_eq!(events.len(), 1);
        let (code, _, fields) = &events[0];
        assert_eq!(*code, LogCode::InvoiceCreateSuccess);
        assert_eq!(fields["id"], invoice.id);
    }

    #[tokio::test]
    async fn provider_failure_surfaces_the_cause_message() {
        let h = harness(
            StubProvider::failing("Invalid invoice price"),
            StubRepository::succeeding(),
        );

        let error = h.workflow.execute(&valid_params()).await.unwrap_err();

        // The wrapper's own message is stripped; the cause's Display remains.
        let cause = ProviderApiError::Rejected {
            message: "Invalid invoice price".to_string(),
        };
        assert_eq!(error.to_string(), cause.to_string());
        assert!(matches!(error, InvoiceError::Unexpected(_)));
        assert!(h.repository.saved().is_empty());
    }

    #[tokio::test]
    async fn provider_failure_logs_failure_once() {
        let h = harness(
            StubProvider::failing("Invalid invoice price"),
            StubRepository::succeeding(),
        );

        let _ = h.workflow.execute(&valid_params()).await;

        let events = h.logger.events();
        assert_eq!(events.len(), 1);
        let (code, _, fields) = &events[0];
        assert_eq!(*code, LogCode::InvoiceCreateFail);
        assert!(fields["error_message"]
            .as_str()
            .unwrap()
            .contains("Invalid invoice price"));
        assert!(fields["trace"].as_str().is_some());
    }

    #[tokio::test]
    async fn validation_failure_propagates_unchanged_and_skips_collaborators() {
        let h = harness(StubProvider::succeeding(), StubRepository::succeeding());
        let params: RequestParameters =
            [("currency".to_string(), Some("USD".to_string()))]
                .into_iter()
                .collect();

        let error = h.workflow.execute(&params).await.unwrap_err();

        assert!(matches!(
            error,
            InvoiceError::Validation { ref field, .. } if field.as_deref() == Some("amount")
        ));
        assert_eq!(error.to_string(), "missing required field: amount");
        assert_eq!(h.provider.call_count(), 0);
        assert!(h.repository.saved().is_empty());

        let events = h.logger.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, LogCode::InvoiceCreateFail);
    }

    #[tokio::test]
    async fn persistence_failure_propagates_unchanged_with_failure_log() {
        let h = harness(
            StubProvider::succeeding(),
            StubRepository::failing("connection refused"),
        );

        let error = h.workflow.execute(&valid_params()).await.unwrap_err();

        assert!(matches!(error, InvoiceError::Persistence { .. }));
        assert_eq!(error.to_string(), "connection refused");
        assert_eq!(h.provider.call_count(), 1);

        let events = h.logger.events();
        assert_eq!(events.len(), 1);
        let (code, _, fields) = &events[0];
        assert_eq!(*code, LogCode::InvoiceCreateFail);
        assert_eq!(fields["error_message"], "connection refused");
    }

    #[tokio::test]
    async fn concurrent_invocations_get_distinct_identifiers() {
        let h = harness(StubProvider::succeeding(), StubRepository::succeeding());
        let (first_params, second_params) = (valid_params(), valid_params());

        let (a, b) = tokio::join!(
            h.workflow.execute(&first_params),
            h.workflow.execute(&second_params)
        );

        assert_ne!(a.unwrap().id, b.unwrap().id);
        assert_eq!(h.repository.saved().len(), 2);
    }
}
