//! Tracing setup and the structured workflow logger.

use crate::config::{LogFormat, LoggingConfig};
use serde_json::Value as JsonValue;
use tracing_subscriber::{fmt, EnvFilter};

/// Machine-readable event codes emitted by the invoice workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCode {
    InvoiceCreateSuccess,
    InvoiceCreateFail,
}

impl LogCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCode::InvoiceCreateSuccess => "INVOICE_CREATE_SUCCESS",
            LogCode::InvoiceCreateFail => "INVOICE_CREATE_FAIL",
        }
    }
}

impl std::fmt::Display for LogCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured logging seam for the invoice workflows. Fire-and-forget; the
/// production implementation forwards to `tracing`.
pub trait WorkflowLogger: Send + Sync {
    fn info(&self, code: LogCode, message: &str, fields: JsonValue);
    fn error(&self, code: LogCode, message: &str, fields: JsonValue);
}

/// [`WorkflowLogger`] backed by the global `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl WorkflowLogger for TracingLogger {
    fn info(&self, code: LogCode, message: &str, fields: JsonValue) {
        tracing::info!(code = %code, fields = %fields, "{}", message);
    }

    fn error(&self, code: LogCode, message: &str, fields: JsonValue) {
        tracing::error!(code = %code, fields = %fields, "{}", message);
    }
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the configured
/// level when set.
pub fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_current_span(false)
                .init();
        }
        LogFormat::Plain => {
            fmt().with_env_filter(filter).init();
        }
    }
}
