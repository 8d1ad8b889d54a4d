use kiosk_backend::api::invoices::InvoiceApiState;
use kiosk_backend::config::AppConfig;
use kiosk_backend::database::invoice_repository::PgInvoiceRepository;
use kiosk_backend::database::{init_pool, PoolConfig};
use kiosk_backend::health::HealthChecker;
use kiosk_backend::invoices::factory::InvoiceFactory;
use kiosk_backend::invoices::providers::BitPayProvider;
use kiosk_backend::invoices::validator::KioskParamsValidator;
use kiosk_backend::invoices::workflow::CreateInvoiceWorkflow;
use kiosk_backend::logging::{init_tracing, TracingLogger};
use kiosk_backend::router::app_router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;

    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting kiosk backend service"
    );

    let pool = init_pool(&config.database.url, Some(PoolConfig::from(&config.database)))
        .await
        .map_err(|e| {
            error!("Failed to initialize database pool: {}", e);
            anyhow::anyhow!("database error: {e}")
        })?;

    let provider = BitPayProvider::new(config.provider.clone()).map_err(|e| {
        error!("Failed to initialize BitPay client: {}", e);
        anyhow::anyhow!("provider error: {e}")
    })?;
    info!("BitPay client initialized");

    let repository = Arc::new(PgInvoiceRepository::new(pool.clone()));
    let workflow = Arc::new(CreateInvoiceWorkflow::new(
        Arc::new(KioskParamsValidator::new()),
        Arc::new(provider),
        InvoiceFactory::new(),
        repository.clone(),
        Arc::new(TracingLogger::new()),
    ));

    let app = app_router(
        InvoiceApiState {
            workflow,
            repository,
        },
        Some(HealthChecker::new(pool)),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "Listening for kiosk checkout requests");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
