use crate::database::error::DatabaseError;
use crate::invoices::error::{InvoiceError, InvoiceResult};
use crate::invoices::types::{Invoice, InvoiceStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

/// Persistence seam for domain invoices. The create workflow only calls
/// `save`; the read side backs the HTTP GET endpoints.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn save(&self, invoice: &Invoice) -> InvoiceResult<()>;

    async fn find_by_id(&self, id: &str) -> InvoiceResult<Option<Invoice>>;

    async fn list_recent(&self, limit: i64) -> InvoiceResult<Vec<Invoice>>;
}

/// Row shape of the `invoices` table. Status is stored as text.
#[derive(Debug, FromRow)]
struct InvoiceRow {
    id: String,
    provider_id: String,
    price: Decimal,
    currency: String,
    status: String,
    payment_url: String,
    token: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl InvoiceRow {
    fn into_invoice(self) -> InvoiceResult<Invoice> {
        let status = InvoiceStatus::from_str(&self.status).map_err(|_| {
            InvoiceError::Persistence {
                message: format!("stored invoice {} has invalid status: {}", self.id, self.status),
            }
        })?;

        Ok(Invoice {
            id: self.id,
            provider_id: self.provider_id,
            price: self.price,
            currency: self.currency,
            status,
            payment_url: self.payment_url,
            token: self.token,
            created_at: self.created_at,
            expires_at: self.expires_at,
        })
    }
}

/// Postgres-backed invoice repository.
pub struct PgInvoiceRepository {
    pool: PgPool,
}

impl PgInvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn persistence(err: DatabaseError) -> InvoiceError {
        InvoiceError::Persistence {
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl InvoiceRepository for PgInvoiceRepository {
    async fn save(&self, invoice: &Invoice) -> InvoiceResult<()> {
        sqlx::query(
            "INSERT INTO invoices
                (id, provider_id, price, currency, status, payment_url, token, created_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&invoice.id)
        .bind(&invoice.provider_id)
        .bind(invoice.price)
        .bind(&invoice.currency)
        .bind(invoice.status.as_str())
        .bind(&invoice.payment_url)
        .bind(&invoice.token)
        .bind(invoice.created_at)
        .bind(invoice.expires_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
        .map_err(Self::persistence)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> InvoiceResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            "SELECT id, provider_id, price, currency, status, payment_url, token, created_at, expires_at
             FROM invoices
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
        .map_err(Self::persistence)?;

        row.map(InvoiceRow::into_invoice).transpose()
    }

    async fn list_recent(&self, limit: i64) -> InvoiceResult<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(
            "SELECT id, provider_id, price, currency, status, payment_url, token, created_at, expires_at
             FROM invoices
             ORDER BY created_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
        .map_err(Self::persistence)?;

        rows.into_iter().map(InvoiceRow::into_invoice).collect()
    }
}
