//! Backend for the kiosk checkout flow.
//!
//! The core is the create-invoice workflow in [`invoices::workflow`]: it
//! validates the checkout parameters, creates a matching invoice at the
//! payment provider, persists the local invoice record, and logs the outcome.
//! Everything else here is the service around it: configuration, the Postgres
//! repository, the HTTP API, and health probes.

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod health;
pub mod invoices;
pub mod logging;
pub mod middleware;
pub mod router;
