//! Invoice domain: checkout parameter validation, the provider client, and
//! the create-invoice workflow.

pub mod error;
pub mod factory;
pub mod id;
pub mod provider;
pub mod providers;
pub mod types;
pub mod validator;
pub mod workflow;
