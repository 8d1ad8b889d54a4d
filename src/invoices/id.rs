use uuid::Uuid;

/// Fresh identifier for one workflow invocation. The same value becomes the
/// provider-side order id and the local invoice id.
pub fn generate_invoice_id() -> String {
    Uuid::new_v4().to_string()
}
