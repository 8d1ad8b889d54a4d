use crate::invoices::error::{InvoiceError, InvoiceResult};
use crate::invoices::types::{RequestParameters, ValidatedInvoiceParams};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Validates raw checkout parameters into [`ValidatedInvoiceParams`].
pub trait ParamsValidator: Send + Sync {
    fn validate(&self, params: &RequestParameters) -> InvoiceResult<ValidatedInvoiceParams>;
}

/// Validation rules for the kiosk checkout form: a positive `amount` with at
/// most two fraction digits and a three-letter uppercase `currency` code.
#[derive(Debug, Default)]
pub struct KioskParamsValidator;

impl KioskParamsValidator {
    pub fn new() -> Self {
        Self
    }

    fn required<'a>(params: &'a RequestParameters, field: &str) -> InvoiceResult<&'a str> {
        params
            .get(field)
            .and_then(|v| v.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                InvoiceError::validation(format!("missing required field: {}", field), Some(field))
            })
    }

    fn parse_amount(raw: &str) -> InvoiceResult<Decimal> {
        let amount = Decimal::from_str(raw).map_err(|_| {
            InvoiceError::validation(format!("invalid decimal amount: {}", raw), Some("amount"))
        })?;
        if amount <= Decimal::ZERO {
            return Err(InvoiceError::validation(
                "amount must be greater than zero",
                Some("amount"),
            ));
        }
        if amount.scale() > 2 {
            return Err(InvoiceError::validation(
                "amount must have at most two decimal places",
                Some("amount"),
            ));
        }
        Ok(amount)
    }

    fn parse_currency(raw: &str) -> InvoiceResult<String> {
        if raw.len() != 3 || !raw.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(InvoiceError::validation(
                format!("currency must be a three-letter ISO code: {}", raw),
                Some("currency"),
            ));
        }
        Ok(raw.to_string())
    }
}

impl ParamsValidator for KioskParamsValidator {
    fn validate(&self, params: &RequestParameters) -> InvoiceResult<ValidatedInvoiceParams> {
        let amount = Self::parse_amount(Self::required(params, "amount")?)?;
        let currency = Self::parse_currency(Self::required(params, "currency")?)?;

        Ok(ValidatedInvoiceParams { amount, currency })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, Option<&str>)]) -> RequestParameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(|s| s.to_string())))
            .collect()
    }

    #[test]
    fn accepts_valid_amount_and_currency() {
        let validator = KioskParamsValidator::new();
        let validated = validator
            .validate(&params(&[
                ("amount", Some("10.00")),
                ("currency", Some("USD")),
            ]))
            .unwrap();
        assert_eq!(validated.amount, Decimal::from_str("10.00").unwrap());
        assert_eq!(validated.currency, "USD");
    }

    #[test]
    fn ignores_unknown_parameters() {
        let validator = KioskParamsValidator::new();
        let validated = validator
            .validate(&params(&[
                ("amount", Some("5")),
                ("currency", Some("EUR")),
                ("kiosk_id", Some("west-lobby-2")),
            ]))
            .unwrap();
        assert_eq!(validated.currency, "EUR");
    }

    #[test]
    fn rejects_missing_amount() {
        let validator = KioskParamsValidator::new();
        let err = validator
            .validate(&params(&[("currency", Some("USD"))]))
            .unwrap_err();
        assert!(matches!(
            err,
            InvoiceError::Validation { ref field, .. } if field.as_deref() == Some("amount")
        ));
    }

    #[test]
    fn rejects_none_valued_amount() {
        let validator = KioskParamsValidator::new();
        let err = validator
            .validate(&params(&[("amount", None), ("currency", Some("USD"))]))
            .unwrap_err();
        assert!(matches!(err, InvoiceError::Validation { .. }));
    }

    #[test]
    fn rejects_non_positive_amount() {
        let validator = KioskParamsValidator::new();
        for raw in ["0", "-3.50"] {
            let err = validator
                .validate(&params(&[("amount", Some(raw)), ("currency", Some("USD"))]))
                .unwrap_err();
            assert!(matches!(err, InvoiceError::Validation { .. }));
        }
    }

    #[test]
    fn rejects_sub_cent_precision() {
        let validator = KioskParamsValidator::new();
        let err = validator
            .validate(&params(&[
                ("amount", Some("1.999")),
                ("currency", Some("USD")),
            ]))
            .unwrap_err();
        assert!(matches!(err, InvoiceError::Validation { .. }));
    }

    #[test]
    fn rejects_malformed_currency() {
        let validator = KioskParamsValidator::new();
        for raw in ["usd", "US", "DOLLARS", "U$D"] {
            let err = validator
                .validate(&params(&[
                    ("amount", Some("10.00")),
                    ("currency", Some(raw)),
                ]))
                .unwrap_err();
            assert!(matches!(
                err,
                InvoiceError::Validation { ref field, .. } if field.as_deref() == Some("currency")
            ));
        }
    }
}
