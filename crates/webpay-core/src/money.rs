//! # Money Types
//!
//! Currency amounts as carried by wallet payment sheets.
//! Values are exact decimals; currencies are ISO 4217 codes kept as given.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

use crate::error::{PaymentError, PaymentResult};

/// Currency used when no line items are configured
pub const DEFAULT_CURRENCY: &str = "GBP";

/// An amount in a given currency (e.g. `"10.00"` `"USD"`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyAmount {
    /// Decimal value, serialized as a string
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
    /// ISO 4217 currency code
    pub currency: String,
}

impl CurrencyAmount {
    /// Create an amount from an already parsed decimal
    pub fn new(value: Decimal, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }

    /// Parse an amount from its string value (e.g. `"10.00"`)
    pub fn parse(value: &str, currency: impl Into<String>) -> PaymentResult<Self> {
        let value = Decimal::from_str(value.trim()).map_err(|e| {
            PaymentError::InvalidRequest(format!("Invalid amount {:?}: {}", value, e))
        })?;
        Ok(Self::new(value, currency))
    }

    /// The zero total shown before any items are set (`"0.0"`)
    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(Decimal::new(0, 1), currency)
    }

    /// Value as the string a payment sheet expects
    pub fn value_string(&self) -> String {
        self.value.to_string()
    }

    /// Upper-cased currency code
    pub fn currency_code(&self) -> String {
        self.currency.to_uppercase()
    }

    /// Single-character display prefix for the currency (e.g. "$", "£")
    pub fn currency_symbol(&self) -> String {
        currency_symbol(&self.currency)
    }

    /// Format for display (e.g., "$10.00")
    pub fn display(&self) -> String {
        format!("{}{}", self.currency_symbol(), self.value)
    }
}

/// Exact sum of `values`, saturating at the bounds of `Decimal`
pub fn sum_values(values: impl IntoIterator<Item = Decimal> + Clone) -> Decimal {
    match values
        .clone()
        .into_iter()
        .try_fold(Decimal::ZERO, Decimal::checked_add)
    {
        Some(sum) => sum,
        None => {
            warn!("Amount overflows the supported range, saturating");
            values
                .into_iter()
                .fold(Decimal::ZERO, Decimal::saturating_add)
        }
    }
}

/// Leading display character for a currency code.
///
/// Unknown codes fall back to the first letter of the code.
pub fn currency_symbol(currency: &str) -> String {
    let code = currency.to_uppercase();
    let symbol = match code.as_str() {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "INR" => "₹",
        "KRW" => "₩",
        "ILS" => "₪",
        "NGN" => "₦",
        "VND" => "₫",
        "PHP" => "₱",
        _ => return code.chars().next().map(String::from).unwrap_or_default(),
    };
    symbol.to_string()
}
