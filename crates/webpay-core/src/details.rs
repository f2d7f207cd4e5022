//! # Payment Details
//!
//! The cart as shown on a wallet payment sheet: line items, shipping options
//! and the total derived from the items.

use crate::money::{sum_values, CurrencyAmount, DEFAULT_CURRENCY};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Label used for the derived total
pub const TOTAL_LABEL: &str = "Total";

/// A line item on the payment sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentItem {
    /// Display label
    pub label: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Amount for this item
    pub amount: CurrencyAmount,

    /// Whether the amount is not final yet
    #[serde(default)]
    pub pending: bool,
}

impl PaymentItem {
    /// Create a final line item
    pub fn new(label: impl Into<String>, amount: CurrencyAmount) -> Self {
        Self {
            label: label.into(),
            description: None,
            amount,
            pending: false,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: mark the amount as pending
    pub fn pending(mut self) -> Self {
        self.pending = true;
        self
    }
}

/// A shipping option offered on the payment sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOption {
    /// Identifier echoed back by the wallet
    pub id: String,

    /// Display label
    pub label: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Shipping cost
    pub amount: CurrencyAmount,

    /// Whether this option is preselected.
    /// At most one option should be selected; not enforced.
    #[serde(default)]
    pub selected: bool,
}

impl ShippingOption {
    /// Create an unselected shipping option
    pub fn new(id: impl Into<String>, label: impl Into<String>, amount: CurrencyAmount) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            amount,
            selected: false,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: mark as the preselected option
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }
}

/// Line items and shipping options with a derived total
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    #[serde(default, alias = "displayItems")]
    display_items: Vec<PaymentItem>,

    #[serde(default, alias = "shippingOptions")]
    shipping_options: Vec<ShippingOption>,
}

impl PaymentDetails {
    /// Create empty payment details (total `0.0 GBP`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set line items
    pub fn with_items(mut self, items: Vec<PaymentItem>) -> Self {
        self.set_display_items(items);
        self
    }

    /// Builder: set shipping options
    pub fn with_shipping_options(mut self, options: Vec<ShippingOption>) -> Self {
        self.set_shipping_options(options);
        self
    }

    /// Replace the line items
    pub fn set_display_items(&mut self, items: Vec<PaymentItem>) {
        self.display_items = items;
        if self.has_mixed_currencies() {
            warn!(
                currency = %self.display_items[0].amount.currency,
                "Line items use mixed currencies, total takes the first item's currency"
            );
        }
    }

    /// Replace the shipping options
    pub fn set_shipping_options(&mut self, options: Vec<ShippingOption>) {
        self.shipping_options = options;
    }

    pub fn display_items(&self) -> &[PaymentItem] {
        &self.display_items
    }

    pub fn shipping_options(&self) -> &[ShippingOption] {
        &self.shipping_options
    }

    /// Total derived from the line items.
    ///
    /// Sums item values exactly, is pending if any item is pending, and takes
    /// its currency from the first item. With no items the total is `0.0 GBP`.
    pub fn total(&self) -> PaymentItem {
        let Some(first) = self.display_items.first() else {
            return PaymentItem::new(TOTAL_LABEL, CurrencyAmount::zero(DEFAULT_CURRENCY));
        };

        let value = sum_values(self.display_items.iter().map(|item| item.amount.value));

        PaymentItem {
            label: TOTAL_LABEL.to_string(),
            description: None,
            amount: CurrencyAmount::new(value, first.amount.currency.clone()),
            pending: self.display_items.iter().any(|item| item.pending),
        }
    }

    /// Check if the line items disagree on currency
    pub fn has_mixed_currencies(&self) -> bool {
        match self.display_items.split_first() {
            Some((first, rest)) => rest
                .iter()
                .any(|item| !item.amount.currency.eq_ignore_ascii_case(&first.amount.currency)),
            None => false,
        }
    }

    /// Check if any shipping options are configured
    pub fn has_shipping_options(&self) -> bool {
        !self.shipping_options.is_empty()
    }

    /// Find a shipping option by ID
    pub fn shipping_option(&self, id: &str) -> Option<&ShippingOption> {
        self.shipping_options.iter().find(|option| option.id == id)
    }

    /// First shipping option flagged as selected
    pub fn selected_shipping_option(&self) -> Option<&ShippingOption> {
        self.shipping_options.iter().find(|option| option.selected)
    }
}

/// Shipping type classifier shown by some wallets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingType {
    Shipping,
    Delivery,
    Pickup,
}

/// What to request from the payer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentOptions {
    #[serde(alias = "requestPayerEmail")]
    pub request_payer_email: bool,
    #[serde(alias = "requestPayerName")]
    pub request_payer_name: bool,
    #[serde(alias = "requestPayerPhone")]
    pub request_payer_phone: bool,
    #[serde(alias = "requestShipping")]
    pub request_shipping: bool,
    #[serde(skip_serializing_if = "Option::is_none", alias = "shippingType")]
    pub shipping_type: Option<ShippingType>,
}

impl Default for PaymentOptions {
    fn default() -> Self {
        Self {
            request_payer_email: true,
            request_payer_name: true,
            request_payer_phone: true,
            request_shipping: false,
            shipping_type: None,
        }
    }
}

impl PaymentOptions {
    /// Builder: request a shipping address
    pub fn with_shipping(mut self, shipping_type: Option<ShippingType>) -> Self {
        self.request_shipping = true;
        self.shipping_type = shipping_type;
        self
    }
}
