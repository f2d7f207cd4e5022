//! # Unified Payment Response
//!
//! The single result shape handed to merchants regardless of which wallet
//! produced it. Payment data is tokenized by the wallet and passed through
//! untouched.

use serde::{Deserialize, Serialize};

/// Which wallet a button or response belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WalletKind {
    ApplePay,
    GooglePay,
}

impl WalletKind {
    /// Tag used for gateway dispatch and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletKind::ApplePay => "applePay",
            WalletKind::GooglePay => "googlePay",
        }
    }
}

impl std::fmt::Display for WalletKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payer contact details, as sparse as the wallet returned them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl BillingDetails {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Normalized postal address for shipping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address_line: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrative_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependent_locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting_code: Option<String>,
}

/// Wallet-independent payment result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    /// Wallet that produced this response
    pub wallet: WalletKind,

    /// Google Pay API version of the payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_version: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_minor: Option<u32>,

    /// Opaque tokenized payment method data
    pub payment_details: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_details: Option<BillingDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_details: Option<ShippingDetails>,

    /// ID of the shipping option the payer confirmed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_option_selected: Option<String>,
}

impl PaymentResponse {
    /// Create a response carrying only payment data
    pub fn new(wallet: WalletKind, payment_details: serde_json::Value) -> Self {
        Self {
            wallet,
            google_api_version: None,
            google_api_minor: None,
            payment_details,
            billing_details: None,
            shipping_details: None,
            shipping_option_selected: None,
        }
    }
}
