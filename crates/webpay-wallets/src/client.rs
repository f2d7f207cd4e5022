//! # Google Pay Client
//!
//! Interfaces to the Google Pay JavaScript client. The engine never talks to
//! the page directly: script injection, client construction, readiness,
//! button rendering and the payment sheet all go through these traits.

use crate::callbacks::PaymentDataCallbacks;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use webpay_core::gpay::{
    ClientSettings, IsReadyToPayRequest, IsReadyToPayResponse, PaymentData, PaymentDataRequest,
};
use webpay_core::{GooglePayButtonStyle, GooglePayButtonType, PaymentResult, WalletConfiguration};

/// Injects the provider's script into the page
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    /// Resolves once the script has loaded
    async fn load_script(&self, src: &str) -> PaymentResult<()>;
}

/// Everything a payments client is constructed with
pub struct PaymentsClientOptions {
    pub settings: ClientSettings,
    pub callbacks: PaymentDataCallbacks,
}

/// Constructs payments clients (`new google.payments.api.PaymentsClient`)
pub trait PaymentsClientFactory: Send + Sync {
    fn create_client(&self, options: PaymentsClientOptions) -> PaymentResult<Arc<dyn PaymentsClient>>;
}

/// How the rendered button sizes itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSizeMode {
    Static,
    Fill,
}

/// Options for `createButton`; the click handler is wired by the caller to
/// `WalletButton::click`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleButtonOptions {
    pub button_color: GooglePayButtonStyle,
    pub button_type: GooglePayButtonType,
    pub button_size_mode: ButtonSizeMode,
}

impl GoogleButtonOptions {
    /// Full-width button in the configured color and type
    pub fn from_configuration(configuration: &WalletConfiguration) -> Self {
        Self {
            button_color: configuration.google_pay.style,
            button_type: configuration.google_pay.button_type,
            button_size_mode: ButtonSizeMode::Fill,
        }
    }
}

/// A constructed Google Pay payments client
#[async_trait]
pub trait PaymentsClient: Send + Sync {
    async fn is_ready_to_pay(&self, request: &IsReadyToPayRequest) -> PaymentResult<IsReadyToPayResponse>;

    /// Render the provider's button; the element is opaque to the engine
    fn create_button(&self, options: &GoogleButtonOptions) -> serde_json::Value;

    /// Open the payment sheet and wait for the payer
    async fn load_payment_data(&self, request: &PaymentDataRequest) -> PaymentResult<PaymentData>;
}
