//! # WebPayments
//!
//! Entry point for merchants: owns the configuration, hands each wallet's
//! handshake a view of it, and exposes one button-creation call per wallet.

use crate::apple::{ApplePayCapability, ApplePayHandshake, PaymentGateway};
use crate::client::{PaymentsClientFactory, ScriptLoader};
use crate::google::GooglePayHandshake;
use crate::settings::HandshakeSettings;
use crate::state::SharedConfiguration;
use std::sync::Arc;
use tracing::{debug, instrument};
use webpay_core::{
    ApplePayConfiguration, ButtonAvailability, ButtonRequest, GooglePayConfiguration,
    HandshakeRegistry, MerchantIdentity, PaymentError, PaymentItem, PaymentOptions,
    PaymentResponder, PaymentResult, ShippingOption, WalletConfiguration, WalletKind,
};

/// Wallet payments for one checkout page
pub struct WebPayments {
    configuration: SharedConfiguration,
    handshakes: HandshakeRegistry,
    settings: HandshakeSettings,
}

impl WebPayments {
    pub fn new(configuration: WalletConfiguration, settings: HandshakeSettings) -> Self {
        Self {
            configuration: SharedConfiguration::new(configuration),
            handshakes: HandshakeRegistry::new(),
            settings,
        }
    }

    /// Create with settings from environment variables
    pub fn from_env(configuration: WalletConfiguration) -> PaymentResult<Self> {
        Ok(Self::new(configuration, HandshakeSettings::from_env()?))
    }

    /// Load the configuration from TOML, settings from the environment
    pub fn from_toml(toml_str: &str) -> PaymentResult<Self> {
        Self::from_env(WalletConfiguration::from_toml(toml_str)?)
    }

    /// Builder: enable Apple Pay
    pub fn with_apple_pay(
        mut self,
        capability: Arc<dyn ApplePayCapability>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        self.handshakes.register(Arc::new(ApplePayHandshake::new(
            self.configuration.clone(),
            capability,
            gateway,
            self.settings.clone(),
        )));
        self
    }

    /// Builder: enable Google Pay
    pub fn with_google_pay(
        mut self,
        loader: Arc<dyn ScriptLoader>,
        factory: Arc<dyn PaymentsClientFactory>,
    ) -> Self {
        self.handshakes.register(Arc::new(GooglePayHandshake::new(
            self.configuration.clone(),
            loader,
            factory,
            self.settings.clone(),
        )));
        self
    }

    pub fn set_merchant(&self, merchant: MerchantIdentity) {
        self.configuration.update(|config| config.set_merchant(merchant));
    }

    pub fn set_apple_pay(&self, configuration: ApplePayConfiguration) {
        self.configuration.update(|config| config.set_apple_pay(configuration));
    }

    pub fn set_google_pay(&self, configuration: GooglePayConfiguration) {
        self.configuration.update(|config| config.set_google_pay(configuration));
    }

    /// Replace the line items; the total follows
    pub fn set_payment_items(&self, items: Vec<PaymentItem>) {
        debug!(items = items.len(), "Payment items replaced");
        self.configuration.update(|config| config.set_payment_items(items));
    }

    pub fn set_shipping_options(&self, options: Vec<ShippingOption>) {
        self.configuration.update(|config| config.set_shipping_options(options));
    }

    pub fn set_payment_options(&self, options: PaymentOptions) {
        self.configuration.update(|config| config.set_payment_options(options));
    }

    /// Total derived from the current line items
    pub fn total(&self) -> PaymentItem {
        self.configuration.read(|config| config.payment_details.total())
    }

    /// Copy of the current configuration
    pub fn configuration(&self) -> WalletConfiguration {
        self.configuration.snapshot()
    }

    pub fn settings(&self) -> &HandshakeSettings {
        &self.settings
    }

    /// Wallets with a registered handshake
    pub fn wallets(&self) -> Vec<WalletKind> {
        self.handshakes.wallets()
    }

    /// Run `wallet`'s handshake; the outcome of the attempt goes to `responder`
    #[instrument(skip(self, request, responder))]
    pub async fn button(
        &self,
        wallet: WalletKind,
        request: &ButtonRequest,
        responder: PaymentResponder,
    ) -> PaymentResult<ButtonAvailability> {
        let handshake = self.handshakes.get(wallet).ok_or_else(|| {
            PaymentError::Configuration(format!("{} is not enabled", wallet))
        })?;

        handshake.create_button(request, responder).await
    }

    pub async fn apple_pay_button(
        &self,
        request: &ButtonRequest,
        responder: PaymentResponder,
    ) -> PaymentResult<ButtonAvailability> {
        self.button(WalletKind::ApplePay, request, responder).await
    }

    pub async fn google_pay_button(
        &self,
        request: &ButtonRequest,
        responder: PaymentResponder,
    ) -> PaymentResult<ButtonAvailability> {
        self.button(WalletKind::GooglePay, request, responder).await
    }

    /// Abandon every pending setup step and open sheet
    pub fn cancel_all(&self) {
        self.handshakes.cancel_all();
    }
}
