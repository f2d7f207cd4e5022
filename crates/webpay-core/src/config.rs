//! # Wallet Configuration
//!
//! Merchant identity, per-wallet configuration and the cart, held together in
//! one `WalletConfiguration`. Setters replace whole values and never validate
//! across fields; handshakes check what they need at use time.
//!
//! Configurations can be loaded from TOML:
//!
//! ```toml
//! [merchant]
//! display_name = "Tea Shop"
//! domain_name = "tea.example"
//! country_code = "GB"
//!
//! [google_pay]
//! environment = "PRODUCTION"
//! merchant_identifier = "BCR2DN4T"
//!
//! [[payment_details.display_items]]
//! label = "Earl Grey"
//! amount = { value = "4.50", currency = "GBP" }
//! ```

use crate::details::{PaymentDetails, PaymentItem, PaymentOptions, ShippingOption};
use crate::error::PaymentResult;
use serde::{Deserialize, Serialize};

/// Who is being paid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantIdentity {
    /// Display name shown on the payment sheet
    #[serde(alias = "displayName")]
    pub display_name: String,
    /// Merchant domain (payment origin)
    #[serde(alias = "domainName")]
    pub domain_name: String,
    /// ISO 3166 country code
    #[serde(alias = "countryCode")]
    pub country_code: String,
}

impl MerchantIdentity {
    pub fn new(
        display_name: impl Into<String>,
        domain_name: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            domain_name: domain_name.into(),
            country_code: country_code.into(),
        }
    }
}

// =============================================================================
// Apple Pay
// =============================================================================

/// Apple Pay button color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApplePayButtonStyle {
    #[default]
    #[serde(rename = "ApplePayButtonBlack")]
    Black,
    #[serde(rename = "ApplePayButtonWhite")]
    White,
    #[serde(rename = "ApplePayButtonWhiteWithLine")]
    WhiteWithLine,
}

impl ApplePayButtonStyle {
    /// CSS class for this style
    pub fn class_name(&self) -> &'static str {
        match self {
            ApplePayButtonStyle::Black => "ApplePayButtonBlack",
            ApplePayButtonStyle::White => "ApplePayButtonWhite",
            ApplePayButtonStyle::WhiteWithLine => "ApplePayButtonWhiteWithLine",
        }
    }
}

/// Apple Pay button caption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApplePayButtonType {
    #[default]
    #[serde(rename = "ApplePayButtonPlain")]
    Plain,
    #[serde(rename = "ApplePayButtonBuy")]
    Buy,
    #[serde(rename = "ApplePayButtonDonate")]
    Donate,
    #[serde(rename = "ApplePayButtonCheckout")]
    Checkout,
    #[serde(rename = "ApplePayButtonBook")]
    Book,
    #[serde(rename = "ApplePayButtonSetup")]
    Setup,
    #[serde(rename = "ApplePayButtonSubscribe")]
    Subscribe,
}

impl ApplePayButtonType {
    /// CSS class for this type
    pub fn class_name(&self) -> &'static str {
        match self {
            ApplePayButtonType::Plain => "ApplePayButtonPlain",
            ApplePayButtonType::Buy => "ApplePayButtonBuy",
            ApplePayButtonType::Donate => "ApplePayButtonDonate",
            ApplePayButtonType::Checkout => "ApplePayButtonCheckout",
            ApplePayButtonType::Book => "ApplePayButtonBook",
            ApplePayButtonType::Setup => "ApplePayButtonSetup",
            ApplePayButtonType::Subscribe => "ApplePayButtonSubscribe",
        }
    }
}

/// Card networks Apple Pay can accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplePayNetwork {
    Amex,
    ChinaUnionPay,
    Discover,
    Interac,
    MasterCard,
    PrivateLabel,
    Visa,
}

/// Apple Pay merchant capability flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplePayMerchantCapability {
    #[serde(rename = "supports3DS")]
    Supports3DS,
    #[serde(rename = "supportsCredit")]
    SupportsCredit,
}

/// Apple Pay merchant configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplePayConfiguration {
    /// Apple merchant identifier (e.g. "merchant.com.example")
    #[serde(alias = "merchantIdentifier")]
    pub merchant_identifier: String,
    #[serde(alias = "merchantCapabilities")]
    pub merchant_capabilities: Vec<ApplePayMerchantCapability>,
    /// Must be non-empty for the capability probe to mean anything
    #[serde(alias = "supportedNetworks")]
    pub supported_networks: Vec<ApplePayNetwork>,
    /// Merchant identity certificate reference
    pub certificate: String,
    /// Merchant identity key reference
    pub key: String,
    pub style: ApplePayButtonStyle,
    #[serde(rename = "type")]
    pub button_type: ApplePayButtonType,
}

impl Default for ApplePayConfiguration {
    fn default() -> Self {
        Self {
            merchant_identifier: String::new(),
            merchant_capabilities: vec![ApplePayMerchantCapability::Supports3DS],
            supported_networks: vec![
                ApplePayNetwork::Visa,
                ApplePayNetwork::MasterCard,
                ApplePayNetwork::Amex,
            ],
            certificate: String::new(),
            key: String::new(),
            style: ApplePayButtonStyle::default(),
            button_type: ApplePayButtonType::default(),
        }
    }
}

impl ApplePayConfiguration {
    /// Create a configuration with default networks, capabilities and button
    pub fn new(merchant_identifier: impl Into<String>) -> Self {
        Self {
            merchant_identifier: merchant_identifier.into(),
            ..Self::default()
        }
    }

    /// Builder: set certificate and key references
    pub fn with_credentials(mut self, certificate: impl Into<String>, key: impl Into<String>) -> Self {
        self.certificate = certificate.into();
        self.key = key.into();
        self
    }

    /// Builder: set supported networks
    pub fn with_networks(mut self, networks: Vec<ApplePayNetwork>) -> Self {
        self.supported_networks = networks;
        self
    }

    /// Builder: set button style and type
    pub fn with_button(mut self, style: ApplePayButtonStyle, button_type: ApplePayButtonType) -> Self {
        self.style = style;
        self.button_type = button_type;
        self
    }
}

// =============================================================================
// Google Pay
// =============================================================================

/// Google Pay environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GooglePayEnvironment {
    #[default]
    Test,
    Production,
}

/// Google Pay button color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GooglePayButtonStyle {
    #[default]
    Black,
    White,
}

/// Google Pay button length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GooglePayButtonType {
    #[default]
    Short,
    Long,
}

/// Card authentication methods accepted through Google Pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GooglePayAuthMethod {
    #[serde(rename = "CRYPTOGRAM_3DS")]
    Cryptogram3ds,
    PanOnly,
}

/// Card networks Google Pay can accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GooglePayNetwork {
    Amex,
    Discover,
    Interac,
    Jcb,
    Mastercard,
    Visa,
}

/// Google Pay merchant configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GooglePayConfiguration {
    pub environment: GooglePayEnvironment,
    /// Merchant identifier, also used as the gateway merchant id
    #[serde(alias = "merchantIdentifier")]
    pub merchant_identifier: String,
    /// Accepted authentication methods
    #[serde(alias = "merchantCapabilities")]
    pub merchant_capabilities: Vec<GooglePayAuthMethod>,
    #[serde(alias = "supportedNetworks")]
    pub supported_networks: Vec<GooglePayNetwork>,
    /// Countries shipping addresses may come from (`None` = any)
    #[serde(skip_serializing_if = "Option::is_none", alias = "allowedCountryCodes")]
    pub allowed_country_codes: Option<Vec<String>>,
    pub style: GooglePayButtonStyle,
    #[serde(rename = "type")]
    pub button_type: GooglePayButtonType,
}

impl Default for GooglePayConfiguration {
    fn default() -> Self {
        Self {
            environment: GooglePayEnvironment::Test,
            merchant_identifier: String::new(),
            merchant_capabilities: vec![GooglePayAuthMethod::PanOnly],
            supported_networks: vec![
                GooglePayNetwork::Amex,
                GooglePayNetwork::Mastercard,
                GooglePayNetwork::Visa,
            ],
            allowed_country_codes: None,
            style: GooglePayButtonStyle::default(),
            button_type: GooglePayButtonType::default(),
        }
    }
}

impl GooglePayConfiguration {
    /// Create a configuration with default networks, auth methods and button
    pub fn new(environment: GooglePayEnvironment, merchant_identifier: impl Into<String>) -> Self {
        Self {
            environment,
            merchant_identifier: merchant_identifier.into(),
            ..Self::default()
        }
    }

    /// Builder: set accepted auth methods
    pub fn with_auth_methods(mut self, methods: Vec<GooglePayAuthMethod>) -> Self {
        self.merchant_capabilities = methods;
        self
    }

    /// Builder: set supported networks
    pub fn with_networks(mut self, networks: Vec<GooglePayNetwork>) -> Self {
        self.supported_networks = networks;
        self
    }

    /// Builder: restrict shipping countries
    pub fn with_allowed_countries(mut self, countries: Vec<String>) -> Self {
        self.allowed_country_codes = Some(countries);
        self
    }

    /// Builder: set button style and type
    pub fn with_button(mut self, style: GooglePayButtonStyle, button_type: GooglePayButtonType) -> Self {
        self.style = style;
        self.button_type = button_type;
        self
    }
}

// =============================================================================
// Whole configuration
// =============================================================================

/// Everything a wallet handshake reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfiguration {
    pub merchant: MerchantIdentity,
    #[serde(alias = "applePay")]
    pub apple_pay: ApplePayConfiguration,
    #[serde(alias = "googlePay")]
    pub google_pay: GooglePayConfiguration,
    #[serde(alias = "paymentDetails")]
    pub payment_details: PaymentDetails,
    #[serde(alias = "paymentOptions")]
    pub payment_options: PaymentOptions,
}

impl WalletConfiguration {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> PaymentResult<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn set_merchant(&mut self, merchant: MerchantIdentity) {
        self.merchant = merchant;
    }

    pub fn set_apple_pay(&mut self, configuration: ApplePayConfiguration) {
        self.apple_pay = configuration;
    }

    pub fn set_google_pay(&mut self, configuration: GooglePayConfiguration) {
        self.google_pay = configuration;
    }

    /// Replace the line items; the total follows them
    pub fn set_payment_items(&mut self, items: Vec<PaymentItem>) {
        self.payment_details.set_display_items(items);
    }

    pub fn set_shipping_options(&mut self, options: Vec<ShippingOption>) {
        self.payment_details.set_shipping_options(options);
    }

    pub fn set_payment_options(&mut self, options: PaymentOptions) {
        self.payment_options = options;
    }

    /// Builder: set merchant identity
    pub fn with_merchant(mut self, merchant: MerchantIdentity) -> Self {
        self.set_merchant(merchant);
        self
    }

    /// Builder: set Apple Pay configuration
    pub fn with_apple_pay(mut self, configuration: ApplePayConfiguration) -> Self {
        self.set_apple_pay(configuration);
        self
    }

    /// Builder: set Google Pay configuration
    pub fn with_google_pay(mut self, configuration: GooglePayConfiguration) -> Self {
        self.set_google_pay(configuration);
        self
    }

    /// Builder: set line items
    pub fn with_items(mut self, items: Vec<PaymentItem>) -> Self {
        self.set_payment_items(items);
        self
    }

    /// Builder: set shipping options
    pub fn with_shipping_options(mut self, options: Vec<ShippingOption>) -> Self {
        self.set_shipping_options(options);
        self
    }

    /// Builder: set payment options
    pub fn with_payment_options(mut self, options: PaymentOptions) -> Self {
        self.set_payment_options(options);
        self
    }

    /// Whether live shipping recalculation applies: options exist and shipping is requested
    pub fn requests_shipping_options(&self) -> bool {
        self.payment_details.has_shipping_options() && self.payment_options.request_shipping
    }
}
