//! # webpay-core
//!
//! Core types and traits for the webpay wallet payment engine.
//!
//! This crate provides:
//! - `WalletConfiguration` with merchant identity, per-wallet settings and the cart
//! - `PaymentDetails` whose total is always derived from its line items
//! - Shipping recalculation for live shipping-option changes
//! - Google Pay wire types and request builders
//! - `PaymentResponse`, the unified result, and the normalizers producing it
//! - `WalletHandshake` / `WalletButton` traits and the once-only `PaymentResponder`
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust
//! use webpay_core::{CurrencyAmount, PaymentItem, WalletConfiguration};
//!
//! let mut config = WalletConfiguration::new();
//! config.set_payment_items(vec![
//!     PaymentItem::new("Book", CurrencyAmount::parse("10.00", "USD").unwrap()),
//!     PaymentItem::new("Pen", CurrencyAmount::parse("5.00", "USD").unwrap()),
//! ]);
//!
//! assert_eq!(config.payment_details.total().amount.value_string(), "15.00");
//! ```

pub mod config;
pub mod details;
pub mod error;
pub mod gpay;
pub mod handshake;
pub mod money;
pub mod normalize;
pub mod response;
pub mod shipping;

// Re-exports for convenience
pub use config::{
    ApplePayButtonStyle, ApplePayButtonType, ApplePayConfiguration, ApplePayMerchantCapability,
    ApplePayNetwork, GooglePayAuthMethod, GooglePayButtonStyle, GooglePayButtonType,
    GooglePayConfiguration, GooglePayEnvironment, GooglePayNetwork, MerchantIdentity,
    WalletConfiguration,
};
pub use details::{PaymentDetails, PaymentItem, PaymentOptions, ShippingOption, ShippingType};
pub use error::{PaymentError, PaymentResult};
pub use handshake::{
    BoxedWalletHandshake, ButtonAvailability, ButtonElement, ButtonRequest, HandshakeRegistry,
    PaymentResponder, StyledButton, UnavailableReason, WalletButton, WalletHandshake,
};
pub use money::CurrencyAmount;
pub use normalize::{
    normalize_apple_payment, normalize_failure, normalize_google_payment,
    normalize_google_payment_value, ApplePayPayment,
};
pub use response::{BillingDetails, PaymentResponse, ShippingDetails, WalletKind};
pub use shipping::{checkout_total, recalculate_total, RecalculatedTotal};
