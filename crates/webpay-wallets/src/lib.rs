//! # webpay-wallets
//!
//! Apple Pay and Google Pay handshakes for webpay-rs.
//!
//! Two asymmetric protocols behind one `WalletHandshake` trait:
//!
//! 1. **ApplePayHandshake** - single phase
//!    - Capability probe, then a styled button
//!    - Click hands the configuration to your `PaymentGateway`
//!
//! 2. **GooglePayHandshake** - multi phase
//!    - Script load (once), client with live callbacks, readiness probe
//!    - Click opens the payment sheet; shipping changes recalculate the
//!      total while it is open
//!
//! Every setup step runs under the deadlines in `HandshakeSettings` and can
//! be abandoned with `cancel()`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use webpay_wallets::WebPayments;
//! use webpay_core::{ButtonRequest, PaymentResponder, WalletConfiguration};
//!
//! let payments = WebPayments::from_env(WalletConfiguration::from_toml(CONFIG)?)?
//!     .with_google_pay(script_loader, client_factory);
//!
//! let responder = PaymentResponder::new(|outcome| match outcome {
//!     Ok(response) => submit_to_backend(response),
//!     Err(err) => show_error(err.message()),
//! });
//!
//! if let Some(button) = payments
//!     .google_pay_button(&ButtonRequest::default(), responder)
//!     .await?
//!     .into_button()
//! {
//!     mount(button.element());
//!     // on click:
//!     button.click().await?;
//! }
//! ```

pub mod apple;
pub mod callbacks;
pub mod client;
pub mod google;
pub mod payments;
pub mod settings;
pub mod state;

#[cfg(test)]
mod testing;

// Re-exports
pub use apple::{ApplePayButton, ApplePayCapability, ApplePayHandshake, PaymentGateway};
pub use callbacks::{
    AcknowledgingAuthorizer, PaymentAuthorizedHandler, PaymentDataCallbacks,
    PaymentDataChangedHandler, ShippingRecalculation,
};
pub use client::{
    ButtonSizeMode, GoogleButtonOptions, PaymentsClient, PaymentsClientFactory,
    PaymentsClientOptions, ScriptLoader,
};
pub use google::{GooglePayButton, GooglePayHandshake};
pub use payments::WebPayments;
pub use settings::HandshakeSettings;
pub use state::{HandshakeRuns, HandshakeStage, SharedConfiguration, SheetActivity, StageTracker};
