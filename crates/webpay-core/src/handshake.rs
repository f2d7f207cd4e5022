//! # Wallet Handshake Traits
//!
//! Each wallet runs its own asynchronous handshake (probe, render, click,
//! resolve) behind one trait, so callers hold either wallet the same way.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   WalletHandshake (trait)                   │
//! │  ├── create_button() -> Ready(WalletButton) | Unavailable   │
//! │  ├── cancel()                                               │
//! │  └── wallet()                                               │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!              ┌─────────────┴─────────────┐
//!      ┌───────┴────────┐          ┌───────┴────────┐
//!      │ApplePayHandshake│         │GooglePayHandshake│
//!      │  probe → button │         │ script → client →│
//!      │  click → gateway│         │ probe → sheet    │
//!      └────────────────┘          └──────────────────┘
//! ```
//!
//! Both variants share only the terminal contract: the `PaymentResponder`
//! handed to `create_button` is invoked at most once.

use crate::error::PaymentResult;
use crate::response::{PaymentResponse, WalletKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

type ResponseCallback = Box<dyn FnOnce(PaymentResult<PaymentResponse>) + Send>;

/// Once-only delivery of a payment attempt's outcome.
///
/// Clones share the same slot: whichever clone delivers first wins and every
/// later delivery is dropped.
#[derive(Clone)]
pub struct PaymentResponder {
    slot: Arc<Mutex<Option<ResponseCallback>>>,
}

impl PaymentResponder {
    /// Wrap the merchant's response callback
    pub fn new(callback: impl FnOnce(PaymentResult<PaymentResponse>) + Send + 'static) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(Box::new(callback)))),
        }
    }

    /// Deliver the outcome. Returns false if it was already delivered.
    pub fn deliver(&self, result: PaymentResult<PaymentResponse>) -> bool {
        let callback = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match callback {
            Some(callback) => {
                callback(result);
                true
            }
            None => false,
        }
    }

    /// Check if the outcome has been delivered
    pub fn is_settled(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl std::fmt::Debug for PaymentResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentResponder")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Rendering hints supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonRequest {
    /// CSS height (e.g. "48px")
    pub height: String,
    /// BCP 47 language tag for the button caption
    pub language: String,
}

impl ButtonRequest {
    pub fn new(height: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            height: height.into(),
            language: language.into(),
        }
    }
}

impl Default for ButtonRequest {
    fn default() -> Self {
        Self::new("40px", "en")
    }
}

/// A plain `<button>` styled by class names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledButton {
    pub class_names: Vec<String>,
    pub width: String,
    pub height: String,
    pub lang: String,
}

impl StyledButton {
    /// Value for the element's `class` attribute
    pub fn class_attribute(&self) -> String {
        self.class_names.join(" ")
    }
}

/// What the caller mounts in the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "element", rename_all = "snake_case")]
pub enum ButtonElement {
    /// Button built here from configuration
    Styled(StyledButton),
    /// Opaque element produced by the wallet's own client
    Provider(serde_json::Value),
}

/// A rendered, clickable wallet button
#[async_trait]
pub trait WalletButton: Send + Sync {
    fn wallet(&self) -> WalletKind;

    /// Element to mount
    fn element(&self) -> &ButtonElement;

    /// Run the payment attempt bound to this button.
    ///
    /// The outcome goes to the responder given at creation; the returned
    /// error only reports clicks that could not start an attempt.
    async fn click(&self) -> PaymentResult<()>;
}

/// Why no button was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "message", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The wallet answered that it cannot pay here
    NotSupported,
    /// The capability probe or its setup failed
    ProbeFailed(String),
    /// A setup step exceeded its deadline
    TimedOut(String),
    /// The caller cancelled the handshake
    Cancelled,
}

/// Outcome of a button-creation call
pub enum ButtonAvailability {
    Ready(Box<dyn WalletButton>),
    Unavailable(UnavailableReason),
}

impl ButtonAvailability {
    pub fn is_ready(&self) -> bool {
        matches!(self, ButtonAvailability::Ready(_))
    }

    pub fn into_button(self) -> Option<Box<dyn WalletButton>> {
        match self {
            ButtonAvailability::Ready(button) => Some(button),
            ButtonAvailability::Unavailable(_) => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&UnavailableReason> {
        match self {
            ButtonAvailability::Ready(_) => None,
            ButtonAvailability::Unavailable(reason) => Some(reason),
        }
    }
}

impl std::fmt::Debug for ButtonAvailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ButtonAvailability::Ready(button) => f
                .debug_tuple("Ready")
                .field(&button.wallet())
                .finish(),
            ButtonAvailability::Unavailable(reason) => {
                f.debug_tuple("Unavailable").field(reason).finish()
            }
        }
    }
}

/// Handshake for one wallet.
///
/// At most one handshake per wallet should be active at a time; callers
/// serialize repeated `create_button` calls.
#[async_trait]
pub trait WalletHandshake: Send + Sync {
    fn wallet(&self) -> WalletKind;

    /// Probe the wallet and, if it can pay, return a button bound to `responder`.
    async fn create_button(
        &self,
        request: &ButtonRequest,
        responder: PaymentResponder,
    ) -> PaymentResult<ButtonAvailability>;

    /// Abandon any pending setup step or open sheet.
    ///
    /// Only work already started is abandoned; a later `create_button`
    /// runs normally.
    fn cancel(&self);
}

/// Type alias for a shared handshake (dynamic dispatch)
pub type BoxedWalletHandshake = Arc<dyn WalletHandshake>;

/// Handshakes keyed by wallet
#[derive(Clone, Default)]
pub struct HandshakeRegistry {
    handshakes: HashMap<WalletKind, BoxedWalletHandshake>,
}

impl HandshakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handshake, replacing any previous one for the same wallet
    pub fn register(&mut self, handshake: BoxedWalletHandshake) {
        self.handshakes.insert(handshake.wallet(), handshake);
    }

    /// Register with builder pattern
    pub fn with_handshake(mut self, handshake: BoxedWalletHandshake) -> Self {
        self.register(handshake);
        self
    }

    pub fn get(&self, wallet: WalletKind) -> Option<&BoxedWalletHandshake> {
        self.handshakes.get(&wallet)
    }

    /// List all registered wallets
    pub fn wallets(&self) -> Vec<WalletKind> {
        self.handshakes.keys().copied().collect()
    }

    pub fn has_wallet(&self, wallet: WalletKind) -> bool {
        self.handshakes.contains_key(&wallet)
    }

    /// Cancel every registered handshake
    pub fn cancel_all(&self) {
        for handshake in self.handshakes.values() {
            handshake.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_responder_delivers_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let responder = PaymentResponder::new(move |result| {
            assert!(result.is_err());
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let clone = responder.clone();

        assert!(!responder.is_settled());
        assert!(clone.deliver(Err(PaymentError::AttemptSettled)));
        assert!(!responder.deliver(Err(PaymentError::AttemptSettled)));
        assert!(responder.is_settled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_styled_button_class_attribute() {
        let button = StyledButton {
            class_names: vec!["ApplePayButton".into(), "ApplePayButtonBlack".into()],
            width: "100%".into(),
            height: "48px".into(),
            lang: "en".into(),
        };
        assert_eq!(button.class_attribute(), "ApplePayButton ApplePayButtonBlack");
    }

    struct NeverReady {
        cancelled: AtomicUsize,
    }

    #[async_trait]
    impl WalletHandshake for NeverReady {
        fn wallet(&self) -> WalletKind {
            WalletKind::ApplePay
        }

        async fn create_button(
            &self,
            _request: &ButtonRequest,
            _responder: PaymentResponder,
        ) -> PaymentResult<ButtonAvailability> {
            Ok(ButtonAvailability::Unavailable(UnavailableReason::NotSupported))
        }

        fn cancel(&self) {
            self.cancelled.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_registry() {
        let handshake = Arc::new(NeverReady {
            cancelled: AtomicUsize::new(0),
        });
        let registry = HandshakeRegistry::new().with_handshake(handshake.clone());

        assert!(registry.has_wallet(WalletKind::ApplePay));
        assert!(!registry.has_wallet(WalletKind::GooglePay));
        assert_eq!(registry.wallets(), vec![WalletKind::ApplePay]);

        let availability = registry
            .get(WalletKind::ApplePay)
            .unwrap()
            .create_button(&ButtonRequest::default(), PaymentResponder::new(|_| {}))
            .await
            .unwrap();
        assert_eq!(
            availability.unavailable_reason(),
            Some(&UnavailableReason::NotSupported)
        );

        registry.cancel_all();
        assert_eq!(handshake.cancelled.load(Ordering::SeqCst), 1);
    }
}
