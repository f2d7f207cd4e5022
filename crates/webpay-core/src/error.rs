//! # Payment Error Types
//!
//! Typed error handling for the webpay wallet engine.
//! Every failure that reaches a merchant's response callback is a `PaymentError`.

use crate::response::WalletKind;
use thiserror::Error;

/// Core error type for all wallet payment operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Configuration errors (bad settings, unparsable config file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The provider script never became usable
    #[error("Script load failed: {0}")]
    ScriptLoad(String),

    /// The wallet's capability probe rejected
    #[error("Capability probe failed [{wallet}]: {message}")]
    CapabilityProbe { wallet: WalletKind, message: String },

    /// The provider rejected while the payment sheet was open.
    /// Displays the bare provider message.
    #[error("{message}")]
    Provider { wallet: WalletKind, message: String },

    /// A suspension point exceeded its deadline
    #[error("{stage} timed out after {after_ms}ms")]
    TimedOut { stage: String, after_ms: u64 },

    /// The caller abandoned the handshake
    #[error("{stage} cancelled")]
    Cancelled { stage: String },

    /// The payment attempt already delivered its response
    #[error("Payment attempt already settled")]
    AttemptSettled,

    /// A payment sheet is already open for this button
    #[error("Payment attempt already in progress")]
    AttemptInProgress,

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Create a provider error for a wallet
    pub fn provider(wallet: WalletKind, message: impl Into<String>) -> Self {
        PaymentError::Provider {
            wallet,
            message: message.into(),
        }
    }

    /// Human-readable message without the variant prefix
    pub fn message(&self) -> String {
        match self {
            PaymentError::Configuration(message)
            | PaymentError::InvalidRequest(message)
            | PaymentError::ScriptLoad(message)
            | PaymentError::Serialization(message)
            | PaymentError::Internal(message)
            | PaymentError::CapabilityProbe { message, .. }
            | PaymentError::Provider { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns true if retrying the same handshake may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::TimedOut { .. } | PaymentError::ScriptLoad(_)
        )
    }

    /// Returns the wallet this error originated from, if any
    pub fn wallet(&self) -> Option<WalletKind> {
        match self {
            PaymentError::CapabilityProbe { wallet, .. } | PaymentError::Provider { wallet, .. } => {
                Some(*wallet)
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PaymentError {
    fn from(err: toml::de::Error) -> Self {
        PaymentError::Configuration(err.to_string())
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
