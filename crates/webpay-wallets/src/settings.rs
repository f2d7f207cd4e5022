//! # Handshake Settings
//!
//! Engine settings that are not part of a merchant's cart: deadlines for
//! setup steps, the Google Pay script location and the tokenization gateway.
//! Loaded from environment variables (and a `.env` file if present).

use std::env;
use std::time::Duration;
use webpay_core::PaymentError;

pub const DEFAULT_GOOGLE_PAY_SCRIPT_URL: &str = "https://pay.google.com/gp/p/js/pay.js";
pub const DEFAULT_GATEWAY: &str = "judopay";
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings shared by both handshakes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeSettings {
    /// Google Pay client script
    pub google_pay_script_url: String,

    /// Gateway named in the Google Pay tokenization specification
    pub gateway: String,

    /// Deadline for loading the provider script (`None` = wait forever)
    pub script_timeout: Option<Duration>,

    /// Deadline for each capability probe (`None` = wait forever)
    pub probe_timeout: Option<Duration>,
}

impl HandshakeSettings {
    /// Load settings from environment variables.
    ///
    /// Optional env vars:
    /// - `WEBPAY_GOOGLE_PAY_SCRIPT_URL`
    /// - `WEBPAY_GOOGLE_PAY_GATEWAY`
    /// - `WEBPAY_SCRIPT_TIMEOUT_SECS` (0 disables the deadline)
    /// - `WEBPAY_PROBE_TIMEOUT_SECS` (0 disables the deadline)
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let settings = Self {
            google_pay_script_url: env::var("WEBPAY_GOOGLE_PAY_SCRIPT_URL")
                .unwrap_or(defaults.google_pay_script_url),
            gateway: env::var("WEBPAY_GOOGLE_PAY_GATEWAY").unwrap_or(defaults.gateway),
            script_timeout: timeout_var("WEBPAY_SCRIPT_TIMEOUT_SECS", defaults.script_timeout)?,
            probe_timeout: timeout_var("WEBPAY_PROBE_TIMEOUT_SECS", defaults.probe_timeout)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<(), PaymentError> {
        if !self.google_pay_script_url.starts_with("https://") {
            return Err(PaymentError::Configuration(
                "WEBPAY_GOOGLE_PAY_SCRIPT_URL must be an https:// URL".to_string(),
            ));
        }

        if self.gateway.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "WEBPAY_GOOGLE_PAY_GATEWAY must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder: set the tokenization gateway
    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into();
        self
    }

    /// Builder: set the script deadline
    pub fn with_script_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.script_timeout = timeout;
        self
    }

    /// Builder: set the probe deadline
    pub fn with_probe_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.probe_timeout = timeout;
        self
    }
}

impl Default for HandshakeSettings {
    fn default() -> Self {
        Self {
            google_pay_script_url: DEFAULT_GOOGLE_PAY_SCRIPT_URL.to_string(),
            gateway: DEFAULT_GATEWAY.to_string(),
            script_timeout: Some(DEFAULT_STAGE_TIMEOUT),
            probe_timeout: Some(DEFAULT_STAGE_TIMEOUT),
        }
    }
}

fn timeout_var(name: &str, default: Option<Duration>) -> Result<Option<Duration>, PaymentError> {
    match env::var(name) {
        Ok(raw) => parse_timeout_secs(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_timeout_secs(name: &str, raw: &str) -> Result<Option<Duration>, PaymentError> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        PaymentError::Configuration(format!("{} must be a whole number of seconds", name))
    })?;

    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
