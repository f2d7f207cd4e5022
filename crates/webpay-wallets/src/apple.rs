//! # Apple Pay Handshake
//!
//! Single-phase handshake: probe the device, then render a styled button.
//! A click hands the whole configuration and the responder to the payment
//! gateway, which owns the native session from there on.

use crate::settings::HandshakeSettings;
use crate::state::{run_stage, HandshakeRuns, HandshakeStage, SharedConfiguration, StageTracker};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use webpay_core::{
    ButtonAvailability, ButtonElement, ButtonRequest, PaymentError, PaymentResponder,
    PaymentResult, StyledButton, UnavailableReason, WalletButton, WalletConfiguration,
    WalletHandshake, WalletKind,
};

/// Base CSS class of every Apple Pay button
pub const APPLE_PAY_BUTTON_CLASS: &str = "ApplePayButton";

/// "Can this device pay with Apple Pay?"
#[async_trait]
pub trait ApplePayCapability: Send + Sync {
    async fn can_make_payments(&self) -> PaymentResult<bool>;
}

/// Merchant gateway that runs the native payment session.
///
/// Fire-and-forget: the gateway must deliver exactly one outcome to
/// `responder` (see `webpay_core::normalize_apple_payment`).
pub trait PaymentGateway: Send + Sync {
    fn execute(&self, wallet: WalletKind, configuration: WalletConfiguration, responder: PaymentResponder);
}

/// Apple Pay handshake
pub struct ApplePayHandshake {
    configuration: SharedConfiguration,
    capability: Arc<dyn ApplePayCapability>,
    gateway: Arc<dyn PaymentGateway>,
    settings: HandshakeSettings,
    runs: HandshakeRuns,
}

impl ApplePayHandshake {
    pub fn new(
        configuration: SharedConfiguration,
        capability: Arc<dyn ApplePayCapability>,
        gateway: Arc<dyn PaymentGateway>,
        settings: HandshakeSettings,
    ) -> Self {
        Self {
            configuration,
            capability,
            gateway,
            settings,
            runs: HandshakeRuns::new(),
        }
    }

    /// Stage of the most recent `create_button`
    pub fn stage(&self) -> HandshakeStage {
        self.runs.stage()
    }

    /// Build the button element from style × type
    fn styled_button(configuration: &WalletConfiguration, request: &ButtonRequest) -> StyledButton {
        let apple = &configuration.apple_pay;
        StyledButton {
            class_names: vec![
                APPLE_PAY_BUTTON_CLASS.to_string(),
                apple.style.class_name().to_string(),
                apple.button_type.class_name().to_string(),
            ],
            width: "100%".to_string(),
            height: request.height.clone(),
            lang: request.language.clone(),
        }
    }

    fn unavailable(stage: &StageTracker, reason: UnavailableReason) -> PaymentResult<ButtonAvailability> {
        stage.set(HandshakeStage::Unavailable);
        Ok(ButtonAvailability::Unavailable(reason))
    }
}

#[async_trait]
impl WalletHandshake for ApplePayHandshake {
    fn wallet(&self) -> WalletKind {
        WalletKind::ApplePay
    }

    #[instrument(skip_all, fields(wallet = "applePay", attempt = tracing::field::Empty))]
    async fn create_button(
        &self,
        request: &ButtonRequest,
        responder: PaymentResponder,
    ) -> PaymentResult<ButtonAvailability> {
        let attempt = Uuid::new_v4();
        tracing::Span::current().record("attempt", tracing::field::display(attempt));

        let (stage, cancel) = self.runs.start();
        let configuration = self.configuration.snapshot();

        if configuration.apple_pay.supported_networks.is_empty() {
            warn!("Apple Pay has no supported networks configured");
            return Self::unavailable(&stage, UnavailableReason::ProbeFailed(
                "No supported networks configured".to_string(),
            ));
        }

        let element = Self::styled_button(&configuration, request);

        stage.set(HandshakeStage::Probing);
        let probe = run_stage(
            "capability probe",
            self.settings.probe_timeout,
            &cancel,
            self.capability.can_make_payments(),
        )
        .await;

        // Probe failures are only logged; the merchant's responder is not told.
        match probe {
            Ok(Ok(true)) => {
                debug!(classes = %element.class_attribute(), "Apple Pay available");
                stage.set(HandshakeStage::Ready);
                Ok(ButtonAvailability::Ready(Box::new(ApplePayButton {
                    element: ButtonElement::Styled(element),
                    configuration: self.configuration.clone(),
                    gateway: self.gateway.clone(),
                    responder,
                    stage,
                    attempt,
                })))
            }
            Ok(Ok(false)) => {
                info!("Apple Pay not available on this device");
                Self::unavailable(&stage, UnavailableReason::NotSupported)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Apple Pay capability probe failed");
                Self::unavailable(&stage, UnavailableReason::ProbeFailed(err.message()))
            }
            Err(PaymentError::Cancelled { .. }) => {
                info!("Apple Pay handshake cancelled");
                Self::unavailable(&stage, UnavailableReason::Cancelled)
            }
            Err(err) => {
                warn!(error = %err, "Apple Pay capability probe did not finish");
                Self::unavailable(&stage, UnavailableReason::TimedOut(err.message()))
            }
        }
    }

    fn cancel(&self) {
        self.runs.cancel();
    }
}

/// Rendered Apple Pay button
pub struct ApplePayButton {
    element: ButtonElement,
    configuration: SharedConfiguration,
    gateway: Arc<dyn PaymentGateway>,
    responder: PaymentResponder,
    stage: StageTracker,
    attempt: Uuid,
}

#[async_trait]
impl WalletButton for ApplePayButton {
    fn wallet(&self) -> WalletKind {
        WalletKind::ApplePay
    }

    fn element(&self) -> &ButtonElement {
        &self.element
    }

    #[instrument(skip_all, fields(wallet = "applePay", attempt = %self.attempt))]
    async fn click(&self) -> PaymentResult<()> {
        if self.responder.is_settled() {
            return Err(PaymentError::AttemptSettled);
        }
        self.stage.begin_attempt(HandshakeStage::Dispatched)?;

        info!("Dispatching Apple Pay attempt to gateway");
        self.gateway.execute(
            WalletKind::ApplePay,
            self.configuration.snapshot(),
            self.responder.clone(),
        );
        Ok(())
    }
}
