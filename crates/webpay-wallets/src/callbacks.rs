//! # Live Sheet Callbacks
//!
//! Handlers the Google Pay client calls while its payment sheet is open.
//! They answer the provider directly and never touch the attempt's responder.

use crate::state::{SharedConfiguration, SheetActivity, StageTracker};
use std::sync::Arc;
use tracing::{debug, info, warn};
use webpay_core::gpay::{
    CallbackTrigger, IntermediatePaymentData, PaymentAuthorizationResult, PaymentData,
    PaymentDataUpdate,
};
use webpay_core::{PaymentResult, WalletConfiguration};

/// Shown on the sheet when the payer confirms a settled attempt
pub const SETTLED_MESSAGE: &str = "This payment is no longer in progress";

/// Handles `onPaymentAuthorized`
pub trait PaymentAuthorizedHandler: Send + Sync {
    fn on_payment_authorized(&self, data: &PaymentData) -> PaymentAuthorizationResult;
}

/// Handles `onPaymentDataChanged`
pub trait PaymentDataChangedHandler: Send + Sync {
    fn on_payment_data_changed(&self, data: &IntermediatePaymentData) -> PaymentDataUpdate;
}

/// Acknowledges authorizations while the sheet is open.
///
/// Authorization itself is left to the merchant's backend. Once the attempt
/// has been settled (cancelled or failed) the payer is told it did not go
/// through, since the merchant will never receive the token.
#[derive(Debug, Clone)]
pub struct AcknowledgingAuthorizer {
    stage: StageTracker,
}

impl AcknowledgingAuthorizer {
    pub fn new(stage: StageTracker) -> Self {
        Self { stage }
    }
}

impl PaymentAuthorizedHandler for AcknowledgingAuthorizer {
    fn on_payment_authorized(&self, _data: &PaymentData) -> PaymentAuthorizationResult {
        if self.stage.sheet_activity(SheetActivity::Authorizing) {
            info!("Google Pay payment authorized");
            PaymentAuthorizationResult::success()
        } else {
            warn!(stage = ?self.stage.get(), "Authorization callback after the attempt was settled");
            PaymentAuthorizationResult::error(SETTLED_MESSAGE)
        }
    }
}

/// Recomputes the sheet total when the payer picks another shipping option
#[derive(Debug, Clone)]
pub struct ShippingRecalculation {
    configuration: SharedConfiguration,
    stage: StageTracker,
}

impl ShippingRecalculation {
    pub fn new(configuration: SharedConfiguration, stage: StageTracker) -> Self {
        Self {
            configuration,
            stage,
        }
    }
}

impl PaymentDataChangedHandler for ShippingRecalculation {
    fn on_payment_data_changed(&self, data: &IntermediatePaymentData) -> PaymentDataUpdate {
        if !self.stage.sheet_activity(SheetActivity::RecalculatingShipping) {
            debug!(stage = ?self.stage.get(), "Ignoring data change outside an open sheet");
            return PaymentDataUpdate::default();
        }

        let update = self
            .configuration
            .read(|config| PaymentDataUpdate::for_change(&config.payment_details, data));

        match (&update.new_transaction_info, &data.shipping_option_data) {
            (Some(info), _) => debug!(total = %info.total_price, "Shipping total recalculated"),
            (None, Some(selection)) if data.callback_trigger == CallbackTrigger::ShippingOption => {
                debug!(option = %selection.id, "Unknown shipping option, total unchanged")
            }
            _ => debug!(trigger = ?data.callback_trigger, "No update for callback trigger"),
        }

        self.stage.sheet_activity(SheetActivity::Waiting);
        update
    }
}

/// Callbacks registered with a payments client
#[derive(Clone)]
pub struct PaymentDataCallbacks {
    pub on_payment_authorized: Arc<dyn PaymentAuthorizedHandler>,
    /// `None` tells the provider live shipping recalculation is unsupported
    pub on_payment_data_changed: Option<Arc<dyn PaymentDataChangedHandler>>,
}

impl PaymentDataCallbacks {
    /// Callbacks for a client built from `snapshot`.
    ///
    /// The data-changed handler is registered only when the snapshot has
    /// shipping options and requests shipping.
    pub fn for_configuration(
        snapshot: &WalletConfiguration,
        configuration: &SharedConfiguration,
        stage: &StageTracker,
    ) -> Self {
        let on_payment_data_changed = snapshot.requests_shipping_options().then(|| {
            Arc::new(ShippingRecalculation::new(configuration.clone(), stage.clone()))
                as Arc<dyn PaymentDataChangedHandler>
        });

        Self {
            on_payment_authorized: Arc::new(AcknowledgingAuthorizer::new(stage.clone())),
            on_payment_data_changed,
        }
    }

    pub fn handles_data_changes(&self) -> bool {
        self.on_payment_data_changed.is_some()
    }

    pub fn authorize(&self, data: &PaymentData) -> PaymentAuthorizationResult {
        self.on_payment_authorized.on_payment_authorized(data)
    }

    /// Dispatch a data change; empty update when no handler is registered
    pub fn data_changed(&self, data: &IntermediatePaymentData) -> PaymentDataUpdate {
        match &self.on_payment_data_changed {
            Some(handler) => handler.on_payment_data_changed(data),
            None => PaymentDataUpdate::default(),
        }
    }

    /// Dispatch a data change received as raw JSON and answer in JSON
    pub fn data_changed_value(&self, raw: serde_json::Value) -> PaymentResult<serde_json::Value> {
        let data: IntermediatePaymentData = serde_json::from_value(raw)?;
        Ok(serde_json::to_value(self.data_changed(&data))?)
    }
}

impl std::fmt::Debug for PaymentDataCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentDataCallbacks")
            .field("handles_data_changes", &self.handles_data_changes())
            .finish()
    }
}
