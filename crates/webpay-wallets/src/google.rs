//! # Google Pay Handshake
//!
//! Multi-phase handshake:
//!
//! ```text
//! create_button: script (once) → client + callbacks → isReadyToPay → button
//! click:         payment data request → sheet ⇄ live callbacks → response
//! ```
//!
//! Probe rejections and sheet outcomes are delivered to the responder; a
//! `false` readiness answer only withholds the button.

use crate::callbacks::PaymentDataCallbacks;
use crate::client::{
    GoogleButtonOptions, PaymentsClient, PaymentsClientFactory, PaymentsClientOptions, ScriptLoader,
};
use crate::settings::HandshakeSettings;
use crate::state::{
    run_stage, HandshakeRuns, HandshakeStage, SharedConfiguration, SheetActivity, StageTracker,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use webpay_core::gpay::{ClientSettings, IsReadyToPayRequest, PaymentDataRequest, PaymentMethod};
use webpay_core::{
    normalize_google_payment, ButtonAvailability, ButtonElement, ButtonRequest, PaymentError,
    PaymentResponder, PaymentResult, UnavailableReason, WalletButton, WalletHandshake, WalletKind,
};

/// Google Pay handshake
pub struct GooglePayHandshake {
    configuration: SharedConfiguration,
    loader: Arc<dyn ScriptLoader>,
    factory: Arc<dyn PaymentsClientFactory>,
    settings: HandshakeSettings,
    script: OnceCell<()>,
    runs: HandshakeRuns,
}

impl GooglePayHandshake {
    pub fn new(
        configuration: SharedConfiguration,
        loader: Arc<dyn ScriptLoader>,
        factory: Arc<dyn PaymentsClientFactory>,
        settings: HandshakeSettings,
    ) -> Self {
        Self {
            configuration,
            loader,
            factory,
            settings,
            script: OnceCell::new(),
            runs: HandshakeRuns::new(),
        }
    }

    /// Stage of the most recent `create_button`
    pub fn stage(&self) -> HandshakeStage {
        self.runs.stage()
    }

    /// Load the client script; succeeds once per handshake, failures retry
    async fn load_script(&self, cancel: &CancellationToken) -> PaymentResult<()> {
        self.script
            .get_or_try_init(|| async {
                debug!(src = %self.settings.google_pay_script_url, "Loading Google Pay script");
                run_stage(
                    "script load",
                    self.settings.script_timeout,
                    cancel,
                    self.loader.load_script(&self.settings.google_pay_script_url),
                )
                .await?
            })
            .await
            .map(|_| ())
    }

    fn unavailable(stage: &StageTracker, reason: UnavailableReason) -> PaymentResult<ButtonAvailability> {
        stage.set(HandshakeStage::Unavailable);
        Ok(ButtonAvailability::Unavailable(reason))
    }

    fn interrupted(stage: &StageTracker, err: PaymentError) -> PaymentResult<ButtonAvailability> {
        match err {
            PaymentError::Cancelled { .. } => {
                info!("Google Pay handshake cancelled");
                Self::unavailable(stage, UnavailableReason::Cancelled)
            }
            PaymentError::TimedOut { .. } => {
                warn!(error = %err, "Google Pay setup step did not finish");
                Self::unavailable(stage, UnavailableReason::TimedOut(err.message()))
            }
            other => {
                warn!(error = %other, "Google Pay setup failed");
                Self::unavailable(stage, UnavailableReason::ProbeFailed(other.message()))
            }
        }
    }
}

#[async_trait]
impl WalletHandshake for GooglePayHandshake {
    fn wallet(&self) -> WalletKind {
        WalletKind::GooglePay
    }

    #[instrument(skip_all, fields(wallet = "googlePay", attempt = tracing::field::Empty))]
    async fn create_button(
        &self,
        _request: &ButtonRequest,
        responder: PaymentResponder,
    ) -> PaymentResult<ButtonAvailability> {
        let attempt = Uuid::new_v4();
        tracing::Span::current().record("attempt", tracing::field::display(attempt));

        let (stage, cancel) = self.runs.start();
        stage.set(HandshakeStage::ScriptLoading);
        if let Err(err) = self.load_script(&cancel).await {
            return Self::interrupted(&stage, err);
        }

        let configuration = self.configuration.snapshot();
        let callbacks = PaymentDataCallbacks::for_configuration(&configuration, &self.configuration, &stage);
        let options = PaymentsClientOptions {
            settings: ClientSettings::from_configuration(&configuration),
            callbacks,
        };
        let client = match self.factory.create_client(options) {
            Ok(client) => client,
            Err(err) => return Self::interrupted(&stage, err),
        };
        let payment_method = PaymentMethod::card(&configuration, &self.settings.gateway);
        stage.set(HandshakeStage::ClientConfigured);

        stage.set(HandshakeStage::Probing);
        let probe = run_stage(
            "capability probe",
            self.settings.probe_timeout,
            &cancel,
            client.is_ready_to_pay(&IsReadyToPayRequest::new(payment_method.clone())),
        )
        .await;

        match probe {
            Ok(Ok(response)) if response.result => {
                let element = client.create_button(&GoogleButtonOptions::from_configuration(&configuration));
                debug!("Google Pay available");
                stage.set(HandshakeStage::Ready);
                Ok(ButtonAvailability::Ready(Box::new(GooglePayButton {
                    element: ButtonElement::Provider(element),
                    configuration: self.configuration.clone(),
                    client,
                    payment_method,
                    responder,
                    stage,
                    cancel,
                    attempt,
                })))
            }
            Ok(Ok(_)) => {
                info!("Google Pay not available for this payer");
                Self::unavailable(&stage, UnavailableReason::NotSupported)
            }
            Ok(Err(err)) => {
                let message = err.message();
                warn!(error = %message, "Google Pay readiness probe rejected");
                stage.set(HandshakeStage::Failed);
                responder.deliver(Err(PaymentError::CapabilityProbe {
                    wallet: WalletKind::GooglePay,
                    message: message.clone(),
                }));
                Ok(ButtonAvailability::Unavailable(UnavailableReason::ProbeFailed(message)))
            }
            Err(err) => Self::interrupted(&stage, err),
        }
    }

    fn cancel(&self) {
        self.runs.cancel();
    }
}

/// Rendered Google Pay button
pub struct GooglePayButton {
    element: ButtonElement,
    configuration: SharedConfiguration,
    client: Arc<dyn PaymentsClient>,
    payment_method: PaymentMethod,
    responder: PaymentResponder,
    stage: StageTracker,
    cancel: CancellationToken,
    attempt: Uuid,
}

#[async_trait]
impl WalletButton for GooglePayButton {
    fn wallet(&self) -> WalletKind {
        WalletKind::GooglePay
    }

    fn element(&self) -> &ButtonElement {
        &self.element
    }

    #[instrument(skip_all, fields(wallet = "googlePay", attempt = %self.attempt))]
    async fn click(&self) -> PaymentResult<()> {
        if self.responder.is_settled() {
            return Err(PaymentError::AttemptSettled);
        }
        self.stage
            .begin_attempt(HandshakeStage::SheetOpen(SheetActivity::Waiting))?;

        let request = self.configuration.read(|config| {
            PaymentDataRequest::from_configuration(config, self.payment_method.clone())
        });
        info!(
            total = %request.transaction_info.total_price,
            currency = %request.transaction_info.currency_code,
            "Opening Google Pay sheet"
        );

        let outcome = run_stage(
            "payment sheet",
            None,
            &self.cancel,
            self.client.load_payment_data(&request),
        )
        .await
        .and_then(|loaded| loaded);

        match outcome {
            Ok(data) => {
                self.stage.set(HandshakeStage::Resolved);
                info!("Google Pay payment data received");
                self.responder.deliver(Ok(normalize_google_payment(data)));
            }
            Err(err) => {
                self.stage.set(HandshakeStage::Failed);
                warn!(error = %err, "Google Pay sheet failed");
                self.responder.deliver(Err(err));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        capture, init_tracing, MockClient, MockClientFactory, MockScriptLoader, Probe, Sheet,
    };
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use webpay_core::gpay::{CallbackIntent, IntermediatePaymentData, PaymentData, TransactionState};
    use webpay_core::{
        CurrencyAmount, GooglePayConfiguration, GooglePayEnvironment, PaymentItem, PaymentOptions,
        ShippingOption, WalletConfiguration,
    };

    fn usd(value: &str) -> CurrencyAmount {
        CurrencyAmount::parse(value, "USD").unwrap()
    }

    fn cart() -> WalletConfiguration {
        WalletConfiguration::new()
            .with_google_pay(GooglePayConfiguration::new(GooglePayEnvironment::Test, "merchant-42"))
            .with_items(vec![
                PaymentItem::new("Book", usd("10.00")),
                PaymentItem::new("Pen", usd("5.00")),
            ])
    }

    fn with_shipping(configuration: WalletConfiguration) -> WalletConfiguration {
        configuration
            .with_shipping_options(vec![
                ShippingOption::new("std", "Standard", usd("2.00")),
                ShippingOption::new("exp", "Express", usd("9.00")).selected(),
            ])
            .with_payment_options(PaymentOptions::default().with_shipping(None))
    }

    fn payment_data() -> PaymentData {
        serde_json::from_value(json!({
            "apiVersion": 2,
            "apiVersionMinor": 0,
            "email": "payer@example.com",
            "paymentMethodData": {"type": "CARD", "tokenizationData": {"token": "tok_1"}},
            "shippingAddress": {"name": "A Payer", "address1": "1 Main St", "address2": "", "countryCode": "US"},
            "shippingOptionData": {"id": "std"}
        }))
        .unwrap()
    }

    struct Fixture {
        handshake: GooglePayHandshake,
        loader: Arc<MockScriptLoader>,
        factory: Arc<MockClientFactory>,
        client: Arc<MockClient>,
    }

    fn fixture(configuration: WalletConfiguration, loader: MockScriptLoader, client: MockClient) -> Fixture {
        init_tracing();
        let loader = Arc::new(loader);
        let client = Arc::new(client);
        let factory = Arc::new(MockClientFactory::new(client.clone()));
        let handshake = GooglePayHandshake::new(
            SharedConfiguration::new(configuration),
            loader.clone(),
            factory.clone(),
            HandshakeSettings::default(),
        );
        Fixture {
            handshake,
            loader,
            factory,
            client,
        }
    }

    #[tokio::test]
    async fn test_successful_payment_resolves_once() {
        let f = fixture(
            cart(),
            MockScriptLoader::default(),
            MockClient::new(Probe::Answer(true), Sheet::Pay(payment_data())),
        );
        let (responder, outcomes) = capture();

        let button = f
            .handshake
            .create_button(&ButtonRequest::default(), responder)
            .await
            .unwrap()
            .into_button()
            .unwrap();
        assert_eq!(f.handshake.stage(), HandshakeStage::Ready);
        assert!(matches!(button.element(), ButtonElement::Provider(_)));
        assert_eq!(f.client.buttons.lock().unwrap().len(), 1);

        button.click().await.unwrap();
        assert_eq!(f.handshake.stage(), HandshakeStage::Resolved);

        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        let response = outcomes[0].as_ref().unwrap();
        assert_eq!(response.wallet, WalletKind::GooglePay);
        assert_eq!(response.google_api_version, Some(2));
        assert_eq!(
            response.billing_details.as_ref().unwrap().email.as_deref(),
            Some("payer@example.com")
        );
        let shipping = response.shipping_details.as_ref().unwrap();
        assert_eq!(shipping.address_line, vec!["1 Main St".to_string()]);
        assert_eq!(response.shipping_option_selected.as_deref(), Some("std"));
    }

    #[tokio::test]
    async fn test_sheet_rejection_delivers_provider_message() {
        let f = fixture(
            cart(),
            MockScriptLoader::default(),
            MockClient::new(Probe::Answer(true), Sheet::Reject("user_cancelled".into())),
        );
        let (responder, outcomes) = capture();

        let button = f
            .handshake
            .create_button(&ButtonRequest::default(), responder)
            .await
            .unwrap()
            .into_button()
            .unwrap();
        button.click().await.unwrap();

        assert_eq!(f.handshake.stage(), HandshakeStage::Failed);
        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        let err = outcomes[0].as_ref().unwrap_err();
        assert_eq!(err.to_string(), "user_cancelled");
        assert_eq!(err.wallet(), Some(WalletKind::GooglePay));
        drop(outcomes);

        assert_eq!(button.click().await, Err(PaymentError::AttemptSettled));
    }

    #[tokio::test]
    async fn test_probe_rejection_is_delivered() {
        let f = fixture(
            cart(),
            MockScriptLoader::default(),
            MockClient::new(Probe::Reject("DEVELOPER_ERROR".into()), Sheet::Hang),
        );
        let (responder, outcomes) = capture();

        let availability = f
            .handshake
            .create_button(&ButtonRequest::default(), responder)
            .await
            .unwrap();

        assert_eq!(
            availability.unavailable_reason(),
            Some(&UnavailableReason::ProbeFailed("DEVELOPER_ERROR".into()))
        );
        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0],
            Err(PaymentError::CapabilityProbe {
                wallet: WalletKind::GooglePay,
                message: "DEVELOPER_ERROR".into()
            })
        );
        assert!(f.client.buttons.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_not_ready_halts_silently() {
        let f = fixture(
            cart(),
            MockScriptLoader::default(),
            MockClient::new(Probe::Answer(false), Sheet::Hang),
        );
        let (responder, outcomes) = capture();

        let availability = f
            .handshake
            .create_button(&ButtonRequest::default(), responder)
            .await
            .unwrap();

        assert_eq!(
            availability.unavailable_reason(),
            Some(&UnavailableReason::NotSupported)
        );
        assert_eq!(f.handshake.stage(), HandshakeStage::Unavailable);
        assert!(outcomes.lock().unwrap().is_empty());
        assert!(f.client.buttons.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_script_loads_once_per_handshake() {
        let f = fixture(
            cart(),
            MockScriptLoader::default(),
            MockClient::new(Probe::Answer(true), Sheet::Hang),
        );

        for _ in 0..3 {
            let availability = f
                .handshake
                .create_button(&ButtonRequest::default(), capture().0)
                .await
                .unwrap();
            assert!(availability.is_ready());
        }

        assert_eq!(f.loader.loads(), 1);
        assert_eq!(
            f.loader.sources.lock().unwrap()[0],
            "https://pay.google.com/gp/p/js/pay.js"
        );
        assert_eq!(f.factory.settings.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_script_load_is_retried() {
        let f = fixture(
            cart(),
            MockScriptLoader::failing_once("network error"),
            MockClient::new(Probe::Answer(true), Sheet::Hang),
        );
        let (responder, outcomes) = capture();

        let availability = f
            .handshake
            .create_button(&ButtonRequest::default(), responder.clone())
            .await
            .unwrap();
        assert!(matches!(
            availability.unavailable_reason(),
            Some(UnavailableReason::ProbeFailed(_))
        ));
        assert!(outcomes.lock().unwrap().is_empty());

        let availability = f
            .handshake
            .create_button(&ButtonRequest::default(), responder)
            .await
            .unwrap();
        assert!(availability.is_ready());
        assert_eq!(f.loader.loads(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_script_times_out() {
        let f = fixture(
            cart(),
            MockScriptLoader::hanging(),
            MockClient::new(Probe::Answer(true), Sheet::Hang),
        );

        let availability = tokio::time::timeout(
            Duration::from_secs(60),
            f.handshake.create_button(&ButtonRequest::default(), capture().0),
        )
        .await
        .expect("script deadline should fire first")
        .unwrap();

        assert!(matches!(
            availability.unavailable_reason(),
            Some(UnavailableReason::TimedOut(_))
        ));
        assert!(f.factory.settings.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_callbacks_follow_shipping_configuration() {
        let f = fixture(
            cart(),
            MockScriptLoader::default(),
            MockClient::new(Probe::Answer(true), Sheet::Hang),
        );
        f.handshake
            .create_button(&ButtonRequest::default(), capture().0)
            .await
            .unwrap();
        assert!(!f.factory.last_callbacks().handles_data_changes());

        let f = fixture(
            with_shipping(cart()),
            MockScriptLoader::default(),
            MockClient::new(Probe::Answer(true), Sheet::Hang),
        );
        f.handshake
            .create_button(&ButtonRequest::default(), capture().0)
            .await
            .unwrap();
        assert!(f.factory.last_callbacks().handles_data_changes());

        let settings = f.factory.settings.lock().unwrap();
        assert_eq!(settings[0].environment, GooglePayEnvironment::Test);
        assert_eq!(settings[0].merchant_info.merchant_id.as_deref(), Some("merchant-42"));
    }

    #[tokio::test]
    async fn test_live_shipping_changes_while_sheet_open() {
        let (sheet_tx, sheet_rx) = oneshot::channel();
        let f = fixture(
            with_shipping(cart()),
            MockScriptLoader::default(),
            MockClient::new(Probe::Answer(true), Sheet::manual(sheet_rx)),
        );
        let (responder, outcomes) = capture();

        let button = f
            .handshake
            .create_button(&ButtonRequest::default(), responder)
            .await
            .unwrap()
            .into_button()
            .unwrap();
        let callbacks = f.factory.last_callbacks();

        let payer = async {
            while !matches!(f.handshake.stage(), HandshakeStage::SheetOpen(_)) {
                tokio::task::yield_now().await;
            }

            let change: IntermediatePaymentData = serde_json::from_value(json!({
                "callbackTrigger": "SHIPPING_OPTION",
                "shippingOptionData": {"id": "std"}
            }))
            .unwrap();
            let update = callbacks.data_changed(&change);
            assert_eq!(update.new_transaction_info.unwrap().total_price, "17.00");
            assert!(outcomes.lock().unwrap().is_empty());

            assert_eq!(button.click().await, Err(PaymentError::AttemptInProgress));

            callbacks.authorize(&payment_data());
            assert_eq!(
                f.handshake.stage(),
                HandshakeStage::SheetOpen(SheetActivity::Authorizing)
            );
            assert!(sheet_tx.send(Ok(payment_data())).is_ok());
        };

        let (clicked, ()) = tokio::join!(button.click(), payer);
        clicked.unwrap();

        let request = f.client.requests.lock().unwrap()[0].clone();
        assert_eq!(request.transaction_info.total_price, "24.00");
        assert!(request.callback_intents.contains(&CallbackIntent::ShippingOption));

        assert_eq!(outcomes.lock().unwrap().len(), 1);
        let change: IntermediatePaymentData = serde_json::from_value(json!({
            "callbackTrigger": "SHIPPING_OPTION",
            "shippingOptionData": {"id": "exp"}
        }))
        .unwrap();
        assert!(callbacks.data_changed(&change).is_empty());
    }

    #[tokio::test]
    async fn test_request_uses_configuration_at_click_time() {
        let f = fixture(
            cart(),
            MockScriptLoader::default(),
            MockClient::new(Probe::Answer(true), Sheet::Pay(payment_data())),
        );
        let button = f
            .handshake
            .create_button(&ButtonRequest::default(), capture().0)
            .await
            .unwrap()
            .into_button()
            .unwrap();

        f.handshake.configuration.update(|config| {
            config.set_payment_items(vec![PaymentItem::new("Lamp", usd("30.00"))])
        });
        button.click().await.unwrap();

        let requests = f.client.requests.lock().unwrap();
        assert_eq!(requests[0].transaction_info.total_price, "30.00");
        assert_eq!(
            requests[0].allowed_payment_methods[0]
                .tokenization_specification
                .parameters
                .gateway,
            "judopay"
        );
    }

    #[tokio::test]
    async fn test_cancel_while_sheet_open_fails_once() {
        let f = fixture(
            cart(),
            MockScriptLoader::default(),
            MockClient::new(Probe::Answer(true), Sheet::Hang),
        );
        let (responder, outcomes) = capture();
        let button = f
            .handshake
            .create_button(&ButtonRequest::default(), responder)
            .await
            .unwrap()
            .into_button()
            .unwrap();

        let cancel = async {
            while !matches!(f.handshake.stage(), HandshakeStage::SheetOpen(_)) {
                tokio::task::yield_now().await;
            }
            f.handshake.cancel();
        };
        let (clicked, ()) = tokio::join!(button.click(), cancel);
        clicked.unwrap();

        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], Err(PaymentError::Cancelled { .. })));
        drop(outcomes);

        let late = f.factory.last_callbacks().authorize(&payment_data());
        assert_eq!(late.transaction_state, TransactionState::Error);
        assert_eq!(f.handshake.stage(), HandshakeStage::Failed);
    }

    #[tokio::test]
    async fn test_handshake_usable_after_cancel() {
        let f = fixture(
            cart(),
            MockScriptLoader::default(),
            MockClient::new(Probe::Answer(true), Sheet::Pay(payment_data())),
        );
        f.handshake.cancel();

        for _ in 0..2 {
            let (responder, outcomes) = capture();
            let button = f
                .handshake
                .create_button(&ButtonRequest::default(), responder)
                .await
                .unwrap()
                .into_button()
                .unwrap();
            button.click().await.unwrap();
            assert!(outcomes.lock().unwrap()[0].is_ok());
        }
    }

    #[tokio::test]
    async fn test_earlier_button_keeps_its_stage() {
        let f = fixture(
            cart(),
            MockScriptLoader::default(),
            MockClient::new(Probe::answers([true, false]), Sheet::Pay(payment_data())),
        );
        let (responder, outcomes) = capture();
        let button = f
            .handshake
            .create_button(&ButtonRequest::default(), responder)
            .await
            .unwrap()
            .into_button()
            .unwrap();

        let later = f
            .handshake
            .create_button(&ButtonRequest::default(), capture().0)
            .await
            .unwrap();
        assert_eq!(later.unavailable_reason(), Some(&UnavailableReason::NotSupported));
        assert_eq!(f.handshake.stage(), HandshakeStage::Unavailable);

        button.click().await.unwrap();
        assert!(outcomes.lock().unwrap()[0].is_ok());
    }
}
