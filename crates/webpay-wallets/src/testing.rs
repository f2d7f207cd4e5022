//! Mock collaborators shared by the handshake tests.

use crate::apple::{ApplePayCapability, PaymentGateway};
use crate::callbacks::PaymentDataCallbacks;
use crate::client::{
    GoogleButtonOptions, PaymentsClient, PaymentsClientFactory, PaymentsClientOptions, ScriptLoader,
};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use webpay_core::gpay::{
    ClientSettings, IsReadyToPayRequest, IsReadyToPayResponse, PaymentData, PaymentDataRequest,
};
use webpay_core::{
    PaymentError, PaymentResponder, PaymentResponse, PaymentResult, WalletConfiguration, WalletKind,
};

/// Route handshake logs to the test output (`RUST_LOG=debug cargo test`)
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::WARN.into())
                .from_env_lossy(),
        )
        .try_init();
}

pub type Outcomes = Arc<Mutex<Vec<PaymentResult<PaymentResponse>>>>;

/// Responder that records every outcome it receives
pub fn capture() -> (PaymentResponder, Outcomes) {
    let outcomes: Outcomes = Arc::new(Mutex::new(Vec::new()));
    let sink = outcomes.clone();
    let responder = PaymentResponder::new(move |outcome| sink.lock().unwrap().push(outcome));
    (responder, outcomes)
}

/// Scripted capability answer
pub enum Probe {
    Answer(bool),
    /// One answer per probe, `false` once exhausted
    Answers(Mutex<VecDeque<bool>>),
    Reject(String),
    Hang,
}

impl Probe {
    pub fn answers(answers: impl IntoIterator<Item = bool>) -> Self {
        Probe::Answers(Mutex::new(answers.into_iter().collect()))
    }

    async fn run(&self, wallet: WalletKind) -> PaymentResult<bool> {
        match self {
            Probe::Answer(answer) => Ok(*answer),
            Probe::Answers(answers) => Ok(answers.lock().unwrap().pop_front().unwrap_or(false)),
            Probe::Reject(message) => Err(PaymentError::provider(wallet, message.clone())),
            Probe::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl ApplePayCapability for Probe {
    async fn can_make_payments(&self) -> PaymentResult<bool> {
        self.run(WalletKind::ApplePay).await
    }
}

/// Gateway that records dispatches and never delivers
#[derive(Default)]
pub struct RecordingGateway {
    pub dispatched: Mutex<Vec<(WalletKind, WalletConfiguration, PaymentResponder)>>,
}

impl PaymentGateway for RecordingGateway {
    fn execute(&self, wallet: WalletKind, configuration: WalletConfiguration, responder: PaymentResponder) {
        self.dispatched
            .lock()
            .unwrap()
            .push((wallet, configuration, responder));
    }
}

enum ScriptBehavior {
    Load,
    FailOnce(String),
    Hang,
}

/// Script loader counting its loads
pub struct MockScriptLoader {
    behavior: ScriptBehavior,
    count: AtomicUsize,
    pub sources: Mutex<Vec<String>>,
}

impl Default for MockScriptLoader {
    fn default() -> Self {
        Self::with_behavior(ScriptBehavior::Load)
    }
}

impl MockScriptLoader {
    fn with_behavior(behavior: ScriptBehavior) -> Self {
        Self {
            behavior,
            count: AtomicUsize::new(0),
            sources: Mutex::new(Vec::new()),
        }
    }

    /// First load fails, later loads succeed
    pub fn failing_once(message: &str) -> Self {
        Self::with_behavior(ScriptBehavior::FailOnce(message.to_string()))
    }

    pub fn hanging() -> Self {
        Self::with_behavior(ScriptBehavior::Hang)
    }

    pub fn loads(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptLoader for MockScriptLoader {
    async fn load_script(&self, src: &str) -> PaymentResult<()> {
        let previous = self.count.fetch_add(1, Ordering::SeqCst);
        self.sources.lock().unwrap().push(src.to_string());

        match &self.behavior {
            ScriptBehavior::Load => Ok(()),
            ScriptBehavior::FailOnce(message) if previous == 0 => {
                Err(PaymentError::ScriptLoad(message.clone()))
            }
            ScriptBehavior::FailOnce(_) => Ok(()),
            ScriptBehavior::Hang => std::future::pending().await,
        }
    }
}

/// Scripted payment sheet
pub enum Sheet {
    Pay(PaymentData),
    Reject(String),
    Hang,
    Manual(Mutex<Option<oneshot::Receiver<PaymentResult<PaymentData>>>>),
}

impl Sheet {
    /// Sheet resolved by the test through the paired sender
    pub fn manual(receiver: oneshot::Receiver<PaymentResult<PaymentData>>) -> Self {
        Sheet::Manual(Mutex::new(Some(receiver)))
    }
}

/// Payments client with scripted readiness and sheet
pub struct MockClient {
    ready: Probe,
    sheet: Sheet,
    pub buttons: Mutex<Vec<GoogleButtonOptions>>,
    pub requests: Mutex<Vec<PaymentDataRequest>>,
}

impl MockClient {
    pub fn new(ready: Probe, sheet: Sheet) -> Self {
        Self {
            ready,
            sheet,
            buttons: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaymentsClient for MockClient {
    async fn is_ready_to_pay(&self, _request: &IsReadyToPayRequest) -> PaymentResult<IsReadyToPayResponse> {
        let result = self.ready.run(WalletKind::GooglePay).await?;
        Ok(IsReadyToPayResponse { result })
    }

    fn create_button(&self, options: &GoogleButtonOptions) -> serde_json::Value {
        self.buttons.lock().unwrap().push(options.clone());
        json!({"tag": "div", "class": "gpay-card-info-container"})
    }

    async fn load_payment_data(&self, request: &PaymentDataRequest) -> PaymentResult<PaymentData> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.sheet {
            Sheet::Pay(data) => Ok(data.clone()),
            Sheet::Reject(message) => Err(PaymentError::provider(WalletKind::GooglePay, message.clone())),
            Sheet::Hang => std::future::pending().await,
            Sheet::Manual(receiver) => {
                let receiver = receiver.lock().unwrap().take().expect("sheet opened twice");
                receiver
                    .await
                    .unwrap_or_else(|_| Err(PaymentError::provider(WalletKind::GooglePay, "sheet closed")))
            }
        }
    }
}

/// Factory handing out one shared client and recording what it was built with
pub struct MockClientFactory {
    client: Arc<MockClient>,
    pub settings: Mutex<Vec<ClientSettings>>,
    callbacks: Mutex<Vec<PaymentDataCallbacks>>,
}

impl MockClientFactory {
    pub fn new(client: Arc<MockClient>) -> Self {
        Self {
            client,
            settings: Mutex::new(Vec::new()),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Callbacks registered with the most recent client
    pub fn last_callbacks(&self) -> PaymentDataCallbacks {
        self.callbacks
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no client created")
    }
}

impl PaymentsClientFactory for MockClientFactory {
    fn create_client(&self, options: PaymentsClientOptions) -> PaymentResult<Arc<dyn PaymentsClient>> {
        self.settings.lock().unwrap().push(options.settings);
        self.callbacks.lock().unwrap().push(options.callbacks);
        Ok(self.client.clone() as Arc<dyn PaymentsClient>)
    }
}
