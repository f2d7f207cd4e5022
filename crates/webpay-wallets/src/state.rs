//! # Handshake State
//!
//! The configuration shared between the orchestrator and its handshakes, the
//! stage each handshake is in, and the guard every suspension point runs under.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use webpay_core::{PaymentError, PaymentResult, WalletConfiguration};

/// Configuration owned by `WebPayments` and read by handshakes.
///
/// Handshakes take a snapshot per button creation or per click and never
/// hold the lock across an await.
#[derive(Debug, Clone, Default)]
pub struct SharedConfiguration {
    inner: Arc<RwLock<WalletConfiguration>>,
}

impl SharedConfiguration {
    pub fn new(configuration: WalletConfiguration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(configuration)),
        }
    }

    /// Copy of the current configuration
    pub fn snapshot(&self) -> WalletConfiguration {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read without copying
    pub fn read<T>(&self, f: impl FnOnce(&WalletConfiguration) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Apply a setter
    pub fn update(&self, f: impl FnOnce(&mut WalletConfiguration)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }
}

/// What an open payment sheet is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetActivity {
    Waiting,
    Authorizing,
    RecalculatingShipping,
}

/// Stage of a handshake.
///
/// Apple Pay: `Idle → Probing → Ready | Unavailable`, then `Dispatched` once
/// the gateway owns the attempt.
/// Google Pay: `Idle → ScriptLoading → ClientConfigured → Probing →
/// Ready | Unavailable`, then `SheetOpen → Resolved | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStage {
    Idle,
    ScriptLoading,
    ClientConfigured,
    Probing,
    Ready,
    Unavailable,
    Dispatched,
    SheetOpen(SheetActivity),
    Resolved,
    Failed,
}

impl HandshakeStage {
    /// Check if the response has been delivered
    pub fn is_terminal(&self) -> bool {
        matches!(self, HandshakeStage::Resolved | HandshakeStage::Failed)
    }
}

/// Shared, observable stage of one handshake
#[derive(Debug, Clone)]
pub struct StageTracker {
    stage: Arc<Mutex<HandshakeStage>>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self {
            stage: Arc::new(Mutex::new(HandshakeStage::Idle)),
        }
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> HandshakeStage {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, stage: HandshakeStage) {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner) = stage;
    }

    /// Move `Ready → next` for a click.
    ///
    /// Fails with `AttemptSettled` after a terminal stage and with
    /// `AttemptInProgress` while an attempt is already running.
    pub fn begin_attempt(&self, next: HandshakeStage) -> PaymentResult<()> {
        let mut stage = self.stage.lock().unwrap_or_else(PoisonError::into_inner);
        match *stage {
            HandshakeStage::Ready => {
                *stage = next;
                Ok(())
            }
            current if current.is_terminal() => Err(PaymentError::AttemptSettled),
            HandshakeStage::Dispatched | HandshakeStage::SheetOpen(_) => {
                Err(PaymentError::AttemptInProgress)
            }
            current => Err(PaymentError::InvalidRequest(format!(
                "Button is not ready (stage {:?})",
                current
            ))),
        }
    }

    /// Switch the open sheet's activity; returns false once the attempt is over
    pub fn sheet_activity(&self, activity: SheetActivity) -> bool {
        let mut stage = self.stage.lock().unwrap_or_else(PoisonError::into_inner);
        match *stage {
            HandshakeStage::SheetOpen(_) => {
                *stage = HandshakeStage::SheetOpen(activity);
                true
            }
            _ => false,
        }
    }
}

/// Runs of one handshake.
///
/// Each `create_button` starts a run with its own `StageTracker`, so buttons
/// rendered earlier keep their stage. `cancel` fires the token every live run
/// holds and re-arms a fresh one for the runs that follow.
#[derive(Debug, Default)]
pub struct HandshakeRuns {
    latest: Mutex<StageTracker>,
    cancel: Mutex<CancellationToken>,
}

impl HandshakeRuns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run: a fresh stage plus the current cancellation token
    pub fn start(&self) -> (StageTracker, CancellationToken) {
        let stage = StageTracker::new();
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = stage.clone();
        let cancel = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        (stage, cancel)
    }

    /// Stage of the most recent run
    pub fn stage(&self) -> HandshakeStage {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get()
    }

    /// Abandon every live run
    pub fn cancel(&self) {
        let fired = std::mem::take(&mut *self.cancel.lock().unwrap_or_else(PoisonError::into_inner));
        fired.cancel();
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Run one suspension point under an optional deadline and a cancellation token
pub(crate) async fn run_stage<F>(
    stage: &str,
    deadline: Option<Duration>,
    cancel: &CancellationToken,
    future: F,
) -> PaymentResult<F::Output>
where
    F: Future,
{
    let guarded = async {
        match deadline {
            Some(deadline) => tokio::time::timeout(deadline, future).await.map_err(|_| {
                PaymentError::TimedOut {
                    stage: stage.to_string(),
                    after_ms: saturating_millis(deadline),
                }
            }),
            None => Ok(future.await),
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PaymentError::Cancelled { stage: stage.to_string() }),
        output = guarded => output,
    }
}
