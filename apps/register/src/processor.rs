//! # Payment Processor
//!
//! Runs the simulated gateway call as a background task.
//!
//! ## Task Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  submit() ──► PaymentState armed ──► tokio::spawn ──┐                   │
//! │     │                                               ▼                   │
//! │     │                                   select! {                       │
//! │     │                                     sleep(delay)  ─► finish(id)   │
//! │     │                                     cancel_rx     ─► abort(id)    │
//! │     │                                   }                               │
//! │     │                                               │                   │
//! │     ▼                                               ▼                   │
//! │  PaymentTicket ◄──────── done_rx ◄──── PaymentOutcome (exactly once)    │
//! │     ├── wait().await                                │                   │
//! │     └── cancel()                                    ▼                   │
//! │                                          emitter.emit_resolved()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Approval is deterministic: there is no gateway, so a payment that is not
//! cancelled is always approved once the delay elapses. An approval takes the
//! paid lines off the cart; anything added while processing stays there.

use std::sync::Arc;
use std::time::Duration;

use adega_core::{PaymentDetails, Receipt};
use chrono::Utc;
use tokio::sync::oneshot;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::{CartState, PaymentState, RegisterConfig};

/// How a payment resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// "Pagamento Aprovado!"
    Approved(Receipt),
    /// Cancelled by the operator or by leaving the screen.
    Cancelled,
}

impl PaymentOutcome {
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            PaymentOutcome::Approved(receipt) => Some(receipt),
            PaymentOutcome::Cancelled => None,
        }
    }
}

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Receives the single resolution event of each payment (implemented by the
/// UI integration to show the success toast or re-enable the form).
pub trait PaymentEventEmitter: Send + Sync {
    fn emit_resolved(&self, payment_id: &str, outcome: &PaymentOutcome);
}

/// No-op event emitter.
pub struct NoOpEmitter;

impl PaymentEventEmitter for NoOpEmitter {
    fn emit_resolved(&self, _payment_id: &str, _outcome: &PaymentOutcome) {}
}

// =============================================================================
// Processor
// =============================================================================

#[derive(Clone)]
pub struct PaymentProcessor {
    delay: Duration,
    emitter: Arc<dyn PaymentEventEmitter>,
}

impl PaymentProcessor {
    pub fn new(delay: Duration) -> Self {
        Self::with_emitter(delay, Arc::new(NoOpEmitter))
    }

    pub fn with_emitter(delay: Duration, emitter: Arc<dyn PaymentEventEmitter>) -> Self {
        PaymentProcessor { delay, emitter }
    }

    pub fn from_config(config: &RegisterConfig) -> Self {
        Self::new(config.processing_delay())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Validates the details and starts processing.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// ## Errors
    /// Validation failures leave the flow awaiting details; a second submit
    /// while one is in flight gets `PAYMENT_IN_PROGRESS`.
    pub fn submit(
        &self,
        payment: &PaymentState,
        cart: &CartState,
        details: &PaymentDetails,
    ) -> Result<PaymentTicket, ApiError> {
        let payment_id = Uuid::new_v4().to_string();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        payment.submit_armed(details, &payment_id, cancel_tx)?;

        info!(%payment_id, method = %details.method(), "Processing payment");

        let (done_tx, done_rx) = oneshot::channel();
        let task_payment = payment.clone();
        let task_cart = cart.clone();
        let task_id = payment_id.clone();
        let delay = self.delay;
        let emitter = Arc::clone(&self.emitter);

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    match task_payment.finish(&task_id, Uuid::new_v4().to_string(), Utc::now()) {
                        Some(receipt) => {
                            task_cart.with_cart_mut(|c| c.settle(&receipt.lines));
                            PaymentOutcome::Approved(receipt)
                        }
                        None => PaymentOutcome::Cancelled,
                    }
                }
                _ = cancel_rx => {
                    task_payment.abort(&task_id);
                    PaymentOutcome::Cancelled
                }
            };

            match &outcome {
                PaymentOutcome::Approved(receipt) => info!(
                    payment_id = %task_id,
                    receipt_id = %receipt.id,
                    total = %receipt.total,
                    "Payment approved"
                ),
                PaymentOutcome::Cancelled => info!(payment_id = %task_id, "Payment cancelled"),
            }

            emitter.emit_resolved(&task_id, &outcome);
            if done_tx.send(outcome).is_err() {
                debug!(payment_id = %task_id, "Ticket dropped before resolution");
            }
        });

        Ok(PaymentTicket {
            id: payment_id,
            payment: payment.clone(),
            done: done_rx,
        })
    }
}

// =============================================================================
// Ticket
// =============================================================================

/// Handle to one payment in flight.
///
/// Dropping the ticket does not cancel the payment.
#[derive(Debug)]
pub struct PaymentTicket {
    id: String,
    payment: PaymentState,
    done: oneshot::Receiver<PaymentOutcome>,
}

impl PaymentTicket {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Requests cancellation. Returns `false` if the payment already
    /// resolved.
    pub fn cancel(&self) -> bool {
        self.payment.cancel_pending()
    }

    /// Waits for the resolution event.
    pub async fn wait(self) -> PaymentOutcome {
        // the task only drops `done_tx` unsent if it panicked
        self.done.await.unwrap_or(PaymentOutcome::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adega_core::{Money, PaymentMethod, PaymentStage, Product};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEmitter {
        events: Mutex<Vec<(String, PaymentOutcome)>>,
    }

    impl PaymentEventEmitter for RecordingEmitter {
        fn emit_resolved(&self, payment_id: &str, outcome: &PaymentOutcome) {
            self.events
                .lock()
                .unwrap()
                .push((payment_id.to_string(), outcome.clone()));
        }
    }

    fn checkout(method: PaymentMethod) -> (PaymentState, CartState) {
        let cart = CartState::new();
        let vodka = Product::new(5, "Vodka Premium", "Destilados", Money::from_cents(9500));
        cart.with_cart_mut(|c| c.add_item(&vodka));

        let payment = PaymentState::new();
        payment.begin(cart.with_cart(|c| c.checkout()).unwrap()).unwrap();
        payment.select_method(method).unwrap();
        (payment, cart)
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_approved_after_delay() {
        let emitter = Arc::new(RecordingEmitter::default());
        let processor = PaymentProcessor::with_emitter(Duration::from_secs(2), emitter.clone());
        let (payment, cart) = checkout(PaymentMethod::Cash);

        let ticket = processor
            .submit(&payment, &cart, &PaymentDetails::cash_from_text("100"))
            .unwrap();
        let id = ticket.id().to_string();
        assert!(payment.is_processing());

        let outcome = ticket.wait().await;
        let receipt = outcome.receipt().unwrap();
        assert_eq!(receipt.change.cents(), 500);
        assert!(cart.with_cart(|c| c.is_empty()));

        let events = emitter.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_returns_to_details() {
        let emitter = Arc::new(RecordingEmitter::default());
        let processor = PaymentProcessor::with_emitter(Duration::from_secs(2), emitter.clone());
        let (payment, cart) = checkout(PaymentMethod::Pix);

        let ticket = processor.submit(&payment, &cart, &PaymentDetails::Pix).unwrap();
        assert!(ticket.cancel());
        assert!(!ticket.cancel());

        assert_eq!(ticket.wait().await, PaymentOutcome::Cancelled);
        assert_eq!(
            payment.view().map(|v| v.stage),
            Some(PaymentStage::AwaitingDetails {
                method: PaymentMethod::Pix
            })
        );
        assert_eq!(cart.with_cart(|c| c.len()), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(emitter.events.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubmit_while_processing_is_rejected() {
        let processor = PaymentProcessor::new(Duration::from_secs(2));
        let (payment, cart) = checkout(PaymentMethod::Pix);

        let ticket = processor.submit(&payment, &cart, &PaymentDetails::Pix).unwrap();
        let err = processor
            .submit(&payment, &cart, &PaymentDetails::Pix)
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::PaymentInProgress);

        assert!(matches!(ticket.wait().await, PaymentOutcome::Approved(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_details_never_spawn() {
        let emitter = Arc::new(RecordingEmitter::default());
        let processor = PaymentProcessor::with_emitter(Duration::from_millis(10), emitter.clone());
        let (payment, cart) = checkout(PaymentMethod::Cash);

        let err = processor
            .submit(&payment, &cart, &PaymentDetails::cash_from_text("50"))
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InsufficientPayment);
        assert!(!payment.is_processing());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(emitter.events.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_payment_does_not_cancel_next_sale() {
        let emitter = Arc::new(RecordingEmitter::default());
        let processor = PaymentProcessor::with_emitter(Duration::from_secs(2), emitter.clone());
        let (payment, cart) = checkout(PaymentMethod::Pix);

        let first = processor.submit(&payment, &cart, &PaymentDetails::Pix).unwrap();
        payment.abandon();
        cart.reset();

        let wine = Product::new(1, "Vinho Tinto Reserva", "Vinhos Tintos", Money::from_cents(8990));
        cart.with_cart_mut(|c| c.add_item(&wine));
        payment.begin(cart.with_cart(|c| c.checkout()).unwrap()).unwrap();
        payment.select_method(PaymentMethod::Pix).unwrap();
        let second = processor.submit(&payment, &cart, &PaymentDetails::Pix).unwrap();

        assert_eq!(first.wait().await, PaymentOutcome::Cancelled);
        let receipt = second.wait().await.receipt().cloned().unwrap();
        assert_eq!(receipt.total.cents(), 8990);
        assert!(matches!(
            payment.view().map(|v| v.stage),
            Some(PaymentStage::Completed { .. })
        ));
        assert_eq!(emitter.events.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_approval_keeps_items_added_while_processing() {
        let processor = PaymentProcessor::new(Duration::from_secs(2));
        let (payment, cart) = checkout(PaymentMethod::Pix);

        let ticket = processor.submit(&payment, &cart, &PaymentDetails::Pix).unwrap();
        let ipa = Product::new(6, "Cerveja Artesanal IPA", "Cervejas", Money::from_cents(1850));
        cart.with_cart_mut(|c| c.add_item(&ipa));

        let receipt = ticket.wait().await.receipt().cloned().unwrap();
        assert_eq!(receipt.item_count(), 1);
        assert_eq!(cart.with_cart(|c| c.line(6).map(|l| l.quantity)), Some(1));
        assert!(cart.with_cart(|c| c.line(5).is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_approval_is_noop() {
        let processor = PaymentProcessor::new(Duration::from_millis(100));
        let (payment, cart) = checkout(PaymentMethod::Pix);

        let ticket = processor.submit(&payment, &cart, &PaymentDetails::Pix).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(!ticket.cancel());
        assert!(matches!(ticket.wait().await, PaymentOutcome::Approved(_)));
    }
}
