//! # Payment State
//!
//! Holds the checkout currently on the Payment screen and the cancel switch
//! of its processing task.
//!
//! ## Arming
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit_armed(details, id, cancel_tx)                                   │
//! │     flow: AwaitingDetails ──► Processing     attempt: Some(id)          │
//! │                                              cancel:  Some(tx) (armed)  │
//! │                                                                         │
//! │  cancel_pending()   takes tx, sends ──► task runs abort(id)             │
//! │  finish(id)         completes only if still armed                       │
//! │                                                                         │
//! │  Whoever takes `tx` first decides the outcome, so a late cancel and a   │
//! │  timer firing at the same instant still resolve exactly once.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `finish` and `abort` ignore calls whose id is not the current attempt: a
//! task left over from an abandoned checkout never touches the next one.

use std::sync::{Arc, Mutex, PoisonError};

use adega_core::cart::CheckoutSnapshot;
use adega_core::{Money, PaymentDetails, PaymentFlow, PaymentMethod, PaymentStage, Receipt};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::ApiError;

/// What the Payment screen renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    pub stage: PaymentStage,
    pub total: Money,
    pub item_count: u32,
    pub receipt: Option<Receipt>,
}

impl From<&PaymentFlow> for PaymentView {
    fn from(flow: &PaymentFlow) -> Self {
        PaymentView {
            stage: flow.stage(),
            total: flow.total(),
            item_count: flow.snapshot().item_count,
            receipt: flow.receipt().cloned(),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    flow: Option<PaymentFlow>,
    /// Payment id of the task currently processing `flow`.
    attempt: Option<String>,
    cancel: Option<oneshot::Sender<()>>,
}

impl Inner {
    fn owns(&self, payment_id: &str) -> bool {
        self.attempt.as_deref() == Some(payment_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaymentState {
    inner: Arc<Mutex<Inner>>,
}

impl PaymentState {
    pub fn new() -> Self {
        PaymentState::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a checkout for the snapshot, replacing a finished or idle one.
    pub fn begin(&self, snapshot: CheckoutSnapshot) -> Result<PaymentView, ApiError> {
        let mut inner = self.lock();
        if inner.flow.as_ref().is_some_and(PaymentFlow::is_processing) {
            return Err(ApiError::payment_in_progress());
        }

        let flow = PaymentFlow::new(snapshot);
        let view = PaymentView::from(&flow);
        inner.flow = Some(flow);
        inner.attempt = None;
        inner.cancel = None;
        Ok(view)
    }

    pub fn select_method(&self, method: PaymentMethod) -> Result<PaymentView, ApiError> {
        let mut inner = self.lock();
        let flow = inner.flow.as_mut().ok_or_else(ApiError::no_checkout)?;
        if flow.is_processing() {
            return Err(ApiError::payment_in_progress());
        }

        flow.select_method(method)?;
        Ok(PaymentView::from(&*flow))
    }

    /// Submits the details and, on success, records `payment_id` as the
    /// current attempt and arms its cancel switch in the same critical
    /// section.
    pub fn submit_armed(
        &self,
        details: &PaymentDetails,
        payment_id: &str,
        cancel: oneshot::Sender<()>,
    ) -> Result<PaymentView, ApiError> {
        let mut inner = self.lock();
        let flow = inner.flow.as_mut().ok_or_else(ApiError::no_checkout)?;
        if flow.is_processing() {
            return Err(ApiError::payment_in_progress());
        }

        flow.submit(details)?;
        let view = PaymentView::from(&*flow);
        inner.attempt = Some(payment_id.to_string());
        inner.cancel = Some(cancel);
        Ok(view)
    }

    /// Signals the processing task to stop. Returns whether a payment was
    /// actually in flight.
    pub fn cancel_pending(&self) -> bool {
        match self.lock().cancel.take() {
            Some(tx) => {
                debug!("Cancelling payment in flight");
                // the task may have just resolved; nothing to do then
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    /// Completes the flow if `payment_id` is the current attempt and it is
    /// still armed. A disarmed attempt goes back to the details form.
    pub(crate) fn finish(
        &self,
        payment_id: &str,
        receipt_id: String,
        completed_at: DateTime<Utc>,
    ) -> Option<Receipt> {
        let mut inner = self.lock();
        if !inner.owns(payment_id) {
            debug!(%payment_id, "Stale payment task finished; ignoring");
            return None;
        }

        inner.attempt = None;
        let armed = inner.cancel.take().is_some();
        let flow = inner.flow.as_mut()?;

        if !armed {
            let _ = flow.cancel();
            return None;
        }

        match flow.complete(receipt_id, completed_at) {
            Ok(receipt) => Some(receipt),
            Err(e) => {
                warn!(error = %e, "Payment finished in an unexpected stage");
                None
            }
        }
    }

    /// Returns a cancelled attempt to the details form.
    pub(crate) fn abort(&self, payment_id: &str) {
        let mut inner = self.lock();
        if !inner.owns(payment_id) {
            return;
        }

        inner.attempt = None;
        inner.cancel = None;
        if let Some(flow) = inner.flow.as_mut().filter(|f| f.is_processing()) {
            let _ = flow.cancel();
        }
    }

    /// Leaves the Payment screen: any task in flight is cancelled and the
    /// checkout is dropped without a trace.
    pub fn abandon(&self) {
        let mut inner = self.lock();
        if let Some(tx) = inner.cancel.take() {
            let _ = tx.send(());
        }
        inner.attempt = None;
        inner.flow = None;
    }

    pub fn view(&self) -> Option<PaymentView> {
        self.lock().flow.as_ref().map(PaymentView::from)
    }

    pub fn total(&self) -> Option<Money> {
        self.lock().flow.as_ref().map(PaymentFlow::total)
    }

    pub fn is_processing(&self) -> bool {
        self.lock()
            .flow
            .as_ref()
            .is_some_and(PaymentFlow::is_processing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adega_core::{Cart, Product};

    fn snapshot() -> CheckoutSnapshot {
        let mut cart = Cart::new();
        cart.add_item(&Product::new(2, "Vinho Branco Seco", "Vinhos Brancos", Money::from_cents(6500)));
        cart.checkout().unwrap()
    }

    fn processing_state() -> (PaymentState, oneshot::Receiver<()>) {
        let state = PaymentState::new();
        state.begin(snapshot()).unwrap();
        state.select_method(PaymentMethod::Pix).unwrap();

        let (tx, rx) = oneshot::channel();
        state.submit_armed(&PaymentDetails::Pix, "pay-1", tx).unwrap();
        (state, rx)
    }

    #[test]
    fn test_actions_need_a_checkout() {
        let state = PaymentState::new();
        assert!(state.view().is_none());
        assert!(state.select_method(PaymentMethod::Cash).is_err());
    }

    #[test]
    fn test_resubmission_rejected_while_processing() {
        let (state, _rx) = processing_state();
        let (tx, _) = oneshot::channel();

        let err = state.submit_armed(&PaymentDetails::Pix, "pay-2", tx).unwrap_err();
        assert_eq!(err, ApiError::payment_in_progress());
        assert!(state.begin(snapshot()).is_err());
    }

    #[test]
    fn test_finish_completes_armed_flow() {
        let (state, _rx) = processing_state();

        let receipt = state.finish("pay-1", "r-1".to_string(), Utc::now()).unwrap();
        assert_eq!(receipt.total.cents(), 6500);
        assert!(matches!(
            state.view().map(|v| v.stage),
            Some(PaymentStage::Completed { .. })
        ));
    }

    #[test]
    fn test_cancel_beats_late_finish() {
        let (state, mut rx) = processing_state();

        assert!(state.cancel_pending());
        assert!(!state.cancel_pending());
        assert!(rx.try_recv().is_ok());

        assert!(state.finish("pay-1", "late".to_string(), Utc::now()).is_none());
        assert_eq!(
            state.view().map(|v| v.stage),
            Some(PaymentStage::AwaitingDetails {
                method: PaymentMethod::Pix
            })
        );
    }

    #[test]
    fn test_abandon_drops_flow() {
        let (state, mut rx) = processing_state();
        state.abandon();

        assert!(rx.try_recv().is_ok());
        assert!(state.view().is_none());
        assert!(!state.is_processing());
    }

    #[test]
    fn test_leftover_task_cannot_touch_next_attempt() {
        let (state, _old_rx) = processing_state();
        state.abandon();

        state.begin(snapshot()).unwrap();
        state.select_method(PaymentMethod::Pix).unwrap();
        let (tx, _rx) = oneshot::channel();
        state.submit_armed(&PaymentDetails::Pix, "pay-2", tx).unwrap();

        state.abort("pay-1");
        assert!(state.finish("pay-1", "stale".to_string(), Utc::now()).is_none());
        assert!(state.is_processing());

        let receipt = state.finish("pay-2", "r-2".to_string(), Utc::now()).unwrap();
        assert_eq!(receipt.id, "r-2");
    }
}
