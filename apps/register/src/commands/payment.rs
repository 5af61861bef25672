//! # Payment Commands
//!
//! Payment screen: method selection, card masks, cash change, PIX payload
//! and the asynchronous approval.
//!
//! ## Screen Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  "Finalizar Pedido" ──► begin_checkout()        EMPTY_CART if no lines  │
//! │  Method tabs ─────────► select_payment_method()                         │
//! │  Card inputs ─────────► format_card_input()     masks every keystroke   │
//! │  "Valor recebido" ────► preview_change()        live "Troco"            │
//! │  "Confirmar" ─────────► submit_payment()        PaymentTicket           │
//! │  "Cancelar" ──────────► cancel_payment()                                │
//! │  "Voltar" ────────────► leave_payment()         checkout + cart dropped │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use adega_core::payment::{self, CardDetails};
use adega_core::{Money, PaymentDetails, PaymentMethod};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::processor::{PaymentProcessor, PaymentTicket};
use crate::state::{CartState, ConfigState, PaymentState, PaymentView, SessionState};

/// Freezes the cart and opens the Payment screen.
pub fn begin_checkout(
    session: &SessionState,
    cart: &CartState,
    payment: &PaymentState,
) -> Result<PaymentView, ApiError> {
    session.require()?;

    let snapshot = cart.with_cart(|c| c.checkout())?;
    info!(items = snapshot.item_count, total = %snapshot.total, "Checkout started");
    payment.begin(snapshot)
}

pub fn select_payment_method(
    session: &SessionState,
    payment: &PaymentState,
    method: PaymentMethod,
) -> Result<PaymentView, ApiError> {
    session.require()?;
    debug!(%method, "select_payment_method command");
    payment.select_method(method)
}

/// Applies the card form masks to raw keystrokes.
pub fn format_card_input(number: &str, holder_name: &str, expiry: &str, cvv: &str) -> CardDetails {
    CardDetails::from_raw(number, holder_name, expiry, cvv)
}

/// Change to show while the cash amount is typed; never negative.
pub fn preview_change(
    session: &SessionState,
    payment: &PaymentState,
    received: &str,
) -> Result<Money, ApiError> {
    session.require()?;
    let total = payment.total().ok_or_else(ApiError::no_checkout)?;
    Ok(payment::preview_change(total, Money::parse_lenient(received)))
}

/// "Copia e cola" text under the PIX QR placeholder.
pub fn pix_payload(session: &SessionState, config: &ConfigState) -> Result<String, ApiError> {
    session.require()?;
    Ok(config.get().payment.pix_payload.clone())
}

/// Validates the form and starts the simulated approval.
///
/// On a validation error the form stays open for correction. The returned
/// ticket resolves exactly once, to a receipt or to a cancellation.
pub fn submit_payment(
    session: &SessionState,
    processor: &PaymentProcessor,
    payment: &PaymentState,
    cart: &CartState,
    details: &PaymentDetails,
) -> Result<PaymentTicket, ApiError> {
    session.require()?;
    debug!(method = %details.method(), "submit_payment command");
    processor.submit(payment, cart, details)
}

/// Returns whether a payment was in flight.
pub fn cancel_payment(session: &SessionState, payment: &PaymentState) -> Result<bool, ApiError> {
    session.require()?;
    debug!("cancel_payment command");
    Ok(payment.cancel_pending())
}

pub fn payment_status(session: &SessionState, payment: &PaymentState) -> Result<PaymentView, ApiError> {
    session.require()?;
    payment.view().ok_or_else(ApiError::no_checkout)
}

/// Leaves the Payment screen. The checkout and the order behind it are
/// discarded; nothing is kept for later.
pub fn leave_payment(
    session: &SessionState,
    payment: &PaymentState,
    cart: &CartState,
) -> Result<(), ApiError> {
    session.require()?;
    debug!("leave_payment command");
    payment.abandon();
    cart.reset();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::processor::PaymentOutcome;
    use adega_core::{Cpf, PaymentStage, Product};
    use std::time::Duration;

    fn setup() -> (SessionState, CartState, PaymentState) {
        let session = SessionState::in_memory();
        session.start(Cpf::parse("12345678909").unwrap());

        let cart = CartState::new();
        let brut = Product::new(3, "Espumante Brut", "Espumantes", Money::from_cents(12500));
        cart.with_cart_mut(|c| c.add_item(&brut));
        (session, cart, PaymentState::new())
    }

    #[test]
    fn test_empty_cart_cannot_checkout() {
        let (session, _, payment) = setup();
        let err = begin_checkout(&session, &CartState::new(), &payment).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }

    #[test]
    fn test_preview_change() {
        let (session, cart, payment) = setup();
        assert!(preview_change(&session, &payment, "10").is_err());

        begin_checkout(&session, &cart, &payment).unwrap();
        assert_eq!(preview_change(&session, &payment, "150").unwrap().cents(), 2500);
        assert_eq!(preview_change(&session, &payment, "100").unwrap(), Money::zero());
        assert_eq!(preview_change(&session, &payment, "abc").unwrap(), Money::zero());
    }

    #[test]
    fn test_card_masks() {
        let card = format_card_input("4111111111111111", "ana souza", "0930", "12x3");
        assert_eq!(card.number, "4111 1111 1111 1111");
        assert_eq!(card.holder_name, "ANA SOUZA");
        assert_eq!(card.expiry, "09/30");
        assert_eq!(card.cvv, "123");
    }

    #[test]
    fn test_pix_payload_from_config() {
        let mut config = crate::state::RegisterConfig::default();
        config.payment.pix_payload = "PIX-TESTE".to_string();
        let (session, _, _) = setup();
        let config = ConfigState::new(config);
        assert_eq!(pix_payload(&session, &config).unwrap(), "PIX-TESTE");
    }

    #[tokio::test(start_paused = true)]
    async fn test_card_payment_end_to_end() {
        let (session, cart, payment) = setup();
        let processor = PaymentProcessor::new(Duration::from_secs(2));

        begin_checkout(&session, &cart, &payment).unwrap();
        select_payment_method(&session, &payment, PaymentMethod::Card).unwrap();

        let incomplete = PaymentDetails::Card(format_card_input("4111", "", "12", "1"));
        let err = submit_payment(&session, &processor, &payment, &cart, &incomplete).unwrap_err();
        assert_eq!(err.message, "Preencha todos os dados do cartão");
        assert!(matches!(
            payment_status(&session, &payment).unwrap().stage,
            PaymentStage::AwaitingDetails { .. }
        ));

        let card = PaymentDetails::Card(format_card_input("4111111111111111", "Ana", "1230", "123"));
        let ticket = submit_payment(&session, &processor, &payment, &cart, &card).unwrap();
        let outcome = ticket.wait().await;

        let receipt = outcome.receipt().unwrap();
        assert_eq!(receipt.method.label(), "Cartão de Crédito");
        assert_eq!(receipt.total.cents(), 12500);
        assert!(cart.view().lines.is_empty());
        assert_eq!(payment_status(&session, &payment).unwrap().receipt.as_ref(), Some(receipt));
    }

    #[tokio::test(start_paused = true)]
    async fn test_leave_payment_cancels_in_flight() {
        let (session, cart, payment) = setup();
        let processor = PaymentProcessor::new(Duration::from_secs(2));

        begin_checkout(&session, &cart, &payment).unwrap();
        select_payment_method(&session, &payment, PaymentMethod::Pix).unwrap();
        let ticket = submit_payment(&session, &processor, &payment, &cart, &PaymentDetails::Pix).unwrap();

        leave_payment(&session, &payment, &cart).unwrap();
        assert_eq!(ticket.wait().await, PaymentOutcome::Cancelled);
        assert!(payment_status(&session, &payment).is_err());
        assert!(!cancel_payment(&session, &payment).unwrap());
        assert_eq!(cart.view().item_count, 0);
    }

    #[test]
    fn test_payment_commands_need_login() {
        let (session, cart, payment) = setup();
        let processor = PaymentProcessor::new(Duration::from_secs(2));
        begin_checkout(&session, &cart, &payment).unwrap();
        session.end();

        let denied = |r: Result<PaymentView, ApiError>| r.unwrap_err().code;
        assert_eq!(
            denied(select_payment_method(&session, &payment, PaymentMethod::Pix)),
            ErrorCode::Unauthenticated
        );
        assert_eq!(denied(payment_status(&session, &payment)), ErrorCode::Unauthenticated);
        assert!(preview_change(&session, &payment, "200").is_err());
        assert!(cancel_payment(&session, &payment).is_err());
        assert!(leave_payment(&session, &payment, &cart).is_err());
        assert!(pix_payload(&session, &ConfigState::default()).is_err());

        let err = submit_payment(&session, &processor, &payment, &cart, &PaymentDetails::Pix)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthenticated);
        assert!(!payment.is_processing());
        assert_eq!(cart.view().item_count, 1);
    }
}
