//! # Auth Commands
//!
//! Login screen and session lifecycle.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CPF field keystroke ──► format_cpf_input()   "1234567" → "123.456.7"  │
//! │  "Entrar" ─────────────► login()              Session or toast          │
//! │  App start ────────────► restore_session()    skip login if stored     │
//! │  "Sair" ───────────────► logout()             cart + payment dropped   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use adega_core::cpf;
use adega_core::validation::validate_password;
use adega_core::Cpf;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{CartState, ConfigState, PaymentState, Session, SessionState};

/// Masks the CPF field as the operator types.
pub fn format_cpf_input(raw: &str) -> String {
    cpf::format(raw)
}

/// Validates the login form and opens a session.
///
/// ## Checks (in order)
/// 1. CPF check digits → `INVALID_IDENTIFIER`
/// 2. Password length → `VALIDATION_ERROR`
///
/// The password is not stored or compared against anything.
pub fn login(
    session: &SessionState,
    config: &ConfigState,
    cpf_input: &str,
    password: &str,
) -> Result<Session, ApiError> {
    let cpf = Cpf::parse(cpf_input).map_err(|e| {
        warn!("Login rejected: invalid CPF");
        ApiError::from(e)
    })?;

    validate_password(password, config.get().auth.min_password_length).map_err(|e| {
        warn!(cpf = %cpf.masked(), "Login rejected: password too short");
        ApiError::from(e)
    })?;

    let started = session.start(cpf);
    info!(cpf = %started.cpf.masked(), "Login succeeded");
    Ok(started)
}

pub fn restore_session(session: &SessionState) -> Option<Session> {
    session.restore()
}

pub fn current_operator(session: &SessionState) -> Result<Session, ApiError> {
    session.require()
}

/// Ends the session. The order and any payment in flight belong to the
/// operator leaving, so both are discarded before the next login.
pub fn logout(session: &SessionState, payment: &PaymentState, cart: &CartState) {
    debug!("logout command");
    payment.abandon();
    cart.reset();
    session.end();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_login_success() {
        let session = SessionState::in_memory();
        let config = ConfigState::default();

        let started = login(&session, &config, "123.456.789-09", "segredo").unwrap();
        assert_eq!(started.cpf.to_string(), "123.456.789-09");
        assert_eq!(current_operator(&session).unwrap().id, started.id);
    }

    #[test]
    fn test_login_checks_cpf_before_password() {
        let session = SessionState::in_memory();
        let config = ConfigState::default();

        let err = login(&session, &config, "123.456.789-00", "x").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidIdentifier);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_login_rejects_short_password() {
        let session = SessionState::in_memory();
        let config = ConfigState::default();

        let err = login(&session, &config, "12345678909", "12345").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_logout_then_guard_fails() {
        let session = SessionState::in_memory();
        let config = ConfigState::default();
        let (payment, cart) = (PaymentState::new(), CartState::new());

        login(&session, &config, "12345678909", "123456").unwrap();
        logout(&session, &payment, &cart);
        logout(&session, &payment, &cart);

        assert_eq!(
            current_operator(&session).unwrap_err().code,
            ErrorCode::Unauthenticated
        );
        assert!(restore_session(&session).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_discards_order_and_payment() {
        use crate::processor::{PaymentOutcome, PaymentProcessor};
        use adega_core::{Money, PaymentDetails, PaymentMethod, Product};
        use std::time::Duration;

        let session = SessionState::in_memory();
        let config = ConfigState::default();
        let (payment, cart) = (PaymentState::new(), CartState::new());
        login(&session, &config, "12345678909", "123456").unwrap();

        let gin = Product::new(7, "Gin London Dry", "Destilados", Money::from_cents(11000));
        cart.with_cart_mut(|c| c.add_item(&gin));
        payment.begin(cart.with_cart(|c| c.checkout()).unwrap()).unwrap();
        payment.select_method(PaymentMethod::Pix).unwrap();
        let ticket = PaymentProcessor::new(Duration::from_secs(2))
            .submit(&payment, &cart, &PaymentDetails::Pix)
            .unwrap();

        logout(&session, &payment, &cart);

        assert_eq!(ticket.wait().await, PaymentOutcome::Cancelled);
        assert!(payment.view().is_none());
        assert!(cart.with_cart(|c| c.is_empty()));
    }

    #[test]
    fn test_format_cpf_input() {
        assert_eq!(format_cpf_input("1234567"), "123.456.7");
        assert_eq!(format_cpf_input("123456789012"), "123456789012");
    }
}
