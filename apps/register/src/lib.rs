//! # adega-register
//!
//! Orchestration layer of the PDV Adegas register: it owns the shared state
//! and exposes the screen actions the UI calls.
//!
//! ## Module Organization
//! ```text
//! adega_register/
//! ├── lib.rs          ◄─── You are here (tracing, Register context)
//! ├── state/
//! │   ├── session.rs  ◄─── Session context + key/value store
//! │   ├── cart.rs     ◄─── Cart state
//! │   ├── catalog.rs  ◄─── Catalog state
//! │   ├── payment.rs  ◄─── Payment flow + cancel switch
//! │   └── config.rs   ◄─── register.toml / ADEGA_* configuration
//! ├── commands/       ◄─── auth, catalog, cart, payment actions
//! ├── processor.rs    ◄─── Async payment task
//! └── error.rs        ◄─── ApiError for the UI
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use adega_register::commands::{auth, cart, payment};
//! use adega_register::Register;
//! use adega_core::{PaymentDetails, PaymentMethod};
//!
//! # async fn demo() -> Result<(), adega_register::error::ApiError> {
//! let register = Register::load(None);
//! auth::login(&register.session, &register.config, "123.456.789-09", "segredo")?;
//!
//! cart::scan_barcode(&register.session, &register.catalog, &register.cart, "7891234567890")?;
//! payment::begin_checkout(&register.session, &register.cart, &register.payment)?;
//! payment::select_payment_method(&register.session, &register.payment, PaymentMethod::Pix)?;
//!
//! let ticket = payment::submit_payment(
//!     &register.session,
//!     &register.processor,
//!     &register.payment,
//!     &register.cart,
//!     &PaymentDetails::Pix,
//! )?;
//! let outcome = ticket.wait().await;
//! assert!(outcome.receipt().is_some());
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod error;
pub mod processor;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use processor::PaymentProcessor;
use state::{
    CartState, CatalogState, ConfigState, JsonFileStore, KeyValueStore, MemoryStore,
    PaymentState, RegisterConfig, SessionState,
};

/// Everything one register instance shares between screens.
#[derive(Clone)]
pub struct Register {
    pub config: ConfigState,
    pub session: SessionState,
    pub catalog: CatalogState,
    pub cart: CartState,
    pub payment: PaymentState,
    pub processor: PaymentProcessor,
}

impl Register {
    /// Builds a register over the given session store.
    pub fn new(config: RegisterConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let processor = PaymentProcessor::from_config(&config);
        Register {
            config: ConfigState::new(config),
            session: SessionState::new(store),
            catalog: CatalogState::seeded(),
            cart: CartState::new(),
            payment: PaymentState::new(),
            processor,
        }
    }

    /// Nothing persisted; used by tests and demos.
    pub fn in_memory(config: RegisterConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Loads configuration, opens the on-disk session store, and restores a
    /// previous login if one was stored.
    ///
    /// ## Startup Sequence
    /// 1. `register.toml` + `ADEGA_*` overrides (defaults on failure)
    /// 2. Session store under the platform data directory
    /// 3. Session restore
    pub fn load(config_path: Option<PathBuf>) -> Self {
        let config = RegisterConfig::load_or_default(config_path);

        let store: Arc<dyn KeyValueStore> = match JsonFileStore::default_path() {
            Some(path) => {
                info!(?path, "Using session store");
                Arc::new(JsonFileStore::open(path))
            }
            None => Arc::new(MemoryStore::new()),
        };

        let register = Self::new(config, store);
        if let Some(session) = register.session.restore() {
            info!(cpf = %session.cpf.masked(), "Previous session restored");
        }

        info!(store = %register.config.get().store.name, "Register ready");
        register
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=adega_register=trace` - Trace the register only
/// - Default: INFO, DEBUG for the register crates
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,adega_register=debug,adega_core=debug"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{auth, cart, payment};
    use crate::processor::PaymentOutcome;
    use adega_core::{PaymentDetails, PaymentMethod};

    fn fast_config() -> RegisterConfig {
        let mut config = RegisterConfig::default();
        config.payment.processing_delay_ms = 100;
        config
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cash_sale() {
        let register = Register::in_memory(fast_config());
        auth::login(&register.session, &register.config, "123.456.789-09", "segredo").unwrap();

        cart::add_to_cart(&register.session, &register.catalog, &register.cart, 1).unwrap();
        cart::add_to_cart(&register.session, &register.catalog, &register.cart, 1).unwrap();
        cart::scan_barcode(&register.session, &register.catalog, &register.cart, "7891234567895")
            .unwrap();

        let view = payment::begin_checkout(&register.session, &register.cart, &register.payment)
            .unwrap();
        assert_eq!(view.total.to_decimal_string(), "198.30");

        payment::select_payment_method(&register.session, &register.payment, PaymentMethod::Cash).unwrap();
        let ticket = payment::submit_payment(
            &register.session,
            &register.processor,
            &register.payment,
            &register.cart,
            &PaymentDetails::cash_from_text("200"),
        )
        .unwrap();

        match ticket.wait().await {
            PaymentOutcome::Approved(receipt) => {
                assert_eq!(receipt.change.to_decimal_string(), "1.70");
                assert_eq!(receipt.item_count(), 3);
            }
            PaymentOutcome::Cancelled => panic!("payment should be approved"),
        }
        assert_eq!(register.cart.view().item_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sale_after_leaving_payment_is_approved() {
        let register = Register::in_memory(fast_config());
        auth::login(&register.session, &register.config, "12345678909", "segredo").unwrap();

        cart::add_to_cart(&register.session, &register.catalog, &register.cart, 2).unwrap();
        payment::begin_checkout(&register.session, &register.cart, &register.payment).unwrap();
        payment::select_payment_method(&register.session, &register.payment, PaymentMethod::Pix)
            .unwrap();
        let abandoned = payment::submit_payment(
            &register.session,
            &register.processor,
            &register.payment,
            &register.cart,
            &PaymentDetails::Pix,
        )
        .unwrap();
        payment::leave_payment(&register.session, &register.payment, &register.cart).unwrap();

        cart::add_to_cart(&register.session, &register.catalog, &register.cart, 4).unwrap();
        payment::begin_checkout(&register.session, &register.cart, &register.payment).unwrap();
        payment::select_payment_method(&register.session, &register.payment, PaymentMethod::Pix)
            .unwrap();
        let ticket = payment::submit_payment(
            &register.session,
            &register.processor,
            &register.payment,
            &register.cart,
            &PaymentDetails::Pix,
        )
        .unwrap();

        assert_eq!(abandoned.wait().await, PaymentOutcome::Cancelled);
        let receipt = ticket.wait().await.receipt().cloned().unwrap();
        assert_eq!(receipt.total.to_decimal_string(), "280.00");
        assert!(matches!(
            payment::payment_status(&register.session, &register.payment)
                .unwrap()
                .stage,
            adega_core::PaymentStage::Completed { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_sale_after_approval() {
        let register = Register::in_memory(fast_config());
        auth::login(&register.session, &register.config, "12345678909", "segredo").unwrap();

        for _ in 0..2 {
            cart::add_to_cart(&register.session, &register.catalog, &register.cart, 5).unwrap();
            payment::begin_checkout(&register.session, &register.cart, &register.payment)
                .unwrap();
            payment::select_payment_method(&register.session, &register.payment, PaymentMethod::Pix).unwrap();

            let ticket = payment::submit_payment(
                &register.session,
                &register.processor,
                &register.payment,
                &register.cart,
                &PaymentDetails::Pix,
            )
            .unwrap();
            assert!(ticket.wait().await.receipt().is_some());
        }
    }
}
