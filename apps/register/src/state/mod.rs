//! # State Module
//!
//! Shared register state, one focused type per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌──────────────┐   │
//! │  │ SessionState │ │  CartState   │ │ CatalogState │ │ PaymentState │   │
//! │  │              │ │              │ │              │ │              │   │
//! │  │ Session +    │ │ Arc<Mutex<   │ │ Arc<Mutex<   │ │ PaymentFlow  │   │
//! │  │ KeyValueStore│ │   Cart>>     │ │   Catalog>>  │ │ + cancel tx  │   │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └──────────────┘   │
//! │                                                                         │
//! │  ┌──────────────┐                                                       │
//! │  │ ConfigState  │  Arc<RegisterConfig>, read-only after startup         │
//! │  └──────────────┘                                                       │
//! │                                                                         │
//! │  Each command takes only the state it needs. All types are cheap to    │
//! │  clone and clones share the same data.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod config;
mod payment;
mod session;

pub use cart::{CartLineView, CartState, CartView};
pub use catalog::CatalogState;
pub use config::{
    AuthSettings, CatalogSettings, ConfigError, ConfigResult, ConfigState, PaymentSettings,
    RegisterConfig, StoreSettings,
};
pub use payment::{PaymentState, PaymentView};
pub use session::{
    JsonFileStore, KeyValueStore, MemoryStore, Session, SessionState, StoreError, AUTH_FLAG_KEY,
    USER_CPF_KEY,
};
