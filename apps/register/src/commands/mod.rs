//! # Commands Module
//!
//! One function per screen action. Each takes only the state it needs and
//! returns `Result<T, ApiError>`.
//!
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── auth.rs     ◄─── Login, session restore, logout
//! ├── catalog.rs  ◄─── Product search, registration, stock summary
//! ├── cart.rs     ◄─── Order building, barcode scan
//! └── payment.rs  ◄─── Checkout, payment methods, processing
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod payment;
