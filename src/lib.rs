//! Remittance Ledger
//!
//! Rate table, conversion engine and transaction lifecycle for GBP-sourced
//! transfers to Somalia and Kenya.
//!
//! # Modules
//!
//! - [`core_types`] - Id types (UserId, TransactionId, RateId)
//! - [`money`] - Strict decimal parsing and currency rounding
//! - [`corridor`] - Destination countries, currencies, payment methods
//! - [`fee`] - Sender fee policy and profit
//! - [`conversion`] - Pure conversion of a source amount under one rate
//! - [`rates`] - Versioned rate table
//! - [`lifecycle`] - Status / stage state machine
//! - [`store`] - Storage trait, in-memory store, snapshots
//! - [`access`] - Who may do what
//! - [`identity`] - Identity & profile collaborator
//! - [`service`] - Boundary operations
//! - [`gateway`] - HTTP surface

// Core types - must be first!
pub mod core_types;
pub mod error;

pub mod money;
pub mod corridor;
pub mod fee;
pub mod models;
pub mod audit;

pub mod conversion;
pub mod rates;
pub mod lifecycle;
pub mod store;

pub mod access;
pub mod identity;
pub mod stats;
pub mod service;

pub mod config;
pub mod gateway;
pub mod logging;

// Convenient re-exports at crate root
pub use access::{Caller, Role};
pub use conversion::{LiveQuote, Quote, convert, convert_input};
pub use core_types::{RateId, TransactionId, UserId};
pub use corridor::{Country, PaymentMethod};
pub use error::RemitError;
pub use fee::FeePolicy;
pub use lifecycle::{StateDelta, TransactionLifecycle, TransactionStage, TransactionStatus};
pub use models::{RateEntry, RateSnapshot, Transaction, TransactionView};
pub use service::{CreateTransaction, RemitService};
pub use store::{MemoryStore, RemitStore};
