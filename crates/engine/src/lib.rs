//! Driver contract for callback-driven key-value storage engines.
//!
//! This crate defines the boundary between the asyncstore connector and the
//! underlying storage engine. Engines in this family (IndexedDB-style
//! embedded stores) complete every operation through a pair of one-shot
//! signals: a request object is returned immediately, and exactly one of its
//! success or error signals fires later.
//!
//! # Architecture
//!
//! - [`EngineRequest`] / [`RequestResponder`] model the one-shot completion
//!   pair for a single native request
//! - [`OpenRequest`] / [`OpenResponder`] extend that with the upgrade signal
//!   emitted on first-time database setup
//! - [`StorageEngine`], [`Connection`], [`Transaction`], [`ObjectStore`] and
//!   [`SchemaEditor`] are the traits a driver implements
//! - [`Record`] is the stored unit: a JSON object mapping field names to
//!   values
//!
//! # Completion Contract
//!
//! For every request the driver fires exactly one signal, exactly once. A
//! request whose responder is dropped unfired never settles; consumers treat
//! that as driver malfunction and simply stay suspended.
//!
//! # Feature Flags
//!
//! - **`in-memory`**: enables the `mem` module, an in-memory engine with
//!   fault injection for tests and development.

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]

mod error;
pub use error::EngineError;

mod request;
pub use request::{
    EngineRequest, FailureSignal, OpenRequest, OpenResponder, RequestResponder, SuccessSignal,
    UpgradeSignal,
};

mod record;
pub use record::Record;

mod traits;
pub use traits::{Connection, ObjectStore, SchemaEditor, StorageEngine, Transaction, TransactionMode};

#[cfg(any(test, feature = "in-memory"))]
pub mod mem;
