//! Asynchronous key-value storage connector.
//!
//! This crate exposes get/set/remove/clear over a persistent, transactional,
//! callback-driven key-value store. One connection is established lazily per
//! [`StoreConnector`] instance and published to every operation through a
//! replay cell, so early and late callers alike observe the same connection
//! exactly once.
//!
//! # Architecture
//!
//! - an outcome bridge races each one-shot success/error signal pair into a
//!   single-resolution result
//! - the connection cell owns the `Uninitialized -> Opening -> Ready`
//!   lifecycle, including idempotent first-time object-store creation
//! - [`StoreConnector`] composes the two into the four key-value operations
//!
//! # Example
//!
//! ```ignore
//! use asyncstore::StoreConnector;
//! use asyncstore_engine::mem::MemEngine;
//! use serde_json::json;
//!
//! let engine = MemEngine::new();
//! let store = StoreConnector::new(&engine);
//!
//! store.set("a", json!("1")).await?;
//! assert_eq!(store.get("a").await?, Some(json!("1")));
//! store.remove("a").await?;
//! ```
//!
//! # Consistency
//!
//! `set` and `remove` perform an existence check in a separate transaction
//! from the write. Concurrent writers racing that window can observe
//! check-then-act anomalies; this layer does not serialize operations on the
//! same key. See [`StoreConnector::set`].
//!
//! # Feature Flags
//!
//! - **`test-utils`**: exposes the `conformance` suite for exercising engine
//!   implementations through the connector.

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
pub use error::{OpContext, StoreError, StoreResult};

pub mod config;
pub use config::StoreConfig;

mod outcome;

mod connection;

mod connector;
pub use connector::StoreConnector;

/// Conformance tests for storage engines driven through the connector.
#[cfg(any(test, feature = "test-utils"))]
pub mod conformance;

// Re-export the engine contract for convenience.
pub use asyncstore_engine::{
    Connection, EngineError, ObjectStore, Record, SchemaEditor, StorageEngine, Transaction,
    TransactionMode,
};
