//! Core trait definitions for storage engine drivers.
//!
//! The trait hierarchy mirrors the shape of the native store: an engine
//! opens named databases, a connection opens scoped transactions, a
//! transaction exposes object-store accessors, and an accessor issues the
//! per-record requests. The traits are agnostic to how the driver persists
//! or indexes data.

use crate::{EngineError, EngineRequest, OpenRequest, Record};

/// Transaction access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionMode {
    /// Read-only access. The default for non-mutating operations.
    #[default]
    ReadOnly,
    /// Read-write access, required for add/put/delete/clear.
    ReadWrite,
}

/// A storage engine driver.
///
/// Opening is the only asynchronous-by-callback entry point at this level:
/// `open` returns immediately with an [`OpenRequest`] that settles later.
/// Implementations must honor the ordering contract documented on
/// [`OpenRequest`]: the upgrade signal settles before either completion
/// signal, and a delivered schema handle must be dropped before the open
/// completes.
pub trait StorageEngine: Send + Sync + 'static {
    /// The connection handle produced by a successful open.
    ///
    /// `Clone` because the ready connection is shared by every operation on
    /// the connector for the rest of its lifetime.
    type Connection: Connection + Clone + Send + Sync + 'static;

    /// The schema handle delivered through the upgrade signal.
    type Schema: SchemaEditor + Send + 'static;

    /// Issue an open request for the named database.
    fn open(&self, database: &str) -> OpenRequest<Self::Connection, Self::Schema>;
}

/// Mutable schema handle, valid only for the duration of an upgrade.
pub trait SchemaEditor {
    /// Whether an object store with the given name already exists.
    fn contains_store(&self, name: &str) -> bool;

    /// Create an object store with the given key path.
    ///
    /// Errors if a store with this name already exists; callers check with
    /// [`contains_store`](Self::contains_store) first.
    fn create_store(&mut self, name: &str, key_path: &str) -> Result<(), EngineError>;
}

/// A live connection to an opened database.
pub trait Connection: Send {
    /// The transaction handle type.
    type Transaction: Transaction;

    /// Open a transaction scoped to the named object stores.
    ///
    /// Errors if the database does not contain one of the requested stores.
    fn transaction(
        &self,
        stores: &[&str],
        mode: TransactionMode,
    ) -> Result<Self::Transaction, EngineError>;
}

/// A scoped, short-lived transaction.
///
/// Never reused across operations; each connector operation opens its own.
pub trait Transaction: Send {
    /// The object-store accessor type.
    type Store: ObjectStore;

    /// Get the accessor for a store within this transaction's scope.
    ///
    /// Errors if the name is outside the scope the transaction was opened
    /// with.
    fn object_store(&self, name: &str) -> Result<Self::Store, EngineError>;
}

/// Accessor for issuing per-record requests against one object store.
///
/// Every method returns immediately with a pending [`EngineRequest`] that
/// settles exactly once. Mutating requests issued through a read-only
/// transaction are rejected by the driver.
pub trait ObjectStore: Send {
    /// Fetch the record stored under `key`, if any.
    fn get(&self, key: &str) -> EngineRequest<Option<Record>>;

    /// Insert a record under a key that must not already exist.
    fn add(&self, record: Record, key: &str) -> EngineRequest<()>;

    /// Insert or replace the record under `key`.
    fn put(&self, record: Record, key: &str) -> EngineRequest<()>;

    /// Delete the record under `key`. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> EngineRequest<()>;

    /// Delete every record in the store.
    fn clear(&self) -> EngineRequest<()>;
}
