//! The key-value connector.
//!
//! [`StoreConnector`] composes the connection cell, the per-operation
//! transaction accessor, and the outcome bridge into the four operations:
//! get, set, remove, clear. All four are scoped to the single object store
//! fixed at construction.

use crate::{
    OpContext, StoreConfig, StoreError, StoreResult, connection::ConnectionCell, outcome,
};
use asyncstore_engine::{
    Connection, EngineRequest, ObjectStore, Record, StorageEngine, Transaction, TransactionMode,
};
use serde_json::Value;

/// The object-store accessor reached through a connection's transaction.
type Accessor<C> = <<C as Connection>::Transaction as Transaction>::Store;

/// Asynchronous key-value connector over one object store.
///
/// Construction issues the open request immediately; operations suspend
/// until the connection is ready and then share it for the lifetime of the
/// instance. The connection is established at most once; a connection
/// failure is fatal to every pending and future operation and is never
/// retried.
///
/// Operations issued concurrently are not serialized against each other:
/// each opens its own transaction. See [`set`](Self::set) for the resulting
/// consistency caveat.
///
/// Construction spawns the open-driving task and must happen within a Tokio
/// runtime.
pub struct StoreConnector<C> {
    config: StoreConfig,
    cell: ConnectionCell<C>,
}

impl<C> std::fmt::Debug for StoreConnector<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConnector").field("config", &self.config).finish_non_exhaustive()
    }
}

impl<C> StoreConnector<C>
where
    C: Connection + Clone + Send + Sync + 'static,
{
    /// Create a connector with the default store identity.
    pub fn new<E>(engine: &E) -> Self
    where
        E: StorageEngine<Connection = C>,
    {
        Self::with_config(engine, StoreConfig::default())
    }

    /// Create a connector with an explicit store identity.
    pub fn with_config<E>(engine: &E, config: StoreConfig) -> Self
    where
        E: StorageEngine<Connection = C>,
    {
        let cell = ConnectionCell::establish(engine, &config);
        Self { config, cell }
    }

    /// The store identity this connector was constructed with.
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Get the value stored under `key`.
    ///
    /// Absence is a normal outcome, not an error: a key that was never
    /// written (or whose record lacks the configured value field) resolves
    /// to `Ok(None)`.
    pub async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let store = self.object_store(TransactionMode::ReadOnly, OpContext::Getter).await?;
        let record = self.settle(store.get(key), OpContext::Getter).await?;
        Ok(record.and_then(|r| r.into_field(self.config.value_path())))
    }

    /// Store `value` under `key`, inserting or overwriting as needed.
    ///
    /// `value` must not be `Value::Null`: null is indistinguishable from
    /// absence on read, so storing it breaks the add-vs-put routing below.
    ///
    /// The existence check and the write run in separate transactions. A
    /// concurrent write to the same key between the two can route this call
    /// to the wrong native primitive (`add` where `put` was needed, or vice
    /// versa). Sequential callers are unaffected.
    pub async fn set(&self, key: &str, value: Value) -> StoreResult<()> {
        let exists = self.get(key).await?.is_some();
        let store = self.object_store(TransactionMode::ReadWrite, OpContext::Setter).await?;
        let record = Record::single(self.config.value_path(), value);
        let request = if exists { store.put(record, key) } else { store.add(record, key) };
        self.settle(request, OpContext::Setter).await
    }

    /// Delete the record stored under `key`.
    ///
    /// Removing a key that does not exist is a no-op success; no write
    /// transaction is opened for it. The same non-atomicity caveat as
    /// [`set`](Self::set) applies between the existence check and the
    /// delete.
    pub async fn remove(&self, key: &str) -> StoreResult<()> {
        if self.get(key).await?.is_none() {
            return Ok(());
        }
        let store = self.object_store(TransactionMode::ReadWrite, OpContext::Remover).await?;
        self.settle(store.delete(key), OpContext::Remover).await
    }

    /// Delete every record in the store.
    ///
    /// Idempotent by nature; no existence check is performed.
    pub async fn clear(&self) -> StoreResult<()> {
        let store = self.object_store(TransactionMode::ReadWrite, OpContext::Clearer).await?;
        self.settle(store.clear(), OpContext::Clearer).await
    }

    /// Open a fresh transaction and yield the object-store accessor.
    ///
    /// Suspends until the published connection is ready; a published
    /// connection failure propagates without a transaction being opened.
    /// Every call gets its own transaction, scoped to exactly the configured
    /// store.
    async fn object_store(
        &self,
        mode: TransactionMode,
        context: OpContext,
    ) -> StoreResult<Accessor<C>> {
        let connection = self.cell.get().await?;
        let transaction = connection
            .transaction(&[self.config.store_name()], mode)
            .map_err(|e| StoreError::operation(context, e))?;
        transaction
            .object_store(self.config.store_name())
            .map_err(|e| StoreError::operation(context, e))
    }

    /// Resolve a native request, tagging failures with `context`.
    async fn settle<T>(&self, request: EngineRequest<T>, context: OpContext) -> StoreResult<T> {
        outcome::resolve(request).await.map_err(|e| StoreError::operation(context, e))
    }
}
