//! In-memory storage engine for testing.
//!
//! This engine keeps all databases in memory behind a shared mutex and
//! completes requests through the same one-shot signalling as a real driver:
//! `open` settles from a spawned task, per-record requests return
//! pre-completed. It enforces the driver contract strictly — duplicate `add`
//! keys, writes through read-only transactions, and out-of-scope store
//! access are all rejected — and supports fault injection so callers can
//! exercise their error paths.

use crate::{
    Connection, EngineError, EngineRequest, ObjectStore, OpenRequest, OpenResponder, Record,
    SchemaEditor, StorageEngine, Transaction, TransactionMode,
};
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::oneshot;

/// A request kind a fault can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// The next `get` request fails.
    Get,
    /// The next `add` request fails.
    Add,
    /// The next `put` request fails.
    Put,
    /// The next `delete` request fails.
    Delete,
    /// The next `clear` request fails.
    Clear,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::Add => write!(f, "add"),
            Self::Put => write!(f, "put"),
            Self::Delete => write!(f, "delete"),
            Self::Clear => write!(f, "clear"),
        }
    }
}

/// One object store: records keyed by string, plus the configured key path.
#[derive(Debug, Default)]
struct MemStore {
    #[allow(dead_code)]
    key_path: String,
    records: BTreeMap<String, Record>,
}

/// One named database: a set of object stores.
#[derive(Debug, Default)]
struct MemDatabase {
    stores: HashMap<String, MemStore>,
}

/// Shared engine state.
#[derive(Debug, Default)]
struct Inner {
    databases: HashMap<String, MemDatabase>,
    faults: HashSet<Fault>,
    opens: u64,
    upgrades: u64,
}

/// In-memory storage engine.
///
/// Cheap to clone via its internal `Arc`; all handles observe the same
/// state, so a second engine value opened on the same database sees
/// previously written records.
#[derive(Debug, Default)]
pub struct MemEngine {
    inner: Arc<Mutex<Inner>>,
    fail_open: bool,
}

impl MemEngine {
    /// Create a new empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine whose open requests always fail.
    pub fn failing_open() -> Self {
        Self { inner: Arc::default(), fail_open: true }
    }

    /// Make the next request of the given kind fail.
    pub fn inject_fault(&self, fault: Fault) {
        self.lock().faults.insert(fault);
    }

    /// Number of open requests issued against this engine.
    pub fn open_count(&self) -> u64 {
        self.lock().opens
    }

    /// Number of upgrade signals fired by this engine.
    pub fn upgrade_count(&self) -> u64 {
        self.lock().upgrades
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("mem engine lock poisoned")
    }
}

impl StorageEngine for MemEngine {
    type Connection = MemConnection;
    type Schema = MemSchema;

    fn open(&self, database: &str) -> OpenRequest<MemConnection, MemSchema> {
        let (open, responder) = OpenRequest::new();
        let inner = Arc::clone(&self.inner);
        let database = database.to_owned();
        let fail = self.fail_open;

        inner.lock().expect("mem engine lock poisoned").opens += 1;

        tokio::spawn(async move {
            // The upgrade signal settles before either completion signal.
            let OpenResponder { upgrade, completion } = responder;

            if fail {
                drop(upgrade);
                completion.reject(EngineError::new("open request rejected by driver"));
                return;
            }

            let fresh = {
                let mut guard = inner.lock().expect("mem engine lock poisoned");
                let fresh = !guard.databases.contains_key(&database);
                if fresh {
                    guard.databases.insert(database.clone(), MemDatabase::default());
                    guard.upgrades += 1;
                }
                fresh
            };

            if fresh {
                let (done_tx, done_rx) = oneshot::channel();
                let schema = MemSchema {
                    inner: Arc::clone(&inner),
                    database: database.clone(),
                    _done: done_tx,
                };
                if upgrade.send(schema).is_ok() {
                    // Wait for the schema handle to drop before completing.
                    let _ = done_rx.await;
                }
            } else {
                drop(upgrade);
            }

            completion.resolve(MemConnection { inner, database });
        });

        open
    }
}

/// Schema handle delivered through the upgrade signal.
///
/// The open request completes only after this handle is dropped.
#[derive(Debug)]
pub struct MemSchema {
    inner: Arc<Mutex<Inner>>,
    database: String,
    _done: oneshot::Sender<()>,
}

impl SchemaEditor for MemSchema {
    fn contains_store(&self, name: &str) -> bool {
        self.inner
            .lock()
            .expect("mem engine lock poisoned")
            .databases
            .get(&self.database)
            .is_some_and(|db| db.stores.contains_key(name))
    }

    fn create_store(&mut self, name: &str, key_path: &str) -> Result<(), EngineError> {
        let mut guard = self.inner.lock().expect("mem engine lock poisoned");
        let db = guard
            .databases
            .get_mut(&self.database)
            .ok_or_else(|| EngineError::new(format!("no such database: {}", self.database)))?;
        if db.stores.contains_key(name) {
            return Err(EngineError::new(format!("object store already exists: {name}")));
        }
        db.stores
            .insert(name.to_owned(), MemStore { key_path: key_path.to_owned(), ..Default::default() });
        Ok(())
    }
}

/// Connection handle for an opened in-memory database.
#[derive(Debug, Clone)]
pub struct MemConnection {
    inner: Arc<Mutex<Inner>>,
    database: String,
}

impl Connection for MemConnection {
    type Transaction = MemTransaction;

    fn transaction(
        &self,
        stores: &[&str],
        mode: TransactionMode,
    ) -> Result<MemTransaction, EngineError> {
        let guard = self.inner.lock().expect("mem engine lock poisoned");
        let db = guard
            .databases
            .get(&self.database)
            .ok_or_else(|| EngineError::new(format!("no such database: {}", self.database)))?;
        for store in stores {
            if !db.stores.contains_key(*store) {
                return Err(EngineError::new(format!("no such object store: {store}")));
            }
        }
        Ok(MemTransaction {
            inner: Arc::clone(&self.inner),
            database: self.database.clone(),
            scope: stores.iter().map(|s| (*s).to_owned()).collect(),
            mode,
        })
    }
}

/// A scoped transaction against one in-memory database.
#[derive(Debug)]
pub struct MemTransaction {
    inner: Arc<Mutex<Inner>>,
    database: String,
    scope: Vec<String>,
    mode: TransactionMode,
}

impl Transaction for MemTransaction {
    type Store = MemObjectStore;

    fn object_store(&self, name: &str) -> Result<MemObjectStore, EngineError> {
        if !self.scope.iter().any(|s| s == name) {
            return Err(EngineError::new(format!("object store not in transaction scope: {name}")));
        }
        Ok(MemObjectStore {
            inner: Arc::clone(&self.inner),
            database: self.database.clone(),
            store: name.to_owned(),
            mode: self.mode,
        })
    }
}

/// Accessor issuing requests against one in-memory object store.
#[derive(Debug)]
pub struct MemObjectStore {
    inner: Arc<Mutex<Inner>>,
    database: String,
    store: String,
    mode: TransactionMode,
}

impl MemObjectStore {
    /// Consume a pending injected fault for the given kind.
    fn take_fault(&self, fault: Fault) -> bool {
        self.inner.lock().expect("mem engine lock poisoned").faults.remove(&fault)
    }

    /// Run `op` against this store's record map, as a completed request.
    fn with_records<T>(
        &self,
        op: impl FnOnce(&mut BTreeMap<String, Record>) -> Result<T, EngineError>,
    ) -> EngineRequest<T> {
        let mut guard = self.inner.lock().expect("mem engine lock poisoned");
        let result = guard
            .databases
            .get_mut(&self.database)
            .and_then(|db| db.stores.get_mut(&self.store))
            .ok_or_else(|| EngineError::new(format!("no such object store: {}", self.store)))
            .and_then(|store| op(&mut store.records));
        match result {
            Ok(value) => EngineRequest::resolved(value),
            Err(error) => EngineRequest::rejected(error),
        }
    }

    /// Reject mutating requests issued through a read-only transaction.
    fn check_writable(&self) -> Result<(), EngineError> {
        match self.mode {
            TransactionMode::ReadWrite => Ok(()),
            TransactionMode::ReadOnly => {
                Err(EngineError::new("cannot mutate through a read-only transaction"))
            }
        }
    }
}

impl ObjectStore for MemObjectStore {
    fn get(&self, key: &str) -> EngineRequest<Option<Record>> {
        if self.take_fault(Fault::Get) {
            return EngineRequest::rejected(EngineError::new("injected get fault"));
        }
        self.with_records(|records| Ok(records.get(key).cloned()))
    }

    fn add(&self, record: Record, key: &str) -> EngineRequest<()> {
        if self.take_fault(Fault::Add) {
            return EngineRequest::rejected(EngineError::new("injected add fault"));
        }
        if let Err(e) = self.check_writable() {
            return EngineRequest::rejected(e);
        }
        self.with_records(|records| {
            if records.contains_key(key) {
                return Err(EngineError::new(format!("key already exists: {key}")));
            }
            records.insert(key.to_owned(), record);
            Ok(())
        })
    }

    fn put(&self, record: Record, key: &str) -> EngineRequest<()> {
        if self.take_fault(Fault::Put) {
            return EngineRequest::rejected(EngineError::new("injected put fault"));
        }
        if let Err(e) = self.check_writable() {
            return EngineRequest::rejected(e);
        }
        self.with_records(|records| {
            records.insert(key.to_owned(), record);
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> EngineRequest<()> {
        if self.take_fault(Fault::Delete) {
            return EngineRequest::rejected(EngineError::new("injected delete fault"));
        }
        if let Err(e) = self.check_writable() {
            return EngineRequest::rejected(e);
        }
        self.with_records(|records| {
            records.remove(key);
            Ok(())
        })
    }

    fn clear(&self) -> EngineRequest<()> {
        if self.take_fault(Fault::Clear) {
            return EngineRequest::rejected(EngineError::new("injected clear fault"));
        }
        if let Err(e) = self.check_writable() {
            return EngineRequest::rejected(e);
        }
        self.with_records(|records| {
            records.clear();
            Ok(())
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    const STORE: &str = "localStorage";

    /// Open a database, creating the store on upgrade, and await readiness.
    async fn open_ready(engine: &MemEngine, database: &str) -> MemConnection {
        let (upgrade, request) = engine.open(database).into_parts();
        if let Ok(mut schema) = upgrade.await {
            if !schema.contains_store(STORE) {
                schema.create_store(STORE, "key").unwrap();
            }
        }
        let (success, _failure) = request.into_signals();
        success.await.unwrap()
    }

    fn accessor(conn: &MemConnection, mode: TransactionMode) -> MemObjectStore {
        conn.transaction(&[STORE], mode).unwrap().object_store(STORE).unwrap()
    }

    async fn settle<T>(request: EngineRequest<T>) -> Result<T, EngineError> {
        let (success, failure) = request.into_signals();
        tokio::select! {
            Ok(v) = success => Ok(v),
            Ok(e) = failure => Err(e),
            else => panic!("request dropped without settling"),
        }
    }

    #[tokio::test]
    async fn upgrade_fires_only_for_fresh_database() {
        let engine = MemEngine::new();
        open_ready(&engine, "db").await;
        assert_eq!(engine.upgrade_count(), 1);

        // Second open: database exists, no upgrade.
        let (upgrade, request) = engine.open("db").into_parts();
        assert!(upgrade.await.is_err());
        let (success, _failure) = request.into_signals();
        success.await.unwrap();
        assert_eq!(engine.upgrade_count(), 1);
        assert_eq!(engine.open_count(), 2);
    }

    #[tokio::test]
    async fn add_rejects_existing_key_and_put_upserts() {
        let engine = MemEngine::new();
        let conn = open_ready(&engine, "db").await;
        let store = accessor(&conn, TransactionMode::ReadWrite);

        settle(store.add(Record::single("value", json!("1")), "a")).await.unwrap();
        let err = settle(store.add(Record::single("value", json!("2")), "a")).await.unwrap_err();
        assert!(err.message().contains("already exists"));

        settle(store.put(Record::single("value", json!("2")), "a")).await.unwrap();
        let record = settle(store.get("a")).await.unwrap().unwrap();
        assert_eq!(record.field("value"), Some(&json!("2")));
    }

    #[tokio::test]
    async fn read_only_transaction_rejects_writes() {
        let engine = MemEngine::new();
        let conn = open_ready(&engine, "db").await;
        let store = accessor(&conn, TransactionMode::ReadOnly);

        let err = settle(store.put(Record::single("value", json!("1")), "a")).await.unwrap_err();
        assert!(err.message().contains("read-only"));
        let err = settle(store.clear()).await.unwrap_err();
        assert!(err.message().contains("read-only"));
    }

    #[tokio::test]
    async fn out_of_scope_store_access_errors() {
        let engine = MemEngine::new();
        let conn = open_ready(&engine, "db").await;

        assert!(conn.transaction(&["missing"], TransactionMode::ReadOnly).is_err());
        let tx = conn.transaction(&[STORE], TransactionMode::ReadOnly).unwrap();
        assert!(tx.object_store("missing").is_err());
    }

    #[tokio::test]
    async fn injected_fault_fails_next_matching_request_only() {
        let engine = MemEngine::new();
        let conn = open_ready(&engine, "db").await;
        let store = accessor(&conn, TransactionMode::ReadOnly);

        engine.inject_fault(Fault::Get);
        let err = settle(store.get("a")).await.unwrap_err();
        assert!(err.message().contains("injected get fault"));

        // The fault is consumed; the next request succeeds.
        assert!(settle(store.get("a")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failing_open_rejects() {
        let engine = MemEngine::failing_open();
        let (upgrade, request) = engine.open("db").into_parts();
        assert!(upgrade.await.is_err());
        let (_success, failure) = request.into_signals();
        assert!(failure.await.unwrap().message().contains("rejected"));
    }
}
