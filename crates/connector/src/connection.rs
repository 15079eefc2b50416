//! Lazy connection establishment and replay publication.
//!
//! A [`ConnectionCell`] owns the `Uninitialized -> Opening -> Ready` (or
//! `Failed`) lifecycle of one connection. The open request is issued
//! immediately on construction; the eventual outcome is published exactly
//! once into a watch slot, from which any number of past, present, and
//! future subscribers read the same value. There is no transition back out
//! of the terminal states and no automatic retry.

use crate::{StoreConfig, StoreError, StoreResult, outcome};
use asyncstore_engine::{EngineError, OpenRequest, SchemaEditor, StorageEngine};
use tokio::sync::watch;
use tracing::{debug, instrument};

/// The slot value: `None` while opening, then the published outcome.
type Slot<C> = Option<Result<C, EngineError>>;

/// Replay cell holding the connection for one connector instance.
///
/// Publication happens once; every subscriber observes the same value
/// whether it subscribed before or after the open settled. No locking is
/// needed around connection access beyond the watch channel itself.
pub(crate) struct ConnectionCell<C> {
    slot: watch::Receiver<Slot<C>>,
}

impl<C> std::fmt::Debug for ConnectionCell<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionCell").finish_non_exhaustive()
    }
}

impl<C> ConnectionCell<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Issue the open request and drive it to publication in the background.
    pub(crate) fn establish<E>(engine: &E, config: &StoreConfig) -> Self
    where
        E: StorageEngine<Connection = C>,
    {
        let (publish, slot) = watch::channel(None);
        debug!(database = config.database_name(), "issuing open request");
        let open = engine.open(config.database_name());
        tokio::spawn(drive_open(
            open,
            publish,
            config.store_name().to_owned(),
            config.key_path().to_owned(),
        ));
        Self { slot }
    }

    /// Wait for the published connection.
    ///
    /// Suspends until the open settles; once it has, resolves immediately
    /// for every later caller. A published failure is replayed to all
    /// pending and future callers.
    pub(crate) async fn get(&self) -> StoreResult<C> {
        let mut slot = self.slot.clone();
        let published = slot.wait_for(Option::is_some).await.map_err(|_| {
            StoreError::Connection(EngineError::new(
                "open task terminated before publishing a connection",
            ))
        })?;
        match &*published {
            Some(Ok(connection)) => Ok(connection.clone()),
            Some(Err(error)) => Err(StoreError::Connection(error.clone())),
            // wait_for only returns once the slot is filled
            None => unreachable!("watch slot observed empty after wait_for"),
        }
    }
}

/// Drive an open request to publication.
///
/// Handles the upgrade signal first (it settles before either completion
/// signal): if a schema handle arrives and the target store does not exist
/// yet, it is created with the configured key path. The check-then-create
/// never errors on a pre-existing store. The completion race is then
/// published exactly once.
#[instrument(skip_all, fields(store = %store_name))]
async fn drive_open<C, S>(
    open: OpenRequest<C, S>,
    publish: watch::Sender<Slot<C>>,
    store_name: String,
    key_path: String,
) where
    S: SchemaEditor,
{
    let (upgrade, request) = open.into_parts();

    if let Ok(mut schema) = upgrade.await {
        if !schema.contains_store(&store_name) {
            debug!("creating object store");
            if let Err(error) = schema.create_store(&store_name, &key_path) {
                let _ = publish.send(Some(Err(error)));
                return;
            }
        }
        // Dropping the schema handle lets the engine finish the upgrade.
    }

    match outcome::resolve(request).await {
        Ok(connection) => {
            debug!("connection established");
            let _ = publish.send(Some(Ok(connection)));
        }
        Err(error) => {
            let _ = publish.send(Some(Err(error)));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Schema stub recording create calls.
    struct StubSchema {
        present: bool,
        fail_create: bool,
        created: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl SchemaEditor for StubSchema {
        fn contains_store(&self, _name: &str) -> bool {
            self.present
        }

        fn create_store(&mut self, name: &str, key_path: &str) -> Result<(), EngineError> {
            if self.fail_create {
                return Err(EngineError::new("create refused"));
            }
            self.created.lock().unwrap().push((name.to_owned(), key_path.to_owned()));
            Ok(())
        }
    }

    fn cell_with_slot() -> (watch::Sender<Slot<u32>>, ConnectionCell<u32>) {
        let (publish, slot) = watch::channel(None);
        (publish, ConnectionCell { slot })
    }

    #[tokio::test]
    async fn creates_missing_store_on_upgrade() {
        let created = Arc::new(Mutex::new(Vec::new()));
        let (open, responder) = OpenRequest::<u32, StubSchema>::new();
        let (publish, cell) = cell_with_slot();
        tokio::spawn(drive_open(open, publish, "kv".into(), "key".into()));

        let schema =
            StubSchema { present: false, fail_create: false, created: Arc::clone(&created) };
        responder.upgrade.send(schema).unwrap_or_else(|_| panic!("upgrade not consumed"));
        responder.completion.resolve(1);

        assert_eq!(cell.get().await.unwrap(), 1);
        assert_eq!(created.lock().unwrap().as_slice(), &[("kv".to_owned(), "key".to_owned())]);
    }

    #[tokio::test]
    async fn skips_creation_when_store_exists() {
        let created = Arc::new(Mutex::new(Vec::new()));
        let (open, responder) = OpenRequest::<u32, StubSchema>::new();
        let (publish, cell) = cell_with_slot();
        tokio::spawn(drive_open(open, publish, "kv".into(), "key".into()));

        let schema =
            StubSchema { present: true, fail_create: true, created: Arc::clone(&created) };
        responder.upgrade.send(schema).unwrap_or_else(|_| panic!("upgrade not consumed"));
        responder.completion.resolve(2);

        // The pre-existing store is left alone; create_store is never hit.
        assert_eq!(cell.get().await.unwrap(), 2);
        assert!(created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_failure_publishes_connection_error() {
        let (open, responder) = OpenRequest::<u32, StubSchema>::new();
        let (publish, cell) = cell_with_slot();
        tokio::spawn(drive_open(open, publish, "kv".into(), "key".into()));

        let schema = StubSchema {
            present: false,
            fail_create: true,
            created: Arc::default(),
        };
        responder.upgrade.send(schema).unwrap_or_else(|_| panic!("upgrade not consumed"));

        let err = cell.get().await.unwrap_err();
        assert!(err.is_connection_failure());
        assert!(err.to_string().contains("create refused"));
    }

    #[tokio::test]
    async fn publishes_without_upgrade() {
        let (open, responder) = OpenRequest::<u32, StubSchema>::new();
        let (publish, cell) = cell_with_slot();
        tokio::spawn(drive_open(open, publish, "kv".into(), "key".into()));

        drop(responder.upgrade);
        responder.completion.resolve(3);

        assert_eq!(cell.get().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn failure_replays_to_every_subscriber() {
        let (open, responder) = OpenRequest::<u32, StubSchema>::new();
        let (publish, cell) = cell_with_slot();
        tokio::spawn(drive_open(open, publish, "kv".into(), "key".into()));

        drop(responder.upgrade);
        responder.completion.reject(EngineError::new("no disk"));

        let first = cell.get().await.unwrap_err();
        let second = cell.get().await.unwrap_err();
        assert!(first.is_connection_failure());
        assert_eq!(first.to_string(), second.to_string());
    }
}
