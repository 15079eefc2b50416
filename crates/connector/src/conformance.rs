//! Conformance tests for storage engines driven through the connector.
//!
//! These verify that an engine implementation behaves correctly under the
//! connector's operation contract. To use them with a custom engine, build a
//! connector over it and call [`conformance`].
//!
//! The individual tests share the connector's store; they use disjoint keys
//! except for [`test_clear`], which runs last in the combined suite.

use crate::{StoreConnector, StoreResult};
use asyncstore_engine::Connection;
use serde_json::json;

/// Run all conformance tests against a connector.
///
/// This is the main entry point for testing a custom engine implementation.
pub async fn conformance<C>(connector: &StoreConnector<C>) -> StoreResult<()>
where
    C: Connection + Clone + Send + Sync + 'static,
{
    test_missing_key_is_absent(connector).await?;
    test_write_then_read(connector).await?;
    test_overwrite(connector).await?;
    test_remove_missing_key(connector).await?;
    test_remove_written_key(connector).await?;
    test_sequential_scenario(connector).await?;
    test_clear(connector).await?;
    Ok(())
}

/// A key never written resolves to absent, not a failure.
pub async fn test_missing_key_is_absent<C>(connector: &StoreConnector<C>) -> StoreResult<()>
where
    C: Connection + Clone + Send + Sync + 'static,
{
    assert_eq!(connector.get("conformance-missing").await?, None);
    Ok(())
}

/// Write-then-read consistency for a single sequential caller.
pub async fn test_write_then_read<C>(connector: &StoreConnector<C>) -> StoreResult<()>
where
    C: Connection + Clone + Send + Sync + 'static,
{
    connector.set("conformance-wr", json!("hello")).await?;
    assert_eq!(connector.get("conformance-wr").await?, Some(json!("hello")));

    // Non-string payloads round-trip unchanged.
    connector.set("conformance-wr-obj", json!({"n": 3, "nested": [1, 2]})).await?;
    assert_eq!(
        connector.get("conformance-wr-obj").await?,
        Some(json!({"n": 3, "nested": [1, 2]}))
    );
    Ok(())
}

/// Overwriting routes through put and must not create duplicate records.
pub async fn test_overwrite<C>(connector: &StoreConnector<C>) -> StoreResult<()>
where
    C: Connection + Clone + Send + Sync + 'static,
{
    connector.set("conformance-ow", json!("v1")).await?;
    connector.set("conformance-ow", json!("v2")).await?;
    assert_eq!(connector.get("conformance-ow").await?, Some(json!("v2")));
    Ok(())
}

/// Removing a non-existent key is a no-op success.
pub async fn test_remove_missing_key<C>(connector: &StoreConnector<C>) -> StoreResult<()>
where
    C: Connection + Clone + Send + Sync + 'static,
{
    connector.remove("conformance-never-written").await?;
    Ok(())
}

/// Removing a written key leaves it absent.
pub async fn test_remove_written_key<C>(connector: &StoreConnector<C>) -> StoreResult<()>
where
    C: Connection + Clone + Send + Sync + 'static,
{
    connector.set("conformance-rm", json!("gone soon")).await?;
    connector.remove("conformance-rm").await?;
    assert_eq!(connector.get("conformance-rm").await?, None);
    Ok(())
}

/// The full sequential scenario: set, get, remove, get, clear.
pub async fn test_sequential_scenario<C>(connector: &StoreConnector<C>) -> StoreResult<()>
where
    C: Connection + Clone + Send + Sync + 'static,
{
    connector.set("a", json!("1")).await?;
    assert_eq!(connector.get("a").await?, Some(json!("1")));
    connector.remove("a").await?;
    assert_eq!(connector.get("a").await?, None);
    connector.clear().await?;
    Ok(())
}

/// Clearing leaves every previously written key absent, and clearing an
/// already-empty store succeeds.
pub async fn test_clear<C>(connector: &StoreConnector<C>) -> StoreResult<()>
where
    C: Connection + Clone + Send + Sync + 'static,
{
    connector.set("conformance-clear-1", json!("x")).await?;
    connector.set("conformance-clear-2", json!("y")).await?;
    connector.clear().await?;
    assert_eq!(connector.get("conformance-clear-1").await?, None);
    assert_eq!(connector.get("conformance-clear-2").await?, None);
    assert_eq!(connector.get("conformance-wr").await?, None);

    // Clear on an empty store is still a success.
    connector.clear().await?;
    Ok(())
}
