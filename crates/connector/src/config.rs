//! Connector configuration.
//!
//! The store identity — database name, object-store name, key field and
//! value field — is fixed at construction and never changes afterwards.
//! Configuration comes from the defaults, programmatic setters, or
//! environment variables:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `ASYNCSTORE_DATABASE` | database name | `ngStorage` |
//! | `ASYNCSTORE_STORE` | object-store name | `localStorage` |
//! | `ASYNCSTORE_KEY_PATH` | key field | `key` |
//! | `ASYNCSTORE_VALUE_PATH` | value field | `value` |

use std::env;

/// Default database name.
pub const DEFAULT_DATABASE_NAME: &str = "ngStorage";

/// Default object-store name.
pub const DEFAULT_STORE_NAME: &str = "localStorage";

/// Default key field name.
pub const DEFAULT_KEY_PATH: &str = "key";

/// Default value field name.
pub const DEFAULT_VALUE_PATH: &str = "value";

/// Environment variable for the database name.
pub const ENV_DATABASE_NAME: &str = "ASYNCSTORE_DATABASE";

/// Environment variable for the object-store name.
pub const ENV_STORE_NAME: &str = "ASYNCSTORE_STORE";

/// Environment variable for the key field name.
pub const ENV_KEY_PATH: &str = "ASYNCSTORE_KEY_PATH";

/// Environment variable for the value field name.
pub const ENV_VALUE_PATH: &str = "ASYNCSTORE_VALUE_PATH";

/// Store identity configuration, immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    database_name: String,
    store_name: String,
    key_path: String,
    value_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_name: DEFAULT_DATABASE_NAME.to_owned(),
            store_name: DEFAULT_STORE_NAME.to_owned(),
            key_path: DEFAULT_KEY_PATH.to_owned(),
            value_path: DEFAULT_VALUE_PATH.to_owned(),
        }
    }
}

impl StoreConfig {
    /// Create a configuration with the default identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Self {
        let or_default = |var: &str, default: &str| {
            env::var(var).unwrap_or_else(|_| default.to_owned())
        };
        Self {
            database_name: or_default(ENV_DATABASE_NAME, DEFAULT_DATABASE_NAME),
            store_name: or_default(ENV_STORE_NAME, DEFAULT_STORE_NAME),
            key_path: or_default(ENV_KEY_PATH, DEFAULT_KEY_PATH),
            value_path: or_default(ENV_VALUE_PATH, DEFAULT_VALUE_PATH),
        }
    }

    /// Set the database name.
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    /// Set the object-store name.
    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    /// Set the key field name.
    pub fn with_key_path(mut self, path: impl Into<String>) -> Self {
        self.key_path = path.into();
        self
    }

    /// Set the value field name.
    pub fn with_value_path(mut self, path: impl Into<String>) -> Self {
        self.value_path = path.into();
        self
    }

    /// The database name.
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// The object-store name.
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// The key field name.
    pub fn key_path(&self) -> &str {
        &self.key_path
    }

    /// The value field name.
    pub fn value_path(&self) -> &str {
        &self.value_path
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_match_the_store_identity() {
        let config = StoreConfig::default();
        assert_eq!(config.database_name(), "ngStorage");
        assert_eq!(config.store_name(), "localStorage");
        assert_eq!(config.key_path(), "key");
        assert_eq!(config.value_path(), "value");
    }

    #[test]
    fn setters_override_fields() {
        let config = StoreConfig::new()
            .with_database_name("app")
            .with_store_name("kv")
            .with_key_path("k")
            .with_value_path("v");
        assert_eq!(config.database_name(), "app");
        assert_eq!(config.store_name(), "kv");
        assert_eq!(config.key_path(), "k");
        assert_eq!(config.value_path(), "v");
    }
}
