//! Config import into the KV store and typed reads from a local snapshot.
pub mod cached_loader;
pub mod flattener;
pub mod mapped_loader;
pub mod mock_loader;
pub mod parse;

use crate::client_error::{ClientError, FatalConfigError};
use async_trait::async_trait;
use std::time::Duration;

pub use cached_loader::CachedLoader;
pub use flattener::{FlatConfig, KeyFlattener, KeyLayout};
pub use mapped_loader::MappedLoader;
pub use mock_loader::{MockLoader, MockValue};

/// Imports, initializes and reads config values.
///
/// The `must_get_*` accessors are meant for config an app needs to start.
/// They never return an error: a missing or unparsable value panics through
/// [`FatalConfigError::raise`].
#[async_trait]
pub trait Loader: Send + Sync {
    /// Writes a JSON document into the backing store.
    async fn import(&self, data: &[u8]) -> Result<(), ClientError>;

    /// Loads the current values into the local snapshot, replacing it.
    async fn initialize(&self) -> Result<(), ClientError>;

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), ClientError>;

    fn get(&self, key: &str) -> Result<Vec<u8>, ClientError>;

    fn must_get(&self, key: &str) -> Vec<u8> {
        self.get(key)
            .unwrap_or_else(|e| FatalConfigError::new("fetch", key, e).raise())
    }

    fn must_get_string(&self, key: &str) -> String {
        String::from_utf8(self.must_get(key)).unwrap_or_else(|e| {
            FatalConfigError::new("parse", key, format!("into a string: {}", e)).raise()
        })
    }

    fn must_get_bool(&self, key: &str) -> bool {
        let raw = self.must_get_string(key);
        parse::parse_bool(&raw).unwrap_or_else(|| {
            FatalConfigError::new("parse", key, format!("into a bool: {:?}", raw)).raise()
        })
    }

    fn must_get_int(&self, key: &str) -> i64 {
        let raw = self.must_get_string(key);
        raw.parse().unwrap_or_else(|e| {
            FatalConfigError::new("parse", key, format!("into an int: {}", e)).raise()
        })
    }

    fn must_get_duration(&self, key: &str) -> Duration {
        let raw = self.must_get_string(key);
        parse::parse_duration(&raw).unwrap_or_else(|e| {
            FatalConfigError::new("parse", key, format!("into a duration: {}", e)).raise()
        })
    }
}
