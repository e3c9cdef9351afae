use super::flattener::DIVIDER;
use super::{KeyFlattener, KeyLayout, Loader};
use crate::client_error::ClientError;
use crate::consul::{ConsulClient, ConsulConfig, KvStore};
use async_trait::async_trait;
use log::info;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Loader that imports into a KV store under `namespace` and serves reads
/// from a snapshot of that namespace taken by [`Loader::initialize`].
pub struct CachedLoader {
    namespace: String,
    store: Arc<dyn KvStore>,
    flattener: KeyFlattener,
    cache: RwLock<HashMap<String, Vec<u8>>>,
}

impl CachedLoader {
    pub fn new(namespace: impl Into<String>, store: Arc<dyn KvStore>) -> Self {
        Self {
            namespace: namespace.into(),
            store,
            flattener: KeyFlattener::default(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn consul(namespace: impl Into<String>, config: ConsulConfig) -> Result<Self, ClientError> {
        let client = ConsulClient::new(config)?;
        Ok(Self::new(namespace, Arc::new(client)))
    }

    pub fn with_layout(mut self, layout: KeyLayout) -> Self {
        self.flattener = KeyFlattener::new(layout);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // "dev/config" 只匹配 "dev/config/..."，不匹配 "dev/configuration/..."
    fn list_prefix(&self) -> String {
        let namespace = self.namespace.trim_end_matches(DIVIDER);
        if namespace.is_empty() {
            String::new()
        } else {
            format!("{}{}", namespace, DIVIDER)
        }
    }

    /// Keys of the current snapshot, sorted.
    pub fn keys(&self) -> Vec<String> {
        let cache = self.cache.read();
        let mut keys: Vec<String> = cache.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Loader for CachedLoader {
    async fn import(&self, data: &[u8]) -> Result<(), ClientError> {
        // 先完整展开，展开失败时不写入任何 key
        let flat = self.flattener.flatten_bytes(data, &self.namespace)?;
        for (key, value) in &flat {
            self.store.put(key, value).await?;
        }
        info!(
            "[Import] wrote {} keys under namespace {:?}",
            flat.len(),
            self.namespace
        );
        Ok(())
    }

    async fn initialize(&self) -> Result<(), ClientError> {
        let pairs = self.store.list(&self.list_prefix()).await?;
        let snapshot: HashMap<String, Vec<u8>> =
            pairs.into_iter().map(|pair| (pair.key, pair.value)).collect();
        let count = snapshot.len();

        *self.cache.write() = snapshot;
        info!(
            "[Config] loaded {} keys from namespace {:?}",
            count, self.namespace
        );
        Ok(())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), ClientError> {
        self.store.put(key, value).await?;
        self.cache.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, ClientError> {
        self.cache
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Could not find value for key: {}", key)))
    }
}
