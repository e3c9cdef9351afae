use super::{KvPair, KvStore};
use crate::client_error::ClientError;
use async_trait::async_trait;
use dashmap::DashMap;

/// In-process [`KvStore`], for tests and dry-run imports.
#[derive(Default)]
pub struct MemoryKv {
    data: DashMap<String, Vec<u8>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.data.remove(key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), ClientError> {
        self.data.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<KvPair>, ClientError> {
        let mut pairs: Vec<KvPair> = self
            .data
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| KvPair {
                key: entry.key().clone(),
                value: entry.value().clone(),
            })
            .collect();
        pairs.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(pairs)
    }
}
