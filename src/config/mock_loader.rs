use super::Loader;
use crate::client_error::{ClientError, FatalConfigError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum MockValue {
    Bytes(Vec<u8>),
    String(String),
    Bool(bool),
    Int(i64),
    Duration(Duration),
}

/// Fixture loader holding already-typed values. Reading a key with the wrong
/// accessor is as fatal as reading a missing one.
#[derive(Default)]
pub struct MockLoader {
    data: RwLock<HashMap<String, MockValue>>,
}

impl MockLoader {
    pub fn new(data: HashMap<String, MockValue>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    pub fn with(self, key: &str, value: MockValue) -> Self {
        self.data.write().insert(key.to_string(), value);
        self
    }

    fn lookup(&self, key: &str) -> Option<MockValue> {
        self.data.read().get(key).cloned()
    }
}

fn not_set(key: &str) -> ! {
    FatalConfigError::new("fetch", key, "not set in mock").raise()
}

#[async_trait]
impl Loader for MockLoader {
    async fn import(&self, _data: &[u8]) -> Result<(), ClientError> {
        Ok(())
    }

    async fn initialize(&self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), ClientError> {
        self.data
            .write()
            .insert(key.to_string(), MockValue::Bytes(value.to_vec()));
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, ClientError> {
        match self.lookup(key) {
            Some(MockValue::Bytes(raw)) => Ok(raw),
            _ => Err(ClientError::NotFound(format!("Key ({}) not set in mock.", key))),
        }
    }

    fn must_get_string(&self, key: &str) -> String {
        match self.lookup(key) {
            Some(MockValue::String(v)) => v,
            _ => not_set(key),
        }
    }

    fn must_get_bool(&self, key: &str) -> bool {
        match self.lookup(key) {
            Some(MockValue::Bool(v)) => v,
            _ => not_set(key),
        }
    }

    fn must_get_int(&self, key: &str) -> i64 {
        match self.lookup(key) {
            Some(MockValue::Int(v)) => v,
            _ => not_set(key),
        }
    }

    fn must_get_duration(&self, key: &str) -> Duration {
        match self.lookup(key) {
            Some(MockValue::Duration(v)) => v,
            _ => not_set(key),
        }
    }
}
