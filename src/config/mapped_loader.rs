use super::{parse, Loader};
use crate::client_error::{ClientError, FatalConfigError};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Loader over an in-memory map built from a JSON object. Each top-level field
/// is kept as raw JSON and typed accessors decode it, so `"port": 8080` reads
/// back with `must_get_int("port")`. No remote store is involved.
#[derive(Default)]
pub struct MappedLoader {
    data: RwLock<HashMap<String, Vec<u8>>>,
}

impl MappedLoader {
    pub fn new(data: &[u8]) -> Result<Self, ClientError> {
        Ok(Self {
            data: RwLock::new(parse_document(data)?),
        })
    }

    fn must_decode<T: DeserializeOwned>(&self, key: &str, kind: &str) -> T {
        let raw = self.must_get(key);
        serde_json::from_slice(&raw).unwrap_or_else(|e| {
            FatalConfigError::new("unmarshal", key, format!("into {}: {}", kind, e)).raise()
        })
    }
}

fn parse_document(data: &[u8]) -> Result<HashMap<String, Vec<u8>>, ClientError> {
    let conf: Map<String, Value> = serde_json::from_slice(data).map_err(ClientError::Parse)?;
    conf.into_iter()
        .map(|(key, value)| -> Result<(String, Vec<u8>), ClientError> {
            let raw = serde_json::to_vec(&value).map_err(|e| ClientError::Encoding(key.clone(), e))?;
            Ok((key, raw))
        })
        .collect()
}

#[async_trait]
impl Loader for MappedLoader {
    async fn import(&self, data: &[u8]) -> Result<(), ClientError> {
        let conf = parse_document(data)?;
        *self.data.write() = conf;
        Ok(())
    }

    async fn initialize(&self) -> Result<(), ClientError> {
        //noop
        Ok(())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), ClientError> {
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, ClientError> {
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Could not find value for key: {}", key)))
    }

    fn must_get_string(&self, key: &str) -> String {
        self.must_decode(key, "a string")
    }

    fn must_get_bool(&self, key: &str) -> bool {
        self.must_decode(key, "a bool")
    }

    fn must_get_int(&self, key: &str) -> i64 {
        self.must_decode(key, "an int")
    }

    fn must_get_duration(&self, key: &str) -> Duration {
        let raw = self.must_get_string(key);
        parse::parse_duration(&raw).unwrap_or_else(|e| {
            FatalConfigError::new("parse", key, format!("into a duration: {}", e)).raise()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &[u8] = br#"{
        "name": "orders",
        "debug": true,
        "workers": 8,
        "timeout": "5s",
        "db": {"host": "db.internal"}
    }"#;

    #[test]
    fn test_typed_reads() {
        let loader = MappedLoader::new(DOC).unwrap();

        assert_eq!(loader.must_get_string("name"), "orders");
        assert!(loader.must_get_bool("debug"));
        assert_eq!(loader.must_get_int("workers"), 8);
        assert_eq!(loader.must_get_duration("timeout"), Duration::from_secs(5));
        // 嵌套对象保持原始 JSON
        assert_eq!(loader.get("db").unwrap(), br#"{"host":"db.internal"}"#.to_vec());
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            MappedLoader::new(b"not json"),
            Err(ClientError::Parse(_))
        ));
    }

    #[actix_rt::test]
    async fn test_import_replaces_and_put_adds() {
        let loader = MappedLoader::new(DOC).unwrap();
        loader.import(br#"{"name": "billing"}"#).await.unwrap();
        loader.put("region", br#""eu-west-1""#).await.unwrap();

        assert_eq!(loader.must_get_string("name"), "billing");
        assert_eq!(loader.must_get_string("region"), "eu-west-1");
        assert!(loader.get("workers").unwrap_err().is_not_found());
    }

    #[test]
    #[should_panic(expected = "Could not unmarshal config (name) into a bool")]
    fn test_wrong_type_is_fatal() {
        let loader = MappedLoader::new(DOC).unwrap();
        loader.must_get_bool("name");
    }

    #[test]
    #[should_panic(expected = "Could not fetch config (missing)")]
    fn test_missing_is_fatal() {
        let loader = MappedLoader::default();
        loader.must_get_string("missing");
    }
}
