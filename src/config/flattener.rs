//! Turns a nested JSON document into store-ready `key -> bytes` pairs.
//!
//! `{"db": {"host": "x", "port": 5432}}` under namespace `dev` becomes
//! `dev/db/host = x` and `dev/db/port = 5432`.
use crate::client_error::ClientError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DIVIDER: &str = "/";

pub type FlatConfig = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyLayout {
    /// Each leaf value under its full `prefix/path/key`. Strings are stored as
    /// plain text, everything else as JSON text.
    #[default]
    Qualified,
    /// Layout written by the first importer: every leaf is keyed by its bare
    /// field name and holds the JSON of the object containing it. Only useful
    /// to stay compatible with data imported that way.
    Legacy,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyFlattener {
    layout: KeyLayout,
}

impl KeyFlattener {
    pub fn new(layout: KeyLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> KeyLayout {
        self.layout
    }

    /// Parses `data` as a JSON object and flattens it under `namespace`.
    pub fn flatten_bytes(&self, data: &[u8], namespace: &str) -> Result<FlatConfig, ClientError> {
        let root: Map<String, Value> = serde_json::from_slice(data).map_err(ClientError::Parse)?;
        self.flatten(&root, namespace.trim_end_matches(DIVIDER))
    }

    pub fn flatten(&self, object: &Map<String, Value>, prefix: &str) -> Result<FlatConfig, ClientError> {
        let mut result = FlatConfig::new();
        for (key, value) in object {
            match value {
                Value::Object(child) => {
                    //递归后合并，同名 key 后写覆盖
                    let compiled = self.flatten(child, &join(prefix, key))?;
                    result.extend(compiled);
                }
                leaf => {
                    let (store_key, bytes) = match self.layout {
                        KeyLayout::Qualified => {
                            let full = join(prefix, key);
                            let bytes = encode_leaf(&full, leaf)?;
                            (full, bytes)
                        }
                        KeyLayout::Legacy => {
                            let bytes = serde_json::to_vec(object)
                                .map_err(|e| ClientError::Encoding(key.clone(), e))?;
                            (key.clone(), bytes)
                        }
                    };
                    result.insert(store_key, bytes);
                }
            }
        }
        Ok(result)
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, DIVIDER, key)
    }
}

fn encode_leaf(key: &str, value: &Value) -> Result<Vec<u8>, ClientError> {
    match value {
        Value::String(s) => Ok(s.as_bytes().to_vec()),
        other => serde_json::to_vec(other).map_err(|e| ClientError::Encoding(key.to_string(), e)),
    }
}
