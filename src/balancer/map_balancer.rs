use super::{Balancer, ServiceLocation};
use crate::client_error::ClientError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Fixed `name -> "host:port"` table, for setups without a registry.
#[derive(Debug, Clone, Default)]
pub struct MapBalancer {
    services: HashMap<String, String>,
}

impl MapBalancer {
    pub fn new(services: HashMap<String, String>) -> Self {
        Self { services }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapBalancer {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[async_trait]
impl Balancer for MapBalancer {
    async fn find_service(&self, service: &str) -> Result<ServiceLocation, ClientError> {
        let address = self
            .services
            .get(service)
            .ok_or_else(|| ClientError::NotFound(format!("Could not find {}", service)))?;

        split_host_port(address).ok_or_else(|| {
            ClientError::NotFound(format!(
                "Malformed address for {}: {} (expected host:port)",
                service, address
            ))
        })
    }
}

// "host:port" 或 "[v6]:port"
fn split_host_port(address: &str) -> Option<ServiceLocation> {
    let (host, port) = address.rsplit_once(':')?;
    let host = match host.strip_prefix('[') {
        Some(inner) => inner.strip_suffix(']')?,
        None if host.contains(':') => return None,
        None => host,
    };
    if host.is_empty() {
        return None;
    }
    let port: u16 = port.parse().ok()?;
    Some(ServiceLocation::new(host, port))
}
