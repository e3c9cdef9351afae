//Consul 协作方：服务注册表查询 + KV 存储
pub mod consul_client;
pub mod consul_config;
pub mod memory_kv;
#[cfg(test)]
mod test_consul;

use crate::balancer::ServiceLocation;
use crate::client_error::ClientError;
use async_trait::async_trait;

pub use consul_client::ConsulClient;
pub use consul_config::ConsulConfig;
pub use memory_kv::MemoryKv;

/// Source of health-checked instances for a service name.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Instances that currently pass their health checks, filtered by `tag`
    /// when it is not empty. An unknown service yields an empty list.
    async fn healthy_instances(
        &self,
        service: &str,
        tag: &str,
    ) -> Result<Vec<ServiceLocation>, ClientError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPair {
    pub key: String,
    pub value: Vec<u8>,
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), ClientError>;

    async fn list(&self, prefix: &str) -> Result<Vec<KvPair>, ClientError>;
}
