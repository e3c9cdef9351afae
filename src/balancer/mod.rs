//! Service location lookup. A [`Balancer`] turns a logical service name into
//! one reachable endpoint; which backend answers is chosen at construction.
pub mod location_cache;
pub mod map_balancer;
pub mod mock_balancer;
pub mod random_balancer;
#[cfg(test)]
mod test_registry;

use crate::client_error::ClientError;
use async_trait::async_trait;
use reqwest::Url;

pub use location_cache::LocationCache;
pub use map_balancer::MapBalancer;
pub use mock_balancer::MockBalancer;
pub use random_balancer::RandomBalancer;

/// Where one instance of a service lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceLocation {
    pub host: String,
    pub port: Option<u16>,
}

impl ServiceLocation {
    /// Port `0` means "not registered" and is stored as `None`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port: (port != 0).then_some(port),
        }
    }

    /// Renders `scheme://host[:port]`, bracketing IPv6 hosts.
    pub fn to_url(&self, use_tls: bool) -> Result<Url, ClientError> {
        let scheme = if use_tls { "https" } else { "http" };
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        // host 和 port 分别设置，host 中的 '/' '@' '?' 不会被当成路径或认证信息
        let invalid =
            |reason: String| ClientError::InvalidLocation(format!("{}: {}", self.host, reason));
        let mut url = Url::parse(&format!("{}://placeholder", scheme))
            .map_err(|e| invalid(e.to_string()))?;
        url.set_host(Some(&host)).map_err(|e| invalid(e.to_string()))?;
        if let Some(port) = self.port.filter(|p| *p != 0) {
            url.set_port(Some(port))
                .map_err(|_| invalid(format!("cannot set port {}", port)))?;
        }
        Ok(url)
    }
}

#[async_trait]
pub trait Balancer: Send + Sync {
    async fn find_service(&self, service: &str) -> Result<ServiceLocation, ClientError>;

    async fn http_url(&self, service: &str, use_tls: bool) -> Result<Url, ClientError> {
        let location = self.find_service(service).await?;
        location.to_url(use_tls)
    }
}
