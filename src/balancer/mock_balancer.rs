use super::{Balancer, ServiceLocation};
use crate::client_error::ClientError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Fixture balancer for tests of code that depends on a [`Balancer`].
#[derive(Debug, Clone, Default)]
pub struct MockBalancer {
    services: HashMap<String, ServiceLocation>,
}

impl MockBalancer {
    pub fn new(services: HashMap<String, ServiceLocation>) -> Self {
        Self { services }
    }

    pub fn with_service(mut self, service: &str, location: ServiceLocation) -> Self {
        self.services.insert(service.to_string(), location);
        self
    }
}

#[async_trait]
impl Balancer for MockBalancer {
    async fn find_service(&self, service: &str) -> Result<ServiceLocation, ClientError> {
        self.services
            .get(service)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("Could not find {}", service)))
    }
}
