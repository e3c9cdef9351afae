//测试用注册表：记录上游调用次数
use crate::balancer::ServiceLocation;
use crate::client_error::ClientError;
use crate::consul::Registry;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
pub struct CountingRegistry {
    instances: Mutex<HashMap<String, Vec<ServiceLocation>>>,
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Duration,
}

impl CountingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn set(&self, service: &str, locations: Vec<ServiceLocation>) {
        self.instances.lock().insert(service.to_string(), locations);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Registry for CountingRegistry {
    async fn healthy_instances(
        &self,
        service: &str,
        _tag: &str,
    ) -> Result<Vec<ServiceLocation>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::Upstream(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Request failed: connection refused".into(),
            ));
        }
        Ok(self
            .instances
            .lock()
            .get(service)
            .cloned()
            .unwrap_or_default())
    }
}
