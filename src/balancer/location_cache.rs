//缓存层实现：服务名 -> 健康实例列表
use super::ServiceLocation;
use crate::client_error::ClientError;
use crate::consul::Registry;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct CacheEntry {
    locations: Arc<[ServiceLocation]>,
    cached_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() < ttl
    }
}

/// Read-through TTL cache of healthy instances per service name.
///
/// A single lock guards the whole map. Refreshes take the write half and keep
/// it for the duration of the registry call, so concurrent misses on a stale
/// name collapse into one upstream lookup. Misses on other names wait behind it.
// TODO: lock per service name so a slow lookup only blocks callers of that name
pub struct LocationCache {
    registry: Arc<dyn Registry>,
    environment: String,
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl LocationCache {
    pub fn new(registry: Arc<dyn Registry>, environment: impl Into<String>, ttl: Duration) -> Self {
        Self {
            registry,
            environment: environment.into(),
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Returns the cached instances for `service`, asking the registry when the
    /// entry is missing or older than the TTL. Failures are never cached.
    pub async fn resolve(&self, service: &str) -> Result<Arc<[ServiceLocation]>, ClientError> {
        if let Some(locations) = self.cached(service).await {
            return Ok(locations);
        }
        self.refresh(service).await
    }

    async fn cached(&self, service: &str) -> Option<Arc<[ServiceLocation]>> {
        let entries = self.entries.read().await;
        entries
            .get(service)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.locations.clone())
    }

    async fn refresh(&self, service: &str) -> Result<Arc<[ServiceLocation]>, ClientError> {
        let mut entries = self.entries.write().await;

        // 等写锁期间可能已有别的调用刷新过
        if let Some(entry) = entries.get(service) {
            if entry.is_fresh(self.ttl) {
                debug!("[Cache] {} refreshed while waiting for lock", service);
                return Ok(entry.locations.clone());
            }
        }

        let start = Instant::now();
        let found = self
            .registry
            .healthy_instances(service, &self.environment)
            .await?;
        if found.is_empty() {
            warn!(
                "[Cache] no healthy instances for {} (env={})",
                service, self.environment
            );
            return Err(ClientError::NotFound(format!(
                "No services found for {}",
                service
            )));
        }

        let locations: Arc<[ServiceLocation]> = found.into();
        entries.insert(
            service.to_string(),
            CacheEntry {
                locations: locations.clone(),
                cached_at: Instant::now(),
            },
        );
        info!(
            "[Cache] refreshed {} with {} instances, took: {:.4}s",
            service,
            locations.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(locations)
    }
}
