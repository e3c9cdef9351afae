use super::{Balancer, LocationCache, ServiceLocation};
use crate::client_error::ClientError;
use crate::consul::{ConsulClient, ConsulConfig};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Picks one of the registry's healthy instances uniformly at random.
pub struct RandomBalancer {
    cache: LocationCache,
    rng: Mutex<StdRng>,
}

impl RandomBalancer {
    /// Seeds the random source from the clock.
    pub fn new(cache: LocationCache) -> Self {
        Self::with_rng(cache, StdRng::seed_from_u64(clock_seed()))
    }

    pub fn with_rng(cache: LocationCache, rng: StdRng) -> Self {
        Self {
            cache,
            rng: Mutex::new(rng),
        }
    }

    /// Balancer backed by the Consul health endpoint, filtered by `environment` tag.
    pub fn consul(
        config: ConsulConfig,
        environment: &str,
        cache_ttl: Duration,
    ) -> Result<Self, ClientError> {
        let client = ConsulClient::new(config)?;
        Ok(Self::new(LocationCache::new(
            Arc::new(client),
            environment,
            cache_ttl,
        )))
    }

    pub fn cache(&self) -> &LocationCache {
        &self.cache
    }

    fn pick(&self, locations: &[ServiceLocation]) -> ServiceLocation {
        let index = self.rng.lock().gen_range(0..locations.len());
        locations[index].clone()
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

#[async_trait]
impl Balancer for RandomBalancer {
    async fn find_service(&self, service: &str) -> Result<ServiceLocation, ClientError> {
        //缓存中的列表不会为空
        let locations = self.cache.resolve(service).await?;
        Ok(self.pick(&locations))
    }
}
