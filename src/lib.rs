//! Client-side layer in front of Consul: service lookup with a TTL cache and
//! random balancing, plus JSON config import into the KV store and cached reads.
pub mod balancer;
pub mod client_error;
pub mod config;
pub mod consul;

pub use balancer::{Balancer, ServiceLocation};
pub use client_error::{ClientError, FatalConfigError};
pub use config::Loader;
