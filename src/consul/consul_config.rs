use crate::client_error::ClientError;
use crate::config::parse::parse_bool;
use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8500";
pub const ADDR_ENV: &str = "CONSUL_HTTP_ADDR";
pub const TOKEN_ENV: &str = "CONSUL_HTTP_TOKEN";
pub const SSL_ENV: &str = "CONSUL_HTTP_SSL";
pub const DATACENTER_ENV: &str = "CONSUL_DATACENTER";

#[derive(Debug, Clone)]
pub struct ConsulConfig {
    pub address: Url,
    pub token: Option<String>,
    pub datacenter: Option<String>,
    //默认不设超时，由调用方决定
    pub timeout: Option<Duration>,
}

impl ConsulConfig {
    pub fn new(address: &str) -> Result<Self, ClientError> {
        Ok(Self {
            address: parse_address(address, false)?,
            token: None,
            datacenter: None,
            timeout: None,
        })
    }

    /// Local agent at [`DEFAULT_ADDRESS`].
    pub fn local() -> Result<Self, ClientError> {
        Self::new(DEFAULT_ADDRESS)
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConsulConfig::from_env`] with the variable source passed in.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_tls = match lookup(SSL_ENV) {
            Some(v) => parse_bool(&v)
                .ok_or_else(|| ClientError::Config(format!("Invalid {} value: {}", SSL_ENV, v)))?,
            None => false,
        };
        let address = lookup(ADDR_ENV)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

        Ok(Self {
            address: parse_address(&address, use_tls)?,
            token: lookup(TOKEN_ENV).filter(|v| !v.is_empty()),
            datacenter: lookup(DATACENTER_ENV).filter(|v| !v.is_empty()),
            timeout: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_datacenter(mut self, datacenter: impl Into<String>) -> Self {
        self.datacenter = Some(datacenter.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// Accepts "host:port" as well as a full URL. The path always ends in '/'
// so endpoint paths can be appended.
fn parse_address(raw: &str, use_tls: bool) -> Result<Url, ClientError> {
    let full = if raw.contains("://") {
        raw.to_string()
    } else if use_tls {
        format!("https://{}", raw)
    } else {
        format!("http://{}", raw)
    };
    let mut url = Url::parse(&full)
        .map_err(|e| ClientError::Config(format!("Invalid consul address {}: {}", raw, e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
