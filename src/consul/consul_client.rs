//Consul HTTP 客户端，同时实现 Registry 和 KvStore
use super::{ConsulConfig, KvPair, KvStore, Registry};
use crate::balancer::ServiceLocation;
use crate::client_error::ClientError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Method, RequestBuilder, StatusCode, Url};

#[derive(Clone)]
pub struct ConsulClient {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    datacenter: Option<String>,
}

impl ConsulClient {
    pub fn new(config: ConsulConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::ClientBuilder::new();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("Could not create consul client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.address,
            token: config.token,
            datacenter: config.datacenter,
        })
    }

    fn request<'a, I>(&self, method: Method, segments: I) -> RequestBuilder
    where
        I: IntoIterator<Item = &'a str>,
    {
        //Url样例：http://127.0.0.1:8500/v1/health/service/web?passing=true&tag=dev
        // 每段单独做百分号编码，key 里的 '#' '?' 不会截断路径
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("v1").extend(segments);
        }
        let mut req = self.client.request(method, url);
        if let Some(dc) = &self.datacenter {
            req = req.query(&[("dc", dc)]);
        }
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send(req: RequestBuilder, context: &str) -> Result<(StatusCode, String), ClientError> {
        let resp = req
            .send()
            .await
            .map_err(|e| ClientError::transport(context, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            ClientError::Upstream(status, format!("Failed to read response: {}", e))
        })?;
        Ok((status, body))
    }
}

// KV key 中的 '/' 是层级分隔，按段编码
fn kv_path(key: &str) -> impl Iterator<Item = &str> {
    std::iter::once("kv").chain(key.split('/'))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HealthEntry {
    node: NodeEntry,
    service: ServiceEntry,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NodeEntry {
    #[serde(default)]
    address: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ServiceEntry {
    #[serde(default)]
    address: String,
    #[serde(default)]
    port: u16,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
struct KvEntry {
    key: String,
    value: Option<String>,
}

impl HealthEntry {
    fn into_location(self) -> ServiceLocation {
        // 服务未单独注册地址时使用节点地址
        let host = if self.service.address.is_empty() {
            self.node.address
        } else {
            self.service.address
        };
        ServiceLocation::new(host, self.service.port)
    }
}

#[async_trait]
impl Registry for ConsulClient {
    async fn healthy_instances(
        &self,
        service: &str,
        tag: &str,
    ) -> Result<Vec<ServiceLocation>, ClientError> {
        let mut req = self
            .request(Method::GET, ["health", "service", service])
            .query(&[("passing", "true")]);
        if !tag.is_empty() {
            req = req.query(&[("tag", tag)]);
        }

        let (status, body) =
            Self::send(req, "Error reaching consul for service lookup").await?;
        match status {
            StatusCode::OK => {
                let entries: Vec<HealthEntry> = serde_json::from_str(&body).map_err(|e| {
                    ClientError::Upstream(status, format!("Invalid health response: {}", e))
                })?;
                Ok(entries.into_iter().map(HealthEntry::into_location).collect())
            }
            _ => Err(ClientError::Upstream(status, body)),
        }
    }
}

#[async_trait]
impl KvStore for ConsulClient {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), ClientError> {
        let req = self
            .request(Method::PUT, kv_path(key))
            .body(value.to_vec());

        let (status, body) = Self::send(req, "Could not write key to consul").await?;
        match status {
            // consul 写入被拒绝时返回 200 + "false"
            StatusCode::OK if body.trim() == "false" => Err(ClientError::Upstream(
                status,
                format!("Consul rejected write for key {}", key),
            )),
            StatusCode::OK => Ok(()),
            _ => Err(ClientError::Upstream(status, format!("{} - {}", body, key))),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<KvPair>, ClientError> {
        let req = self
            .request(Method::GET, kv_path(prefix))
            .query(&[("recurse", "true")]);

        let (status, body) = Self::send(req, "Could not pull config from consul").await?;
        match status {
            StatusCode::OK => {
                let entries: Vec<KvEntry> = serde_json::from_str(&body).map_err(|e| {
                    ClientError::Upstream(status, format!("Invalid kv response: {}", e))
                })?;
                entries
                    .into_iter()
                    .map(|entry| -> Result<KvPair, ClientError> {
                        let value = match entry.value {
                            Some(encoded) => STANDARD.decode(encoded).map_err(|e| {
                                ClientError::Upstream(
                                    status,
                                    format!("Invalid value for key {}: {}", entry.key, e),
                                )
                            })?,
                            None => Vec::new(),
                        };
                        Ok(KvPair {
                            key: entry.key,
                            value,
                        })
                    })
                    .collect()
            }
            // 前缀下没有任何 key
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            _ => Err(ClientError::Upstream(status, body)),
        }
    }
}
