use crate::errors::FetchError;
use crate::models::RawOrder;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use std::{path::PathBuf, time::Duration};
use tokio::fs;
use tracing::{info, warn};
use url::{Url, form_urlencoded};

#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_orders(&self) -> Result<Vec<RawOrder>, FetchError>;

    fn describe(&self) -> String;
}

pub struct WebhookSource {
    client: Client,
    url: Url,
    proxies: Vec<String>,
}

impl WebhookSource {
    pub fn new(
        mut url: Url,
        app_version: i64,
        proxies: Vec<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        url.query_pairs_mut()
            .append_pair("v", &app_version.to_string());
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url,
            proxies,
        })
    }

    pub fn attempt_urls(&self) -> Vec<String> {
        let encoded: String = form_urlencoded::byte_serialize(self.url.as_str().as_bytes()).collect();
        std::iter::once(self.url.to_string())
            .chain(self.proxies.iter().map(|proxy| format!("{proxy}{encoded}")))
            .collect()
    }

    async fn fetch_from(&self, target: &str) -> Result<Vec<RawOrder>, FetchError> {
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: target.to_string(),
            source,
        };

        let response = self
            .client
            .get(target)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(self.url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: target.to_string(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        decode_orders(&body)
    }
}

#[async_trait]
impl OrderSource for WebhookSource {
    async fn fetch_orders(&self) -> Result<Vec<RawOrder>, FetchError> {
        let mut last_error = None;

        for (attempt, target) in self.attempt_urls().iter().enumerate() {
            let via = if attempt == 0 { "direct" } else { "proxy" };
            info!(attempt = attempt + 1, via, url = %target, "fetching orders");

            match self.fetch_from(target).await {
                Ok(orders) => {
                    info!(attempt = attempt + 1, count = orders.len(), "orders received");
                    return Ok(orders);
                }
                Err(err) => {
                    warn!(attempt = attempt + 1, via, "fetch attempt failed: {err}");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(FetchError::NoEndpoints))
    }

    fn describe(&self) -> String {
        format!("webhook {} ({} proxies)", self.url, self.proxies.len())
    }
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl OrderSource for FileSource {
    async fn fetch_orders(&self) -> Result<Vec<RawOrder>, FetchError> {
        let bytes = fs::read(&self.path).await?;
        decode_orders(&bytes)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

// Elements that do not fit `RawOrder` are dropped; only a non-array body fails.
pub fn decode_orders(bytes: &[u8]) -> Result<Vec<RawOrder>, FetchError> {
    let values: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;
    let total = values.len();

    let orders: Vec<RawOrder> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(order) => Some(order),
            Err(err) => {
                warn!(index, "dropping undecodable order: {err}");
                None
            }
        })
        .collect();

    if orders.len() < total {
        warn!(dropped = total - orders.len(), total, "some orders could not be decoded");
    }
    Ok(orders)
}
