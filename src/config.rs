use crate::errors::ConfigError;
use crate::fetch::{FileSource, OrderSource, WebhookSource};
use chrono::Utc;
use std::{env, path::PathBuf, sync::Arc, time::Duration};
use url::Url;

pub const DEFAULT_WEBHOOK_URL: &str = "https://n8n.gabrielpicanco.site/webhook/bolos-semana";

pub const DEFAULT_PROXIES: [&str; 3] = [
    "https://cors-anywhere.herokuapp.com/",
    "https://api.allorigins.win/raw?url=",
    "https://corsproxy.io/?",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub webhook_url: Url,
    pub proxies: Vec<String>,
    pub orders_file: Option<PathBuf>,
    pub poll_interval: Duration,
    pub auto_refresh: bool,
    pub fetch_timeout: Duration,
    // Process start time in epoch milliseconds.
    pub app_version: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let raw_url = lookup("WEBHOOK_URL").unwrap_or_else(|| DEFAULT_WEBHOOK_URL.to_string());
        let webhook_url = Url::parse(&raw_url).map_err(|source| ConfigError::InvalidWebhookUrl {
            value: raw_url.clone(),
            source,
        })?;

        let proxies = match lookup("CORS_PROXIES") {
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|proxy| !proxy.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_PROXIES.iter().map(|proxy| proxy.to_string()).collect(),
        };

        let orders_file = lookup("ORDERS_FILE")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        let poll_secs = lookup("POLL_INTERVAL_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(300);
        if poll_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        let auto_refresh = lookup("AUTO_REFRESH")
            .map(|value| parse_flag(&value))
            .unwrap_or(true);

        let fetch_timeout = lookup("FETCH_TIMEOUT_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Self {
            port,
            webhook_url,
            proxies,
            orders_file,
            poll_interval: Duration::from_secs(poll_secs),
            auto_refresh,
            fetch_timeout: Duration::from_secs(fetch_timeout),
            app_version: Utc::now().timestamp_millis(),
        })
    }

    pub fn order_source(&self) -> Result<Arc<dyn OrderSource>, ConfigError> {
        if let Some(path) = &self.orders_file {
            return Ok(Arc::new(FileSource::new(path.clone())));
        }

        let source = WebhookSource::new(
            self.webhook_url.clone(),
            self.app_version,
            self.proxies.clone(),
            self.fetch_timeout,
        )?;
        Ok(Arc::new(source))
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "off" | "no"
    )
}
