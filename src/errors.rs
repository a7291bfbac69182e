use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("webhook not found (404): {0}")]
    NotFound(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to read orders file: {0}")]
    Io(#[from] std::io::Error),

    #[error("no endpoints configured")]
    NoEndpoints,
}

impl FetchError {
    pub fn user_message(&self) -> String {
        match self {
            FetchError::NotFound(_) => "Webhook não encontrado. Verifique se a URL está correta e se o webhook está ativo no n8n.".to_string(),
            FetchError::Transport { source, .. } if source.is_connect() || source.is_timeout() => {
                "Falha na conexão. Verifique sua internet e se o servidor está funcionando."
                    .to_string()
            }
            other => format!("Erro: {other}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid WEBHOOK_URL {value:?}: {source}")]
    InvalidWebhookUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("POLL_INTERVAL_SECS must be greater than zero")]
    ZeroPollInterval,

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
