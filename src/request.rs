use std::future::Future;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{Config, HEALTH_CHECK_PATH, LATEST_DOCUMENT_PATH};
use crate::types::TelemetryDocument;

/// Every failure collapses into one of these, and `Display` is the message shown in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("Network error - please check your connection and try again")]
    Network,
    #[error("An unexpected error occurred")]
    Unexpected,
    #[error("Invalid response format from server")]
    MalformedResponse,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
    message: Option<Value>,
}

impl FetchError {
    pub fn from_server_response(status: StatusCode, body: &[u8]) -> Self {
        let body = serde_json::from_slice::<ErrorBody>(body).unwrap_or_default();
        let message = [body.detail, body.message]
            .into_iter()
            .flatten()
            .find_map(|field| match field {
                Value::String(message) if !message.is_empty() => Some(message),
                _ => None,
            })
            .unwrap_or_else(|| format!("Server error ({})", status.as_u16()));

        Self::Server {
            status: status.as_u16(),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_builder() || err.is_redirect() || err.is_decode() {
            Self::Unexpected
        } else {
            Self::Network
        }
    }
}

pub trait DocumentSource {
    fn fetch_latest(&self) -> impl Future<Output = Result<TelemetryDocument, FetchError>>;
}

#[derive(Debug, Clone)]
pub struct HttpDocumentClient {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    health_check_timeout: Duration,
}

impl HttpDocumentClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            request_timeout: config.request_timeout,
            health_check_timeout: config.health_check_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health_check(&self) -> bool {
        let url = format!("{}{HEALTH_CHECK_PATH}", self.base_url);
        debug!("GET {url}");

        let request = self.client.get(&url).timeout(self.health_check_timeout);

        match request.send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                error!("health check failed: status={}", response.status());
                false
            }
            Err(err) => {
                error!("health check failed: {err}");
                false
            }
        }
    }
}

impl DocumentSource for HttpDocumentClient {
    async fn fetch_latest(&self) -> Result<TelemetryDocument, FetchError> {
        let url = format!("{}{LATEST_DOCUMENT_PATH}", self.base_url);
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| {
                error!("no response from {url}: {err}");
                FetchError::from_transport(&err)
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            error!("failed to read response body from {url}: {err}");
            FetchError::from_transport(&err)
        })?;

        debug!("response from {url}: status={status}");

        if !status.is_success() {
            error!(
                "api error {status}: {}",
                String::from_utf8_lossy(&body).trim()
            );
            return Err(FetchError::from_server_response(status, &body));
        }

        let document = parse_document(&body)?;
        info!("fetched document id={:?}", document.id);

        Ok(document)
    }
}

pub fn parse_document(body: &[u8]) -> Result<TelemetryDocument, FetchError> {
    let Ok(Value::Object(object)) = serde_json::from_slice::<Value>(body) else {
        error!("response is not a json object");
        return Err(FetchError::MalformedResponse);
    };

    let document = TelemetryDocument::from(object);
    let missing = document.missing_fields();
    if !missing.is_empty() {
        warn!("response missing expected fields: {}", missing.join(", "));
    }

    Ok(document)
}
