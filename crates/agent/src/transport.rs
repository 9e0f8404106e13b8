use async_trait::async_trait;
use reqwest::Client;
use shopdesk_core::config::BackendConfig;
use shopdesk_core::{ApiResponse, ChatRequest, TransportError};
use tracing::debug;

const STATUS_BODY_LIMIT: usize = 256;

/// The single network round trip behind a chat turn.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ApiResponse, TransportError>;
}

#[derive(Clone, Debug)]
pub struct HttpChatTransport {
    client: Client,
    chat_url: String,
    health_url: String,
}

impl HttpChatTransport {
    pub fn new(chat_url: impl Into<String>, health_url: impl Into<String>) -> Self {
        Self { client: Client::new(), chat_url: chat_url.into(), health_url: health_url.into() }
    }

    pub fn from_config(backend: &BackendConfig) -> Self {
        Self::new(backend.chat_url(), backend.health_url())
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }

    /// GETs the health endpoint and returns the status code on 2xx.
    pub async fn probe_health(&self) -> Result<u16, TransportError> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status: status.as_u16(), body: clip(&body) });
        }

        Ok(status.as_u16())
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ApiResponse, TransportError> {
        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(|error| TransportError::Connect(error.to_string()))?;

        let status = response.status();
        let body =
            response.bytes().await.map_err(|error| TransportError::Connect(error.to_string()))?;
        debug!(
            event_name = "chat.transport.response_received",
            status = status.as_u16(),
            body_bytes = body.len(),
            "backend responded"
        );

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: clip(&String::from_utf8_lossy(&body)),
            });
        }

        serde_json::from_slice::<ApiResponse>(&body)
            .map_err(|error| TransportError::Decode(error.to_string()))
    }
}

fn clip(body: &str) -> String {
    body.chars().take(STATUS_BODY_LIMIT).collect()
}
