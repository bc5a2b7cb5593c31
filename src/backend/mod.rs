use crate::chat::Message;
use crate::error::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod http;

pub use http::HttpBackend;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub girl_id: Option<String>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub girl_id: Option<String>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pose: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PhotoResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<PhotoData>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PhotoData {
    #[serde(default)]
    pub url: Option<String>,
}

impl PhotoResponse {
    /// Top-level `url` first, then `data[0].url`. Empty strings count as missing.
    pub fn image_url(&self) -> Option<&str> {
        let top_level = self.url.as_deref().filter(|url| !url.is_empty());
        top_level.or_else(|| {
            self.data
                .as_ref()?
                .first()?
                .url
                .as_deref()
                .filter(|url| !url.is_empty())
        })
    }
}

/// The two generation endpoints a session talks to.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Returns the raw reply text on a successful status.
    async fn chat(&self, request: &ChatRequest) -> Result<String, BackendError>;

    async fn photo(&self, request: &PhotoRequest) -> Result<PhotoResponse, BackendError>;
}
