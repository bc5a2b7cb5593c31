use crate::backend::{ChatBackend, ChatRequest, PhotoRequest, PhotoResponse};
use crate::config::Config;
use crate::error::BackendError;
use async_trait::async_trait;
use std::time::Duration;

#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    chat_url: String,
    photo_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            chat_url: join_url(&config.base_url, &config.chat_path),
            photo_url: join_url(&config.base_url, &config.photo_path),
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    pub fn photo_url(&self) -> &str {
        &self.photo_url
    }

    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response, BackendError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                endpoint: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(BackendError::Status {
                endpoint: url.to_string(),
                status: response.status(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String, BackendError> {
        log::debug!(
            "POST {} with {} messages",
            self.chat_url,
            request.messages.len()
        );
        let response = self.post_json(&self.chat_url, request).await?;
        response
            .text()
            .await
            .map_err(|source| BackendError::Transport {
                endpoint: self.chat_url.clone(),
                source,
            })
    }

    async fn photo(&self, request: &PhotoRequest) -> Result<PhotoResponse, BackendError> {
        log::debug!("POST {} prompt={:?}", self.photo_url, request.prompt);
        let response = self.post_json(&self.photo_url, request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| BackendError::Transport {
                endpoint: self.photo_url.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|source| BackendError::Decode {
            endpoint: self.photo_url.clone(),
            source,
        })
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::join_url;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("http://host:5000/", "/chat"), "http://host:5000/chat");
        assert_eq!(join_url("http://host:5000", "api/chat"), "http://host:5000/api/chat");
        assert_eq!(join_url("http://host", ""), "http://host");
    }
}
