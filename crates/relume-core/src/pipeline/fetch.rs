//! Source image fetching over HTTP.

use std::time::Duration;

use crate::config::{HttpConfig, LimitsConfig};
use crate::error::{ConfigError, EnhanceError};

/// HTTP fetcher for source images, with timeout and size limits.
#[derive(Debug)]
pub struct ImageFetcher {
    client: reqwest::Client,
    limits: LimitsConfig,
}

impl ImageFetcher {
    /// Create a fetcher with the given limits and HTTP settings.
    ///
    /// Fails if the HTTP client cannot be built — e.g. a configured user
    /// agent that is not a valid header value. Falling back to a default
    /// client here would silently drop the configured timeout.
    pub fn new(limits: LimitsConfig, http: &HttpConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(http.user_agent.clone())
            .timeout(Duration::from_millis(limits.fetch_timeout_ms))
            .build()
            .map_err(|e| ConfigError::ValidationError(format!("Cannot build HTTP client: {e}")))?;
        Ok(Self { client, limits })
    }

    /// Fetch the raw bytes of a source image.
    ///
    /// Network failures, non-2xx statuses, and oversized bodies all come
    /// back as errors; the orchestrator decides whether to degrade.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, EnhanceError> {
        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| EnhanceError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        // Reject early when the server declares an oversized body.
        if let Some(length) = response.content_length() {
            if length > max_bytes {
                return Err(EnhanceError::TooLarge {
                    url: url.to_string(),
                    size_mb: length / (1024 * 1024),
                    max_mb: self.limits.max_file_size_mb,
                });
            }
        }

        let bytes = response.bytes().await.map_err(|e| EnhanceError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if bytes.len() as u64 > max_bytes {
            return Err(EnhanceError::TooLarge {
                url: url.to_string(),
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        tracing::trace!(url, size = bytes.len(), "fetched source image");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;

    fn fetcher() -> ImageFetcher {
        ImageFetcher::new(LimitsConfig::default(), &HttpConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_url_is_fetch_error() {
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, EnhanceError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_error_carries_url() {
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_invalid_user_agent_rejected() {
        let http = HttpConfig {
            user_agent: "bad\nagent".to_string(),
        };
        let err = ImageFetcher::new(LimitsConfig::default(), &http).unwrap_err();
        assert!(err.to_string().contains("HTTP client"));
    }
}
