//! Raw paste fetcher for the `TargetSource` seam.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rolecast_core::{FetchError, FetchResult, TargetSource};
use tracing::debug;
use url::Url;

use crate::endpoint::{join, parse_base};
use crate::error::{HttpSetupError, HttpSetupResult};

/// Fetches `{base_url}/{paste_id}` as UTF-8 text.
#[derive(Clone)]
pub struct PasteClient {
    client: Client,
    base_url: Url,
}

impl PasteClient {
    /// Build a fetcher for a raw-content endpoint such as `https://pastebin.com/raw`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is unusable or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> HttpSetupResult<Self> {
        let base_url = parse_base(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rolecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| HttpSetupError::Client { source })?;
        Ok(Self { client, base_url })
    }

    /// URL fetched for `paste_id`.
    #[must_use]
    pub fn url_for(&self, paste_id: &str) -> Url {
        join(&self.base_url, &[paste_id.trim()])
    }
}

#[async_trait]
impl TargetSource for PasteClient {
    async fn fetch_raw(&self, source_id: &str) -> FetchResult<String> {
        let url = self.url_for(source_id);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| FetchError::Request {
                url: url.to_string(),
                source: Box::new(err),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|err| FetchError::Body {
            url: url.to_string(),
            source: Box::new(err),
        })?;
        debug!(url = %url, bytes = body.len(), "fetched paste source");
        Ok(body)
    }
}
