/// HTTP download of source media.
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

use crate::source::SourceError;

#[derive(Clone)]
pub struct MediaFetcher {
    client: reqwest::Client,
}

/// Accept only absolute http(s) URLs.
pub fn parse_url(raw: &str) -> Result<Url, SourceError> {
    let url = Url::parse(raw.trim()).map_err(|_| SourceError::InvalidUrl(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(SourceError::InvalidUrl(raw.to_string())),
    }
}

impl MediaFetcher {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("matrix-player/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch(&self, url: Url) -> Result<Vec<u8>, SourceError> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        debug!("Fetched {} bytes", body.len());
        Ok(body.to_vec())
    }
}
