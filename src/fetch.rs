use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::settings::Settings;

/// Anything that can turn a URL into an HTML body.
pub trait PageSource: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Plain GET over reqwest. Non-success statuses are logged, not raised: the
/// body is handed to the parser either way.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(&settings.user_agent);
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            warn!("{} answered {}", url, status);
        }

        let body = resp
            .text()
            .await
            .with_context(|| format!("Failed to read body of {url}"))?;
        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}
