use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{ChartEngine, EngineRequest};

/// Engine exposed as an HTTP service: `POST {base_url}/chart`.
pub struct HttpChartEngine {
    client: Client,
    base_url: String,
}

impl HttpChartEngine {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ChartEngine for HttpChartEngine {
    async fn calculate(&self, request: &EngineRequest) -> Result<Value> {
        let url = format!("{}/chart", self.base_url);
        debug!("Chart engine request to {}: {:?}", url, request);

        let res = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to reach chart engine")?
            .error_for_status()
            .context("Chart engine rejected the request")?;

        res.json::<Value>()
            .await
            .context("Chart engine returned invalid JSON")
    }
}
