//! Chart Facade
//!
//! The astrology computation lives outside this service. An engine receives
//! the normalized birth instant and resolved location and answers with its
//! full chart serialization (JSON), which is returned untouched.

pub mod http;
pub mod process;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub use http::HttpChartEngine;
pub use process::ProcessChartEngine;

/// What every engine backend receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineRequest {
    pub name: String,
    /// Local birth time, `YYYY-MM-DDTHH:MM:SS`.
    pub birth_date: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Hours east of UTC.
    pub timezone_offset: f64,
}

#[async_trait]
pub trait ChartEngine: Send + Sync {
    /// One fresh computation per call; no caching, no retry.
    async fn calculate(&self, request: &EngineRequest) -> Result<Value>;
}
