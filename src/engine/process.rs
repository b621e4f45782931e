use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{ChartEngine, EngineRequest};

/// Engine run as a child process, one per request. The request goes to
/// stdin as a single JSON document; the chart comes back on stdout.
pub struct ProcessChartEngine {
    program: String,
    args: Vec<String>,
}

impl ProcessChartEngine {
    pub fn new(program: &str, args: &[String]) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
        }
    }
}

#[async_trait]
impl ChartEngine for ProcessChartEngine {
    async fn calculate(&self, request: &EngineRequest) -> Result<Value> {
        debug!("Spawning chart engine {} {:?}", self.program, self.args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn chart engine '{}'", self.program))?;

        let payload = serde_json::to_vec(request)?;
        {
            let mut stdin = child.stdin.take().context("Failed to open engine stdin")?;
            stdin.write_all(&payload).await?;
            stdin.shutdown().await?;
        }

        let output = child
            .wait_with_output()
            .await
            .context("Chart engine did not finish")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Chart engine exited with {}: {}", output.status, stderr.trim());
            return Err(anyhow!("Chart engine exited with {}", output.status));
        }

        serde_json::from_slice(&output.stdout).context("Chart engine returned invalid JSON")
    }
}
