use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to spawn probe: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("probe exited with {status}: {stderr}")]
    Failed { status: std::process::ExitStatus, stderr: String },
    #[error("empty output from probe")]
    EmptyOutput,
    #[error("failed to parse probe output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no video stream found in file")]
    NoVideoStream,
    #[error("invalid width or height in video stream")]
    InvalidDimensions,
}

#[async_trait::async_trait]
pub trait MediaProbe {
    /// Width and height of the first video stream in `path`.
    async fn dimensions(&self, path: &Path) -> Result<Dimensions, ProbeError>;
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

pub fn parse_dimensions(stdout: &[u8]) -> Result<Dimensions, ProbeError> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Err(ProbeError::EmptyOutput);
    }

    let output: ProbeOutput = serde_json::from_slice(stdout)?;
    let stream = output.streams.into_iter().next().ok_or(ProbeError::NoVideoStream)?;

    match (stream.width, stream.height) {
        (Some(width), Some(height)) if height > 0 => Ok(Dimensions { width, height }),
        _ => Err(ProbeError::InvalidDimensions),
    }
}

/// Runs `ffprobe` against the first video stream.
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: PathBuf,
    timeout: Duration,
}

impl Ffprobe {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { program: program.into(), timeout }
    }
}

#[async_trait::async_trait]
impl MediaProbe for Ffprobe {
    async fn dimensions(&self, path: &Path) -> Result<Dimensions, ProbeError> {
        let start = std::time::Instant::now();

        let child = Command::new(&self.program)
            .args(["-v", "error", "-select_streams", "v:0"])
            .args(["-show_entries", "stream=width,height", "-of", "json"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(
                path = %path.display(),
                status = %output.status,
                stderr = %stderr,
                "ffprobe failed"
            );
            return Err(ProbeError::Failed { status: output.status, stderr });
        }

        let dimensions = parse_dimensions(&output.stdout)?;

        tracing::debug!(
            path = %path.display(),
            width = dimensions.width,
            height = dimensions.height,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "ffprobe finished"
        );

        Ok(dimensions)
    }
}
