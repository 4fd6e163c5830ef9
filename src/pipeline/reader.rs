/// Frame reader
///
/// Loads a just-created image, retrying while the producer may still be
/// writing it. Every attempt decodes the whole file, since a partially
/// flushed PNG or JPEG opens fine and only fails once pixel data is read.

use std::path::Path;
use std::time::Duration;

use tokio::task;
use tracing::debug;

use super::data::SourceFrame;
use crate::error::{PipelineError, PipelineResult};

/// Bounded retry window for reading a source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            interval: Duration::from_millis(500),
        }
    }
}

/// Read and fully decode `path`, retrying per `policy`
///
/// Missing and corrupt files are retried the same way; only running out of
/// attempts yields `SourceUnreadable`.
pub async fn read_frame(path: &Path, policy: ReadPolicy) -> PipelineResult<SourceFrame> {
    let attempts = policy.attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match load_frame(path).await {
            Ok(frame) => {
                debug!(
                    path = %path.display(),
                    attempt,
                    width = frame.width,
                    height = frame.height,
                    "source image decoded"
                );
                return Ok(frame);
            }
            Err(err) => {
                debug!(path = %path.display(), attempt, error = %err, "source image not ready");
                last_error = err;
            }
        }

        if attempt < attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(PipelineError::SourceUnreadable {
        path: path.to_path_buf(),
        attempts,
        detail: last_error,
    })
}

async fn load_frame(path: &Path) -> Result<SourceFrame, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to open: {}", e))?;

    // Decoding is CPU-bound
    task::spawn_blocking(move || decode_frame(bytes))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

fn decode_frame(bytes: Vec<u8>) -> Result<SourceFrame, String> {
    let format = image::guess_format(&bytes).map_err(|e| format!("Unknown format: {}", e))?;
    let decoded = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| format!("Failed to decode: {}", e))?;

    Ok(SourceFrame {
        width: decoded.width(),
        height: decoded.height(),
        format,
        bytes,
    })
}
