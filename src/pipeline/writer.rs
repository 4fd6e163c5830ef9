/// Output writer
///
/// Persists artifacts into the output directory. Same-named artifacts
/// overwrite each other; there is no lock, the last writer wins.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::data::OutputArtifact;
use crate::error::{PipelineError, PipelineResult};

/// Write `artifact`, creating its directory first. Returns the target path.
pub async fn write(artifact: &OutputArtifact) -> PipelineResult<PathBuf> {
    if let Some(dir) = artifact.target.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| PipelineError::OutputWrite {
                operation: "create output directory",
                path: dir.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(&artifact.target, &artifact.bytes)
        .await
        .map_err(|source| PipelineError::OutputWrite {
            operation: "write",
            path: artifact.target.clone(),
            source,
        })?;

    debug!(
        path = %artifact.target.display(),
        bytes = artifact.bytes.len(),
        "artifact written"
    );
    Ok(artifact.target.clone())
}

/// Raw bytes of the source for a verbatim copy, without decoding
pub async fn read_source(path: &Path) -> PipelineResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|source| PipelineError::OutputWrite {
            operation: "read source",
            path: path.to_path_buf(),
            source,
        })
}
