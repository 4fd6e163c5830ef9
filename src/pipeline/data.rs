/// Data structures that flow through the pipeline
///
/// A `DiscoveredFile` enters from the watcher, becomes a `TransformRequest`
/// once its bytes are verified, and leaves as exactly one `OutputArtifact`.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::ImageFormat;

use crate::error::{PipelineError, PipelineResult};

/// A newly created image reported by the watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Absolute path of the source image
    pub path: PathBuf,
    /// When the creation event was accepted
    pub discovered_at: DateTime<Utc>,
}

impl DiscoveredFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            discovered_at: Utc::now(),
        }
    }

    /// File name the artifact is stored under
    pub fn basename(&self) -> Option<&OsStr> {
        self.path.file_name()
    }
}

/// Source image bytes that decoded completely
#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl SourceFrame {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// One call to the generation endpoint, built from the current config snapshot
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub source: SourceFrame,
    pub prompt: String,
    pub model: String,
}

impl TransformRequest {
    pub fn new(source: SourceFrame, prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            source,
            prompt: prompt.into(),
            model: model.into(),
        }
    }
}

/// Outcome of the generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformResult {
    Generated(Vec<u8>),
    Unavailable(String),
}

/// Final bytes for a discovered file and where they go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub target: PathBuf,
    pub bytes: Vec<u8>,
}

impl OutputArtifact {
    /// Target is `output_dir/basename(source)`
    pub fn for_source(
        output_dir: &Path,
        source: &DiscoveredFile,
        bytes: Vec<u8>,
    ) -> PipelineResult<Self> {
        let basename = source.basename().ok_or_else(|| PipelineError::OutputWrite {
            operation: "name artifact for",
            path: source.path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "source path has no file name"),
        })?;

        Ok(Self {
            target: output_dir.join(basename),
            bytes,
        })
    }
}
