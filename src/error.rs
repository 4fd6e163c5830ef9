/// Error types for the watcher, the pipeline and application startup.
///
/// Pipeline errors are mostly absorbed: the coordinator turns them into the
/// fallback copy. Only `OutputWrite` ends a file's pipeline, and only
/// startup errors end the process.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for pipeline stages.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failures of a single file's pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source never became a complete, decodable image.
    #[error("source image unreadable after {attempts} attempts: {path} ({detail})")]
    SourceUnreadable {
        path: PathBuf,
        attempts: u32,
        detail: String,
    },
    /// No API key configured.
    #[error("no API key configured")]
    CredentialsMissing,
    /// The generation call failed or returned no image.
    #[error("image generation unavailable: {detail}")]
    RemoteUnavailable { detail: String },
    /// The artifact could not be persisted.
    #[error("failed to {operation} {path}")]
    OutputWrite {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Whether the coordinator recovers from this error with the fallback copy.
    pub fn is_absorbed(&self) -> bool {
        !matches!(self, Self::OutputWrite { .. })
    }

    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnreadable { .. } => "source_unreadable",
            Self::CredentialsMissing => "credentials_missing",
            Self::RemoteUnavailable { .. } => "remote_unavailable",
            Self::OutputWrite { .. } => "output_write",
        }
    }
}

/// Failures subscribing to the watch directory.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watch directory is not accessible: {path}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to subscribe to filesystem events for {path}")]
    Subscribe {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Fatal errors while starting or running the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to install logging: {0}")]
    Logging(String),
    #[error("failed to create directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to start the pipeline runtime")]
    Runtime(#[source] io::Error),
    #[error("failed to build the HTTP client")]
    HttpClient(#[source] reqwest::Error),
    #[error(transparent)]
    Watch(#[from] WatchError),
    #[error("viewer failed: {0}")]
    Viewer(#[from] iced::Error),
}
