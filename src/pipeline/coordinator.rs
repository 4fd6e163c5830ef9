/// Pipeline coordinator
///
/// Every discovered file gets its own tokio task:
/// settle → snapshot config → (test copy | read → transform → write) → notify.
/// Any failing step falls back to copying the source verbatim, so each file
/// ends with something on screen. Only a failed fallback copy ends a file's
/// pipeline without a show request.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Instrument};

use super::data::{DiscoveredFile, OutputArtifact, TransformRequest, TransformResult};
use super::reader::{self, ReadPolicy};
use super::writer;
use crate::config::{ConfigProvider, ConfigSnapshot};
use crate::error::{PipelineError, PipelineResult};
use crate::transform::TransformClient;
use crate::ui::handoff::PresenterHandle;

/// Whether the remote call is made at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Read, transform, write, falling back to a copy on failure
    Transform,
    /// Always copy the source; never calls the remote model
    TestCopy,
}

/// Delays applied to every file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineTiming {
    /// Pause after discovery so the producer can finish flushing
    pub settle_delay: Duration,
    pub read: ReadPolicy,
}

impl Default for PipelineTiming {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            read: ReadPolicy::default(),
        }
    }
}

/// Spawns and runs one pipeline task per discovered file
pub struct Coordinator<P, C> {
    runtime: Handle,
    config: Arc<P>,
    client: Arc<C>,
    presenter: PresenterHandle,
    mode: PipelineMode,
    timing: PipelineTiming,
}

impl<P, C> Clone for Coordinator<P, C> {
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            config: Arc::clone(&self.config),
            client: Arc::clone(&self.client),
            presenter: self.presenter.clone(),
            mode: self.mode,
            timing: self.timing,
        }
    }
}

impl<P, C> Coordinator<P, C>
where
    P: ConfigProvider,
    C: TransformClient,
{
    pub fn new(
        runtime: Handle,
        config: P,
        client: C,
        presenter: PresenterHandle,
        mode: PipelineMode,
        timing: PipelineTiming,
    ) -> Self {
        Self {
            runtime,
            config: Arc::new(config),
            client: Arc::new(client),
            presenter,
            mode,
            timing,
        }
    }

    /// Start the pipeline for `file` on a background task
    ///
    /// Resolves to the artifact path, or `None` if nothing could be written.
    /// Nothing waits on the handle in normal operation; dropping it leaves
    /// the task running.
    pub fn dispatch(&self, file: DiscoveredFile) -> JoinHandle<Option<PathBuf>> {
        let this = self.clone();
        let span = tracing::info_span!("pipeline", file = %file.path.display());
        self.runtime.spawn(async move { this.process(file).await }.instrument(span))
    }

    async fn process(&self, file: DiscoveredFile) -> Option<PathBuf> {
        tokio::time::sleep(self.timing.settle_delay).await;

        // Fresh per task: prompt and model may have been edited since the last file
        let config = self.config.snapshot();

        let outcome = match self.mode {
            PipelineMode::TestCopy => {
                info!("[test mode] copying source");
                self.fallback(&file, &config, None).await
            }
            PipelineMode::Transform => self.transform_branch(&file, &config).await,
        };

        match outcome {
            Ok(target) => {
                let elapsed = Utc::now() - file.discovered_at;
                info!(
                    path = %target.display(),
                    elapsed_ms = elapsed.num_milliseconds(),
                    "artifact ready"
                );
                self.presenter.notify(target.clone());
                Some(target)
            }
            Err(err) => {
                error!(error = %err, kind = err.kind(), "pipeline ended without an artifact");
                None
            }
        }
    }

    async fn transform_branch(
        &self,
        file: &DiscoveredFile,
        config: &ConfigSnapshot,
    ) -> PipelineResult<PathBuf> {
        let source = match reader::read_frame(&file.path, self.timing.read).await {
            Ok(source) => source,
            Err(err) => {
                absorbed(&err);
                return self.fallback(file, config, None).await;
            }
        };

        let Some(api_key) = config.api_key.as_deref() else {
            absorbed(&PipelineError::CredentialsMissing);
            return self.fallback(file, config, Some(source.bytes)).await;
        };

        let request = TransformRequest::new(source, config.prompt.as_str(), config.model.as_str());
        match self.client.transform(&request, api_key).await {
            TransformResult::Generated(bytes) => {
                let artifact = OutputArtifact::for_source(&config.output_dir, file, bytes)?;
                match writer::write(&artifact).await {
                    Ok(target) => {
                        info!(path = %target.display(), "generated image saved");
                        Ok(target)
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to save generated image, copying the original");
                        self.fallback(file, config, Some(request.source.bytes)).await
                    }
                }
            }
            TransformResult::Unavailable(detail) => {
                absorbed(&PipelineError::RemoteUnavailable { detail });
                self.fallback(file, config, Some(request.source.bytes)).await
            }
        }
    }

    /// Copy the source bytes verbatim, reusing them if already read
    async fn fallback(
        &self,
        file: &DiscoveredFile,
        config: &ConfigSnapshot,
        source_bytes: Option<Vec<u8>>,
    ) -> PipelineResult<PathBuf> {
        let bytes = match source_bytes {
            Some(bytes) => bytes,
            None => writer::read_source(&file.path).await?,
        };

        let artifact = OutputArtifact::for_source(&config.output_dir, file, bytes)?;
        let target = writer::write(&artifact).await?;
        info!(path = %target.display(), "original image copied");
        Ok(target)
    }
}

fn absorbed(err: &PipelineError) {
    debug_assert!(err.is_absorbed());
    warn!(error = %err, kind = err.kind(), "falling back to the original image");
}
