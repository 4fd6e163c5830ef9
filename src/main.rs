use clap::Parser;
use std::path::Path;
use tracing::{info, warn};

mod cli;
mod config;
mod error;
mod logging;
mod pipeline;
mod transform;
mod ui;
mod watcher;

use config::{ConfigProvider, EnvConfig};
use error::AppError;
use pipeline::{Coordinator, PipelineMode, PipelineTiming};
use transform::GeminiClient;
use watcher::DirectoryWatcher;

fn main() -> Result<(), AppError> {
    let cli = cli::Cli::parse();
    logging::init(&cli.log_level)?;

    let provider = EnvConfig::new(cli.config.clone(), cli.overrides());
    let startup = provider.snapshot();

    create_dir(&startup.watch_dir)?;
    create_dir(&startup.output_dir)?;

    let mode = if cli.test {
        info!("test mode: images are copied without calling the model");
        PipelineMode::TestCopy
    } else {
        if startup.api_key.is_none() {
            warn!(
                env_file = %provider.env_file().display(),
                "GOOGLE_API_KEY is not set, images will be shown untransformed"
            );
        }
        PipelineMode::Transform
    };

    // Pipeline tasks run here; the main thread belongs to the viewer
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("pipeline")
        .build()
        .map_err(AppError::Runtime)?;

    let client =
        GeminiClient::new(cli.api_base.clone(), cli.request_timeout()).map_err(AppError::HttpClient)?;
    let (presenter, inbox) = ui::handoff::channel();
    let coordinator = Coordinator::new(
        runtime.handle().clone(),
        provider,
        client,
        presenter,
        mode,
        PipelineTiming::default(),
    );

    let watcher = DirectoryWatcher::start(&startup.watch_dir, move |file| {
        // Detached: the task always runs to completion on its own
        drop(coordinator.dispatch(file));
    })?;

    info!(
        watch = %watcher.dir().display(),
        output = %startup.output_dir.display(),
        "🎨 Sync Image Gen ready"
    );

    let result = ui::viewer::run(inbox);

    drop(watcher);
    // In-flight tasks are abandoned, not drained
    runtime.shutdown_background();

    result.map_err(AppError::from)
}

fn create_dir(path: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(path).map_err(|source| AppError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
