//! Watch directory subscription.
//!
//! Reports every newly created PNG or JPEG in the watch directory (not its
//! subdirectories). Events are not de-duplicated: each creation event for a
//! qualifying file produces one callback.

use std::path::{Path, PathBuf};

use notify::event::CreateKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::error::WatchError;
use crate::pipeline::data::DiscoveredFile;

/// Extensions accepted by the watcher, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Live subscription; events stop when this is dropped.
pub struct DirectoryWatcher {
    _watcher: RecommendedWatcher,
    dir: PathBuf,
}

impl DirectoryWatcher {
    /// Subscribe to `dir`, calling `on_discovered` from the watcher thread.
    ///
    /// # Errors
    ///
    /// Fails if the directory does not exist or the platform watcher cannot
    /// be created. Callers create the directory first.
    pub fn start<F>(dir: &Path, mut on_discovered: F) -> Result<Self, WatchError>
    where
        F: FnMut(DiscoveredFile) + Send + 'static,
    {
        // Canonical so event paths come back absolute
        let dir = dir.canonicalize().map_err(|source| WatchError::Directory {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for path in discovered_paths(&event) {
                    info!(path = %path.display(), "discovered new image");
                    on_discovered(DiscoveredFile::new(path));
                }
            }
            Err(err) => warn!(error = %err, "watch error"),
        })
        .map_err(|source| WatchError::Subscribe {
            path: dir.clone(),
            source,
        })?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Subscribe {
                path: dir.clone(),
                source,
            })?;

        info!(dir = %dir.display(), "watching for new images");
        Ok(Self {
            _watcher: watcher,
            dir,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Paths from a creation event that should enter the pipeline
pub fn discovered_paths(event: &Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => Vec::new(),
        EventKind::Create(_) => event
            .paths
            .iter()
            .filter(|path| is_supported_image(path) && !path.is_dir())
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Whether `path` has a PNG or JPEG extension
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}
