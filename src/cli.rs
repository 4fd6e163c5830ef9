//! Command line flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::DirectoryOverrides;
use crate::logging::DEFAULT_LOG_LEVEL;
use crate::transform::gemini::DEFAULT_API_BASE;

/// Watch a folder, restyle new photos with Gemini and show them full-screen.
#[derive(Debug, Parser)]
#[command(name = "sync-image-gen", version, about)]
pub struct Cli {
    /// Directory to watch for new images (default: WATCH_DIRECTORY or ./images)
    #[arg(long, value_name = "DIR")]
    pub watch_dir: Option<PathBuf>,

    /// Directory for processed images (default: OUTPUT_DIRECTORY or ./processed)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Env file holding the API key, model and prompt; re-read for every image
    #[arg(long, value_name = "FILE", default_value = ".env")]
    pub config: PathBuf,

    /// Test mode: skip the model and show the original images
    #[arg(short, long)]
    pub test: bool,

    /// Timeout for one generation call, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub timeout: u64,

    /// Base URL of the generation API
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, value_name = "FILTER", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

impl Cli {
    pub fn overrides(&self) -> DirectoryOverrides {
        DirectoryOverrides {
            watch_dir: self.watch_dir.clone(),
            output_dir: self.output_dir.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_leave_directories_to_config() {
        let cli = Cli::parse_from(["sync-image-gen"]);

        assert_eq!(cli.overrides(), DirectoryOverrides::default());
        assert_eq!(cli.config, PathBuf::from(".env"));
        assert!(!cli.test);
        assert_eq!(cli.request_timeout(), Duration::from_secs(120));
        assert_eq!(cli.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn parses_directories_and_test_flag() {
        let cli = Cli::parse_from([
            "sync-image-gen",
            "--watch-dir",
            "/mnt/camera",
            "--output-dir",
            "/srv/gallery",
            "--config",
            "gallery.env",
            "-t",
        ]);

        assert_eq!(cli.watch_dir, Some(PathBuf::from("/mnt/camera")));
        assert_eq!(cli.output_dir, Some(PathBuf::from("/srv/gallery")));
        assert_eq!(cli.config, PathBuf::from("gallery.env"));
        assert!(cli.test);
    }
}
