//! Shared components for CLI commands
//!
//! Logging setup, configuration loading and progress reporting used by more
//! than one command.

use crate::Result;
use crate::config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Set up structured logging on stderr at `log_level` for this crate
///
/// `RUST_LOG` takes precedence when set. Calling this twice is harmless;
/// the second subscriber is ignored.
pub fn setup_logging(log_level: &str, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vigitel_loader={}", log_level)));

    let result = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if result.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

/// Resolve the configuration file to read, if any
///
/// An explicit path always wins; otherwise the default location is used
/// when a file exists there.
pub fn resolve_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Config::default_config_path()
            .ok()
            .filter(|path| path.exists()),
    }
}

/// Load configuration using layered approach (defaults -> file -> env)
///
/// Command-line overrides are applied by each command afterwards.
pub fn load_configuration(config_file: Option<&Path>) -> Result<Config> {
    info!("Loading configuration");

    let config_file = resolve_config_file(config_file);
    match &config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file found, using defaults and environment variables"),
    }

    Config::load_layered(config_file.as_deref())
}

/// Progress bar in the style shared by all commands
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
