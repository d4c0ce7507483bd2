//! Log setup. Output goes to a daily-rolling file so it never interleaves
//! with the job listing printed on stdout.

use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives, e.g. `jobseek=debug`
pub const LOG_ENV: &str = "JOBSEEK_LOG";

const LOG_FILE_PREFIX: &str = "jobseek.log";

/// Install the global subscriber.
///
/// The returned guard flushes buffered lines on drop and must be held until
/// the process exits.
pub fn init(verbose: bool) -> Result<WorkerGuard> {
  let dir = log_dir()?;
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let layer = tracing_subscriber::fmt::layer()
    .with_writer(writer)
    .with_ansi(false)
    .with_target(true);

  tracing_subscriber::registry()
    .with(build_filter(std::env::var(LOG_ENV).ok().as_deref(), verbose)?)
    .with(layer)
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}

pub fn log_dir() -> Result<PathBuf> {
  dirs::data_dir()
    .map(|dir| dir.join("jobseek").join("logs"))
    .ok_or_else(|| eyre!("Could not determine data directory for logs"))
}

/// Explicit directives win; otherwise `debug` when verbose, `info` when not.
/// Connection pool chatter is kept at `warn` either way.
fn filter_directives(directives: Option<&str>, verbose: bool) -> String {
  match directives.map(str::trim).filter(|d| !d.is_empty()) {
    Some(d) => d.to_string(),
    None => {
      let level = if verbose { "debug" } else { "info" };
      format!("{},hyper_util=warn,reqwest=warn,rustls=warn", level)
    }
  }
}

fn build_filter(directives: Option<&str>, verbose: bool) -> Result<EnvFilter> {
  let filter = filter_directives(directives, verbose);
  EnvFilter::try_new(&filter).map_err(|e| eyre!("Invalid log filter '{}': {}", filter, e))
}
