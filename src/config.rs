use clap::Parser;
use std::path::PathBuf;

/// Student records sidecar. Speaks newline-delimited JSON on stdin/stdout.
#[derive(Debug, Parser)]
#[command(name = "studentd", version, about)]
pub struct Config {
    /// Workspace directory to open at launch. Failing to open it is fatal.
    #[arg(long, env = "STUDENTD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Log filter directive, e.g. `debug` or `studentd=trace`.
    #[arg(long, env = "STUDENTD_LOG", default_value = "info")]
    pub log_level: String,
}
