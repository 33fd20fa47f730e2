mod backup;
mod config;
mod db;
mod ipc;
mod logging;
mod records;
mod session;
mod store;

use clap::Parser;
use std::io::{self, BufRead, Write};

fn main() {
    let config = config::Config::parse();
    logging::init_logger(&config.log_level);

    let mut state = ipc::AppState::default();

    if let Some(path) = config.workspace.as_deref() {
        match ipc::open_workspace(&mut state, path) {
            Ok(Some(load_error)) => {
                eprintln!("{load_error}");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, workspace = %path.to_string_lossy(), "startup failed");
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            // Can't reply with an id.
            Err(e) => ipc::bad_json(e.to_string()),
        };
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();

        if state.exit_requested {
            break;
        }
    }

    tracing::info!("studentd exiting");
}
