use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session::Session;
use crate::store::{SqliteStore, StoreError};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Opens the workspace database and runs the startup load. On success the
/// new session replaces any previous one; the returned option carries a
/// non-fatal listing failure.
pub fn open_workspace(
    state: &mut AppState,
    path: &Path,
) -> Result<Option<StoreError>, StoreError> {
    let store = SqliteStore::open(path)?;
    // Drop the previous session first so its connection is released.
    state.session = None;
    let (session, load_error) = Session::start(store);
    state.workspace = Some(path.to_path_buf());
    state.session = Some(session);
    tracing::info!(workspace = %path.to_string_lossy(), "workspace selected");
    Ok(load_error)
}

pub fn workspace_result(state: &AppState, load_error: Option<&StoreError>) -> serde_json::Value {
    let mut result = json!({
        "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
        "rowCount": state.session.as_ref().map(|s| s.rows().len()).unwrap_or(0),
    });
    if let Some(e) = load_error {
        result["loadError"] = json!({ "code": e.code(), "message": e.to_string() });
    }
    result
}

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "sessionState": state.session.as_ref().map(|s| s.state()),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match open_workspace(state, &path) {
        Ok(load_error) => ok(&req.id, workspace_result(state, load_error.as_ref())),
        Err(e) => {
            tracing::error!(error = %e, "workspace open failed");
            err(&req.id, e.code(), e.to_string(), None)
        }
    }
}

fn handle_app_exit(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Some(session) = state.session.take() {
        drop(session.on_exit_requested());
    }
    state.exit_requested = true;
    ok(&req.id, json!({ "exiting": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "app.exit" => Some(handle_app_exit(state, req)),
        _ => None,
    }
}
