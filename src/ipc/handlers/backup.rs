use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::core::{open_workspace, workspace_result};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_backup_export_workspace(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing outPath", None),
    };
    let Some(workspace_path) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let out = PathBuf::from(&out_path);
    match backup::export_workspace_bundle(&workspace_path, &out) {
        Ok(export) => {
            tracing::info!(path = %out_path, "workspace exported");
            ok(
                &req.id,
                json!({
                    "path": out_path,
                    "bundleFormat": export.bundle_format,
                    "entryCount": export.entry_count,
                    "dbSha256": export.db_sha256,
                }),
            )
        }
        Err(e) => err(
            &req.id,
            "io_failed",
            format!("{e:#}"),
            Some(json!({ "path": out_path })),
        ),
    }
}

fn handle_backup_import_workspace(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match req.params.get("inPath").and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => return err(&req.id, "bad_params", "missing inPath", None),
    };
    let workspace_path = req
        .params
        .get("workspacePath")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
        .or_else(|| state.workspace.clone());
    let Some(workspace_path) = workspace_path else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return err(
            &req.id,
            "not_found",
            "bundle file not found",
            Some(json!({ "path": in_path })),
        );
    }

    let prepared = match backup::read_bundle(&src) {
        Ok(v) => v,
        Err(e) => {
            let message = format!("{e:#}");
            tracing::warn!(error = %message, "bundle rejected; current workspace kept");
            return err(
                &req.id,
                "io_failed",
                message,
                Some(json!({ "path": src.to_string_lossy() })),
            );
        }
    };

    // Release the current connection before its file is replaced.
    let previous = state.workspace.take();
    state.session = None;

    let import = match backup::install_bundle(&prepared, &workspace_path) {
        Ok(v) => v,
        Err(e) => {
            if let Some(prev) = previous {
                if let Err(reopen) = open_workspace(state, &prev) {
                    tracing::error!(error = %reopen, "could not reopen previous workspace");
                }
            }
            return err(
                &req.id,
                "io_failed",
                format!("{e:#}"),
                Some(json!({ "path": workspace_path.to_string_lossy() })),
            );
        }
    };

    match open_workspace(state, &workspace_path) {
        Ok(load_error) => {
            let mut result = workspace_result(state, load_error.as_ref());
            result["bundleFormatDetected"] = json!(import.bundle_format_detected);
            ok(&req.id, result)
        }
        Err(e) => err(&req.id, e.code(), e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportWorkspace" => Some(handle_backup_export_workspace(state, req)),
        "backup.importWorkspace" => Some(handle_backup_import_workspace(state, req)),
        _ => None,
    }
}
