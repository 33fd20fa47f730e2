use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::records::HIGHLIGHT_THRESHOLD;
use crate::session::{AddError, FormPatch};
use serde_json::json;

fn parse_patch(req: &Request) -> Result<FormPatch, serde_json::Value> {
    if req.params.is_null() {
        return Ok(FormPatch::default());
    }
    serde_json::from_value(req.params.clone())
        .map_err(|e| err(&req.id, "bad_params", format!("invalid form fields: {e}"), None))
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let rows = state
        .session
        .as_ref()
        .map(|s| s.rows().to_vec())
        .unwrap_or_default();
    ok(
        &req.id,
        json!({
            "rows": rows,
            "highlightThreshold": HIGHLIGHT_THRESHOLD,
        }),
    )
}

fn handle_form_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    ok(
        &req.id,
        json!({ "form": session.form(), "blank": session.form().is_blank() }),
    )
}

fn handle_form_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let patch = match parse_patch(req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    session.set_form(patch);
    ok(
        &req.id,
        json!({ "form": session.form(), "blank": session.form().is_blank() }),
    )
}

fn handle_students_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let patch = match parse_patch(req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    session.set_form(patch);

    match session.on_add_requested() {
        Ok(row) => ok(
            &req.id,
            json!({
                "row": row,
                "rowCount": session.rows().len(),
                "form": session.form(),
            }),
        ),
        Err(e) => {
            let details = json!({
                "form": session.form(),
                "rowCount": session.rows().len(),
            });
            let message = match &e {
                AddError::Rejected(reason) => reason.to_string(),
                AddError::Persistence(_) => "Error adding student. Please try again.".to_string(),
            };
            let mut resp = err(&req.id, e.code(), message, Some(details));
            if let AddError::Persistence(cause) = &e {
                resp["error"]["details"]["cause"] = json!(cause.to_string());
            }
            resp
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.add" => Some(handle_students_add(state, req)),
        "form.get" => Some(handle_form_get(state, req)),
        "form.set" => Some(handle_form_set(state, req)),
        _ => None,
    }
}
