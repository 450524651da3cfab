use super::required_str;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::TeacherDraft;
use serde_json::json;

fn parse_draft(req: &Request) -> Result<TeacherDraft, serde_json::Value> {
    serde_json::from_value(req.params.clone())
        .map_err(|e| err(&req.id, "bad_params", e.to_string(), None))
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "teachers": state.store.teachers() }))
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match parse_draft(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let teacher = state.store.add_teacher(draft);
    ok(&req.id, json!({ "teacher": teacher }))
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let draft = match parse_draft(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.update_teacher(&id, draft) {
        Some(teacher) => ok(&req.id, json!({ "teacher": teacher })),
        None => err(&req.id, "not_found", "teacher not found", None),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if state.store.delete_teacher(&id) {
        ok(&req.id, json!({ "ok": true }))
    } else {
        err(&req.id, "not_found", "teacher not found", None)
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.list" => Some(handle_list(state, req)),
        "teachers.create" => Some(handle_create(state, req)),
        "teachers.update" => Some(handle_update(state, req)),
        "teachers.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
