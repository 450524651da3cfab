use super::required_str;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::StudentDraft;
use serde_json::json;

fn parse_draft(req: &Request) -> Result<StudentDraft, serde_json::Value> {
    serde_json::from_value(req.params.clone())
        .map_err(|e| err(&req.id, "bad_params", e.to_string(), None))
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_filter = req.params.get("classId").and_then(|v| v.as_str());
    let students: Vec<_> = state
        .store
        .students()
        .iter()
        .filter(|s| class_filter.map(|c| s.class_id == c).unwrap_or(true))
        .collect();
    ok(&req.id, json!({ "students": students }))
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match parse_draft(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let student = state.store.add_student(draft);
    ok(&req.id, json!({ "student": student }))
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
    match state.store.update_student(&id, draft) {
        Some(student) => ok(&req.id, json!({ "student": student })),
        None => err(&req.id, "not_found", "student not found", None),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let id = match required_str(req, "id") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if state.store.delete_student(&id) {
        ok(&req.id, json!({ "ok": true }))
    } else {
        err(&req.id, "not_found", "student not found", None)
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_list(state, req)),
        "students.create" => Some(handle_create(state, req)),
        "students.update" => Some(handle_update(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
