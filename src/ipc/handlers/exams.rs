use super::required_str;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::ExamDraft;
use serde_json::json;

fn parse_draft(req: &Request) -> Result<ExamDraft, serde_json::Value> {
    serde_json::from_value(req.params.clone())
        .map_err(|e| err(&req.id, "bad_params", e.to_string(), None))
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_filter = req.params.get("classId").and_then(|v| v.as_str());
    let exams: Vec<_> = state
        .store
        .exams()
        .iter()
        .filter(|e| class_filter.map(|c| e.class_id == c).unwrap_or(true))
        .collect();
    ok(&req.id, json!({ "exams": exams }))
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let draft = match parse_draft(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let exam = state.store.add_exam(draft);
    ok(&req.id, json!({ "exam": exam }))
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let exam_id = match required_str(req, "examId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let draft = match parse_draft(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match state.store.update_exam(&exam_id, draft) {
        Some(exam) => ok(&req.id, json!({ "exam": exam })),
        None => err(&req.id, "not_found", "exam not found", None),
    }
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let exam_id = match required_str(req, "examId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if state.store.delete_exam(&exam_id) {
        ok(&req.id, json!({ "ok": true }))
    } else {
        err(&req.id, "not_found", "exam not found", None)
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exams.list" => Some(handle_list(state, req)),
        "exams.create" => Some(handle_create(state, req)),
        "exams.update" => Some(handle_update(state, req)),
        "exams.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
