use super::required_str;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store::Class;
use serde_json::json;

fn parse_class(req: &Request) -> Result<Class, serde_json::Value> {
    let class: Class = match serde_json::from_value(req.params.clone()) {
        Ok(v) => v,
        Err(e) => return Err(err(&req.id, "bad_params", e.to_string(), None)),
    };
    if class.class_id.trim().is_empty() {
        return Err(err(&req.id, "bad_params", "classId must not be empty", None));
    }
    Ok(class)
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "classes": state.store.classes() }))
}

/// The class id is an author-supplied natural key; creating a duplicate is a
/// conflict, not an upsert.
fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class = match parse_class(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    if state.store.find_class(&class.class_id).is_some() {
        return err(
            &req.id,
            "conflict",
            "classId already exists",
            Some(json!({ "classId": class.class_id })),
        );
    }
    let class = state.store.add_class(class);
    ok(&req.id, json!({ "class": class }))
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class = match parse_class(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let class_id = class.class_id.clone();
    match state.store.update_class(&class_id, class) {
        Some(class) => ok(&req.id, json!({ "class": class })),
        None => err(&req.id, "not_found", "class not found", None),
    }
}

// Filter-out delete; students and exams referencing the class stay behind.
fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let class_id = match required_str(req, "classId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    if state.store.delete_class(&class_id) {
        ok(&req.id, json!({ "ok": true }))
    } else {
        err(&req.id, "not_found", "class not found", None)
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "classes.list" => Some(handle_list(state, req)),
        "classes.create" => Some(handle_create(state, req)),
        "classes.update" => Some(handle_update(state, req)),
        "classes.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
