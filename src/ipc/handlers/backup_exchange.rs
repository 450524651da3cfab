use super::required_str;
use crate::backup;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match required_str(req, "outPath") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };
    match backup::export_data_bundle(&state.store, &out_path) {
        Ok(summary) => {
            info!(path = %out_path.to_string_lossy(), "data bundle exported");
            ok(
                &req.id,
                json!({
                    "bundleFormat": summary.bundle_format,
                    "entryCount": summary.entry_count,
                    "path": out_path.to_string_lossy(),
                }),
            )
        }
        Err(e) => err(&req.id, "io_failed", format!("{e:?}"), None),
    }
}

/// Replaces the in-memory collections wholesale with the bundle contents.
fn handle_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match required_str(req, "inPath") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };
    let data = match backup::import_data_bundle(&in_path) {
        Ok(data) => data,
        Err(e) => return err(&req.id, "bundle_invalid", format!("{e:?}"), None),
    };

    let counts = json!({
        "teachers": data.teachers.len(),
        "students": data.students.len(),
        "classes": data.classes.len(),
        "exams": data.exams.len(),
        "results": data.results.len(),
    });
    state.store.replace_collections(
        data.teachers,
        data.students,
        data.classes,
        data.exams,
        data.results,
    );
    info!(path = %in_path.to_string_lossy(), "data bundle imported");
    ok(&req.id, json!({ "imported": counts }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_export(state, req)),
        "backup.import" => Some(handle_import(state, req)),
        _ => None,
    }
}
