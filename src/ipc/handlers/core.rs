use super::required_str;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session::SqliteKv;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Binds the daemon to a workspace directory: opens the session database
/// there and seeds the in-memory collections from `<path>/seed` when that
/// directory exists. Collections themselves are never persisted.
fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e,
    };

    let kv = match SqliteKv::open(&path) {
        Ok(kv) => kv,
        Err(e) => return err(&req.id, "db_open_failed", format!("{e:?}"), None),
    };

    let seed_dir = path.join("seed");
    let seeded = if seed_dir.is_dir() {
        match state.store.load_seed(&seed_dir) {
            Ok(summary) => Some(summary),
            Err(e) => return err(&req.id, "io_failed", format!("{e:?}"), None),
        }
    } else {
        None
    };

    info!(workspace = %path.to_string_lossy(), seeded = seeded.is_some(), "workspace selected");
    state.workspace = Some(path.clone());
    state.session = Some(Box::new(kv));

    ok(
        &req.id,
        json!({
            "workspacePath": path.to_string_lossy(),
            "seeded": seeded,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
