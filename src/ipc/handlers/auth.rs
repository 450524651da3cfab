use super::required_str;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session;
use serde_json::json;
use tracing::info;

/// Plaintext credential match against the seeded user list. Authorization
/// stays a UI concern; this only owns the session record.
fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(kv) = state.session.as_deref_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let email = match required_str(req, "email") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let password = match required_str(req, "password") {
        Ok(v) => v,
        Err(e) => return e,
    };

    let Some(user) = state.store.find_user_by_credentials(&email, &password) else {
        return err(&req.id, "invalid_credentials", "email or password incorrect", None);
    };
    let user = user.clone();

    if let Err(e) = session::persist_current_user(kv, &user) {
        return err(&req.id, "io_failed", format!("{e:?}"), None);
    }
    info!(user = %user.id, "login");
    ok(&req.id, json!({ "user": user }))
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(kv) = state.session.as_deref_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    if let Err(e) = session::clear_current_user(kv) {
        return err(&req.id, "io_failed", format!("{e:?}"), None);
    }
    ok(&req.id, json!({ "ok": true }))
}

fn handle_current_user(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(kv) = state.session.as_deref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match session::current_user(kv) {
        Ok(user) => ok(&req.id, json!({ "user": user })),
        Err(e) => err(&req.id, "io_failed", format!("{e:?}"), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        "auth.currentUser" => Some(handle_current_user(state, req)),
        _ => None,
    }
}
