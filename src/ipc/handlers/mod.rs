pub mod auth;
pub mod backup_exchange;
pub mod classes;
pub mod core;
pub mod dashboard;
pub mod exams;
pub mod reports;
pub mod results;
pub mod students;
pub mod teachers;

use crate::calc::CalcError;
use crate::ipc::error::err;
use crate::ipc::types::Request;

pub(crate) fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub(crate) fn calc_err(req: &Request, e: CalcError) -> serde_json::Value {
    err(&req.id, &e.code, e.message, e.details)
}
