use std::path::PathBuf;

use crate::session::KvStore;
use crate::store::Store;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Store,
    /// Session persistence port; bound by `workspace.select`.
    pub session: Option<Box<dyn KvStore>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            store: Store::new(),
            session: None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
