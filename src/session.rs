use crate::store::User;
use anyhow::Context;
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;

/// Key the logged-in user record is persisted under, mirroring the browser
/// local-storage key the UI used.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Synchronous key-value persistence port. The daemon backs it with sqlite in
/// the workspace; tests use the in-memory variant.
pub trait KvStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

pub struct SqliteKv {
    conn: Connection,
}

impl SqliteKv {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(workspace).with_context(|| {
            format!("failed to create workspace {}", workspace.to_string_lossy())
        })?;
        let db_path = workspace.join("schooldesk.sqlite3");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.to_string_lossy()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv(
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("failed to create kv table")?;
        Ok(Self { conn })
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?", [key], |r| r.get(0))
            .optional()
            .context("kv read failed")
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv(key, value) VALUES(?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                (key, value),
            )
            .context("kv write failed")?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?", [key])
            .context("kv delete failed")?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

pub fn persist_current_user(kv: &mut dyn KvStore, user: &User) -> anyhow::Result<()> {
    let text = serde_json::to_string(user).context("failed to serialize user")?;
    kv.set(CURRENT_USER_KEY, &text)
}

/// A stored record that no longer parses is treated as no session rather
/// than an error; the next login overwrites it.
pub fn current_user(kv: &dyn KvStore) -> anyhow::Result<Option<User>> {
    let Some(text) = kv.get(CURRENT_USER_KEY)? else {
        return Ok(None);
    };
    Ok(serde_json::from_str(&text).ok())
}

pub fn clear_current_user(kv: &mut dyn KvStore) -> anyhow::Result<()> {
    kv.remove(CURRENT_USER_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Role;

    fn user() -> User {
        User {
            id: "u1".to_string(),
            email: "t@school.example".to_string(),
            password: "pw".to_string(),
            role: Role::Teacher,
            name: "T. Iyer".to_string(),
        }
    }

    #[test]
    fn session_round_trips_through_the_port() {
        let mut kv = MemoryKv::default();
        assert!(current_user(&kv).expect("read").is_none());

        persist_current_user(&mut kv, &user()).expect("persist");
        let restored = current_user(&kv).expect("read").expect("some user");
        assert_eq!(restored.id, "u1");
        assert_eq!(restored.role, Role::Teacher);

        clear_current_user(&mut kv).expect("clear");
        assert!(current_user(&kv).expect("read").is_none());
    }

    #[test]
    fn corrupt_session_record_reads_as_no_session() {
        let mut kv = MemoryKv::default();
        kv.set(CURRENT_USER_KEY, "{not json").expect("set");
        assert!(current_user(&kv).expect("read").is_none());
    }
}
