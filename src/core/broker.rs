use crate::core::db;
use crate::core::error;
use crate::core::time;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The DB Broker is the single gate for karma database access.
/// Every call is serialized behind an in-process lock, so concurrent handlers
/// never interleave their statements against the same file.
#[derive(Debug, Clone)]
pub struct DbBroker {
    db_path: PathBuf,
    audit_log_path: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub actor: String,
    pub op: String,
    pub db_id: String,
    pub status: String,
}

impl DbBroker {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
            audit_log_path: None,
        }
    }

    /// Also append one JSON line per operation to `broker.events.jsonl` next to the DB.
    pub fn with_audit_log(mut self) -> Self {
        self.audit_log_path = Some(db::audit_log_path(&self.db_path));
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn audit_log_path(&self) -> Option<&Path> {
        self.audit_log_path.as_deref()
    }

    /// Execute a closure with a serialized connection to the karma DB.
    pub fn with_conn<F, R>(&self, actor: &str, op_name: &str, f: F) -> Result<R, error::KarmaError>
    where
        F: FnOnce(&Connection) -> Result<R, error::KarmaError>,
    {
        static DB_LOCK: Mutex<()> = Mutex::new(());
        let _lock = DB_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let db_id = self
            .db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let conn = db::db_connect(&self.db_path.to_string_lossy())
            .map_err(|e| error::KarmaError::StoreUnavailable(format!("{}: {}", db_id, e)))?;

        let result = f(&conn);

        let status = if result.is_ok() { "success" } else { "error" };
        tracing::debug!(actor, op = op_name, db = %db_id, status, "broker op");
        // The closure has already committed; an audit failure must not mask its result.
        if let Some(path) = &self.audit_log_path
            && let Err(e) = self.log_event(path, actor, op_name, &db_id, status)
        {
            tracing::warn!(op = op_name, path = %path.display(), error = %e, "audit log write failed");
        }

        result
    }

    fn log_event(
        &self,
        path: &Path,
        actor: &str,
        op: &str,
        db_id: &str,
        status: &str,
    ) -> Result<(), error::KarmaError> {
        use std::fs::OpenOptions;
        use std::io::Write;

        let ev = BrokerEvent {
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            actor: actor.to_string(),
            op: op.to_string(),
            db_id: db_id.to_string(),
            status: status.to_string(),
        };

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(error::KarmaError::IoError)?;

        writeln!(f, "{}", serde_json::to_string(&ev)?).map_err(error::KarmaError::IoError)?;
        Ok(())
    }
}
