use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

pub fn db_connect(db_path: &str) -> Result<Connection, error::KarmaError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::KarmaError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::KarmaError::RusqliteError)?;
    Ok(conn)
}

/// Create the parent directory and the `karma` table if missing.
pub fn initialize_karma_db(broker: &DbBroker) -> Result<(), error::KarmaError> {
    if let Some(parent_dir) = broker.db_path().parent()
        && !parent_dir.as_os_str().is_empty()
    {
        fs::create_dir_all(parent_dir).map_err(error::KarmaError::IoError)?;
    }

    broker.with_conn("karmabot", "karma.init", |conn| {
        conn.execute(schemas::KARMA_DB_SCHEMA, [])?;
        Ok(())
    })?;

    tracing::debug!(db = %broker.db_path().display(), "karma database initialized");
    Ok(())
}

pub fn audit_log_path(db_path: &Path) -> std::path::PathBuf {
    match db_path.parent() {
        Some(dir) => dir.join(schemas::AUDIT_LOG_NAME),
        None => Path::new(schemas::AUDIT_LOG_NAME).to_path_buf(),
    }
}
