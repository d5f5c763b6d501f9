use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error;
use crate::core::store::{Delta, KarmaRecord, KarmaStore, Ranking, normalize_key};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// SQLite-backed karma store. All statements go through the broker.
#[derive(Debug, Clone)]
pub struct SqliteKarmaStore {
    broker: DbBroker,
    actor: String,
}

impl SqliteKarmaStore {
    /// Open (and create if needed) the karma database at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self, error::KarmaError> {
        Self::from_broker(DbBroker::new(db_path))
    }

    pub fn from_broker(broker: DbBroker) -> Result<Self, error::KarmaError> {
        db::initialize_karma_db(&broker)?;
        Ok(Self {
            broker,
            actor: "karmabot".to_string(),
        })
    }

    /// Name recorded as the actor of every broker event.
    pub fn with_actor(mut self, actor: &str) -> Self {
        self.actor = actor.to_string();
        self
    }

    pub fn broker(&self) -> &DbBroker {
        &self.broker
    }
}

fn read_record(conn: &Connection, key: &str) -> Result<Option<KarmaRecord>, error::KarmaError> {
    let record = conn
        .query_row(
            "SELECT name, plusplus, minusminus FROM karma WHERE name = ?1",
            params![key],
            |row| {
                let positive: i64 = row.get(1)?;
                let negative: i64 = row.get(2)?;
                Ok(KarmaRecord {
                    name: row.get(0)?,
                    positive_count: positive.max(0) as u64,
                    negative_count: negative.max(0) as u64,
                })
            },
        )
        .optional()?;
    Ok(record)
}

fn counter_increments(delta: Delta) -> (i64, i64) {
    match delta {
        Delta::Plus => (1, 0),
        Delta::Minus => (0, 1),
    }
}

impl KarmaStore for SqliteKarmaStore {
    fn ensure(&self, name: &str) -> Result<(), error::KarmaError> {
        let key = normalize_key(name);
        self.broker.with_conn(&self.actor, "karma.ensure", |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO karma(name, plusplus, minusminus) VALUES(?1, 0, 0)",
                params![key],
            )?;
            Ok(())
        })
    }

    fn increment(&self, name: &str, delta: Delta) -> Result<KarmaRecord, error::KarmaError> {
        let key = normalize_key(name);
        let (plus, minus) = counter_increments(delta);
        self.broker.with_conn(&self.actor, "karma.increment", |conn| {
            let changed = conn.execute(
                "UPDATE karma SET plusplus = plusplus + ?2, minusminus = minusminus + ?3
                 WHERE name = ?1",
                params![key, plus, minus],
            )?;
            if changed == 0 {
                return Err(error::KarmaError::NotFound(key.clone()));
            }
            read_record(conn, &key)?.ok_or_else(|| error::KarmaError::NotFound(key.clone()))
        })
    }

    fn bump(&self, name: &str, delta: Delta) -> Result<KarmaRecord, error::KarmaError> {
        let key = normalize_key(name);
        let (plus, minus) = counter_increments(delta);
        self.broker.with_conn(&self.actor, "karma.bump", |conn| {
            conn.execute(
                "INSERT INTO karma(name, plusplus, minusminus) VALUES(?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET
                    plusplus = plusplus + excluded.plusplus,
                    minusminus = minusminus + excluded.minusminus",
                params![key, plus, minus],
            )?;
            read_record(conn, &key)?.ok_or_else(|| error::KarmaError::NotFound(key.clone()))
        })
    }

    fn get(&self, name: &str) -> Result<Option<KarmaRecord>, error::KarmaError> {
        let key = normalize_key(name);
        self.broker
            .with_conn(&self.actor, "karma.get", |conn| read_record(conn, &key))
    }

    fn rank(&self, by: Ranking) -> Result<Vec<(String, i64)>, error::KarmaError> {
        let sql = match by {
            Ranking::Net => {
                "SELECT name, plusplus - minusminus AS score FROM karma ORDER BY score DESC, rowid ASC"
            }
            Ranking::Positive => {
                "SELECT name, plusplus AS score FROM karma ORDER BY score DESC, rowid ASC"
            }
            Ranking::Negative => {
                "SELECT name, minusminus AS score FROM karma ORDER BY score DESC, rowid ASC"
            }
        };
        self.broker.with_conn(&self.actor, "karma.rank", |conn| {
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

            let mut out = Vec::new();
            for r in rows {
                out.push(r?);
            }
            Ok(out)
        })
    }
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "karma",
        "version": "0.5.0",
        "description": "Per-name karma counters driven by name++ / name-- chat messages",
        "commands": [
            { "name": "[name]++", "description": "Add karma to a name" },
            { "name": "[name]--", "description": "Subtract karma from a name (an em-dash also works)" },
            { "name": "!karma", "parameters": ["name"], "description": "Show karma stats for a name" },
            { "name": "!karmaleaders", "description": "Top names by net karma" },
            { "name": "!karmaplus", "description": "Top names by positive karma" },
            { "name": "!karmaminus", "description": "Top names by negative karma" },
            { "name": "!help", "description": "Show usage" }
        ],
        "storage": ["karmadb.sqlite", "broker.events.jsonl"]
    })
}
