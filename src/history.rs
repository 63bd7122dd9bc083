use chrono::{DateTime, Local};
use directories::ProjectDirs;
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

/// One settled reassignment attempt, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRecord {
    pub class_id: String,
    pub course: String,
    pub from_day: String,
    pub from_slot: String,
    pub to_day: String,
    pub to_slot: String,
    pub ok: bool,
    pub error: Option<String>,
    pub timestamp: DateTime<Local>,
}

/// Local log of operator moves, kept out of the timetable file so a
/// re-export does not erase the audit trail.
#[derive(Debug)]
pub struct MoveLog {
    conn: Connection,
}

impl MoveLog {
    pub fn new() -> Result<Self> {
        let db_path = Self::default_path().unwrap_or_else(|| PathBuf::from("rota_moves.db"));
        Self::open(&db_path)
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path.as_ref())
    }

    fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(db_path)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS move_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                class_id TEXT NOT NULL,
                course TEXT NOT NULL,
                from_day TEXT NOT NULL,
                from_slot TEXT NOT NULL,
                to_day TEXT NOT NULL,
                to_slot TEXT NOT NULL,
                ok BOOLEAN NOT NULL,
                error TEXT,
                timestamp TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_move_log_class ON move_log(class_id)",
            [],
        )?;

        Ok(MoveLog { conn })
    }

    /// Log db under $HOME/.local/state/rota, falling back to the platform
    /// data dir.
    fn default_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("rota")
                    .join("moves.db"),
            )
        } else {
            ProjectDirs::from("", "", "rota").map(|pd| pd.data_local_dir().join("moves.db"))
        }
    }

    pub fn record(&self, record: &MoveRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO move_log
            (class_id, course, from_day, from_slot, to_day, to_slot, ok, error, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.class_id,
                record.course,
                record.from_day,
                record.from_slot,
                record.to_day,
                record.to_slot,
                record.ok,
                record.error,
                record.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent attempts, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<MoveRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT class_id, course, from_day, from_slot, to_day, to_slot, ok, error, timestamp
            FROM move_log
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            let ts: String = row.get(8)?;
            Ok(MoveRecord {
                class_id: row.get(0)?,
                course: row.get(1)?,
                from_day: row.get(2)?,
                from_slot: row.get(3)?,
                to_day: row.get(4)?,
                to_slot: row.get(5)?,
                ok: row.get(6)?,
                error: row.get(7)?,
                timestamp: DateTime::parse_from_rfc3339(&ts)
                    .map(|dt| dt.with_timezone(&Local))
                    .unwrap_or_else(|_| Local::now()),
            })
        })?;

        rows.collect()
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM move_log", [])?;
        Ok(())
    }
}
