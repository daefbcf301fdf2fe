use crate::error::{Result, StatsError};
use crate::model::{PersistedSettings, SCHEMA_VERSION};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SETTINGS_RECORD: &str = "settings";
pub const DB_FILE: &str = "settings.db";

/// Durable storage for the settings snapshot.
pub struct SettingsDb {
    conn: Connection,
}

impl SettingsDb {
    pub fn open<P: AsRef<Path>>(state_dir: Option<P>) -> Result<Self> {
        let dir = match state_dir {
            Some(path) => path.as_ref().to_path_buf(),
            None => default_state_dir()?,
        };
        std::fs::create_dir_all(&dir)?;
        let db_path = dir.join(DB_FILE);
        debug!(path = %db_path.display(), "opening settings database");
        let conn = Connection::open(&db_path)?;
        let mut db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    pub fn in_memory() -> Result<Self> {
        let mut db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS settings (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        self.check_schema_version()?;
        Ok(())
    }

    fn check_schema_version(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            let set_stmt = format!("PRAGMA user_version = {SCHEMA_VERSION};");
            self.conn.execute_batch(&set_stmt)?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(StatsError::Persist(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }

    /// Load the saved snapshot, or defaults when nothing was saved yet.
    ///
    /// A record that no longer parses is discarded with a warning.
    pub fn load(&self) -> Result<PersistedSettings> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE name = ?",
                params![SETTINGS_RECORD],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            None => Ok(PersistedSettings::default()),
            Some(json) => match serde_json::from_str(&json) {
                Ok(settings) => Ok(settings),
                Err(e) => {
                    warn!(error = %e, "discarding unreadable settings record");
                    Ok(PersistedSettings::default())
                }
            },
        }
    }

    pub fn save(&mut self, settings: &PersistedSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (name, value) VALUES (?, ?)",
            params![SETTINGS_RECORD, json],
        )?;
        debug!("settings saved");
        Ok(())
    }
}

pub fn default_state_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("", "", "git-statistics")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| StatsError::Persist("no home directory to keep settings in".to_string()))
}
