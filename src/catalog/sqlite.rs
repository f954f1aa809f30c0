//! SQLite-backed catalog store

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, Row, params};
use tracing::{debug, info};

use crate::catalog::error::CatalogError;
use crate::catalog::record::{
    ConfigurationError, ConfigurationStatus, InstallationScope, LocatingInstruction,
    ProgramRecord, VersionSearchBehavior, VersionSearchMethod,
};
use crate::catalog::state::CachedState;
use crate::catalog::store::CatalogStore;

/// Schema migrations
/// Each version contains a list of SQL statements to execute
const MIGRATIONS: &[&[&str]] = &[
    // v1: speed up the configured-program reset pass
    &[
        "CREATE INDEX IF NOT EXISTS idx_programs_configured \
         ON programs(is_update_check_configured)",
    ],
];

const META_KEY_FINGERPRINT: &str = "last_fingerprint";
const META_KEY_BROWSER_CHECKSUM: &str = "last_browser_checksum";
const META_KEY_USER_AGENT: &str = "last_user_agent";
const META_KEY_CHECK_TIME: &str = "last_check_time";

pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Opens (creating if needed) the catalog database at `db_path`.
    ///
    /// A file that exists but is not a usable database surfaces as
    /// [`CatalogError::Corrupted`] so the host can offer recreation instead
    /// of failing opaquely.
    pub fn open(db_path: &Path) -> Result<Self, CatalogError> {
        info!("Opening catalog database at {:?}", db_path);

        let conn = Connection::open(db_path).map_err(map_open_error)?;

        // Enable WAL mode for better concurrency
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(map_open_error)?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(map_open_error)?;

        debug!("Database connection established");

        let catalog = Self {
            conn: Mutex::new(conn),
        };

        catalog.create_schema()?;
        info!("Catalog opened successfully");

        Ok(catalog)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn.lock().map_err(|_| CatalogError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), CatalogError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS programs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                installed_version TEXT NOT NULL DEFAULT '',
                latest_version TEXT NOT NULL DEFAULT '',
                skipped_version TEXT NOT NULL DEFAULT '',
                installation_scope INTEGER NOT NULL DEFAULT 0,
                is_update_check_configured INTEGER NOT NULL DEFAULT 0,
                web_page_url TEXT NOT NULL DEFAULT '',
                version_search_method INTEGER NOT NULL DEFAULT 0,
                version_search_argument_1 TEXT NOT NULL DEFAULT '',
                version_search_argument_2 TEXT NOT NULL DEFAULT '',
                treat_standalone_number_as_version INTEGER NOT NULL DEFAULT 0,
                version_search_behavior INTEGER NOT NULL DEFAULT 0,
                web_page_post_load_delay_ms INTEGER NOT NULL DEFAULT 0,
                locating_instructions TEXT NOT NULL DEFAULT '[]',
                is_automatically_added INTEGER NOT NULL DEFAULT 0,
                update_check_configuration_status INTEGER NOT NULL DEFAULT 0,
                update_check_configuration_error INTEGER NOT NULL DEFAULT 0,
                is_hidden INTEGER NOT NULL DEFAULT 0
            )
            "#,
            [],
        )
        .map_err(map_open_error)?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Self::apply_migrations(&conn)?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Apply pending migrations based on user_version pragma
    fn apply_migrations(conn: &Connection) -> Result<(), CatalogError> {
        let current_version: i32 =
            conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

        for (i, statements) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                for sql in *statements {
                    conn.execute(sql, [])?;
                }
                debug!("Applied migration v{}", version);
            }
        }

        let target_version = MIGRATIONS.len() as i32;
        if target_version > current_version {
            conn.pragma_update(None, "user_version", target_version)?;
            debug!("Updated schema version to v{}", target_version);
        }

        Ok(())
    }
}

fn map_open_error(e: rusqlite::Error) -> CatalogError {
    match &e {
        rusqlite::Error::SqliteFailure(code, _) if code.code == ErrorCode::NotADatabase => {
            CatalogError::Corrupted
        }
        _ => CatalogError::Database(e),
    }
}

const RECORD_COLUMNS: &str = "name, installed_version, latest_version, skipped_version, \
     installation_scope, is_update_check_configured, web_page_url, version_search_method, \
     version_search_argument_1, version_search_argument_2, \
     treat_standalone_number_as_version, version_search_behavior, \
     web_page_post_load_delay_ms, locating_instructions, is_automatically_added, \
     update_check_configuration_status, update_check_configuration_error, is_hidden";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ProgramRecord> {
    let instructions_json: String = row.get(13)?;
    let locating_instructions: Vec<LocatingInstruction> =
        serde_json::from_str(&instructions_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(13, Type::Text, Box::new(e))
        })?;

    Ok(ProgramRecord {
        name: row.get(0)?,
        installed_version: row.get(1)?,
        latest_version: row.get(2)?,
        skipped_version: row.get(3)?,
        installation_scope: InstallationScope::from_i64(row.get(4)?),
        is_update_check_configured: row.get(5)?,
        web_page_url: row.get(6)?,
        version_search_method: VersionSearchMethod::from_i64(row.get(7)?),
        version_search_argument_1: row.get(8)?,
        version_search_argument_2: row.get(9)?,
        treat_standalone_number_as_version: row.get(10)?,
        version_search_behavior: VersionSearchBehavior::from_i64(row.get(11)?),
        web_page_post_load_delay_ms: row.get::<_, i64>(12)? as u64,
        locating_instructions,
        is_automatically_added: row.get(14)?,
        update_check_configuration_status: ConfigurationStatus::from_i64(row.get(15)?),
        update_check_configuration_error: ConfigurationError::from_i64(row.get(16)?),
        is_hidden: row.get(17)?,
    })
}

fn instructions_json(record: &ProgramRecord) -> Result<String, CatalogError> {
    serde_json::to_string(&record.locating_instructions)
        .map_err(|e| CatalogError::Malformed(e.to_string()))
}

impl CatalogStore for SqliteCatalog {
    fn begin_transaction(&self) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(())
    }

    fn commit_transaction(&self) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;
        conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback_transaction(&self) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;
        conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn programs(&self) -> Result<IndexMap<String, ProgramRecord>, CatalogError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM programs ORDER BY id"
        ))?;

        let mut programs = IndexMap::new();
        for record in stmt.query_map([], row_to_record)? {
            let record = record?;
            programs.insert(record.name.clone(), record);
        }

        Ok(programs)
    }

    fn add_program(&self, record: &ProgramRecord) -> Result<(), CatalogError> {
        let instructions = instructions_json(record)?;
        let conn = self.lock_conn()?;
        conn.execute(
            &format!(
                "INSERT INTO programs ({RECORD_COLUMNS}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
            ),
            params![
                record.name,
                record.installed_version,
                record.latest_version,
                record.skipped_version,
                record.installation_scope.as_i64(),
                record.is_update_check_configured,
                record.web_page_url,
                record.version_search_method.as_i64(),
                record.version_search_argument_1,
                record.version_search_argument_2,
                record.treat_standalone_number_as_version,
                record.version_search_behavior.as_i64(),
                record.web_page_post_load_delay_ms as i64,
                instructions,
                record.is_automatically_added,
                record.update_check_configuration_status.as_i64(),
                record.update_check_configuration_error.as_i64(),
                record.is_hidden,
            ],
        )?;
        Ok(())
    }

    fn update_program(&self, name: &str, record: &ProgramRecord) -> Result<(), CatalogError> {
        let instructions = instructions_json(record)?;
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            UPDATE programs SET
                name = ?1,
                installed_version = ?2,
                latest_version = ?3,
                skipped_version = ?4,
                installation_scope = ?5,
                is_update_check_configured = ?6,
                web_page_url = ?7,
                version_search_method = ?8,
                version_search_argument_1 = ?9,
                version_search_argument_2 = ?10,
                treat_standalone_number_as_version = ?11,
                version_search_behavior = ?12,
                web_page_post_load_delay_ms = ?13,
                locating_instructions = ?14,
                is_automatically_added = ?15,
                update_check_configuration_status = ?16,
                update_check_configuration_error = ?17,
                is_hidden = ?18
            WHERE name = ?19
            "#,
            params![
                record.name,
                record.installed_version,
                record.latest_version,
                record.skipped_version,
                record.installation_scope.as_i64(),
                record.is_update_check_configured,
                record.web_page_url,
                record.version_search_method.as_i64(),
                record.version_search_argument_1,
                record.version_search_argument_2,
                record.treat_standalone_number_as_version,
                record.version_search_behavior.as_i64(),
                record.web_page_post_load_delay_ms as i64,
                instructions,
                record.is_automatically_added,
                record.update_check_configuration_status.as_i64(),
                record.update_check_configuration_error.as_i64(),
                record.is_hidden,
                name,
            ],
        )?;
        Ok(())
    }

    fn update_installation_info(
        &self,
        name: &str,
        installed_version: &str,
        scope: InstallationScope,
    ) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "UPDATE programs SET installed_version = ?1, installation_scope = ?2 \
             WHERE name = ?3",
            params![installed_version, scope.as_i64(), name],
        )?;
        Ok(())
    }

    fn update_latest_version(
        &self,
        name: &str,
        latest_version: &str,
    ) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "UPDATE programs SET latest_version = ?1 WHERE name = ?2",
            params![latest_version, name],
        )?;
        Ok(())
    }

    fn change_configuration_status(
        &self,
        name: &str,
        status: ConfigurationStatus,
        error: ConfigurationError,
    ) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "UPDATE programs SET update_check_configuration_status = ?1, \
             update_check_configuration_error = ?2 WHERE name = ?3",
            params![status.as_i64(), error.as_i64(), name],
        )?;
        Ok(())
    }

    fn reset_configured_programs(&self) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "UPDATE programs SET latest_version = '', \
             update_check_configuration_status = ?1, \
             update_check_configuration_error = ?2 \
             WHERE is_update_check_configured = 1",
            params![
                ConfigurationStatus::Unknown.as_i64(),
                ConfigurationError::None.as_i64()
            ],
        )?;
        Ok(())
    }

    fn unskip_version(&self, name: &str) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "UPDATE programs SET skipped_version = '' WHERE name = ?1",
            params![name],
        )?;
        Ok(())
    }

    fn hide_program(&self, name: &str) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "UPDATE programs SET is_hidden = 1 WHERE name = ?1",
            params![name],
        )?;
        Ok(())
    }

    fn unhide_program(&self, name: &str) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;
        conn.execute(
            "UPDATE programs SET is_hidden = 0 WHERE name = ?1",
            params![name],
        )?;
        Ok(())
    }

    fn remove_program(&self, name: &str) -> Result<(), CatalogError> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM programs WHERE name = ?1", params![name])?;
        Ok(())
    }

    fn load_state(&self) -> Result<CachedState, CatalogError> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM meta")?;
        let entries = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<(String, String)>, _>>()?;

        let mut state = CachedState::default();
        for (key, value) in entries {
            match key.as_str() {
                META_KEY_FINGERPRINT => state.last_fingerprint = value,
                META_KEY_BROWSER_CHECKSUM => state.last_browser_checksum = value,
                META_KEY_USER_AGENT => state.last_user_agent = value,
                META_KEY_CHECK_TIME => {
                    state.last_check_time = DateTime::parse_from_rfc3339(&value)
                        .ok()
                        .map(|t| t.with_timezone(&Utc));
                }
                _ => debug!("Ignoring unknown meta key {:?}", key),
            }
        }

        Ok(state)
    }

    fn save_state(&self, state: &CachedState) -> Result<(), CatalogError> {
        let check_time = state
            .last_check_time
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        // Single statement keeps the whole state write atomic.
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2), (?3, ?4), (?5, ?6), (?7, ?8) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![
                META_KEY_FINGERPRINT,
                state.last_fingerprint,
                META_KEY_BROWSER_CHECKSUM,
                state.last_browser_checksum,
                META_KEY_USER_AGENT,
                state.last_user_agent,
                META_KEY_CHECK_TIME,
                check_time,
            ],
        )?;
        Ok(())
    }
}
