//! SQLite footprint store
//!
//! Every operation opens its own connection and drops it before returning,
//! so no handle outlives a call and a failed call cannot poison later ones.
//! Writers that find the database locked wait up to the busy timeout and
//! then fail with [`StoreError::Busy`].

use crate::schema;
use crate::StoreError;
use chrono::{DateTime, Utc};
use footprints_core::{CanonicalPath, Footprint, FootprintKind, SortKey};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a writer waits on a locked database before giving up
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

const DATA_DIR: &str = "data";
const DB_FILE_NAME: &str = "footprints.db";

const COLUMNS: &str = "path, name, type, visit_count, last_visit";

/// Default database location: `<dir of running executable>/data/footprints.db`
pub fn default_db_path() -> Result<PathBuf, StoreError> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "executable has no parent directory",
        )
    })?;
    Ok(dir.join(DATA_DIR).join(DB_FILE_NAME))
}

/// Durable, deduplicated visit history
#[derive(Debug, Clone)]
pub struct FootprintStore {
    /// Database file
    db_path: PathBuf,
    /// Bounded wait for write locks
    busy_timeout: Duration,
}

impl FootprintStore {
    /// Open or create the store at `db_path`, creating parent directories
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_timeout(db_path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open with an explicit busy timeout
    pub fn open_with_timeout(
        db_path: impl AsRef<Path>,
        busy_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            db_path,
            busy_timeout,
        };

        let conn = store.connect()?;
        schema::install(&conn, busy_timeout)?;

        tracing::debug!("Opened footprint store at {}", store.db_path.display());
        Ok(store)
    }

    /// Change the busy timeout used by subsequent operations
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }

    /// Record a visit happening now
    pub fn record_visit(&self, path: &CanonicalPath) -> Result<Footprint, StoreError> {
        self.record_visit_at(path, Utc::now())
    }

    /// Record a visit at an explicit time
    ///
    /// Inserts with `visit_count = 1` or bumps the existing row in the same
    /// statement. `last_visit` never moves backwards; `name` and `type`
    /// always take the new values.
    pub fn record_visit_at(
        &self,
        path: &CanonicalPath,
        at: DateTime<Utc>,
    ) -> Result<Footprint, StoreError> {
        let conn = self.connect()?;

        let sql = format!(
            "INSERT INTO footprints ({COLUMNS}) VALUES (?1, ?2, ?3, 1, ?4) \
             ON CONFLICT(path) DO UPDATE SET \
                 visit_count = visit_count + 1, \
                 last_visit = MAX(last_visit, excluded.last_visit), \
                 name = excluded.name, \
                 type = excluded.type \
             RETURNING {COLUMNS}"
        );

        conn.query_row(
            &sql,
            params![path.path, path.name, path.kind.as_str(), at.timestamp_millis()],
            footprint_from_row,
        )
        .map_err(|e| self.sql_error(e))
    }

    /// Rows whose name or path contains `substring` (case-insensitive)
    pub fn query(
        &self,
        substring: &str,
        sort: SortKey,
        limit: usize,
    ) -> Result<Vec<Footprint>, StoreError> {
        let conn = self.connect()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let needle = substring.to_lowercase();

        // An empty needle matches everything; skip the filter so the
        // ORDER BY can walk its index directly.
        let filter = if needle.is_empty() {
            ""
        } else {
            "WHERE contains_folded(name, ?2) OR contains_folded(path, ?2)"
        };

        let sql = format!(
            "SELECT {COLUMNS} FROM footprints {filter} ORDER BY {} LIMIT ?1",
            order_clause(sort)
        );

        let mut stmt = conn.prepare(&sql).map_err(|e| self.sql_error(e))?;
        let rows = if needle.is_empty() {
            stmt.query_map(params![limit], footprint_from_row)
        } else {
            stmt.query_map(params![limit, needle], footprint_from_row)
        }
        .map_err(|e| self.sql_error(e))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| self.sql_error(e))
    }

    /// Look up a single row by canonical path
    pub fn get(&self, path: &str) -> Result<Option<Footprint>, StoreError> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM footprints WHERE path = ?1"),
            params![path],
            footprint_from_row,
        )
        .optional()
        .map_err(|e| self.sql_error(e))
    }

    /// Total number of rows
    pub fn count(&self) -> Result<u64, StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM footprints", [], |row| row.get(0))
            .map_err(|e| self.sql_error(e))?;
        Ok(count.max(0) as u64)
    }

    /// Open a connection scoped to one operation
    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path).map_err(|e| self.sql_error(e))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| self.sql_error(e))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| self.sql_error(e))?;

        conn.create_scalar_function(
            "contains_folded",
            2,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let haystack: String = ctx.get(0)?;
                let needle: String = ctx.get(1)?;
                Ok(haystack.to_lowercase().contains(&needle))
            },
        )
        .map_err(|e| self.sql_error(e))?;

        Ok(conn)
    }

    fn sql_error(&self, err: rusqlite::Error) -> StoreError {
        StoreError::from_sql(err, self.busy_timeout)
    }
}

fn order_clause(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Name => "name COLLATE NOCASE ASC",
        SortKey::Kind => "type ASC, last_visit DESC",
        SortKey::VisitCount => "visit_count DESC, last_visit DESC",
        SortKey::LastVisit => "last_visit DESC",
        SortKey::Path => "path ASC",
    }
}

fn footprint_from_row(row: &Row<'_>) -> rusqlite::Result<Footprint> {
    let kind_text: String = row.get(2)?;
    let kind = kind_text
        .parse::<FootprintKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    let visit_count: i64 = row.get(3)?;
    let visit_count = u64::try_from(visit_count)
        .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(3, visit_count))?;

    let last_visit_ms: i64 = row.get(4)?;
    let last_visit = DateTime::<Utc>::from_timestamp_millis(last_visit_ms)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(4, last_visit_ms))?;

    Ok(Footprint {
        path: row.get(0)?,
        name: row.get(1)?,
        kind,
        visit_count,
        last_visit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use footprints_core::normalize;
    use std::fs;
    use tempfile::TempDir;

    fn open_store(temp: &TempDir) -> FootprintStore {
        FootprintStore::open(temp.path().join("data").join("footprints.db")).unwrap()
    }

    fn synthetic(path: &str, kind: FootprintKind) -> CanonicalPath {
        CanonicalPath {
            path: path.to_string(),
            name: Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string()),
            kind,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_open_creates_data_directory() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        assert!(store.db_path().exists());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_first_visit_inserts_row() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let row = store
            .record_visit_at(&synthetic("/a/report.txt", FootprintKind::File), at(0))
            .unwrap();

        assert_eq!(row.path, "/a/report.txt");
        assert_eq!(row.name, "report.txt");
        assert_eq!(row.kind, FootprintKind::File);
        assert_eq!(row.visit_count, 1);
        assert_eq!(row.last_visit, at(0));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_second_visit_updates_in_place() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        let path = synthetic("/a/report.txt", FootprintKind::File);

        store.record_visit_at(&path, at(0)).unwrap();
        let row = store.record_visit_at(&path, at(10)).unwrap();

        assert_eq!(row.visit_count, 2);
        assert_eq!(row.last_visit, at(10));
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("/a/report.txt").unwrap(), Some(row));
    }

    #[test]
    fn test_name_and_kind_track_latest_visit() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store
            .record_visit_at(&synthetic("/a/thing", FootprintKind::File), at(0))
            .unwrap();
        let mut renamed = synthetic("/a/thing", FootprintKind::Folder);
        renamed.name = "Thing".to_string();
        let row = store.record_visit_at(&renamed, at(1)).unwrap();

        assert_eq!(row.name, "Thing");
        assert_eq!(row.kind, FootprintKind::Folder);
        assert_eq!(row.visit_count, 2);
    }

    #[test]
    fn test_last_visit_never_moves_backwards() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        let path = synthetic("/a/b", FootprintKind::File);

        store.record_visit_at(&path, at(100)).unwrap();
        let row = store.record_visit_at(&path, at(50)).unwrap();

        assert_eq!(row.visit_count, 2);
        assert_eq!(row.last_visit, at(100));
    }

    #[test]
    fn test_file_visited_twice() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        let file = temp.path().join("foo");
        fs::write(&file, b"x").unwrap();
        let canonical = normalize(file.to_str().unwrap()).unwrap();

        store.record_visit(&canonical).unwrap();
        let row = store.record_visit(&canonical).unwrap();

        assert_eq!(row.path, canonical.path);
        assert_eq!(row.kind, FootprintKind::File);
        assert_eq!(row.visit_count, 2);
    }

    #[test]
    fn test_directory_recorded_as_folder() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        let dir = temp.path().join("dir");
        fs::create_dir(&dir).unwrap();
        let raw = format!("{}{}", dir.display(), std::path::MAIN_SEPARATOR);

        let row = store.record_visit(&normalize(&raw).unwrap()).unwrap();

        assert_eq!(row.kind, FootprintKind::Folder);
        assert_eq!(row.name, "dir");
    }

    #[test]
    fn test_missing_shortcut_still_recorded() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        let lnk = temp.path().join("gone.lnk");

        let row = store.record_visit(&normalize(lnk.to_str().unwrap()).unwrap()).unwrap();

        assert_eq!(row.kind, FootprintKind::Shortcut);
        assert_eq!(row.visit_count, 1);
    }

    #[test]
    fn test_rows_survive_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let store = open_store(&temp);
            store
                .record_visit_at(&synthetic("/x", FootprintKind::Folder), at(0))
                .unwrap();
        }

        let store = open_store(&temp);
        let row = store.get("/x").unwrap().unwrap();
        assert_eq!(row.kind, FootprintKind::Folder);
        assert_eq!(store.get("/missing").unwrap(), None);
    }

    #[test]
    fn test_busy_writer_times_out() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp).with_busy_timeout(Duration::from_millis(100));
        store
            .record_visit_at(&synthetic("/seed", FootprintKind::File), at(0))
            .unwrap();

        let blocker = Connection::open(store.db_path()).unwrap();
        blocker.execute_batch("BEGIN EXCLUSIVE;").unwrap();

        let err = store
            .record_visit_at(&synthetic("/blocked", FootprintKind::File), at(1))
            .unwrap_err();
        assert!(err.is_busy(), "expected busy, got {err}");

        // WAL readers are not blocked by the writer
        assert_eq!(store.count().unwrap(), 1);

        blocker.execute_batch("ROLLBACK;").unwrap();
        store
            .record_visit_at(&synthetic("/blocked", FootprintKind::File), at(2))
            .unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_garbage_file_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("footprints.db");
        fs::write(&db_path, vec![0x42u8; 8192]).unwrap();

        let err = FootprintStore::open(&db_path).unwrap_err();
        assert!(err.is_corrupt(), "expected corrupt, got {err}");
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("footprints.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch("PRAGMA user_version = 99;").unwrap();
        }

        let err = FootprintStore::open(&db_path).unwrap_err();
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_unversioned_table_is_migrated() {
        let temp = TempDir::new().unwrap();
        let db_path = temp.path().join("footprints.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch(
                r#"
                CREATE TABLE footprints (
                    path TEXT PRIMARY KEY,
                    name TEXT,
                    type TEXT,
                    visit_count INTEGER DEFAULT 1,
                    last_visit DATETIME
                );
                CREATE INDEX idx_last_visit ON footprints(last_visit DESC);
                CREATE INDEX idx_name ON footprints(name COLLATE NOCASE);
                INSERT INTO footprints VALUES
                    ('/old/app.lnk', 'app.lnk', 'Shortcut (Win)', 3, '2024-05-01 10:00:00'),
                    ('/old/docs', 'docs', 'Folder', 1, '2024-04-01 08:30:00');
                "#,
            )
            .unwrap();
        }

        let store = FootprintStore::open(&db_path).unwrap();

        let app = store.get("/old/app.lnk").unwrap().unwrap();
        assert_eq!(app.kind, FootprintKind::Shortcut);
        assert_eq!(app.visit_count, 3);
        let expected = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
            .and_local_timezone(chrono::Local)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(app.last_visit, expected);

        let rows = store.query("", SortKey::LastVisit, 10).unwrap();
        let paths: Vec<_> = rows.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["/old/app.lnk", "/old/docs"]);

        let bumped = store
            .record_visit(&synthetic("/old/docs", FootprintKind::Folder))
            .unwrap();
        assert_eq!(bumped.visit_count, 2);

        let conn = Connection::open(&db_path).unwrap();
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_unknown_kind_row_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);
        {
            let conn = Connection::open(store.db_path()).unwrap();
            conn.execute(
                "INSERT INTO footprints (path, name, type, visit_count, last_visit) \
                 VALUES ('/odd', 'odd', 'Shortcut (Win)', 1, 0)",
                [],
            )
            .unwrap();
        }

        let err = store.get("/odd").unwrap_err();
        assert!(err.is_corrupt());
    }
}
