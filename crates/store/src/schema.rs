//! Table layout and one-time setup

use crate::StoreError;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::time::Duration;

/// Bumped whenever the table layout changes
pub(crate) const SCHEMA_VERSION: i64 = 1;

/// Windows paths compare case-insensitively, so the key does too.
#[cfg(windows)]
const PATH_COLLATION: &str = "COLLATE NOCASE";
#[cfg(not(windows))]
const PATH_COLLATION: &str = "";

/// Create the table and indexes if missing and switch the file to WAL
pub(crate) fn install(conn: &Connection, timeout: Duration) -> Result<(), StoreError> {
    let sql_err = |e| StoreError::from_sql(e, timeout);

    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(sql_err)?;

    if version > SCHEMA_VERSION {
        return Err(StoreError::Corrupt(format!(
            "schema version {version} is newer than supported version {SCHEMA_VERSION}"
        )));
    }

    // Persistent per file; readers keep working while a watcher writes.
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        "#,
    )
    .map_err(sql_err)?;

    if version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate).map_err(sql_err)?;

    // Another process may have finished the install while we waited
    let version: i64 = tx
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(sql_err)?;
    if version == SCHEMA_VERSION {
        return Ok(());
    }

    let legacy: bool = tx
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'footprints')",
            [],
            |row| row.get(0),
        )
        .map_err(sql_err)?;

    if legacy {
        tx.execute_batch("ALTER TABLE footprints RENAME TO footprints_legacy;")
            .map_err(sql_err)?;
    }

    tx.execute_batch(&format!(
        r#"
        CREATE TABLE footprints (
            path TEXT PRIMARY KEY {PATH_COLLATION},
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            visit_count INTEGER NOT NULL DEFAULT 1 CHECK (visit_count >= 1),
            last_visit INTEGER NOT NULL
        );
        "#
    ))
    .map_err(sql_err)?;

    if legacy {
        let migrated = tx.execute(MIGRATE_LEGACY_ROWS, []).map_err(sql_err)?;
        tx.execute_batch("DROP TABLE footprints_legacy;")
            .map_err(sql_err)?;
        tracing::info!("Migrated {} footprints from an unversioned table", migrated);
    }

    tx.execute_batch(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS idx_footprints_last_visit
            ON footprints(last_visit DESC);
        CREATE INDEX IF NOT EXISTS idx_footprints_name
            ON footprints(name COLLATE NOCASE);

        PRAGMA user_version = {SCHEMA_VERSION};
        "#
    ))
    .map_err(sql_err)?;

    tx.commit().map_err(sql_err)?;
    tracing::info!("Installed footprint schema v{}", SCHEMA_VERSION);
    Ok(())
}

/// Copy rows from an unversioned table: local `YYYY-MM-DD HH:MM:SS` text
/// becomes UTC milliseconds, `Shortcut (Win)` becomes `Shortcut`, and
/// missing columns get defaults. Rows whose keys collide under the new
/// collation are merged.
const MIGRATE_LEGACY_ROWS: &str = r#"
    INSERT INTO footprints (path, name, type, visit_count, last_visit)
    SELECT
        path,
        COALESCE(NULLIF(name, ''), path),
        CASE
            WHEN type IN ('Folder', 'File', 'Shortcut', 'WebShortcut') THEN type
            WHEN type = 'Shortcut (Win)' THEN 'Shortcut'
            ELSE 'File'
        END,
        MAX(COALESCE(visit_count, 1), 1),
        CASE typeof(last_visit)
            WHEN 'integer' THEN last_visit
            ELSE COALESCE(CAST(strftime('%s', last_visit, 'utc') AS INTEGER) * 1000, 0)
        END
    FROM footprints_legacy
    WHERE path IS NOT NULL AND path != ''
    ORDER BY 5 ASC
    ON CONFLICT(path) DO UPDATE SET
        visit_count = visit_count + excluded.visit_count,
        name = excluded.name,
        type = excluded.type,
        last_visit = MAX(last_visit, excluded.last_visit)
"#;
