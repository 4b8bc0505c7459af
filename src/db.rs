// ==========================================
// Exam Timetabling Engine - SQLite Initialization
// ==========================================
// Goals:
// - One place for PRAGMA behavior, so every connection gets foreign keys
//   and a busy timeout instead of only some modules doing it
// - One place for the schema DDL, including the guard triggers that make
//   the storage itself reject conflicting placements
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version this code expects.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the uniform PRAGMAs to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings, so this must
/// run on every connection, not once per database.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the uniform configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Read the schema version (None if the table does not exist yet).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Create all tables, indexes and guard triggers.
///
/// Idempotent (`IF NOT EXISTS` throughout), safe to run on every startup.
///
/// The two BEFORE INSERT triggers are the storage-side conflict guards:
/// a non-draft, non-cancelled exam cannot be inserted when its event
/// already has an active exam, or when its room or professor is occupied
/// in an overlapping interval. The engine's in-memory conflict index
/// should make these fire never; when they do fire anyway, the insert is
/// rejected atomically and the error message starts with
/// "schedule conflict", which the repository layer maps to a dedicated
/// error variant.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS rooms (
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            capacity INTEGER NOT NULL,
            building TEXT,
            available INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS professors (
            id INTEGER PRIMARY KEY,
            full_name TEXT NOT NULL,
            dept_id INTEGER,
            available INTEGER NOT NULL DEFAULT 1,
            daily_cap INTEGER NOT NULL DEFAULT 3
        );

        CREATE TABLE IF NOT EXISTS exam_events (
            id INTEGER PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            formation_id INTEGER NOT NULL,
            dept_id INTEGER NOT NULL,
            duration_min INTEGER NOT NULL DEFAULT 120,
            enrollment INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS scheduled_exams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            exam_event_id INTEGER NOT NULL REFERENCES exam_events(id),
            room_id INTEGER REFERENCES rooms(id),
            professor_id INTEGER REFERENCES professors(id),
            start_at TEXT NOT NULL,
            duration_min INTEGER NOT NULL DEFAULT 120,
            status TEXT NOT NULL DEFAULT 'draft',
            session_id TEXT,
            enrollment INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_scheduled_exams_start
            ON scheduled_exams(start_at);
        CREATE INDEX IF NOT EXISTS idx_scheduled_exams_event
            ON scheduled_exams(exam_event_id, status);
        CREATE INDEX IF NOT EXISTS idx_scheduled_exams_room
            ON scheduled_exams(room_id, start_at);
        CREATE INDEX IF NOT EXISTS idx_scheduled_exams_professor
            ON scheduled_exams(professor_id, start_at);

        CREATE TABLE IF NOT EXISTS generation_sessions (
            session_id TEXT PRIMARY KEY,
            requested_by TEXT NOT NULL,
            window_start TEXT NOT NULL,
            window_end TEXT NOT NULL,
            filters_json TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            placed_count INTEGER NOT NULL DEFAULT 0,
            resolved_count INTEGER NOT NULL DEFAULT 0,
            elapsed_ms INTEGER NOT NULL DEFAULT 0,
            log TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            finished_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_generation_sessions_status
            ON generation_sessions(status, created_at);

        CREATE TRIGGER IF NOT EXISTS trg_exam_single_active
        BEFORE INSERT ON scheduled_exams
        FOR EACH ROW
        WHEN NEW.status NOT IN ('cancelled', 'draft')
        BEGIN
            SELECT RAISE(ABORT, 'schedule conflict: exam event already has an active exam')
            WHERE EXISTS (
                SELECT 1 FROM scheduled_exams e
                WHERE e.exam_event_id = NEW.exam_event_id
                  AND e.status NOT IN ('cancelled', 'draft')
            );
        END;

        CREATE TRIGGER IF NOT EXISTS trg_exam_no_overlap
        BEFORE INSERT ON scheduled_exams
        FOR EACH ROW
        WHEN NEW.status NOT IN ('cancelled', 'draft')
        BEGIN
            SELECT RAISE(ABORT, 'schedule conflict: room or professor occupied in an overlapping interval')
            WHERE EXISTS (
                SELECT 1 FROM scheduled_exams e
                WHERE e.status NOT IN ('cancelled', 'draft')
                  AND (
                        (NEW.room_id IS NOT NULL AND e.room_id = NEW.room_id)
                     OR (NEW.professor_id IS NOT NULL AND e.professor_id = NEW.professor_id)
                  )
                  AND e.start_at < datetime(NEW.start_at, '+' || NEW.duration_min || ' minutes')
                  AND datetime(e.start_at, '+' || e.duration_min || ' minutes') > NEW.start_at
            );
        END;

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(
            read_schema_version(&conn).unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }

    #[test]
    fn test_schema_version_none_on_empty_db() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }
}
