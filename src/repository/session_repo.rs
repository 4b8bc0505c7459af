// ==========================================
// Exam Timetabling Engine - Generation Session Repository
// ==========================================
// Sessions are opened `in_progress` and finalized exactly once: the
// UPDATE carries a status guard, so a second finalize attempt surfaces
// as InvalidStateTransition instead of silently overwriting the first
// outcome.
// ==========================================

use crate::domain::session::GenerationSession;
use crate::domain::types::SessionStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// GenerationSessionRepository
// ==========================================
pub struct GenerationSessionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GenerationSessionRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Persist a freshly opened session.
    ///
    /// # Returns
    /// - `Ok(session_id)`
    pub fn create(&self, session: &GenerationSession) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO generation_sessions (
                session_id, requested_by, window_start, window_end,
                filters_json, status, placed_count, resolved_count,
                elapsed_ms, log, created_at, finished_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &session.session_id,
                &session.requested_by,
                &session.window_start.format("%Y-%m-%d").to_string(),
                &session.window_end.format("%Y-%m-%d").to_string(),
                &session.filters_json,
                session.status.as_str(),
                &session.placed_count,
                &session.resolved_count,
                &session.elapsed_ms,
                &session.log,
                &session.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                &session
                    .finished_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            ],
        )?;

        Ok(session.session_id.clone())
    }

    /// Close an `in_progress` session with a terminal status and its run
    /// counters.
    ///
    /// # Returns
    /// - `Ok(())`: exactly this call closed the session
    /// - `Err(InvalidStateTransition)`: the session was already terminal
    /// - `Err(NotFound)`: unknown session id
    pub fn finalize(
        &self,
        session_id: &str,
        status: SessionStatus,
        placed_count: i64,
        resolved_count: i64,
        elapsed_ms: i64,
        log: &str,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let updated = conn.execute(
            r#"UPDATE generation_sessions
               SET status = ?, placed_count = ?, resolved_count = ?,
                   elapsed_ms = ?, log = ?, finished_at = ?
               WHERE session_id = ? AND status = 'in_progress'"#,
            params![
                status.as_str(),
                &placed_count,
                &resolved_count,
                &elapsed_ms,
                log,
                chrono::Utc::now()
                    .naive_utc()
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
                session_id,
            ],
        )?;

        if updated == 0 {
            let current: Option<String> = conn
                .query_row(
                    "SELECT status FROM generation_sessions WHERE session_id = ?",
                    params![session_id],
                    |row| row.get(0),
                )
                .optional()?;

            return match current {
                Some(from) => Err(RepositoryError::InvalidStateTransition {
                    from,
                    to: status.as_str().to_string(),
                }),
                None => Err(RepositoryError::NotFound {
                    entity: "GenerationSession".to_string(),
                    id: session_id.to_string(),
                }),
            };
        }

        Ok(())
    }

    /// Fetch a session by id.
    pub fn find_by_id(&self, session_id: &str) -> RepositoryResult<Option<GenerationSession>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT session_id, requested_by, window_start, window_end,
                      filters_json, status, placed_count, resolved_count,
                      elapsed_ms, log, created_at, finished_at
               FROM generation_sessions
               WHERE session_id = ?"#,
            params![session_id],
            Self::map_row,
        ) {
            Ok(session) => Ok(Some(session)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<GenerationSession> {
        let status_raw: String = row.get(5)?;
        let status = status_raw.parse::<SessionStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, e.into())
        })?;

        let finished_raw: Option<String> = row.get(11)?;
        let finished_at = match finished_raw {
            Some(s) => Some(
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        11,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
            ),
            None => None,
        };

        Ok(GenerationSession {
            session_id: row.get(0)?,
            requested_by: row.get(1)?,
            window_start: NaiveDate::parse_from_str(&row.get::<_, String>(2)?, "%Y-%m-%d")
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
            window_end: NaiveDate::parse_from_str(&row.get::<_, String>(3)?, "%Y-%m-%d")
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
            filters_json: row.get(4)?,
            status,
            placed_count: row.get(6)?,
            resolved_count: row.get(7)?,
            elapsed_ms: row.get(8)?,
            log: row.get(9)?,
            created_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(10)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    10,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            finished_at,
        })
    }
}
