// ==========================================
// Exam Timetabling Engine - Scheduled Exam Repository
// ==========================================
// Writes go through `insert_checked` only: the scheduled_exams guard
// triggers decide conflicts, the repository just maps their rejection to
// RepositoryError::ScheduleConflict. No scheduling logic here.
// ==========================================

use crate::domain::exam::ScheduledExam;
use crate::domain::types::ExamStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ScheduledExamRepository
// ==========================================
pub struct ScheduledExamRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduledExamRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert one placement under the storage guards.
    ///
    /// The insert is a single statement, atomic on its own. When a guard
    /// trigger rejects the row (event already has an active exam, or the
    /// room/professor is occupied in an overlapping interval) the error
    /// comes back as `RepositoryError::ScheduleConflict` and nothing is
    /// committed.
    ///
    /// # Returns
    /// - `Ok(id)`: the generated row id
    pub fn insert_checked(&self, exam: &ScheduledExam) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO scheduled_exams (
                exam_event_id, room_id, professor_id, start_at,
                duration_min, status, session_id, enrollment, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &exam.exam_event_id,
                &exam.room_id,
                &exam.professor_id,
                &exam.start_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                &exam.duration_min,
                exam.status.as_str(),
                &exam.session_id,
                &exam.enrollment,
                &exam.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Does this event already have an active (non-cancelled, non-draft)
    /// scheduled exam?
    pub fn has_active_for_event(&self, exam_event_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;

        let active: bool = conn.query_row(
            r#"SELECT EXISTS (
                SELECT 1 FROM scheduled_exams
                WHERE exam_event_id = ?
                  AND status NOT IN ('cancelled', 'draft')
            )"#,
            params![exam_event_id],
            |row| row.get(0),
        )?;

        Ok(active)
    }

    /// Active exams whose interval overlaps `[window_start, window_end)`.
    ///
    /// True interval overlap: an exam starting before the window but
    /// running into it is returned as well.
    pub fn find_overlapping_window(
        &self,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> RepositoryResult<Vec<ScheduledExam>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT id, exam_event_id, room_id, professor_id, start_at,
                      duration_min, status, session_id, enrollment, created_at
               FROM scheduled_exams
               WHERE status NOT IN ('cancelled', 'draft')
                 AND start_at < ?2
                 AND datetime(start_at, '+' || duration_min || ' minutes') > ?1
               ORDER BY start_at, id"#,
        )?;

        let exams = stmt
            .query_map(
                params![
                    window_start.format("%Y-%m-%d %H:%M:%S").to_string(),
                    window_end.format("%Y-%m-%d %H:%M:%S").to_string(),
                ],
                Self::map_row,
            )?
            .collect::<Result<Vec<ScheduledExam>, _>>()?;

        Ok(exams)
    }

    /// All exams committed by one generation session, in start order.
    pub fn find_by_session(&self, session_id: &str) -> RepositoryResult<Vec<ScheduledExam>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT id, exam_event_id, room_id, professor_id, start_at,
                      duration_min, status, session_id, enrollment, created_at
               FROM scheduled_exams
               WHERE session_id = ?
               ORDER BY start_at, id"#,
        )?;

        let exams = stmt
            .query_map(params![session_id], Self::map_row)?
            .collect::<Result<Vec<ScheduledExam>, _>>()?;

        Ok(exams)
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ScheduledExam> {
        let status_raw: String = row.get(6)?;
        let status = status_raw.parse::<ExamStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, e.into())
        })?;

        Ok(ScheduledExam {
            id: row.get(0)?,
            exam_event_id: row.get(1)?,
            room_id: row.get(2)?,
            professor_id: row.get(3)?,
            start_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(4)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
            duration_min: row.get(5)?,
            status,
            session_id: row.get(7)?,
            enrollment: row.get(8)?,
            created_at: NaiveDateTime::parse_from_str(
                &row.get::<_, String>(9)?,
                "%Y-%m-%d %H:%M:%S",
            )
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    9,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?,
        })
    }
}
