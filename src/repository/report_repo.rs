// ==========================================
// Exam Timetabling Engine - Reporting Repository
// ==========================================
// Raw analytical SQL over committed rows: conflict findings and room
// occupancy. These queries are observational only; nothing here blocks
// or repairs a schedule.
// ==========================================

use crate::domain::report::{ConflictFinding, ConflictKind, RoomOccupancy};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ReportRepository
// ==========================================
pub struct ReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReportRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Pairs of active exams overlapping in the same room.
    ///
    /// Self-join with `e2.id > e1.id` so each pair is reported once.
    pub fn find_room_overlaps(&self) -> RepositoryResult<Vec<ConflictFinding>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT e1.id, e2.id, r.name, date(e1.start_at)
               FROM scheduled_exams e1
               JOIN scheduled_exams e2
                    ON e2.room_id = e1.room_id AND e2.id > e1.id
               JOIN rooms r ON r.id = e1.room_id
               WHERE e1.status NOT IN ('cancelled', 'draft')
                 AND e2.status NOT IN ('cancelled', 'draft')
                 AND e1.room_id IS NOT NULL
                 AND e1.start_at < datetime(e2.start_at, '+' || e2.duration_min || ' minutes')
                 AND e2.start_at < datetime(e1.start_at, '+' || e1.duration_min || ' minutes')
               ORDER BY e1.start_at, e1.id, e2.id"#,
        )?;

        let findings = stmt
            .query_map([], |row| {
                let first_id: i64 = row.get(0)?;
                let second_id: i64 = row.get(1)?;
                let room_name: String = row.get(2)?;
                let day = Self::parse_day(row, 3)?;
                Ok(ConflictFinding {
                    kind: ConflictKind::RoomOverlap,
                    description: format!(
                        "overlapping exams in room {} on {}",
                        room_name, day
                    ),
                    exam_ids: vec![first_id, second_id],
                    day,
                })
            })?
            .collect::<Result<Vec<ConflictFinding>, _>>()?;

        Ok(findings)
    }

    /// Professors supervising more than `threshold` active exams on one
    /// calendar day.
    pub fn find_professor_overloads(
        &self,
        threshold: i64,
    ) -> RepositoryResult<Vec<ConflictFinding>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT p.id, p.full_name, date(e.start_at) AS day, COUNT(*) AS exam_count
               FROM scheduled_exams e
               JOIN professors p ON p.id = e.professor_id
               WHERE e.status NOT IN ('cancelled', 'draft')
               GROUP BY p.id, p.full_name, day
               HAVING COUNT(*) > ?
               ORDER BY exam_count DESC, day, p.id"#,
        )?;

        let findings = stmt
            .query_map(params![threshold], |row| {
                let full_name: String = row.get(1)?;
                let day = Self::parse_day(row, 2)?;
                let exam_count: i64 = row.get(3)?;
                Ok(ConflictFinding {
                    kind: ConflictKind::ProfessorOverload,
                    description: format!(
                        "professor {} supervises {} exams on {}",
                        full_name, exam_count, day
                    ),
                    exam_ids: Vec::new(),
                    day,
                })
            })?
            .collect::<Result<Vec<ConflictFinding>, _>>()?;

        Ok(findings)
    }

    /// Per-room exam count and enrolled-student total over active exams.
    ///
    /// LEFT JOIN keeps idle rooms in the result with zeros; busiest rooms
    /// come first.
    pub fn room_occupancy(&self) -> RepositoryResult<Vec<RoomOccupancy>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT r.id, r.code, r.name, r.building, r.capacity,
                      COUNT(e.id) AS exam_count,
                      COALESCE(SUM(e.enrollment), 0) AS total_enrolled
               FROM rooms r
               LEFT JOIN scheduled_exams e
                      ON e.room_id = r.id
                     AND e.status NOT IN ('cancelled', 'draft')
               GROUP BY r.id, r.code, r.name, r.building, r.capacity
               ORDER BY exam_count DESC, r.id"#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                let capacity: i64 = row.get(4)?;
                Ok(RoomOccupancy {
                    room_id: row.get(0)?,
                    code: row.get(1)?,
                    name: row.get(2)?,
                    building: row.get(3)?,
                    exam_capacity: capacity / 2,
                    exam_count: row.get(5)?,
                    total_enrolled: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<RoomOccupancy>, _>>()?;

        Ok(rows)
    }

    fn parse_day(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDate> {
        NaiveDate::parse_from_str(&row.get::<_, String>(idx)?, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
    }
}
