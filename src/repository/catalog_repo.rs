// ==========================================
// Exam Timetabling Engine - Resource Catalog Repository
// ==========================================
// Bounded pool queries feeding a generation run: exam events, rooms and
// professors. Repositories contain no scheduling logic; ordering and
// caps are part of the query contract and must stay deterministic.
// ==========================================

use crate::domain::exam::ExamEvent;
use crate::domain::resources::{Professor, Room};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// CatalogRepository
// ==========================================
pub struct CatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CatalogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Query exam events for a run, capped to `limit`.
    ///
    /// Events still lacking an active scheduled exam sort first, then id
    /// ascending, so repeated runs make progress through a large catalog
    /// instead of refetching the same scheduled events. Optional
    /// department / formation selectors narrow the pool.
    ///
    /// # Returns
    /// - `Ok(Vec<ExamEvent>)`: deterministic, at most `limit` entries
    pub fn find_exam_events(
        &self,
        dept_ids: Option<&[i64]>,
        formation_ids: Option<&[i64]>,
        limit: usize,
    ) -> RepositoryResult<Vec<ExamEvent>> {
        let conn = self.get_conn()?;

        let mut sql = String::from(
            r#"SELECT id, code, name, formation_id, dept_id, duration_min, enrollment
               FROM exam_events"#,
        );
        let mut args: Vec<Value> = Vec::new();
        let mut clauses: Vec<String> = Vec::new();

        if let Some(ids) = dept_ids.filter(|ids| !ids.is_empty()) {
            clauses.push(format!(
                "dept_id IN ({})",
                vec!["?"; ids.len()].join(", ")
            ));
            args.extend(ids.iter().map(|id| Value::Integer(*id)));
        }
        if let Some(ids) = formation_ids.filter(|ids| !ids.is_empty()) {
            clauses.push(format!(
                "formation_id IN ({})",
                vec!["?"; ids.len()].join(", ")
            ));
            args.extend(ids.iter().map(|id| Value::Integer(*id)));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(
            r#" ORDER BY (CASE WHEN EXISTS (
                    SELECT 1 FROM scheduled_exams e
                    WHERE e.exam_event_id = exam_events.id
                      AND e.status NOT IN ('cancelled', 'draft')
                ) THEN 1 ELSE 0 END), id
                LIMIT ?"#,
        );
        args.push(Value::Integer(limit as i64));

        let mut stmt = conn.prepare(&sql)?;
        let events = stmt
            .query_map(params_from_iter(args.iter()), Self::map_exam_event)?
            .collect::<Result<Vec<ExamEvent>, _>>()?;

        Ok(events)
    }

    /// Query available rooms, largest first, capped to `limit`.
    pub fn find_available_rooms(&self, limit: usize) -> RepositoryResult<Vec<Room>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT id, code, name, capacity, building, available
               FROM rooms
               WHERE available = 1
               ORDER BY capacity DESC, id
               LIMIT ?"#,
        )?;

        let rooms = stmt
            .query_map(params![limit as i64], Self::map_room)?
            .collect::<Result<Vec<Room>, _>>()?;

        Ok(rooms)
    }

    /// Query available professors, capped to `limit`. An optional
    /// department selector keeps supervisors inside the requested
    /// departments.
    pub fn find_available_professors(
        &self,
        dept_ids: Option<&[i64]>,
        limit: usize,
    ) -> RepositoryResult<Vec<Professor>> {
        let conn = self.get_conn()?;

        let mut sql = String::from(
            r#"SELECT id, full_name, dept_id, available, daily_cap
               FROM professors
               WHERE available = 1"#,
        );
        let mut args: Vec<Value> = Vec::new();

        if let Some(ids) = dept_ids.filter(|ids| !ids.is_empty()) {
            sql.push_str(&format!(
                " AND dept_id IN ({})",
                vec!["?"; ids.len()].join(", ")
            ));
            args.extend(ids.iter().map(|id| Value::Integer(*id)));
        }
        sql.push_str(" ORDER BY id LIMIT ?");
        args.push(Value::Integer(limit as i64));

        let mut stmt = conn.prepare(&sql)?;
        let professors = stmt
            .query_map(params_from_iter(args.iter()), Self::map_professor)?
            .collect::<Result<Vec<Professor>, _>>()?;

        Ok(professors)
    }

    fn map_exam_event(row: &rusqlite::Row) -> rusqlite::Result<ExamEvent> {
        Ok(ExamEvent {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            formation_id: row.get(3)?,
            dept_id: row.get(4)?,
            duration_min: row.get(5)?,
            enrollment: row.get(6)?,
        })
    }

    fn map_room(row: &rusqlite::Row) -> rusqlite::Result<Room> {
        Ok(Room {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            capacity: row.get(3)?,
            building: row.get(4)?,
            available: row.get(5)?,
        })
    }

    fn map_professor(row: &rusqlite::Row) -> rusqlite::Result<Professor> {
        Ok(Professor {
            id: row.get(0)?,
            full_name: row.get(1)?,
            dept_id: row.get(2)?,
            available: row.get(3)?,
            daily_cap: row.get(4)?,
        })
    }
}
