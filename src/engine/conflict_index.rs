// ==========================================
// Exam Timetabling Engine - Conflict Index
// ==========================================
// Per-run, in-memory occupancy picture. Seeded once from committed rows
// before assignment starts, updated after every successful placement,
// and consulted for every feasibility question during the run; storage
// is never re-queried per candidate. Rebuilt from scratch each run,
// never persisted.
// ==========================================

use crate::domain::exam::ScheduledExam;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};

// ==========================================
// ConflictIndex
// ==========================================
#[derive(Debug, Default)]
pub struct ConflictIndex {
    /// Occupied (room_id, slot index) pairs
    room_slots: HashSet<(i64, usize)>,
    /// Occupied (professor_id, slot index) pairs
    professor_slots: HashSet<(i64, usize)>,
    /// Exams per (professor_id, day), committed rows included
    professor_days: HashMap<(i64, NaiveDate), u32>,
    /// Exams per (formation_id, day), this run's placements only
    formation_days: HashMap<(i64, NaiveDate), u32>,
}

impl ConflictIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the index from committed rows.
    ///
    /// For each active row, every candidate slot whose nominal interval
    /// overlaps the row marks the row's room and professor occupied at
    /// that slot index. The professor's day counter increments once per
    /// row (it counts exams, not touched slots), whether or not the row
    /// lines up with a candidate slot. Formation counters are not
    /// seeded; they bound only the current run.
    pub fn seed(
        &mut self,
        committed: &[ScheduledExam],
        slots: &[NaiveDateTime],
        nominal_slot_min: i64,
    ) {
        for exam in committed {
            if !exam.is_active() {
                continue;
            }
            if let Some(professor_id) = exam.professor_id {
                *self
                    .professor_days
                    .entry((professor_id, exam.start_at.date()))
                    .or_insert(0) += 1;
            }
            for (slot_idx, slot) in slots.iter().enumerate() {
                let slot_end = *slot + Duration::minutes(nominal_slot_min);
                if !exam.overlaps(*slot, slot_end) {
                    continue;
                }
                if let Some(room_id) = exam.room_id {
                    self.room_slots.insert((room_id, slot_idx));
                }
                if let Some(professor_id) = exam.professor_id {
                    self.professor_slots.insert((professor_id, slot_idx));
                }
            }
        }
    }

    pub fn is_room_free(&self, room_id: i64, slot_idx: usize) -> bool {
        !self.room_slots.contains(&(room_id, slot_idx))
    }

    pub fn is_professor_free(&self, professor_id: i64, slot_idx: usize) -> bool {
        !self.professor_slots.contains(&(professor_id, slot_idx))
    }

    pub fn professor_day_count(&self, professor_id: i64, day: NaiveDate) -> u32 {
        self.professor_days
            .get(&(professor_id, day))
            .copied()
            .unwrap_or(0)
    }

    pub fn formation_day_count(&self, formation_id: i64, day: NaiveDate) -> u32 {
        self.formation_days
            .get(&(formation_id, day))
            .copied()
            .unwrap_or(0)
    }

    /// Record one successful placement: both occupancy pairs plus both
    /// day counters.
    pub fn record_placement(
        &mut self,
        room_id: i64,
        professor_id: i64,
        slot_idx: usize,
        day: NaiveDate,
        formation_id: i64,
    ) {
        self.room_slots.insert((room_id, slot_idx));
        self.professor_slots.insert((professor_id, slot_idx));
        *self.professor_days.entry((professor_id, day)).or_insert(0) += 1;
        *self.formation_days.entry((formation_id, day)).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::exam::ExamEvent;
    use chrono::NaiveDate;

    fn dt(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn committed_exam(room_id: i64, professor_id: i64, start: NaiveDateTime, duration_min: i64) -> ScheduledExam {
        let event = ExamEvent {
            id: 1,
            code: "MAT101".to_string(),
            name: "Analysis".to_string(),
            formation_id: 1,
            dept_id: 1,
            duration_min,
            enrollment: 20,
        };
        ScheduledExam::new_placement(&event, room_id, professor_id, start, duration_min, "seed")
    }

    #[test]
    fn test_seed_marks_overlapping_slot() {
        let slots = vec![dt(5, 8), dt(5, 10), dt(5, 14)];
        let mut index = ConflictIndex::new();
        index.seed(&[committed_exam(1, 2, dt(5, 8), 120)], &slots, 120);

        assert!(!index.is_room_free(1, 0));
        assert!(!index.is_professor_free(2, 0));
        // Back-to-back slot stays free (half-open intervals)
        assert!(index.is_room_free(1, 1));
        assert!(index.is_professor_free(2, 1));
        assert_eq!(index.professor_day_count(2, dt(5, 8).date()), 1);
    }

    #[test]
    fn test_seed_long_exam_blocks_every_touched_slot() {
        let slots = vec![dt(5, 8), dt(5, 10), dt(5, 14)];
        let mut index = ConflictIndex::new();
        // 08:00 + 240 min runs into the 10:00 slot but not the 14:00 one
        index.seed(&[committed_exam(1, 2, dt(5, 8), 240)], &slots, 120);

        assert!(!index.is_room_free(1, 0));
        assert!(!index.is_room_free(1, 1));
        assert!(index.is_room_free(1, 2));
        // Still one exam that day, however many slots it touches
        assert_eq!(index.professor_day_count(2, dt(5, 8).date()), 1);
    }

    #[test]
    fn test_seed_counts_off_grid_rows_toward_the_day() {
        let slots = vec![dt(5, 8), dt(5, 10), dt(5, 14)];
        let mut index = ConflictIndex::new();
        // 12:00-13:00 falls between the 10:00 and 14:00 slots
        index.seed(&[committed_exam(1, 2, dt(5, 12), 60)], &slots, 120);

        assert!(index.is_room_free(1, 1));
        assert!(index.is_room_free(1, 2));
        assert_eq!(index.professor_day_count(2, dt(5, 8).date()), 1);
    }

    #[test]
    fn test_seed_ignores_inactive_rows() {
        let slots = vec![dt(5, 8)];
        let mut cancelled = committed_exam(1, 2, dt(5, 8), 120);
        cancelled.status = crate::domain::types::ExamStatus::Cancelled;
        let mut index = ConflictIndex::new();
        index.seed(&[cancelled], &slots, 120);

        assert!(index.is_room_free(1, 0));
        assert!(index.is_professor_free(2, 0));
    }

    #[test]
    fn test_record_placement_updates_all_structures() {
        let mut index = ConflictIndex::new();
        let day = dt(5, 8).date();
        index.record_placement(3, 7, 2, day, 11);

        assert!(!index.is_room_free(3, 2));
        assert!(!index.is_professor_free(7, 2));
        assert_eq!(index.professor_day_count(7, day), 1);
        assert_eq!(index.formation_day_count(11, day), 1);

        index.record_placement(4, 7, 3, day, 11);
        assert_eq!(index.professor_day_count(7, day), 2);
        assert_eq!(index.formation_day_count(11, day), 2);
    }

    #[test]
    fn test_empty_index_is_all_free() {
        let index = ConflictIndex::new();
        assert!(index.is_room_free(1, 0));
        assert!(index.is_professor_free(1, 0));
        assert_eq!(index.professor_day_count(1, dt(5, 8).date()), 0);
        assert_eq!(index.formation_day_count(1, dt(5, 8).date()), 0);
    }
}
