// ==========================================
// Exam Timetabling Engine - Slot Generator
// ==========================================
// Enumerates the candidate exam slots of a window: four fixed daily
// starts on every weekday, weekends contribute nothing. Pure and
// deterministic; the slot index within the returned sequence is the key
// the conflict index works with.
// ==========================================

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::config::DEFAULT_SLOT_START_HOURS;

// ==========================================
// SlotGenerator
// ==========================================
pub struct SlotGenerator {
    /// Daily start hours, sorted ascending, deduplicated
    start_hours: Vec<u32>,
}

impl SlotGenerator {
    /// Build a generator from configured start hours. Hours are sorted
    /// and deduplicated so the emitted sequence is strictly increasing;
    /// out-of-range values (>= 24) are ignored.
    pub fn new(start_hours: &[u32]) -> Self {
        let mut hours: Vec<u32> = start_hours.iter().copied().filter(|h| *h < 24).collect();
        hours.sort_unstable();
        hours.dedup();
        Self { start_hours: hours }
    }

    /// Candidate slots for the inclusive date range `[start, end]`.
    ///
    /// Every weekday (Monday through Friday) contributes one slot per
    /// configured start hour, in chronological order. An empty range or
    /// a range containing only weekend days yields an empty sequence.
    pub fn generate(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDateTime> {
        let mut slots = Vec::new();
        if start > end {
            return slots;
        }

        let mut day = start;
        loop {
            if day.weekday().num_days_from_monday() < 5 {
                for &hour in &self.start_hours {
                    if let Some(slot) = day.and_hms_opt(hour, 0, 0) {
                        slots.push(slot);
                    }
                }
            }
            if day >= end {
                break;
            }
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        slots
    }
}

impl Default for SlotGenerator {
    fn default() -> Self {
        Self::new(&DEFAULT_SLOT_START_HOURS)
    }
}
