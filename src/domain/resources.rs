// ==========================================
// Exam Timetabling Engine - Resource Entities
// ==========================================
// Rooms and professors come from the academic registry; the engine only
// reads them. Exam-time room capacity is a derived value, never stored.
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Room
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Room id (registry key)
    pub id: i64,
    /// Room code (e.g. "A-204")
    pub code: String,
    /// Display name
    pub name: String,
    /// Nominal seat count
    pub capacity: i64,
    /// Building name (optional)
    pub building: Option<String>,
    /// Usable for exams
    pub available: bool,
}

impl Room {
    /// Seats usable during an exam: students sit one seat apart, so only
    /// half the nominal capacity counts.
    pub fn exam_capacity(&self) -> i64 {
        self.capacity / 2
    }
}

// ==========================================
// Professor
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professor {
    /// Professor id (registry key)
    pub id: i64,
    /// Full display name
    pub full_name: String,
    /// Home department
    pub dept_id: Option<i64>,
    /// Eligible for supervision duty
    pub available: bool,
    /// Maximum exams supervised per calendar day
    pub daily_cap: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exam_capacity_is_half_of_nominal() {
        let room = Room {
            id: 1,
            code: "A-101".to_string(),
            name: "Amphi A".to_string(),
            capacity: 41,
            building: None,
            available: true,
        };
        // Integer division rounds down.
        assert_eq!(room.exam_capacity(), 20);
    }
}
