// ==========================================
// Engine integration tests
// ==========================================
// Full generation runs against a real temporary database: greedy
// placement, caps, idempotent re-runs, seeded-index behavior and the
// session lifecycle.
// ==========================================


use chrono::{NaiveDate, Timelike};
use exam_scheduler::config::SchedulerConfig;
use exam_scheduler::domain::types::{ExamStatus, SessionStatus};
use exam_scheduler::engine::orchestrator::GenerationRequest;
use exam_scheduler::logging;
use exam_scheduler::repository::exam_repo::ScheduledExamRepository;
use exam_scheduler::repository::session_repo::GenerationSessionRepository;
use std::collections::BTreeMap;

/// Mon 2026-01-05 .. Fri 2026-01-09, no filters.
fn week_request() -> GenerationRequest {
    GenerationRequest {
        window_start: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        window_end: NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
        dept_ids: None,
        formation_ids: None,
        requested_by: "tester".to_string(),
    }
}

#[test]
fn test_single_event_happy_path() {
    logging::init_test();

    println!("\n=== Test: single event happy path ===");

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_room(&conn, "R101", 60).expect("Failed to insert room");
    test_helpers::insert_professor(&conn, "Prof. Ionescu", 1, 3).expect("Failed to insert professor");
    test_helpers::insert_exam_event(&conn, "MATH-101", 1, 1, 120, 20)
        .expect("Failed to insert event");
    drop(conn);
    println!("✓ Step 1: seeded one event, one room, one professor");

    let shared = test_helpers::shared_connection(&db_path).expect("Failed to open db");
    let engine = test_helpers::create_engine(shared.clone(), SchedulerConfig::default());
    let outcome = engine.generate(&week_request()).expect("Generation should succeed");
    println!("✓ Step 2: generation finished ({})", outcome.message);

    assert_eq!(outcome.status, SessionStatus::Completed);
    assert_eq!(outcome.placed_count, 1);
    assert_eq!(outcome.resolved_count, 1);
    assert!(outcome.elapsed_ms >= 0);

    // The first feasible slot is Monday 08:00
    let exam_repo = ScheduledExamRepository::new(shared.clone());
    let exams = exam_repo
        .find_by_session(&outcome.session_id)
        .expect("Failed to query session exams");
    assert_eq!(exams.len(), 1);
    let exam = &exams[0];
    assert_eq!(exam.status, ExamStatus::Scheduled);
    assert_eq!(exam.start_at.date(), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
    assert_eq!(exam.start_at.hour(), 8);
    assert_eq!(exam.duration_min, 120);
    assert!(exam.room_id.is_some());
    assert!(exam.professor_id.is_some());
    println!("✓ Step 3: exam committed at {}", exam.start_at);

    // Session row is finalized exactly once, with the outcome recorded
    let session_repo = GenerationSessionRepository::new(shared);
    let session = session_repo
        .find_by_id(&outcome.session_id)
        .expect("Failed to query session")
        .expect("Session row should exist");
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.placed_count, 1);
    assert_eq!(session.resolved_count, 1);
    assert!(session.finished_at.is_some());
    assert_eq!(session.log.as_deref(), Some("placed 1 of 1 exam events"));
    println!("✓ Step 4: session finalized as completed\n");
}

#[test]
fn test_formation_daily_cap_spills_to_next_day() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_room(&conn, "R201", 100).expect("Failed to insert room");
    test_helpers::insert_professor(&conn, "Prof. Pop", 1, 10).expect("Failed to insert professor");
    for code in ["CS-201", "CS-202", "CS-203"] {
        test_helpers::insert_exam_event(&conn, code, 7, 1, 120, 30)
            .expect("Failed to insert event");
    }
    drop(conn);

    let shared = test_helpers::shared_connection(&db_path).expect("Failed to open db");
    let engine = test_helpers::create_engine(shared.clone(), SchedulerConfig::default());
    let outcome = engine.generate(&week_request()).expect("Generation should succeed");

    assert_eq!(outcome.status, SessionStatus::Completed);
    assert_eq!(outcome.placed_count, 3);

    // Formation 7 allows two exams per day, so the third lands on Tuesday
    let exam_repo = ScheduledExamRepository::new(shared);
    let exams = exam_repo
        .find_by_session(&outcome.session_id)
        .expect("Failed to query session exams");
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for exam in &exams {
        *per_day.entry(exam.start_at.date()).or_insert(0) += 1;
    }
    let counts: Vec<(NaiveDate, usize)> = per_day.into_iter().collect();
    assert_eq!(
        counts,
        vec![
            (NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(), 2),
            (NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(), 1),
        ]
    );
}

#[test]
fn test_room_exam_capacity_is_half_seating() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    // 40 seats means exam capacity 20, too small for 25 students
    test_helpers::insert_room(&conn, "R301", 40).expect("Failed to insert room");
    test_helpers::insert_professor(&conn, "Prof. Radu", 1, 3).expect("Failed to insert professor");
    test_helpers::insert_exam_event(&conn, "PHYS-301", 2, 1, 120, 25)
        .expect("Failed to insert event");
    drop(conn);

    let shared = test_helpers::shared_connection(&db_path).expect("Failed to open db");
    let engine = test_helpers::create_engine(shared.clone(), SchedulerConfig::default());
    let outcome = engine.generate(&week_request()).expect("Generation should succeed");

    // The run completes; the event just finds no feasible room
    assert_eq!(outcome.status, SessionStatus::Completed);
    assert_eq!(outcome.placed_count, 0);
    assert_eq!(outcome.resolved_count, 1);

    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    assert_eq!(test_helpers::count_active_exams(&conn).unwrap(), 0);
}

#[test]
fn test_professor_daily_cap_spills_to_next_day() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_room(&conn, "R401", 100).expect("Failed to insert room");
    // One supervision per day only
    test_helpers::insert_professor(&conn, "Prof. Enache", 1, 1).expect("Failed to insert professor");
    test_helpers::insert_exam_event(&conn, "BIO-401", 1, 1, 120, 30)
        .expect("Failed to insert event");
    test_helpers::insert_exam_event(&conn, "BIO-402", 2, 1, 120, 30)
        .expect("Failed to insert event");
    drop(conn);

    let shared = test_helpers::shared_connection(&db_path).expect("Failed to open db");
    let engine = test_helpers::create_engine(shared.clone(), SchedulerConfig::default());
    let outcome = engine.generate(&week_request()).expect("Generation should succeed");

    assert_eq!(outcome.status, SessionStatus::Completed);
    assert_eq!(outcome.placed_count, 2);

    let exam_repo = ScheduledExamRepository::new(shared);
    let exams = exam_repo
        .find_by_session(&outcome.session_id)
        .expect("Failed to query session exams");
    assert_eq!(exams.len(), 2);
    assert_ne!(
        exams[0].start_at.date(),
        exams[1].start_at.date(),
        "a professor with daily_cap 1 cannot supervise twice on one day"
    );
}

#[test]
fn test_rerun_places_nothing_and_completes() {
    logging::init_test();

    println!("\n=== Test: idempotent re-run ===");

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_room(&conn, "R501", 80).expect("Failed to insert room");
    test_helpers::insert_professor(&conn, "Prof. Vasile", 1, 3).expect("Failed to insert professor");
    test_helpers::insert_exam_event(&conn, "CHEM-501", 3, 1, 120, 25)
        .expect("Failed to insert event");
    drop(conn);

    let shared = test_helpers::shared_connection(&db_path).expect("Failed to open db");
    let engine = test_helpers::create_engine(shared.clone(), SchedulerConfig::default());

    let first = engine.generate(&week_request()).expect("First run should succeed");
    assert_eq!(first.status, SessionStatus::Completed);
    assert_eq!(first.placed_count, 1);
    println!("✓ Step 1: first run placed the event");

    let second = engine.generate(&week_request()).expect("Second run should succeed");
    assert_eq!(second.status, SessionStatus::Completed);
    assert_eq!(second.placed_count, 0);
    assert_eq!(second.resolved_count, 1);
    assert!(
        second.message.contains("already scheduled"),
        "unexpected message: {}",
        second.message
    );
    println!("✓ Step 2: second run completed without placing anything");

    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    assert_eq!(test_helpers::count_active_exams(&conn).unwrap(), 1);
    println!("✓ Step 3: still exactly one active exam\n");
}

#[test]
fn test_committed_exams_block_their_triples() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    let room_id = test_helpers::insert_room(&conn, "R601", 100).expect("Failed to insert room");
    let prof_id =
        test_helpers::insert_professor(&conn, "Prof. Dinu", 1, 3).expect("Failed to insert professor");
    let committed_event = test_helpers::insert_exam_event(&conn, "HIST-601", 4, 1, 120, 30)
        .expect("Failed to insert event");
    test_helpers::insert_exam_event(&conn, "HIST-602", 5, 1, 120, 30)
        .expect("Failed to insert event");
    // Monday 08:00 is already taken by a committed exam
    test_helpers::force_scheduled_exam(
        &conn,
        committed_event,
        room_id,
        prof_id,
        "2026-01-05 08:00:00",
        120,
        30,
    )
    .expect("Failed to force exam");
    drop(conn);

    let shared = test_helpers::shared_connection(&db_path).expect("Failed to open db");
    let engine = test_helpers::create_engine(shared.clone(), SchedulerConfig::default());
    let outcome = engine.generate(&week_request()).expect("Generation should succeed");

    assert_eq!(outcome.status, SessionStatus::Completed);
    assert_eq!(outcome.placed_count, 1);

    // The new exam must avoid the occupied Monday 08:00 slot
    let exam_repo = ScheduledExamRepository::new(shared);
    let exams = exam_repo
        .find_by_session(&outcome.session_id)
        .expect("Failed to query session exams");
    assert_eq!(exams.len(), 1);
    assert_eq!(exams[0].start_at.date(), NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
    assert_eq!(exams[0].start_at.hour(), 10);
}

#[test]
fn test_missing_professors_fail_the_session() {
    logging::init_test();

    println!("\n=== Test: insufficient resources ===");

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_room(&conn, "R701", 60).expect("Failed to insert room");
    test_helpers::insert_exam_event(&conn, "GEO-701", 1, 1, 120, 20)
        .expect("Failed to insert event");
    drop(conn);

    let shared = test_helpers::shared_connection(&db_path).expect("Failed to open db");
    let engine = test_helpers::create_engine(shared.clone(), SchedulerConfig::default());
    let outcome = engine.generate(&week_request()).expect("Run should return, not raise");
    println!("✓ Step 1: run returned ({})", outcome.message);

    assert_eq!(outcome.status, SessionStatus::Failed);
    assert_eq!(outcome.placed_count, 0);
    assert_eq!(outcome.resolved_count, 0);
    assert!(outcome.message.contains("insufficient resources"));
    assert!(outcome.message.contains("0 professors"));

    // The failed session is recorded with the shortfall text
    let session_repo = GenerationSessionRepository::new(shared);
    let session = session_repo
        .find_by_id(&outcome.session_id)
        .expect("Failed to query session")
        .expect("Session row should exist");
    assert_eq!(session.status, SessionStatus::Failed);
    assert!(session.finished_at.is_some());
    assert!(session.log.unwrap_or_default().contains("insufficient resources"));

    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    assert_eq!(test_helpers::count_active_exams(&conn).unwrap(), 0);
    println!("✓ Step 2: session failed cleanly, no exams committed\n");
}

#[test]
fn test_weekend_only_window_fails() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_room(&conn, "R801", 60).expect("Failed to insert room");
    test_helpers::insert_professor(&conn, "Prof. Albu", 1, 3).expect("Failed to insert professor");
    test_helpers::insert_exam_event(&conn, "LAW-801", 1, 1, 120, 20)
        .expect("Failed to insert event");
    drop(conn);

    // Sat 2026-01-10 .. Sun 2026-01-11 yields no slots at all
    let request = GenerationRequest {
        window_start: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        window_end: NaiveDate::from_ymd_opt(2026, 1, 11).unwrap(),
        dept_ids: None,
        formation_ids: None,
        requested_by: "tester".to_string(),
    };

    let shared = test_helpers::shared_connection(&db_path).expect("Failed to open db");
    let engine = test_helpers::create_engine(shared, SchedulerConfig::default());
    let outcome = engine.generate(&request).expect("Run should return, not raise");

    assert_eq!(outcome.status, SessionStatus::Failed);
    assert!(outcome.message.contains("0 time slots"));
}

#[test]
fn test_department_filter_restricts_the_pool() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_room(&conn, "R901", 80).expect("Failed to insert room");
    test_helpers::insert_professor(&conn, "Prof. Neagu", 1, 3).expect("Failed to insert professor");
    test_helpers::insert_exam_event(&conn, "ECON-901", 1, 1, 120, 20)
        .expect("Failed to insert event");
    test_helpers::insert_exam_event(&conn, "ARTS-902", 2, 2, 120, 20)
        .expect("Failed to insert event");
    drop(conn);

    let request = GenerationRequest {
        dept_ids: Some(vec![1]),
        ..week_request()
    };

    let shared = test_helpers::shared_connection(&db_path).expect("Failed to open db");
    let engine = test_helpers::create_engine(shared.clone(), SchedulerConfig::default());
    let outcome = engine.generate(&request).expect("Generation should succeed");

    assert_eq!(outcome.status, SessionStatus::Completed);
    assert_eq!(outcome.placed_count, 1);
    assert_eq!(outcome.resolved_count, 1);

    // The request snapshot lands on the session row
    let session_repo = GenerationSessionRepository::new(shared.clone());
    let session = session_repo
        .find_by_id(&outcome.session_id)
        .expect("Failed to query session")
        .expect("Session row should exist");
    assert!(session.filters_json.unwrap_or_default().contains("dept_ids"));

    // Only the dept 1 event was scheduled
    let exam_repo = ScheduledExamRepository::new(shared);
    let exams = exam_repo
        .find_by_session(&outcome.session_id)
        .expect("Failed to query session exams");
    assert_eq!(exams.len(), 1);
}

#[test]
fn test_department_filter_excludes_outside_professors() {
    logging::init_test();

    let (_temp_file, db_path) = test_helpers::create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    test_helpers::insert_room(&conn, "R951", 60).expect("Failed to insert room");
    // The only available professor belongs to another department
    test_helpers::insert_professor(&conn, "Prof. Moraru", 2, 3)
        .expect("Failed to insert professor");
    test_helpers::insert_exam_event(&conn, "ECON-951", 1, 1, 120, 20)
        .expect("Failed to insert event");
    drop(conn);

    let request = GenerationRequest {
        dept_ids: Some(vec![1]),
        ..week_request()
    };

    let shared = test_helpers::shared_connection(&db_path).expect("Failed to open db");
    let engine = test_helpers::create_engine(shared, SchedulerConfig::default());
    let outcome = engine.generate(&request).expect("Run should return, not raise");

    // A supervisor outside the requested departments never fills the gap
    assert_eq!(outcome.status, SessionStatus::Failed);
    assert_eq!(outcome.placed_count, 0);
    assert!(outcome.message.contains("insufficient resources"));
    assert!(outcome.message.contains("0 professors"));

    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    assert_eq!(test_helpers::count_active_exams(&conn).unwrap(), 0);
}
