//! Rotation and polling behaviour of the faculty console under simulated time

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use common::models::{AttendanceRecord, Course};
use common::{SessionId, qr};
use faculty::console::Clock;
use faculty::{ClientError, ConsolePeriods, FacultyConsole, RosterSource};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{self, Instant};
use tokio_test::assert_ok;
use uuid::Uuid;

#[derive(Default)]
struct FakeRoster {
    records: Mutex<HashMap<SessionId, Vec<AttendanceRecord>>>,
    calls: Mutex<Vec<SessionId>>,
    failing: AtomicBool,
}

impl FakeRoster {
    async fn add(&self, session_id: &SessionId, student_id: &str) {
        self.records
            .lock()
            .await
            .entry(session_id.clone())
            .or_default()
            .push(record(session_id, student_id));
    }

    async fn calls(&self) -> Vec<SessionId> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl RosterSource for FakeRoster {
    async fn session_records(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<AttendanceRecord>, ClientError> {
        self.calls.lock().await.push(session_id.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::Api {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Internal server error".to_string(),
            });
        }
        Ok(self
            .records
            .lock()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }
}

fn record(session_id: &SessionId, student_id: &str) -> AttendanceRecord {
    AttendanceRecord {
        id: Uuid::new_v4(),
        session_id: session_id.clone(),
        student_id: student_id.to_string(),
        student_name: student_id.to_uppercase(),
        student_email: format!("{}@college.edu", student_id),
        course_code: "CS301".to_string(),
        class_id: "A1".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        timestamp: 0,
        created_at: Utc::now(),
    }
}

fn course(code: &str) -> Course {
    Course {
        id: Uuid::new_v4(),
        teacher_id: "TCH001".to_string(),
        name: format!("Course {}", code),
        course_code: code.to_string(),
        class_id: "A1".to_string(),
        day: "Wednesday".to_string(),
        time: "09:00".to_string(),
        end_time: "10:00".to_string(),
        room_no: "B12".to_string(),
        student_list: Vec::new(),
        created_at: Utc::now(),
    }
}

fn base_millis() -> i64 {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .unwrap()
        .timestamp_millis()
}

/// Wall clock that follows tokio's paused time
fn simulated_clock() -> Clock {
    let origin = Instant::now();
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    Arc::new(move || base + chrono::Duration::from_std(origin.elapsed()).unwrap())
}

fn console(roster: &Arc<FakeRoster>) -> FacultyConsole {
    let source: Arc<dyn RosterSource> = roster.clone();
    FacultyConsole::new("TCH001", source, ConsolePeriods::default()).with_clock(simulated_clock())
}

#[tokio::test(start_paused = true)]
async fn selecting_a_course_publishes_its_session_code() {
    let roster = Arc::new(FakeRoster::default());
    let mut console = console(&roster);
    let course = course("CS301");

    let session_id = console.select_course(&course).await.unwrap();

    assert_eq!(
        session_id.as_str(),
        format!("session_{}_{}_2024-05-01", course.id, base_millis())
    );
    let payload = assert_ok!(qr::decode(&console.current_qr().unwrap()));
    assert_eq!(payload.session_id, session_id);
    assert_eq!(payload.teacher_id.as_deref(), Some("TCH001"));
    assert_eq!(payload.course_code.as_deref(), Some("CS301"));
    assert!(console.is_running());
}

#[tokio::test(start_paused = true)]
async fn code_rotates_timestamp_but_keeps_session() {
    let roster = Arc::new(FakeRoster::default());
    let mut console = console(&roster);
    let session_id = console.select_course(&course("CS301")).await.unwrap();

    time::sleep(Duration::from_millis(1_500)).await;
    let first = qr::decode(&console.current_qr().unwrap()).unwrap();
    time::sleep(Duration::from_secs(1)).await;
    let second = qr::decode(&console.current_qr().unwrap()).unwrap();

    assert_eq!(first.session_id, session_id);
    assert_eq!(second.session_id, session_id);
    assert_eq!(first.timestamp, Some(base_millis() + 1_000));
    assert_eq!(second.timestamp, Some(base_millis() + 2_000));
}

#[tokio::test(start_paused = true)]
async fn roster_loads_immediately_then_every_poll_period() {
    let roster = Arc::new(FakeRoster::default());
    let mut console = console(&roster);
    let session_id = console.select_course(&course("CS301")).await.unwrap();
    roster.add(&session_id, "en001").await;

    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(roster.calls().await.len(), 1);
    assert_eq!(console.roster().await.len(), 1);

    roster.add(&session_id, "en002").await;
    time::sleep(Duration::from_millis(4_000)).await;

    let calls = roster.calls().await;
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|id| id == &session_id));

    let present: Vec<String> = console
        .roster()
        .await
        .into_iter()
        .map(|r| r.student_id)
        .collect();
    assert_eq!(present, vec!["en001", "en002"]);
}

#[tokio::test(start_paused = true)]
async fn reselecting_active_course_closes_session() {
    let roster = Arc::new(FakeRoster::default());
    let mut console = console(&roster);
    let course = course("CS301");

    console.select_course(&course).await.unwrap();
    time::sleep(Duration::from_millis(100)).await;

    assert_eq!(console.select_course(&course).await, None);
    assert_eq!(console.active_session().await, None);
    assert_eq!(console.current_qr(), None);
    assert!(!console.is_running());

    let polls = roster.calls().await.len();
    time::sleep(Duration::from_secs(10)).await;
    assert_eq!(roster.calls().await.len(), polls);
}

#[tokio::test(start_paused = true)]
async fn switching_course_replaces_roster() {
    let roster = Arc::new(FakeRoster::default());
    let mut console = console(&roster);

    let first = console.select_course(&course("CS301")).await.unwrap();
    roster.add(&first, "en001").await;
    time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(console.roster().await.len(), 1);

    let second = console.select_course(&course("MA101")).await.unwrap();
    assert_ne!(first, second);
    assert!(console.roster().await.is_empty());

    roster.add(&second, "en007").await;
    time::sleep(Duration::from_millis(100)).await;

    let present = console.roster().await;
    assert_eq!(present.len(), 1);
    assert_eq!(present[0].session_id, second);
    assert_eq!(roster.calls().await.last(), Some(&second));
}

#[tokio::test(start_paused = true)]
async fn failed_poll_keeps_previous_roster() {
    let roster = Arc::new(FakeRoster::default());
    let mut console = console(&roster);
    let session_id = console.select_course(&course("CS301")).await.unwrap();
    roster.add(&session_id, "en001").await;

    time::sleep(Duration::from_millis(100)).await;
    roster.failing.store(true, Ordering::SeqCst);
    time::sleep(Duration::from_millis(4_000)).await;

    assert_eq!(console.roster().await.len(), 1);
    assert!(console.is_running());
}

#[tokio::test(start_paused = true)]
async fn deleting_the_active_course_ends_session() {
    let roster = Arc::new(FakeRoster::default());
    let mut console = console(&roster);
    let active = course("CS301");

    console.select_course(&active).await.unwrap();

    console.course_deleted(Uuid::new_v4()).await;
    assert!(console.active_session().await.is_some());

    console.course_deleted(active.id).await;
    assert_eq!(console.active_session().await, None);
    assert!(!console.is_running());
}

#[tokio::test(start_paused = true)]
async fn qr_updates_follow_rotation() {
    let roster = Arc::new(FakeRoster::default());
    let mut console = console(&roster);
    let mut updates = console.qr_updates();

    console.select_course(&course("CS301")).await.unwrap();
    updates.changed().await.unwrap();
    assert!(updates.borrow_and_update().is_some());

    console.end_session().await;
    updates.changed().await.unwrap();
    assert!(updates.borrow_and_update().is_none());
}
