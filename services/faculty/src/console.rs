//! Faculty console: the live session, its rotating QR code and its roster
//!
//! Selecting a course opens a [`LiveSession`] and starts two independent
//! repeating tasks. One regenerates the QR text every rotation period; the
//! other fetches the session's records every poll period and replaces the
//! displayed roster. Both stop when the session ends, when another course is
//! selected, or when the console is dropped.

use chrono::{DateTime, Utc};
use common::models::{AttendanceRecord, Course};
use common::{SessionId, qr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::client::RosterSource;
use crate::session::LiveSession;
use crate::ticker::RepeatingTask;

/// Source of the current time, injectable for tests
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsolePeriods {
    pub rotation: Duration,
    pub poll: Duration,
}

impl Default for ConsolePeriods {
    fn default() -> Self {
        Self {
            rotation: Duration::from_secs(1),
            poll: Duration::from_secs(2),
        }
    }
}

#[derive(Default)]
struct ConsoleState {
    session: Option<LiveSession>,
    roster: Vec<AttendanceRecord>,
}

pub struct FacultyConsole {
    teacher_id: String,
    source: Arc<dyn RosterSource>,
    periods: ConsolePeriods,
    clock: Clock,
    state: Arc<Mutex<ConsoleState>>,
    qr: Arc<watch::Sender<Option<String>>>,
    rotation: RepeatingTask,
    polling: RepeatingTask,
}

impl FacultyConsole {
    pub fn new(
        teacher_id: impl Into<String>,
        source: Arc<dyn RosterSource>,
        periods: ConsolePeriods,
    ) -> Self {
        let (qr, _) = watch::channel(None);

        Self {
            teacher_id: teacher_id.into(),
            source,
            periods,
            clock: Arc::new(Utc::now),
            state: Arc::new(Mutex::new(ConsoleState::default())),
            qr: Arc::new(qr),
            rotation: RepeatingTask::new("QR rotation"),
            polling: RepeatingTask::new("roster polling"),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Open a session for `course`, or close it if it is already the active one
    ///
    /// Returns the id of the newly opened session.
    pub async fn select_course(&mut self, course: &Course) -> Option<SessionId> {
        let course_id = course.id.to_string();
        let reselected = self
            .state
            .lock()
            .await
            .session
            .as_ref()
            .is_some_and(|s| s.is_for_course(&course_id));

        self.end_session().await;
        if reselected {
            return None;
        }

        let session = LiveSession::start(course, &self.teacher_id, (self.clock)());
        let session_id = session.session_id.clone();
        info!(
            "Started session {} for {} ({})",
            session_id, course.course_code, course.class_id
        );

        publish_qr(&self.qr, &session, (self.clock)());
        self.state.lock().await.session = Some(session);

        self.start_rotation();
        self.start_polling();

        Some(session_id)
    }

    /// Close the active session and stop all background work
    pub async fn end_session(&mut self) -> Option<SessionId> {
        self.rotation.stop();
        self.polling.stop();

        let mut state = self.state.lock().await;
        state.roster.clear();
        self.qr.send_replace(None);

        let ended = state.session.take().map(|s| s.session_id);
        if let Some(session_id) = &ended {
            info!("Ended session {}", session_id);
        }
        ended
    }

    /// Close the active session if it belongs to a course that was just deleted
    pub async fn course_deleted(&mut self, course_id: Uuid) {
        let course_id = course_id.to_string();
        let affected = self
            .state
            .lock()
            .await
            .session
            .as_ref()
            .is_some_and(|s| s.is_for_course(&course_id));

        if affected {
            self.end_session().await;
        }
    }

    fn start_rotation(&mut self) {
        let state = Arc::clone(&self.state);
        let qr = Arc::clone(&self.qr);
        let clock = Arc::clone(&self.clock);

        self.rotation.start(self.periods.rotation, move || {
            let state = Arc::clone(&state);
            let qr = Arc::clone(&qr);
            let clock = Arc::clone(&clock);

            async move {
                let state = state.lock().await;
                if let Some(session) = state.session.as_ref() {
                    publish_qr(&qr, session, clock());
                }
            }
        });
    }

    fn start_polling(&mut self) {
        let state = Arc::clone(&self.state);
        let source = Arc::clone(&self.source);

        self.polling.start(self.periods.poll, move || {
            let state = Arc::clone(&state);
            let source = Arc::clone(&source);

            async move {
                let Some(session_id) = active_id(&state).await else {
                    return;
                };

                let records = match source.session_records(&session_id).await {
                    Ok(records) => records,
                    Err(e) => {
                        warn!("Failed to refresh roster for {}: {}", session_id, e);
                        return;
                    }
                };

                let mut state = state.lock().await;
                let still_active = state
                    .session
                    .as_ref()
                    .is_some_and(|s| s.session_id == session_id);
                if !still_active {
                    debug!("Discarding roster of closed session {}", session_id);
                    return;
                }

                if records.len() != state.roster.len() {
                    info!("{} students present in {}", records.len(), session_id);
                }
                state.roster = records;
            }
        });
    }

    /// Text currently encoded in the displayed QR symbol
    pub fn current_qr(&self) -> Option<String> {
        self.qr.borrow().clone()
    }

    /// Receiver notified on every QR rotation
    pub fn qr_updates(&self) -> watch::Receiver<Option<String>> {
        self.qr.subscribe()
    }

    pub async fn roster(&self) -> Vec<AttendanceRecord> {
        self.state.lock().await.roster.clone()
    }

    pub async fn active_session(&self) -> Option<SessionId> {
        active_id(&self.state).await
    }

    pub async fn session_details(&self) -> Option<LiveSession> {
        self.state.lock().await.session.clone()
    }

    pub fn is_running(&self) -> bool {
        self.rotation.is_running() || self.polling.is_running()
    }
}

async fn active_id(state: &Mutex<ConsoleState>) -> Option<SessionId> {
    state
        .lock()
        .await
        .session
        .as_ref()
        .map(|s| s.session_id.clone())
}

fn publish_qr(sender: &watch::Sender<Option<String>>, session: &LiveSession, now: DateTime<Utc>) {
    match qr::encode(&session.payload_at(now)) {
        Ok(text) => {
            sender.send_replace(Some(text));
        }
        Err(e) => error!("Failed to encode QR for {}: {}", session.session_id, e),
    }
}
