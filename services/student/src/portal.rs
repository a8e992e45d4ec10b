//! Student attendance portal

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

use crate::camera::{Camera, PageContext};
use crate::guard::DuplicateGuard;
use crate::notice::Notice;
use crate::scanner::{FrameClock, Scanner};
use crate::submission::{AttendanceGateway, Identity, SubmitOutcome, submit_scan};

/// How long the confirmation stays visible after a recorded scan
pub const CONFIRMATION_PERIOD: Duration = Duration::from_secs(4);

/// Scanning state of one signed-in student
///
/// Owns the duplicate guard, so the remembered session lasts as long as the
/// portal does.
pub struct StudentPortal {
    identity: Identity,
    gateway: Arc<dyn AttendanceGateway>,
    guard: DuplicateGuard,
    confirmed_until: Option<Instant>,
}

impl StudentPortal {
    pub fn new(identity: Identity, gateway: Arc<dyn AttendanceGateway>) -> Self {
        Self {
            identity,
            gateway,
            guard: DuplicateGuard::new(),
            confirmed_until: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn guard(&self) -> &DuplicateGuard {
        &self.guard
    }

    /// Whether the attendance confirmation is currently shown
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_until
            .is_some_and(|until| Instant::now() < until)
    }

    /// Submit decoded QR text and describe the result
    pub async fn handle_scan(&mut self, raw: &str) -> Notice {
        match submit_scan(&mut self.guard, self.gateway.as_ref(), raw, &self.identity).await {
            Ok(SubmitOutcome::Recorded { .. }) => {
                self.confirmed_until = Some(Instant::now() + CONFIRMATION_PERIOD);
                Notice::recorded(&self.identity.name)
            }
            Ok(SubmitOutcome::AlreadyMarked(source)) => Notice::already_marked(source),
            Err(e) => {
                warn!("Scan by {} not recorded: {}", self.identity.student_id, e);
                Notice::submit_failed(&e)
            }
        }
    }

    /// Open the camera, scan until a code is read, then submit it
    pub async fn scan_and_submit(
        &mut self,
        scanner: &mut Scanner,
        camera: &dyn Camera,
        page: &PageContext,
        clock: &mut dyn FrameClock,
    ) -> Notice {
        self.confirmed_until = None;

        if let Err(e) = scanner.start(camera, page).await {
            return Notice::camera_failed(&e);
        }

        match scanner.run(clock).await {
            Some(text) => self.handle_scan(&text).await,
            None => Notice::nothing_detected(),
        }
    }
}
