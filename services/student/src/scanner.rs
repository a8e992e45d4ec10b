//! Camera scan loop
//!
//! A [`Scanner`] owns the camera stream from the moment permission is granted
//! until the first symbol is decoded or the scan is cancelled. Each call to
//! [`Scanner::process_frame`] handles exactly one frame; [`Scanner::run`]
//! drives it from a [`FrameClock`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::camera::{self, Camera, CameraError, CaptureConstraints, PageContext, ReadyState, VideoStream};
use crate::decoder::SymbolDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    RequestingPermission,
    Scanning,
    Stopped,
}

/// Result of handling one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not scanning; nothing was captured
    Inactive,
    /// The video has not buffered enough data yet
    NotReady,
    NoSymbol,
    /// A symbol was read; capture has been released
    Decoded(String),
}

/// Paces the scan loop, one tick per rendered frame
#[async_trait]
pub trait FrameClock: Send {
    async fn next_frame(&mut self);
}

/// Frame clock ticking at a fixed display rate
pub struct DisplayClock {
    interval: Interval,
}

impl DisplayClock {
    pub fn new(frames_per_second: u32) -> Self {
        let period = Duration::from_secs(1) / frames_per_second.max(1);
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

impl Default for DisplayClock {
    fn default() -> Self {
        Self::new(60)
    }
}

#[async_trait]
impl FrameClock for DisplayClock {
    async fn next_frame(&mut self) {
        self.interval.tick().await;
    }
}

pub struct Scanner {
    state: ScanState,
    stream: Option<Box<dyn VideoStream>>,
    decoder: Arc<dyn SymbolDecoder>,
}

impl Scanner {
    pub fn new(decoder: Arc<dyn SymbolDecoder>) -> Self {
        Self {
            state: ScanState::Idle,
            stream: None,
            decoder,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Request the camera and enter [`ScanState::Scanning`]
    ///
    /// On failure the scanner returns to [`ScanState::Idle`] without having
    /// captured anything.
    pub async fn start(&mut self, camera: &dyn Camera, page: &PageContext) -> Result<(), CameraError> {
        self.release();
        self.state = ScanState::RequestingPermission;

        match camera::acquire(camera, page, CaptureConstraints::default()).await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = ScanState::Scanning;
                info!("Camera ready, scanning");
                Ok(())
            }
            Err(e) => {
                self.state = ScanState::Idle;
                warn!("Camera access failed: {:?}", e);
                Err(e)
            }
        }
    }

    pub fn process_frame(&mut self) -> FrameOutcome {
        if self.state != ScanState::Scanning {
            return FrameOutcome::Inactive;
        }
        let Some(stream) = self.stream.as_mut() else {
            return FrameOutcome::Inactive;
        };

        if stream.ready_state() < ReadyState::HaveEnoughData {
            return FrameOutcome::NotReady;
        }
        let Some(frame) = stream.capture() else {
            return FrameOutcome::NotReady;
        };

        match self.decoder.decode(&frame) {
            Some(text) => {
                self.release();
                self.state = ScanState::Stopped;
                debug!("Decoded {} bytes", text.len());
                FrameOutcome::Decoded(text)
            }
            None => FrameOutcome::NoSymbol,
        }
    }

    /// Process frames until a symbol is decoded
    ///
    /// Returns `None` if the scanner is not scanning. Dropping the returned
    /// future leaves the camera running; call [`Scanner::cancel`] afterwards.
    pub async fn run(&mut self, clock: &mut dyn FrameClock) -> Option<String> {
        while self.state == ScanState::Scanning {
            clock.next_frame().await;
            if let FrameOutcome::Decoded(text) = self.process_frame() {
                return Some(text);
            }
        }
        None
    }

    /// Abandon the scan and release the camera
    pub fn cancel(&mut self) {
        self.release();
        if self.state != ScanState::Stopped {
            self.state = ScanState::Idle;
        }
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
            stream.clear_sink();
            debug!("Camera released");
        }
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        self.release();
    }
}
