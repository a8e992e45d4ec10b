//! Synthetic camera, frames and decoder shared by the scanner suites

#![allow(dead_code)]

use async_trait::async_trait;
use faculty::render::ModuleMatrix;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use student::camera::{CaptureConstraints, ReadyState};
use student::{Camera, CameraError, Frame, QrDecoder, SymbolDecoder, VideoStream};

/// Frame showing `text` as a QR symbol
pub fn symbol_frame(text: &str) -> Frame {
    let (side, luma) = ModuleMatrix::encode(text).unwrap().rasterize(4);
    Frame::from_luma(side, side, &luma).unwrap()
}

pub fn blank_frame() -> Frame {
    Frame::from_luma(64, 48, &vec![255; 64 * 48]).unwrap()
}

/// What happened to the streams a camera handed out
#[derive(Default)]
pub struct StreamProbe {
    pub opened: AtomicUsize,
    pub captures: AtomicUsize,
    pub stops: AtomicUsize,
    pub sink_clears: AtomicUsize,
}

impl StreamProbe {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

struct FakeStream {
    /// Ready-state checks left before enough data is buffered
    warmup: AtomicUsize,
    frames: VecDeque<Frame>,
    probe: Arc<StreamProbe>,
}

impl VideoStream for FakeStream {
    fn ready_state(&self) -> ReadyState {
        let warming = self
            .warmup
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if warming {
            ReadyState::HaveCurrentData
        } else {
            ReadyState::HaveEnoughData
        }
    }

    fn capture(&mut self) -> Option<Frame> {
        self.probe.captures.fetch_add(1, Ordering::SeqCst);
        Some(self.frames.pop_front().unwrap_or_else(blank_frame))
    }

    fn stop_tracks(&mut self) {
        self.probe.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn clear_sink(&mut self) {
        self.probe.sink_clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// Camera replaying scripted frames, or failing with a fixed error
pub struct FakeCamera {
    failure: Option<CameraError>,
    warmup: usize,
    frames: Mutex<Vec<Frame>>,
    pub probe: Arc<StreamProbe>,
}

impl FakeCamera {
    pub fn showing(frames: Vec<Frame>) -> Self {
        Self {
            failure: None,
            warmup: 0,
            frames: Mutex::new(frames),
            probe: Arc::new(StreamProbe::default()),
        }
    }

    pub fn failing(error: CameraError) -> Self {
        Self {
            failure: Some(error),
            ..Self::showing(Vec::new())
        }
    }

    /// Report insufficient data for the first `frames` frames
    pub fn with_warmup(mut self, frames: usize) -> Self {
        self.warmup = frames;
        self
    }
}

#[async_trait]
impl Camera for FakeCamera {
    async fn open(
        &self,
        _constraints: CaptureConstraints,
    ) -> Result<Box<dyn VideoStream>, CameraError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.probe.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStream {
            warmup: AtomicUsize::new(self.warmup),
            frames: self.frames.lock().unwrap().clone().into(),
            probe: Arc::clone(&self.probe),
        }))
    }
}

/// QR decoder that counts how many frames it was asked to read
#[derive(Default)]
pub struct CountingDecoder {
    pub calls: AtomicUsize,
}

impl SymbolDecoder for CountingDecoder {
    fn decode(&self, frame: &Frame) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        QrDecoder.decode(frame)
    }
}
