//! Camera acquisition
//!
//! The capture device sits behind the [`Camera`] and [`VideoStream`] traits so
//! the scan loop can run against a browser binding, a native capture backend
//! or synthetic frames in tests.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Origin the scanning page is served from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// Scheme including the trailing colon, e.g. `https:`
    pub protocol: String,
    pub hostname: String,
}

impl PageContext {
    pub fn new(protocol: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            hostname: hostname.into(),
        }
    }

    /// Cameras are only exposed to HTTPS pages, or to any page on localhost
    pub fn is_secure(&self) -> bool {
        self.protocol == "https:" || self.hostname == "localhost"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera
    Environment,
    /// Whatever the device offers
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl CaptureConstraints {
    pub fn any_facing(self) -> Self {
        Self {
            facing: FacingMode::Any,
            ..self
        }
    }
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: 640,
            ideal_height: 480,
        }
    }
}

/// Why a camera stream could not be obtained
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("Camera access requires HTTPS. Please use HTTPS or access via laptop on localhost.")]
    InsecureContext,

    #[error("Camera permission denied. Please allow camera access and try again.")]
    PermissionDenied,

    #[error("No camera found on this device.")]
    NotFound,

    #[error("Camera not supported on this browser. Try Chrome or Safari.")]
    NotSupported,

    #[error("No camera matches the requested constraints.")]
    Overconstrained,

    #[error("Please enable camera permissions in your browser settings.")]
    Other(String),
}

impl CameraError {
    /// Map a `getUserMedia` rejection name
    pub fn from_dom_name(name: &str) -> Self {
        match name {
            "NotAllowedError" | "SecurityError" => CameraError::PermissionDenied,
            "NotFoundError" => CameraError::NotFound,
            "NotSupportedError" => CameraError::NotSupported,
            "OverconstrainedError" => CameraError::Overconstrained,
            other => CameraError::Other(other.to_string()),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CameraError::InsecureContext => "HTTPS Required",
            _ => "Camera Access Error",
        }
    }
}

/// How much of the video is buffered, as reported by a media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

/// One captured RGBA frame
///
/// Only built through [`Frame::from_rgba`] or [`Frame::from_luma`], so the
/// buffer always holds exactly `width * height` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    /// Row-major RGBA, four bytes per pixel
    rgba: Vec<u8>,
}

impl Frame {
    pub fn from_rgba(width: usize, height: usize, rgba: Vec<u8>) -> Option<Self> {
        let expected = width.checked_mul(height)?.checked_mul(4)?;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn from_luma(width: usize, height: usize, luma: &[u8]) -> Option<Self> {
        if luma.len() != width.checked_mul(height)? {
            return None;
        }
        let rgba = luma.iter().flat_map(|&l| [l, l, l, u8::MAX]).collect();
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Perceived brightness of one pixel (BT.601 weights)
    pub fn luma_at(&self, x: usize, y: usize) -> u8 {
        let i = (y * self.width + x) * 4;
        let (r, g, b) = (
            self.rgba[i] as u32,
            self.rgba[i + 1] as u32,
            self.rgba[i + 2] as u32,
        );
        ((299 * r + 587 * g + 114 * b) / 1000) as u8
    }
}

/// A live capture stream bound to a video sink
pub trait VideoStream: Send {
    fn ready_state(&self) -> ReadyState;

    /// Snapshot the frame currently shown by the sink
    fn capture(&mut self) -> Option<Frame>;

    /// Stop every track of the underlying media stream
    fn stop_tracks(&mut self);

    /// Detach the stream from its video sink
    fn clear_sink(&mut self);
}

#[async_trait]
pub trait Camera: Send + Sync {
    async fn open(
        &self,
        constraints: CaptureConstraints,
    ) -> Result<Box<dyn VideoStream>, CameraError>;
}

/// Obtain a stream for scanning, preferring the rear camera
pub async fn acquire(
    camera: &dyn Camera,
    page: &PageContext,
    constraints: CaptureConstraints,
) -> Result<Box<dyn VideoStream>, CameraError> {
    if !page.is_secure() {
        return Err(CameraError::InsecureContext);
    }

    match camera.open(constraints).await {
        Err(CameraError::Overconstrained) if constraints.facing != FacingMode::Any => {
            warn!("Rear camera unavailable, falling back to any camera");
            camera.open(constraints.any_facing()).await
        }
        other => other,
    }
}
