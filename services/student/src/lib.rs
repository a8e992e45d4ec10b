//! Student side of the attendance system
//!
//! Scans a session QR code from a camera stream and records attendance with
//! the attendance service, skipping sessions already submitted.

pub mod camera;
pub mod decoder;
pub mod guard;
pub mod notice;
pub mod portal;
pub mod scanner;
pub mod submission;

pub use camera::{Camera, CameraError, Frame, PageContext, VideoStream};
pub use decoder::{QrDecoder, SymbolDecoder};
pub use guard::DuplicateGuard;
pub use notice::{Notice, NoticeLevel};
pub use portal::StudentPortal;
pub use scanner::{DisplayClock, FrameClock, FrameOutcome, ScanState, Scanner};
pub use submission::{
    AttendanceGateway, DuplicateSource, HttpGateway, Identity, SubmitError, SubmitOutcome,
    submit_scan,
};
