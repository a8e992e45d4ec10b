//! Faculty side of the attendance system
//!
//! Opens live sessions for a faculty member's courses, keeps the displayed QR
//! code fresh and follows who has scanned it.

pub mod client;
pub mod console;
pub mod render;
pub mod roster_csv;
pub mod session;
pub mod settings;
pub mod ticker;

pub use client::{ClientError, FacultyClient, RosterSource};
pub use console::{ConsolePeriods, FacultyConsole};
pub use session::LiveSession;
pub use settings::FacultySettings;
