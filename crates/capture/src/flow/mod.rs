//! Capture review flow.
//!
//! ```text
//! Idle --start--> Live --capture--> Captured --confirm(ok)--> Confirmed
//!  ^               |  ^                |
//!  |               |  +----retake------+
//!  +----cancel-----+-------cancel------+
//! ```
//!
//! A failed upload leaves the flow in `Captured` with the same frame, so
//! the user can confirm again or retake.

mod actor;
mod handle;
mod notice;
mod state;

pub use actor::CAMERA_UNAVAILABLE_MESSAGE;
pub use handle::{FlowDeps, FlowHandle, PendingUpload, UploadOutcome};
pub use notice::{Notice, NoticeLevel};
pub use state::{FlowPhase, FlowSnapshot, StatusView};
