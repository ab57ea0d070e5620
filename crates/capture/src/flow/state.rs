//! Flow states and the snapshot published to observers.

use std::fmt;

use rollcall_core::attendance::{CheckInStatus, Coordinates, LoginRecord};
use tokio::sync::oneshot;

use crate::camera::CameraSession;
use crate::frame::{CapturedFrame, FrameId};
use crate::preview::{PreviewHandle, PreviewId};

use super::handle::UploadOutcome;

/// Coarse phase of a capture flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    /// No camera open.
    Idle,
    /// Camera open, showing the live preview.
    Live,
    /// A frame has been captured and awaits confirmation.
    Captured,
    /// The check-in was recorded. Terminal.
    Confirmed,
}

impl fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowPhase::Idle => "idle",
            FlowPhase::Live => "live",
            FlowPhase::Captured => "captured",
            FlowPhase::Confirmed => "confirmed",
        })
    }
}

/// An upload that has been dispatched and not yet settled.
pub(super) struct InFlightUpload {
    pub frame_id: FrameId,
    pub reply: oneshot::Sender<UploadOutcome>,
}

/// The flow's owned state. Each variant carries exactly the resources
/// valid in that phase.
pub(super) enum FlowState {
    Idle,
    Live {
        session: CameraSession,
    },
    Captured {
        session: CameraSession,
        frame: CapturedFrame,
        preview: PreviewHandle,
        upload: Option<InFlightUpload>,
    },
    Confirmed,
}

impl FlowState {
    pub fn phase(&self) -> FlowPhase {
        match self {
            FlowState::Idle => FlowPhase::Idle,
            FlowState::Live { .. } => FlowPhase::Live,
            FlowState::Captured { .. } => FlowPhase::Captured,
            FlowState::Confirmed => FlowPhase::Confirmed,
        }
    }
}

/// Check-in status as last reported by the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusView {
    /// A status fetch is in flight.
    pub loading: bool,
    pub has_logged_in_today: bool,
    pub record: Option<LoginRecord>,
}

impl StatusView {
    pub(super) fn loading() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    pub(super) fn loaded(status: CheckInStatus) -> Self {
        Self {
            loading: false,
            has_logged_in_today: status.has_logged_in_today,
            record: status.login_record,
        }
    }
}

/// Observable state of a flow, republished after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSnapshot {
    pub phase: FlowPhase,
    pub status: StatusView,
    pub coordinates: Option<Coordinates>,
    /// A position request is in flight.
    pub locating: bool,
    /// Preview of the captured frame, while in [`FlowPhase::Captured`].
    pub preview: Option<PreviewId>,
    pub frame_id: Option<FrameId>,
    pub uploading: bool,
    pub camera_live: bool,
}

impl FlowSnapshot {
    pub(super) fn initial() -> Self {
        Self {
            phase: FlowPhase::Idle,
            status: StatusView::loading(),
            coordinates: None,
            locating: false,
            preview: None,
            frame_id: None,
            uploading: false,
            camera_live: false,
        }
    }
}
