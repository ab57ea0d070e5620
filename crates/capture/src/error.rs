use crate::device::DeviceError;
use crate::flow::FlowPhase;

/// Failures of the capture workflow's building blocks.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    /// Camera or position provider denied or absent. Non-fatal.
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(#[from] DeviceError),

    /// Capture attempted without a live frame.
    #[error("No live frame to capture")]
    CaptureUnavailable,

    /// The upload failed; the message is meant for the user.
    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    /// The daily status could not be fetched.
    #[error("Status fetch failed: {0}")]
    StatusFetchFailed(String),

    /// Encoding the captured frame failed.
    #[error("Frame encoding failed: {0}")]
    Encoding(String),
}

/// Reasons a flow command was refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        phase: FlowPhase,
        action: &'static str,
    },

    #[error("Check-in status is still loading")]
    StatusPending,

    #[error("Already checked in today")]
    AlreadyCheckedIn,

    #[error("An upload is already in progress")]
    UploadInFlight,

    #[error("Capture flow has shut down")]
    Closed,
}
