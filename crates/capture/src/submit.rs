//! Upload submitter: the seam between the capture flow and the remote API.

use async_trait::async_trait;
use rollcall_client::{ApiError, AttendanceApi, PhotoUpload};
use rollcall_core::attendance::{CheckInStatus, Coordinates, LoginRecord};

use crate::error::CaptureError;
use crate::frame::CapturedFrame;

/// Shown when a failed upload carries no server message.
pub const SUBMIT_FALLBACK_MESSAGE: &str = "Failed to record login";

/// Shown after a successful upload.
pub const SUBMIT_SUCCESS_MESSAGE: &str = "Login recorded successfully! Welcome to office.";

/// The two calls the capture flow makes against the attendance API.
#[async_trait]
pub trait CheckInApi: Send + Sync {
    async fn check_login_status(&self) -> Result<CheckInStatus, ApiError>;

    async fn login_with_photo(&self, upload: PhotoUpload) -> Result<Option<LoginRecord>, ApiError>;
}

#[async_trait]
impl CheckInApi for AttendanceApi {
    async fn check_login_status(&self) -> Result<CheckInStatus, ApiError> {
        AttendanceApi::check_login_status(self).await
    }

    async fn login_with_photo(&self, upload: PhotoUpload) -> Result<Option<LoginRecord>, ApiError> {
        AttendanceApi::login_with_photo(self, upload).await
    }
}

/// Submit `frame` (and `coordinates`, when known) once.
///
/// No retry: a failure is returned as [`CaptureError::SubmissionFailed`]
/// carrying the message to show the user.
pub async fn submit(
    api: &dyn CheckInApi,
    frame: &CapturedFrame,
    coordinates: Option<Coordinates>,
) -> Result<Option<LoginRecord>, CaptureError> {
    let upload = PhotoUpload::new(frame.jpeg().to_vec(), coordinates);
    api.login_with_photo(upload).await.map_err(|e| {
        tracing::warn!(frame_id = %frame.id(), error = %e, "Check-in upload failed");
        CaptureError::SubmissionFailed(e.user_message(SUBMIT_FALLBACK_MESSAGE))
    })
}
