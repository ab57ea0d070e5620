//! Status poller: has the current user checked in today?

use rollcall_core::attendance::CheckInStatus;

use crate::error::CaptureError;
use crate::submit::CheckInApi;

/// Fetch the authoritative check-in status.
pub async fn refresh(api: &dyn CheckInApi) -> Result<CheckInStatus, CaptureError> {
    let status = api
        .check_login_status()
        .await
        .map_err(|e| CaptureError::StatusFetchFailed(e.to_string()))?;

    tracing::debug!(
        has_logged_in_today = status.has_logged_in_today,
        "Check-in status fetched",
    );
    Ok(status)
}

/// Like [`refresh`], but a failure degrades to "not checked in yet".
pub async fn refresh_or_default(api: &dyn CheckInApi) -> CheckInStatus {
    match refresh(api).await {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!(error = %e, "Error checking login status, assuming not checked in");
            CheckInStatus::not_checked_in()
        }
    }
}
