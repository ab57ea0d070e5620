use rollcall_core::error::CoreError;

/// Fallback messages for admin actions whose failure carries no server text.
pub const CREATE_EMPLOYEE_FALLBACK: &str = "Failed to create employee";
pub const DELETE_EMPLOYEE_FALLBACK: &str = "Failed to delete employee";
pub const UPDATE_STATUS_FALLBACK: &str = "Failed to update employee status";

/// Errors from the attendance API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Attendance API error ({status}): {}", .message.as_deref().unwrap_or("<no message>"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// The `message` field of the error body, when the body had one.
        message: Option<String>,
    },

    /// The API answered 2xx but with `success: false`.
    #[error("Attendance API rejected the request: {}", .message.as_deref().unwrap_or("<no message>"))]
    Rejected { message: Option<String> },

    /// The configured base URL cannot be used to build endpoint URLs.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Input was refused before anything was sent.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    /// Message suitable for showing to the user.
    ///
    /// Uses the server's `message` field when present, otherwise
    /// `fallback`. Client-side validation failures carry their own text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(m), ..
            }
            | ApiError::Rejected { message: Some(m) }
                if !m.trim().is_empty() =>
            {
                m.clone()
            }
            ApiError::Core(CoreError::Validation(m)) => m.clone(),
            _ => fallback.to_string(),
        }
    }

    /// HTTP status code, if the server answered with an error status.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
