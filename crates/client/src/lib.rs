//! HTTP client for the remote attendance API.
//!
//! Wraps the employee check-in endpoints and the admin dashboard
//! endpoints using [`reqwest`], including the multipart photo upload.

pub mod api;
pub mod config;
pub mod error;
pub mod photo;

pub use api::AttendanceApi;
pub use config::ClientConfig;
pub use error::ApiError;
pub use photo::PhotoUpload;
