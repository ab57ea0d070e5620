//! Check-in domain types: coordinates, login records, and daily status.

use serde::{Deserialize, Serialize};

use crate::types::{RecordId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Multipart field carrying the check-in photo.
pub const PHOTO_FIELD: &str = "photo";

/// File name attached to the uploaded photo part.
pub const PHOTO_FILE_NAME: &str = "photo.jpg";

/// Content type of the uploaded photo part.
pub const PHOTO_CONTENT_TYPE: &str = "image/jpeg";

/// Default JPEG quality for captured frames (0.8 on a 0-1 scale).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A one-shot device position.
///
/// Acquired at most once per capture flow and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in metres.
    pub accuracy: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
        }
    }

    /// The three scalar multipart fields, in submission order.
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("accuracy", self.accuracy.to_string()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Login records
// ---------------------------------------------------------------------------

/// A single recorded check-in as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub login_date: Timestamp,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub location: Option<Coordinates>,
    /// Set once the server's retention job has removed the photo.
    #[serde(default)]
    pub is_photo_deleted: bool,
}

impl LoginRecord {
    /// URL of the photo evidence, if it can still be viewed.
    pub fn viewable_photo(&self) -> Option<&str> {
        if self.is_photo_deleted {
            return None;
        }
        self.photo_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Whether the current user has already checked in today.
///
/// Always reflects what the server last reported; the client never flips
/// it locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInStatus {
    #[serde(default)]
    pub has_logged_in_today: bool,
    #[serde(default)]
    pub login_record: Option<LoginRecord>,
}

impl CheckInStatus {
    /// Status used when the server could not be reached.
    pub fn not_checked_in() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
