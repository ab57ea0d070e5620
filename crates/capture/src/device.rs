//! Capability traits for the camera and the position provider.
//!
//! The capture flow only ever talks to devices through these traits, so a
//! browser bridge, a native camera, a still image or a test fake can all
//! stand behind the same flow.

use std::time::Duration;

use async_trait::async_trait;
use image::RgbImage;
use rollcall_core::attendance::Coordinates;
use rollcall_core::types::Timestamp;

/// Ideal capture width in pixels.
pub const IDEAL_WIDTH: u32 = 640;

/// Ideal capture height in pixels.
pub const IDEAL_HEIGHT: u32 = 480;

/// Default bound on a single position request.
pub const DEFAULT_POSITION_TIMEOUT: Duration = Duration::from_secs(10);

/// Default age up to which a cached position is accepted (5 minutes).
pub const DEFAULT_POSITION_MAX_AGE: Duration = Duration::from_secs(300);

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Front camera, towards the user.
    User,
    /// Rear camera.
    Environment,
}

/// Constraints passed when opening a video stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoConstraints {
    pub facing: FacingMode,
    /// Preferred resolution; sources may deliver something else.
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            ideal_width: IDEAL_WIDTH,
            ideal_height: IDEAL_HEIGHT,
        }
    }
}

/// Options for a one-shot position request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Upper bound on how long the request may take.
    pub timeout: Duration,
    /// A cached fix no older than this may be returned instead of a new one.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: DEFAULT_POSITION_TIMEOUT,
            maximum_age: DEFAULT_POSITION_MAX_AGE,
        }
    }
}

/// A position fix plus the moment it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub coordinates: Coordinates,
    pub acquired_at: Timestamp,
}

/// Failures reported by device sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No device found: {0}")]
    NotFound(String),

    #[error("Not supported in this environment")]
    Unsupported,

    #[error("Device request timed out")]
    Timeout,

    #[error("Device failure: {0}")]
    Failed(String),
}

/// An open video stream.
///
/// Dropping a stream without calling [`stop`](Self::stop) is a leak from
/// the device's point of view; [`crate::camera::CameraSession`] guarantees
/// the call.
pub trait VideoStream: Send {
    /// Human-readable device label, for logs.
    fn label(&self) -> &str;

    /// The frame currently displayed, or `None` when the stream has not
    /// produced one yet or has been stopped.
    fn current_frame(&self) -> Option<RgbImage>;

    /// Halt every track of the stream. Must tolerate repeated calls.
    fn stop(&mut self);

    /// Whether any track is still running.
    fn is_live(&self) -> bool;
}

/// A provider of camera streams.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Open a video stream matching `constraints` as closely as possible.
    async fn open_video(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn VideoStream>, DeviceError>;
}

/// A provider of one-shot device positions.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self, options: &PositionOptions) -> Result<PositionFix, DeviceError>;
}
