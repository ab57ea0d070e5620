//! Camera session: ownership of one live video stream.
//!
//! [`CameraSession`] is the only holder of the device stream. Every way out
//! of a session stops the stream: an explicit [`CameraSession::stop`], or
//! the drop of the session on any other path.

use image::RgbImage;

use crate::device::{MediaSource, VideoConstraints, VideoStream};
use crate::error::CaptureError;

pub struct CameraSession {
    stream: Option<Box<dyn VideoStream>>,
    label: String,
}

impl CameraSession {
    /// Request a stream from `source` and take ownership of it.
    ///
    /// Fails with [`CaptureError::DeviceUnavailable`] when permission is
    /// denied or no camera exists.
    pub async fn start(
        source: &dyn MediaSource,
        constraints: &VideoConstraints,
    ) -> Result<Self, CaptureError> {
        let stream = source.open_video(constraints).await.map_err(|e| {
            tracing::warn!(error = %e, "Camera access denied or not available");
            CaptureError::DeviceUnavailable(e)
        })?;

        let label = stream.label().to_string();
        tracing::info!(
            camera = %label,
            ideal_width = constraints.ideal_width,
            ideal_height = constraints.ideal_height,
            "Camera started",
        );

        Ok(Self {
            stream: Some(stream),
            label,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the session still holds a running stream.
    pub fn is_live(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_live())
    }

    /// The frame currently on screen, if the stream is live and has one.
    pub fn current_frame(&self) -> Option<RgbImage> {
        self.stream
            .as_ref()
            .filter(|s| s.is_live())
            .and_then(|s| s.current_frame())
    }

    /// Halt every track and detach the stream. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            tracing::info!(camera = %self.label, "Camera stopped");
        }
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("label", &self.label)
            .field("live", &self.is_live())
            .finish()
    }
}
