//! Frame capture: mirrored JPEG snapshots of the live stream.
//!
//! The stored image is flipped horizontally so it matches what the user
//! saw in the (mirrored) live preview rather than the raw sensor output.

use std::fmt;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};

use crate::camera::CameraSession;
use crate::error::CaptureError;

/// Monotonic identifier of a captured frame within one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub u64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame-{}", self.0)
    }
}

/// A still image taken from a live session, pending confirmation.
#[derive(Clone)]
pub struct CapturedFrame {
    id: FrameId,
    jpeg: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl CapturedFrame {
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Encoded JPEG bytes.
    pub fn jpeg(&self) -> &Arc<[u8]> {
        &self.jpeg
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("id", &self.id)
            .field("bytes", &self.jpeg.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Snapshot the session's current frame as a mirrored JPEG.
///
/// Fails with [`CaptureError::CaptureUnavailable`] when the session is not
/// live or has not produced a frame with non-zero dimensions.
pub fn capture(
    session: &CameraSession,
    id: FrameId,
    quality: u8,
) -> Result<CapturedFrame, CaptureError> {
    let frame = session
        .current_frame()
        .filter(|f| f.width() > 0 && f.height() > 0)
        .ok_or(CaptureError::CaptureUnavailable)?;

    let jpeg = encode_mirrored(&frame, quality)?;
    tracing::debug!(
        %id,
        width = frame.width(),
        height = frame.height(),
        bytes = jpeg.len(),
        "Frame captured",
    );

    Ok(CapturedFrame {
        id,
        jpeg: Arc::from(jpeg),
        width: frame.width(),
        height: frame.height(),
    })
}

/// Flip `frame` horizontally and encode it as JPEG at `quality` (1-100).
pub fn encode_mirrored(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mirrored = imageops::flip_horizontal(frame);

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode_image(&mirrored)
        .map_err(|e| CaptureError::Encoding(e.to_string()))?;
    Ok(jpeg)
}
