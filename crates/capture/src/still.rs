//! A camera backed by a still image file.
//!
//! Used by the command-line check-in and by kiosks that receive photos
//! from an external capture device. The image is decoded once when the
//! stream opens and downscaled to fit the ideal resolution.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::RgbImage;

use crate::device::{DeviceError, MediaSource, VideoConstraints, VideoStream};

pub struct StillImageSource {
    path: PathBuf,
}

impl StillImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MediaSource for StillImageSource {
    async fn open_video(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn VideoStream>, DeviceError> {
        let path = self.path.clone();
        let (width, height) = (constraints.ideal_width, constraints.ideal_height);

        let frame = tokio::task::spawn_blocking(move || -> Result<RgbImage, DeviceError> {
            let image = image::open(&path).map_err(|e| match e {
                image::ImageError::IoError(io) => {
                    DeviceError::NotFound(format!("{}: {io}", path.display()))
                }
                other => DeviceError::Failed(format!("{}: {other}", path.display())),
            })?;
            let image = if image.width() > width || image.height() > height {
                image.thumbnail(width, height)
            } else {
                image
            };
            Ok(image.to_rgb8())
        })
        .await
        .map_err(|e| DeviceError::Failed(format!("image decode task failed: {e}")))??;

        Ok(Box::new(StillStream {
            label: self.path.display().to_string(),
            frame: Some(frame),
        }))
    }
}

struct StillStream {
    label: String,
    frame: Option<RgbImage>,
}

impl VideoStream for StillStream {
    fn label(&self) -> &str {
        &self.label
    }

    fn current_frame(&self) -> Option<RgbImage> {
        self.frame.clone()
    }

    fn stop(&mut self) {
        self.frame = None;
    }

    fn is_live(&self) -> bool {
        self.frame.is_some()
    }
}
