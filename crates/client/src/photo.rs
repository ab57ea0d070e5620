//! Multipart payload for `POST /employee/login-with-photo`.

use reqwest::multipart::{Form, Part};
use rollcall_core::attendance::{Coordinates, PHOTO_CONTENT_TYPE, PHOTO_FIELD, PHOTO_FILE_NAME};

/// A confirmed check-in photo plus the optional device position.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// JPEG-encoded photo bytes.
    pub jpeg: Vec<u8>,
    pub coordinates: Option<Coordinates>,
}

impl PhotoUpload {
    pub fn new(jpeg: Vec<u8>, coordinates: Option<Coordinates>) -> Self {
        Self { jpeg, coordinates }
    }

    /// Build the multipart form: the photo part, then `latitude`,
    /// `longitude` and `accuracy` when coordinates are present.
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let photo = Part::bytes(self.jpeg)
            .file_name(PHOTO_FILE_NAME)
            .mime_str(PHOTO_CONTENT_TYPE)?;

        let mut form = Form::new().part(PHOTO_FIELD, photo);
        if let Some(coordinates) = self.coordinates {
            for (name, value) in coordinates.form_fields() {
                form = form.text(name, value);
            }
        }
        Ok(form)
    }
}
