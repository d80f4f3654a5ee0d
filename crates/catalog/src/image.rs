//! References to image files kept in external media storage.
//!
//! Only the relative path is stored (`movies/poster.jpg`); the bytes live in
//! whatever file/object storage serves the configured media URL.

use serde::{Serialize, Serializer};
use thiserror::Error;

use kinoteka_core::ValueObject;

use crate::fields::MAX_CHAR_FIELD;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp"];

/// Storage location ("upload directory") of an image kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaLocation {
    Actors,
    Movies,
    MovieShots,
}

impl MediaLocation {
    pub fn dir(self) -> &'static str {
        match self {
            MediaLocation::Actors => "actors",
            MediaLocation::Movies => "movies",
            MediaLocation::MovieShots => "movie_shots",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("this field is required")]
    Empty,

    #[error("file name must not contain path separators")]
    PathSeparator,

    #[error("file extension '{0}' is not allowed")]
    Extension(String),

    #[error("ensure this value has at most {MAX_CHAR_FIELD} characters")]
    TooLong,

    #[error("stored path '{0}' does not belong to this location")]
    WrongLocation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    location: MediaLocation,
    file_name: String,
}

impl ImageRef {
    /// Validate an uploaded file name and place it under `location`.
    pub fn new(location: MediaLocation, file_name: &str) -> Result<Self, ImageError> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(ImageError::Empty);
        }
        if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
            return Err(ImageError::PathSeparator);
        }
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImageError::Extension(ext));
        }
        if location.dir().len() + 1 + file_name.len() > MAX_CHAR_FIELD {
            return Err(ImageError::TooLong);
        }
        Ok(Self {
            location,
            file_name: file_name.to_string(),
        })
    }

    /// Rebuild a reference from its stored relative path (`<dir>/<file>`).
    pub fn from_stored(location: MediaLocation, path: &str) -> Result<Self, ImageError> {
        let file_name = path
            .strip_prefix(location.dir())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| ImageError::WrongLocation(path.to_string()))?;
        Self::new(location, file_name)
    }

    pub fn location(&self) -> MediaLocation {
        self.location
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Relative storage path, as persisted.
    pub fn path(&self) -> String {
        format!("{}/{}", self.location.dir(), self.file_name)
    }

    /// Public URL under the configured media prefix.
    pub fn url(&self, media_url: &str) -> String {
        format!("{}/{}", media_url.trim_end_matches('/'), self.path())
    }
}

impl ValueObject for ImageRef {}

impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path())
    }
}
