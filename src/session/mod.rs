//! Editor sessions
//!
//! A session is the server-side counterpart of one open editor: the chosen
//! photo spec, preview adjustments, backdrop color and the uploaded and
//! processed images. Each upload bumps a version token so a background
//! removal that finishes after a newer upload cannot overwrite it.

mod store;
mod upload;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    default_spec, find_spec, Adjustments, FillColor, PhotoSpec, SpecError, UploadKind,
    ValidationError,
};

pub use store::{sweep_idle_sessions, SessionHandle, SessionStore};
pub use upload::{upload_and_remove, UploadOutcome};

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error("No image has been uploaded yet")]
    NothingToExport,
}

/// An encoded image held by a session
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub bytes: Bytes,
    pub content_type: String,
}

impl StoredImage {
    pub fn new(bytes: Bytes, content_type: impl Into<String>) -> Self {
        StoredImage {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn from_upload(bytes: Bytes, kind: UploadKind) -> Self {
        StoredImage::new(bytes, kind.mime())
    }
}

/// Partial update of session settings; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SessionUpdate {
    pub spec_id: Option<u32>,
    pub brightness: Option<i32>,
    pub contrast: Option<i32>,
    pub beauty_mode: Option<bool>,
    /// Hex color, or "none" for a transparent backdrop
    pub background: Option<String>,
}

/// Everything an export needs, detached from the session lock
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub source: StoredImage,
    pub spec: &'static PhotoSpec,
    pub fill: FillColor,
}

/// State of one editor
#[derive(Debug, Clone)]
pub struct EditorSession {
    pub id: Uuid,
    pub spec: &'static PhotoSpec,
    pub adjustments: Adjustments,
    pub fill: FillColor,
    pub original: Option<StoredImage>,
    pub processed: Option<StoredImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    version: u64,
}

impl EditorSession {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        EditorSession {
            id,
            spec: default_spec(),
            adjustments: Adjustments::default(),
            fill: FillColor::None,
            original: None,
            processed: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Current version token
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply an update atomically: either every field is valid and applied,
    /// or nothing changes
    pub fn apply(&mut self, update: &SessionUpdate) -> Result<(), SessionError> {
        let spec = match update.spec_id {
            Some(id) => find_spec(id).ok_or(SpecError::NotFound(id))?,
            None => self.spec,
        };

        let adjustments = Adjustments {
            brightness: update.brightness.unwrap_or(self.adjustments.brightness),
            contrast: update.contrast.unwrap_or(self.adjustments.contrast),
            beauty_mode: update.beauty_mode.unwrap_or(self.adjustments.beauty_mode),
        };
        adjustments.validate()?;

        let fill = match update.background.as_deref() {
            Some(value) => FillColor::parse(value)?,
            None => self.fill,
        };

        self.spec = spec;
        self.adjustments = adjustments;
        self.fill = fill;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Store a new upload and return the token its processing must present
    pub fn begin_upload(&mut self, image: StoredImage) -> u64 {
        self.original = Some(image);
        self.processed = None;
        self.version += 1;
        self.updated_at = Utc::now();
        self.version
    }

    /// Store a processed image if `token` is still current
    ///
    /// Returns false, leaving the session untouched, when a newer upload
    /// has superseded the one that produced `image`.
    pub fn commit_processed(&mut self, token: u64, image: StoredImage) -> bool {
        if token != self.version {
            return false;
        }
        self.processed = Some(image);
        self.updated_at = Utc::now();
        true
    }

    /// Snapshot the inputs of an export
    ///
    /// Prefers the background-free image and falls back to the raw upload
    /// when background removal has not produced one.
    pub fn export_request(&self) -> Result<ExportRequest, SessionError> {
        let source = self
            .processed
            .as_ref()
            .or(self.original.as_ref())
            .cloned()
            .ok_or(SessionError::NothingToExport)?;

        Ok(ExportRequest {
            source,
            spec: self.spec,
            fill: self.fill,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(tag: &'static [u8]) -> StoredImage {
        StoredImage::new(Bytes::from_static(tag), "image/png")
    }

    #[test]
    fn test_new_session_defaults() {
        let session = EditorSession::new(Uuid::new_v4());
        assert_eq!(session.spec.id, 1);
        assert_eq!(session.adjustments, Adjustments::default());
        assert!(session.fill.is_none());
        assert_eq!(session.version(), 0);
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut session = EditorSession::new(Uuid::new_v4());
        let first = session.begin_upload(image(b"first"));
        let second = session.begin_upload(image(b"second"));

        assert!(!session.commit_processed(first, image(b"first-processed")));
        assert!(session.processed.is_none());

        assert!(session.commit_processed(second, image(b"second-processed")));
        assert_eq!(session.processed.unwrap().bytes, Bytes::from_static(b"second-processed"));
    }

    #[test]
    fn test_new_upload_clears_processed() {
        let mut session = EditorSession::new(Uuid::new_v4());
        let token = session.begin_upload(image(b"a"));
        session.commit_processed(token, image(b"a-processed"));
        session.begin_upload(image(b"b"));
        assert!(session.processed.is_none());
    }

    #[test]
    fn test_apply_is_atomic() {
        let mut session = EditorSession::new(Uuid::new_v4());
        let update = SessionUpdate {
            spec_id: Some(2),
            brightness: Some(500),
            ..Default::default()
        };
        assert!(matches!(session.apply(&update), Err(SessionError::Validation(_))));
        assert_eq!(session.spec.id, 1);
        assert_eq!(session.adjustments.brightness, 0);
    }

    #[test]
    fn test_apply_updates_fields() {
        let mut session = EditorSession::new(Uuid::new_v4());
        let update = SessionUpdate {
            spec_id: Some(3),
            contrast: Some(-20),
            beauty_mode: Some(true),
            background: Some("#FFFFFF".to_string()),
            ..Default::default()
        };
        session.apply(&update).unwrap();

        assert_eq!(session.spec.name, "公务员考试规格");
        assert_eq!(session.adjustments.contrast, -20);
        assert!(session.adjustments.beauty_mode);
        assert_eq!(session.fill, FillColor::Rgb(255, 255, 255));
    }

    #[test]
    fn test_unknown_spec_rejected() {
        let mut session = EditorSession::new(Uuid::new_v4());
        let update = SessionUpdate { spec_id: Some(42), ..Default::default() };
        assert!(matches!(session.apply(&update), Err(SessionError::Spec(SpecError::NotFound(42)))));
    }

    #[test]
    fn test_export_source_selection() {
        let mut session = EditorSession::new(Uuid::new_v4());
        assert!(matches!(session.export_request(), Err(SessionError::NothingToExport)));

        let token = session.begin_upload(image(b"raw"));
        assert_eq!(session.export_request().unwrap().source.bytes, Bytes::from_static(b"raw"));

        session.commit_processed(token, image(b"clean"));
        assert_eq!(session.export_request().unwrap().source.bytes, Bytes::from_static(b"clean"));
    }
}
