//! Input validation for uploads and user-tunable parameters
//!
//! Everything here runs before any image is decoded or any provider is
//! called, so a rejected upload never costs a network round trip.

use thiserror::Error;

/// Default upload limit (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Validation errors surfaced directly to the user
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Unsupported image type '{0}', only JPG/PNG are accepted")]
    UnsupportedType(String),
    #[error("Image is {size} bytes, the maximum is {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error("Image body is empty")]
    Empty,
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },
    #[error("Invalid background color '{0}'")]
    InvalidColor(String),
}

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Jpeg,
    Png,
}

impl UploadKind {
    pub fn mime(&self) -> &'static str {
        match self {
            UploadKind::Jpeg => "image/jpeg",
            UploadKind::Png => "image/png",
        }
    }

    /// Parse a MIME type, ignoring parameters such as `; charset=...`
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("image/jpeg") || essence.eq_ignore_ascii_case("image/jpg") {
            Some(UploadKind::Jpeg)
        } else if essence.eq_ignore_ascii_case("image/png") {
            Some(UploadKind::Png)
        } else {
            None
        }
    }
}

/// Validate an uploaded image before it enters the pipeline
pub fn validate_upload(
    content_type: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<UploadKind, ValidationError> {
    let kind = UploadKind::from_mime(content_type)
        .ok_or_else(|| ValidationError::UnsupportedType(content_type.to_string()))?;

    if bytes.is_empty() {
        return Err(ValidationError::Empty);
    }

    if bytes.len() > max_bytes {
        return Err(ValidationError::TooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }

    Ok(kind)
}

/// Check that `value` lies in `[min, max]`
pub fn check_range(name: &'static str, value: i32, min: i32, max: i32) -> Result<i32, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange { name, value, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_jpeg_and_png() {
        assert_eq!(validate_upload("image/jpeg", b"x", 10), Ok(UploadKind::Jpeg));
        assert_eq!(validate_upload("IMAGE/PNG; q=1", b"x", 10), Ok(UploadKind::Png));
    }

    #[test]
    fn test_rejects_gif() {
        assert_eq!(
            validate_upload("image/gif", b"GIF89a", DEFAULT_MAX_UPLOAD_BYTES),
            Err(ValidationError::UnsupportedType("image/gif".to_string()))
        );
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let exact = vec![0u8; DEFAULT_MAX_UPLOAD_BYTES];
        assert!(validate_upload("image/png", &exact, DEFAULT_MAX_UPLOAD_BYTES).is_ok());

        let over = vec![0u8; DEFAULT_MAX_UPLOAD_BYTES + 1];
        assert!(matches!(
            validate_upload("image/png", &over, DEFAULT_MAX_UPLOAD_BYTES),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validate_upload("image/png", b"", 10), Err(ValidationError::Empty));
    }

    #[test]
    fn test_check_range() {
        assert_eq!(check_range("brightness", 100, -100, 100), Ok(100));
        assert!(check_range("brightness", 101, -100, 100).is_err());
    }
}
