//! Photo specification catalog
//!
//! The catalog is a fixed table of named physical print sizes. Each entry
//! carries its size as a display string (`"35mm×49mm"`) which is parsed on
//! demand into millimeter dimensions and an aspect ratio.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Separator between width and height in a size string (U+00D7)
pub const SIZE_SEPARATOR: char = '×';

/// Unit suffix expected on both dimensions
pub const SIZE_UNIT: &str = "mm";

/// Specification errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    #[error("Malformed size '{size}': {reason}")]
    Malformed { size: String, reason: String },
    #[error("Unknown photo spec: {0}")]
    NotFound(u32),
}

impl SpecError {
    fn malformed(size: &str, reason: impl Into<String>) -> Self {
        SpecError::Malformed {
            size: size.to_string(),
            reason: reason.into(),
        }
    }
}

/// A named physical photo size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSpec {
    pub id: u32,
    pub name: &'static str,
    pub size: &'static str,
}

static CATALOG: [PhotoSpec; 4] = [
    PhotoSpec { id: 1, name: "标准二寸", size: "35mm×49mm" },
    PhotoSpec { id: 2, name: "标准一寸", size: "25mm×35mm" },
    PhotoSpec { id: 3, name: "公务员考试规格", size: "33mm×48mm" },
    PhotoSpec { id: 4, name: "护照照片规格", size: "33mm×48mm" },
];

/// All specs in display order
pub fn catalog() -> &'static [PhotoSpec] {
    &CATALOG
}

/// Look up a spec by id
pub fn find_spec(id: u32) -> Option<&'static PhotoSpec> {
    CATALOG.iter().find(|spec| spec.id == id)
}

/// The spec selected when a session starts
pub fn default_spec() -> &'static PhotoSpec {
    &CATALOG[0]
}

/// Parse a `<number>mm×<number>mm` size string into `(width_mm, height_mm)`
///
/// Both numbers must be finite and strictly positive.
pub fn parse_size(size: &str) -> Result<(f64, f64), SpecError> {
    let mut parts = size.trim().split(SIZE_SEPARATOR);

    let (Some(width), Some(height), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(SpecError::malformed(
            size,
            format!("expected exactly two dimensions separated by '{}'", SIZE_SEPARATOR),
        ));
    };

    Ok((parse_dimension(size, width)?, parse_dimension(size, height)?))
}

fn parse_dimension(size: &str, part: &str) -> Result<f64, SpecError> {
    let number = part
        .trim()
        .strip_suffix(SIZE_UNIT)
        .ok_or_else(|| SpecError::malformed(size, format!("dimension '{}' is missing the mm unit", part.trim())))?;

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| SpecError::malformed(size, format!("'{}' is not a number", number.trim())))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(SpecError::malformed(
            size,
            format!("dimension must be a positive finite number, got {}", value),
        ));
    }

    Ok(value)
}

impl PhotoSpec {
    /// Physical dimensions in millimeters
    pub fn dimensions_mm(&self) -> Result<(f64, f64), SpecError> {
        parse_size(self.size)
    }

    /// Target aspect ratio (width / height)
    pub fn target_ratio(&self) -> Result<f64, SpecError> {
        let (width, height) = self.dimensions_mm()?;
        Ok(width / height)
    }
}

/// Serialized view of a catalog entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PhotoSpecInfo {
    pub id: u32,
    pub name: String,
    pub size: String,
    pub width_mm: f64,
    pub height_mm: f64,
}

impl TryFrom<&PhotoSpec> for PhotoSpecInfo {
    type Error = SpecError;

    fn try_from(spec: &PhotoSpec) -> Result<Self, Self::Error> {
        let (width_mm, height_mm) = spec.dimensions_mm()?;
        Ok(PhotoSpecInfo {
            id: spec.id,
            name: spec.name.to_string(),
            size: spec.size.to_string(),
            width_mm,
            height_mm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_contents() {
        let names: Vec<_> = catalog().iter().map(|s| (s.id, s.name, s.size)).collect();
        assert_eq!(
            names,
            vec![
                (1, "标准二寸", "35mm×49mm"),
                (2, "标准一寸", "25mm×35mm"),
                (3, "公务员考试规格", "33mm×48mm"),
                (4, "护照照片规格", "33mm×48mm"),
            ]
        );
    }

    #[test]
    fn test_every_catalog_size_parses() {
        for spec in catalog() {
            let (w, h) = parse_size(spec.size).unwrap();
            assert!(w > 0.0 && h > 0.0, "{} parsed to {}x{}", spec.name, w, h);
            assert!(spec.target_ratio().unwrap() > 0.0);
        }
    }

    #[test]
    fn test_parse_size_values() {
        assert_eq!(parse_size("35mm×49mm").unwrap(), (35.0, 49.0));
        assert_eq!(parse_size(" 33.5mm × 48mm ").unwrap(), (33.5, 48.0));
    }

    #[test]
    fn test_parse_size_rejects_malformed() {
        for bad in [
            "",
            "35mm",
            "35mmx49mm",
            "35×49",
            "35mm×49mm×10mm",
            "0mm×49mm",
            "-35mm×49mm",
            "abcmm×49mm",
            "35mm×infmm",
            "NaNmm×49mm",
        ] {
            assert!(
                matches!(parse_size(bad), Err(SpecError::Malformed { .. })),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_find_spec() {
        assert_eq!(find_spec(2).map(|s| s.name), Some("标准一寸"));
        assert!(find_spec(99).is_none());
        assert_eq!(default_spec().id, 1);
    }

    #[test]
    fn test_spec_info_conversion() {
        let info = PhotoSpecInfo::try_from(default_spec()).unwrap();
        assert_eq!(info.width_mm, 35.0);
        assert_eq!(info.height_mm, 49.0);
    }
}
