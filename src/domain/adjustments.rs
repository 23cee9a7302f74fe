//! Interactive preview adjustments
//!
//! These settings only drive the client-side preview. They are not applied
//! to the exported PNG.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{check_range, ValidationError};

pub const ADJUSTMENT_MIN: i32 = -100;
pub const ADJUSTMENT_MAX: i32 = 100;

/// Fixed filter applied in beauty mode
pub const BEAUTY_FILTER: &str = "blur(0.5px) saturate(1.5)";

/// Brightness/contrast offsets in percent plus the beauty toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct Adjustments {
    pub brightness: i32,
    pub contrast: i32,
    pub beauty_mode: bool,
}

impl Adjustments {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range("brightness", self.brightness, ADJUSTMENT_MIN, ADJUSTMENT_MAX)?;
        check_range("contrast", self.contrast, ADJUSTMENT_MIN, ADJUSTMENT_MAX)?;
        Ok(())
    }

    /// CSS filter for the preview, `None` when everything is neutral
    pub fn preview_filter(&self) -> Option<String> {
        let mut filters = Vec::new();
        if self.brightness != 0 {
            filters.push(format!("brightness({}%)", 100 + self.brightness));
        }
        if self.contrast != 0 {
            filters.push(format!("contrast({}%)", 100 + self.contrast));
        }
        if self.beauty_mode {
            filters.push(BEAUTY_FILTER.to_string());
        }

        if filters.is_empty() {
            None
        } else {
            Some(filters.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_has_no_filter() {
        assert_eq!(Adjustments::default().preview_filter(), None);
    }

    #[test]
    fn test_filter_composition() {
        let adj = Adjustments { brightness: 20, contrast: -30, beauty_mode: true };
        assert_eq!(
            adj.preview_filter().as_deref(),
            Some("brightness(120%) contrast(70%) blur(0.5px) saturate(1.5)")
        );
    }

    #[test]
    fn test_validate_bounds() {
        assert!(Adjustments { brightness: -100, contrast: 100, beauty_mode: false }.validate().is_ok());
        assert!(Adjustments { brightness: -101, ..Default::default() }.validate().is_err());
        assert!(Adjustments { contrast: 150, ..Default::default() }.validate().is_err());
    }
}
