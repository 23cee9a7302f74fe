//! Backdrop fill colors

use image::Rgba;
use serde::Serialize;
use utoipa::ToSchema;

use super::validation::ValidationError;

/// Optional solid backdrop painted behind the exported photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillColor {
    /// Keep transparency from background removal
    #[default]
    None,
    Rgb(u8, u8, u8),
}

/// A palette entry shown in the editor
#[derive(Debug, Clone, Copy)]
pub struct PaletteEntry {
    pub label: &'static str,
    pub color: FillColor,
}

static PALETTE: [PaletteEntry; 6] = [
    PaletteEntry { label: "无背景", color: FillColor::None },
    PaletteEntry { label: "浅蓝", color: FillColor::Rgb(0x02, 0xA7, 0xF0) },
    PaletteEntry { label: "深蓝", color: FillColor::Rgb(0x34, 0x92, 0xC4) },
    PaletteEntry { label: "暗红", color: FillColor::Rgb(0xD9, 0x00, 0x1B) },
    PaletteEntry { label: "亮红", color: FillColor::Rgb(0xFF, 0x00, 0x00) },
    PaletteEntry { label: "纯白", color: FillColor::Rgb(0xFF, 0xFF, 0xFF) },
];

/// The fixed background palette in display order
pub fn palette() -> &'static [PaletteEntry] {
    &PALETTE
}

impl FillColor {
    /// Parse `none`/`transparent`/empty or a `#RRGGBB` / `#RGB` literal
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("transparent")
        {
            return Ok(FillColor::None);
        }

        let invalid = || ValidationError::InvalidColor(value.to_string());
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(FillColor::Rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                // #abc expands to #aabbcc
                let short = |i: usize| channel(&hex[i..=i]).map(|v| v * 17);
                Ok(FillColor::Rgb(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FillColor::None)
    }

    /// Opaque pixel for this color, `None` when transparent
    pub fn to_rgba(&self) -> Option<Rgba<u8>> {
        match *self {
            FillColor::None => None,
            FillColor::Rgb(r, g, b) => Some(Rgba([r, g, b, 255])),
        }
    }

    /// Hex form (`#RRGGBB`), `None` when transparent
    pub fn to_hex(&self) -> Option<String> {
        match *self {
            FillColor::None => None,
            FillColor::Rgb(r, g, b) => Some(format!("#{:02X}{:02X}{:02X}", r, g, b)),
        }
    }
}

/// Serialized palette entry
#[derive(Debug, Serialize, ToSchema)]
pub struct PaletteEntryInfo {
    pub label: String,
    /// Hex color, null for no background
    pub value: Option<String>,
}

impl From<&PaletteEntry> for PaletteEntryInfo {
    fn from(entry: &PaletteEntry) -> Self {
        PaletteEntryInfo {
            label: entry.label.to_string(),
            value: entry.color.to_hex(),
        }
    }
}
