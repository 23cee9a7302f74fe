//! Domain types and models

mod adjustments;
mod color;
pub mod spec;
pub mod validation;

pub use adjustments::Adjustments;
pub use color::{palette, FillColor, PaletteEntryInfo};
pub use spec::{catalog, default_spec, find_spec, PhotoSpec, PhotoSpecInfo, SpecError};
pub use validation::{validate_upload, UploadKind, ValidationError, DEFAULT_MAX_UPLOAD_BYTES};
