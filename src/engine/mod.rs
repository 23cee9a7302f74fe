//! Export engine
//!
//! This module contains the export pipeline:
//! - Crop geometry for a target photo spec
//! - Backdrop fill and PNG encoding
//! - Download file naming

mod compositor;
mod naming;

pub use compositor::{composite_bytes, CompositorError, ExportResult};
pub use naming::{content_disposition, export_file_name, DEFAULT_PRODUCT_NAME};
