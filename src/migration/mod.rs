//! Export and import of the whole vault as one encrypted bundle.
//!
//! This module provides:
//! - The fixed 132-byte header codec and atomic file writes (`format`)
//! - The JSON payload sealed inside a bundle (`payload`)
//! - Export of the unlocked vault (`export`)
//! - Two-phase verify-and-restore (`import`)

pub mod export;
pub mod format;
pub mod import;
pub mod payload;

pub use export::{default_file_name, export_bundle, export_to_path, ExportSummary};
pub use format::{BundleHeader, FORMAT_VERSION, HEADER_LEN, MAGIC};
pub use import::{read_bundle, stage_import, PendingImport, RestoreSummary};
pub use payload::{ExportPayload, ExportedEntry};
