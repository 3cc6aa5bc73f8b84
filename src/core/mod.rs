//! Core extraction engine.
//!
//! Records flow one way: scanners produce `ExtractionRecord`s, the
//! `CatalogBuilder` merges them into a sorted `Catalog`, and the `PotWriter`
//! serializes that catalog.
//!
//! ## Module Structure
//!
//! - `record`: `ExtractionRecord` and `RawText`
//! - `scanner`: per-source-kind scanners and the shared tree walk
//! - `catalog`: merging and ordering
//! - `pot`: gettext template output
//! - `pipeline`: `Extraction`, wiring scanners to the builder
//! - `error`: fatal error conditions

pub mod catalog;
pub mod error;
pub mod pipeline;
pub mod pot;
pub mod record;
pub mod scanner;

pub use catalog::{Catalog, CatalogBuilder, Location, MessageEntry};
pub use error::ExtractError;
pub use pipeline::{Extraction, ExtractionOutcome};
pub use pot::{HeaderFields, PotWriter};
pub use record::{ExtractionRecord, RawText};
pub use scanner::{ScanWarning, SourceKind, SourceScanner};
