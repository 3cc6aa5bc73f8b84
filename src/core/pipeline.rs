//! Extraction run: every configured scanner over one source tree, merged into
//! a single catalog.

use std::path::{Path, PathBuf};

use crate::core::catalog::{Catalog, CatalogBuilder};
use crate::core::error::{ExtractError, Result};
use crate::core::scanner::{FileFilter, ScanWarning, SourceKind, SourceScanner};

/// Result of a finished run.
#[derive(Debug)]
pub struct ExtractionOutcome {
    pub catalog: Catalog,
    /// Files that could not be scanned, in the order they were met.
    pub warnings: Vec<ScanWarning>,
    pub files_scanned: usize,
}

struct Stage {
    scanner: Box<dyn SourceScanner>,
    filter: FileFilter,
}

/// Composes scanners over a source root.
///
/// Scanners run in the order they were added; the catalog does not depend on
/// that order since entries and locations are sorted.
pub struct Extraction {
    source_root: PathBuf,
    base_dir: Option<PathBuf>,
    stages: Vec<Stage>,
}

impl Extraction {
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            base_dir: None,
            stages: Vec::new(),
        }
    }

    /// Directory location paths are made relative to (defaults to the source root).
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Add a scanner with its default file filter.
    pub fn with_scanner<S>(self, scanner: S) -> Self
    where
        S: SourceScanner + 'static,
    {
        let filter = scanner.default_filter();
        self.with_filtered_scanner(scanner, filter)
    }

    /// Add a scanner restricted to `filter`.
    pub fn with_filtered_scanner<S>(mut self, scanner: S, filter: FileFilter) -> Self
    where
        S: SourceScanner + 'static,
    {
        self.stages.push(Stage {
            scanner: Box::new(scanner),
            filter,
        });
        self
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn kinds(&self) -> Vec<SourceKind> {
        self.stages.iter().map(|s| s.scanner.kind()).collect()
    }

    /// Scan everything and build the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::RootNotFound` if the source root is missing.
    /// Unreadable or unparseable files end up in `warnings` instead.
    pub fn run(&self) -> Result<ExtractionOutcome> {
        if !self.source_root.is_dir() {
            return Err(ExtractError::RootNotFound(self.source_root.clone()));
        }

        let mut builder = CatalogBuilder::new();
        let mut warnings = Vec::new();
        let mut files_scanned = 0;

        for stage in &self.stages {
            let mut scan = stage.scanner.scan(&self.source_root, &stage.filter)?;
            if let Some(base_dir) = &self.base_dir {
                scan = scan.with_base_dir(base_dir);
            }
            for item in scan.by_ref() {
                match item {
                    Ok(record) => builder.add(record),
                    Err(warning) => warnings.push(warning),
                }
            }
            files_scanned += scan.files_scanned();
        }

        Ok(ExtractionOutcome {
            catalog: builder.build(),
            warnings,
            files_scanned,
        })
    }
}
