//! Source scanners.
//!
//! Each source kind (plain code, page templates, declarative configuration)
//! has one `SourceScanner` implementation that knows just enough of the
//! syntax to find message calls. Walking the tree is shared: `Scan` lazily
//! visits matching files under a root and yields one
//! `Result<ExtractionRecord, ScanWarning>` at a time.
//!
//! ## Module Structure
//!
//! - `files`: `FileFilter` (file name patterns and excludes)
//! - `python`: `_()` calls in Python code
//! - `template`: `i18n:*` attributes in page templates
//! - `zcml`: `i18n_domain` scoped attributes in ZCML files

pub mod files;
pub mod python;
pub mod template;
pub mod zcml;

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use walkdir::{DirEntry, WalkDir};

pub use files::FileFilter;
pub use python::PythonScanner;
pub use template::TemplateScanner;
pub use zcml::ZcmlScanner;

use crate::core::error::{ExtractError, Result};
use crate::core::record::ExtractionRecord;
use crate::utils::{absolute_path, label_path};

/// The kind of source a scanner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    Python,
    Template,
    Zcml,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Python => write!(f, "python"),
            SourceKind::Template => write!(f, "template"),
            SourceKind::Zcml => write!(f, "zcml"),
        }
    }
}

/// A file that could not be scanned. The rest of the run is unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWarning {
    pub file_path: String,
    pub error: String,
}

impl ScanWarning {
    pub fn new(file_path: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            file_path: file_path.into(),
            error: error.to_string(),
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_path, self.error)
    }
}

/// A source file handed to a scanner.
#[derive(Debug)]
pub struct SourceFile {
    /// Path on disk.
    pub path: PathBuf,
    /// Path as it should appear in location comments.
    pub label: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            path: PathBuf::from(&label),
            label,
            content: content.into(),
        }
    }
}

/// Capability interface implemented once per source kind.
pub trait SourceScanner {
    fn kind(&self) -> SourceKind;

    /// The file filter used when the caller has no more specific one.
    fn default_filter(&self) -> FileFilter;

    /// Extract all records from a single file.
    ///
    /// An error means the file could not be understood; it becomes a
    /// `ScanWarning` and scanning moves on to the next file.
    fn extract(&self, file: &SourceFile) -> anyhow::Result<Vec<ExtractionRecord>>;

    /// Lazily scan every file under `root` accepted by `filter`.
    ///
    /// The returned iterator can be recreated at any time by calling `scan` again.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::RootNotFound` if `root` is not a directory and
    /// `ExtractError::Io` if its entries cannot be listed.
    fn scan<'a>(&'a self, root: &Path, filter: &FileFilter) -> Result<Scan<'a>>;
}

type EntryPredicate = Box<dyn FnMut(&DirEntry) -> bool>;

/// Lazy walk over a source tree for one scanner.
pub struct Scan<'a> {
    scanner: &'a dyn SourceScanner,
    filter: FileFilter,
    base_dir: PathBuf,
    walker: walkdir::FilterEntry<walkdir::IntoIter, EntryPredicate>,
    pending: std::vec::IntoIter<ExtractionRecord>,
    files_scanned: usize,
}

impl<'a> Scan<'a> {
    pub fn new(scanner: &'a dyn SourceScanner, root: &Path, filter: &FileFilter) -> Result<Self> {
        if !root.is_dir() {
            return Err(ExtractError::RootNotFound(root.to_path_buf()));
        }
        fs::read_dir(root).map_err(|e| ExtractError::io(root, e))?;
        let root = &absolute_path(root);

        let prune_filter = filter.clone();
        let prune_root = root.to_path_buf();
        let predicate: EntryPredicate = Box::new(move |entry: &DirEntry| {
            // The root itself is never pruned, even if it is a dot directory.
            if entry.depth() == 0 {
                return true;
            }
            let hidden_dir =
                entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.');
            let relative = entry.path().strip_prefix(&prune_root).unwrap_or(entry.path());
            !hidden_dir && !prune_filter.is_excluded(relative)
        });

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(predicate);

        Ok(Self {
            scanner,
            filter: filter.clone(),
            base_dir: root.to_path_buf(),
            walker,
            pending: Vec::new().into_iter(),
            files_scanned: 0,
        })
    }

    /// Label locations relative to `base_dir` instead of the scan root.
    pub fn with_base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        self.base_dir = absolute_path(base_dir.as_ref());
        self
    }

    /// Number of files handed to the scanner so far.
    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    fn load(&self, path: &Path) -> std::result::Result<SourceFile, ScanWarning> {
        let label = label_path(path, Some(&self.base_dir));
        let bytes = fs::read(path).map_err(|e| ScanWarning::new(label.clone(), e))?;
        let content = String::from_utf8(bytes)
            .map_err(|_| ScanWarning::new(label.clone(), "file is not valid UTF-8"))?;
        Ok(SourceFile {
            path: path.to_path_buf(),
            label,
            content,
        })
    }
}

impl Iterator for Scan<'_> {
    type Item = std::result::Result<ExtractionRecord, ScanWarning>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.next() {
                return Some(Ok(record));
            }

            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| label_path(p, Some(&self.base_dir)))
                        .unwrap_or_default();
                    return Some(Err(ScanWarning::new(path, err)));
                }
            };

            if !entry.file_type().is_file()
                || !self.filter.matches_file(&entry.file_name().to_string_lossy())
            {
                continue;
            }

            let file = match self.load(entry.path()) {
                Ok(file) => file,
                Err(warning) => return Some(Err(warning)),
            };
            self.files_scanned += 1;

            match self.scanner.extract(&file) {
                Ok(records) => self.pending = records.into_iter(),
                Err(err) => return Some(Err(ScanWarning::new(file.label, format!("{:#}", err)))),
            }
        }
    }
}
