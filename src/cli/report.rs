//! Report formatting and printing utilities.
//!
//! Diagnostics go to stderr in cargo style (`warning:` / `error:` / `note:`),
//! results to stdout. Every printer has a `_to` variant taking a writer so
//! output can be tested.

use std::io::{self, Write};
use std::path::Path;

use colored::Colorize;

use crate::core::scanner::ScanWarning;
use crate::locales::LocaleCatalog;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

fn plural(count: usize, singular: &'static str, plural: &'static str) -> &'static str {
    if count == 1 { singular } else { plural }
}

/// Print files that could not be scanned.
pub fn print_scan_warnings(warnings: &[ScanWarning], verbose: bool) {
    print_scan_warnings_to(warnings, verbose, &mut io::stderr().lock());
}

/// Each warning with `-v`, otherwise a single summary line.
pub fn print_scan_warnings_to<W: Write>(warnings: &[ScanWarning], verbose: bool, writer: &mut W) {
    if warnings.is_empty() {
        return;
    }
    if verbose {
        for warning in warnings {
            let _ = writeln!(
                writer,
                "{} {}: {}",
                "warning:".bold().yellow(),
                warning.file_path.bold(),
                warning.error
            );
        }
    } else {
        let _ = writeln!(
            writer,
            "{} {} file(s) could not be parsed (use {} for details)",
            "warning:".bold().yellow(),
            warnings.len(),
            "-v".cyan()
        );
    }
}

pub fn print_note<W: Write>(message: &str, writer: &mut W) {
    let _ = writeln!(writer, "{} {}", "note:".bold(), message);
}

/// Counts shown after a successful extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractCounts {
    pub messages: usize,
    pub locations: usize,
    pub files: usize,
}

pub fn print_extracted_to<W: Write>(counts: ExtractCounts, output: &Path, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Extracted {} {} ({} {}) from {} {} into {}",
            counts.messages,
            plural(counts.messages, "message", "messages"),
            counts.locations,
            plural(counts.locations, "location", "locations"),
            counts.files,
            plural(counts.files, "file", "files"),
            output.display()
        )
        .green()
    );
}

/// List catalogs, one per line, with their compiled state.
/// One line per catalog; `verbose` adds the compiled `.mo` path below it.
pub fn print_locales_to<W: Write>(
    catalogs: &[LocaleCatalog],
    compile_mo: bool,
    verbose: bool,
    writer: &mut W,
) {
    let width = catalogs.iter().map(|c| c.language.len()).max().unwrap_or(0);
    for catalog in catalogs {
        let status = if compile_mo && catalog.mo_status.needs_compile() {
            format!("needs compile ({})", catalog.mo_status).yellow()
        } else {
            catalog.mo_status.to_string().dimmed()
        };
        let _ = writeln!(
            writer,
            "  {}  {}  {}",
            format!("{:<width$}", catalog.language, width = width).bold(),
            catalog.po_path.display(),
            status
        );
        if verbose {
            let _ = writeln!(
                writer,
                "  {:<width$}  {} {}",
                "",
                "-->".blue().bold(),
                catalog.mo_path.display(),
                width = width
            );
        }
    }
}

pub fn print_locales_summary_to<W: Write>(total: usize, pending: usize, writer: &mut W) {
    if pending > 0 {
        let _ = writeln!(
            writer,
            "{} {} {} compiling",
            "warning:".bold().yellow(),
            pending,
            plural(pending, "catalog needs", "catalogs need")
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("{} {} found", total, plural(total, "catalog", "catalogs")).green()
        );
    }
}
