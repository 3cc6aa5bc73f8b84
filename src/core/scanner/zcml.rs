//! ZCML scanner.
//!
//! `i18n_domain="d"` on an element puts it and its descendants in domain
//! `d`. Inside the requested domain, the values of translatable attributes
//! (`title`, `description` and `label` unless configured otherwise) are
//! messages.

use anyhow::{Result, bail};
use quick_xml::{Reader, events::BytesStart, events::Event};

use super::{FileFilter, Scan, SourceFile, SourceKind, SourceScanner};
use crate::core::error;
use crate::core::record::ExtractionRecord;
use crate::utils::{build_line_index, normalize_whitespace, offset_to_line};

pub const DEFAULT_ATTRIBUTES: &[&str] = &["title", "description", "label"];

#[derive(Debug, Clone)]
pub struct ZcmlScanner {
    domain: String,
    attributes: Vec<String>,
}

impl ZcmlScanner {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            attributes: DEFAULT_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn with_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    fn collect(
        &self,
        e: &BytesStart<'_>,
        domain: Option<&str>,
        file: &SourceFile,
        line: usize,
        records: &mut Vec<ExtractionRecord>,
    ) {
        if domain != Some(self.domain.as_str()) {
            return;
        }
        for attr in e.attributes().with_checks(false).flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref());
            if !self.attributes.iter().any(|a| *a == key) {
                continue;
            }
            let value = match attr.unescape_value() {
                Ok(value) => normalize_whitespace(&value),
                Err(_) => normalize_whitespace(&String::from_utf8_lossy(&attr.value)),
            };
            if !value.is_empty() {
                records.push(ExtractionRecord::new(value, file.label.clone(), line));
            }
        }
    }
}

impl SourceScanner for ZcmlScanner {
    fn kind(&self) -> SourceKind {
        SourceKind::Zcml
    }

    fn default_filter(&self) -> FileFilter {
        FileFilter::builtin(&["*.zcml"], &[])
    }

    fn extract(&self, file: &SourceFile) -> Result<Vec<ExtractionRecord>> {
        let line_index = build_line_index(&file.content);
        let mut reader = Reader::from_str(&file.content);
        reader.config_mut().check_end_names = false;

        // Effective domain of each open element.
        let mut domains: Vec<Option<String>> = Vec::new();
        let mut records = Vec::new();

        loop {
            let offset = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
            let line = offset_to_line(&line_index, offset);
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let domain = element_domain(&e).or_else(|| domains.last().cloned().flatten());
                    self.collect(&e, domain.as_deref(), file, line, &mut records);
                    domains.push(domain);
                }
                Ok(Event::Empty(e)) => {
                    let domain = element_domain(&e).or_else(|| domains.last().cloned().flatten());
                    self.collect(&e, domain.as_deref(), file, line, &mut records);
                }
                Ok(Event::End(_)) => {
                    domains.pop();
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => bail!("{} (line {})", e, line),
            }
        }

        Ok(records)
    }

    fn scan<'a>(&'a self, root: &std::path::Path, filter: &FileFilter) -> error::Result<Scan<'a>> {
        Scan::new(self, root, filter)
    }
}

fn element_domain(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .with_checks(false)
        .flatten()
        .find(|attr| attr.key.as_ref() == b"i18n_domain")
        .map(|attr| String::from_utf8_lossy(&attr.value).trim().to_string())
}
