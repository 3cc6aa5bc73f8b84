//! Page template scanner.
//!
//! Understands the TAL i18n attributes well enough to collect messages:
//!
//! - `i18n:domain="d"` sets the domain for the element and its descendants
//! - `i18n:translate=""` translates the element content, the content is the id
//! - `i18n:translate="id"` uses an explicit id, the content becomes the default
//! - `i18n:name="x"` marks a child as a placeholder, rendered `${x}` in the parent
//! - `i18n:attributes="title; alt alt-id"` translates attribute values
//!
//! Only text content is kept for messages; markup of untagged children is dropped.
//!
//! A file starting with `<?xml` is read as XML: names are case-sensitive and
//! every element needs an end tag. Anything else is read as HTML, where names
//! are case-insensitive and void elements such as `<br>` close themselves.

use std::borrow::Cow;

use anyhow::{Result, bail};
use quick_xml::{Reader, events::BytesStart, events::Event};

use super::{FileFilter, Scan, SourceFile, SourceKind, SourceScanner};
use crate::core::error;
use crate::core::record::ExtractionRecord;
use crate::utils::{build_line_index, normalize_whitespace, offset_to_line};

/// Domain of messages outside any `i18n:domain`.
pub const DEFAULT_DOMAIN: &str = "default";

/// HTML elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone)]
pub struct TemplateScanner {
    domain: String,
    include_default_domain: bool,
}

impl TemplateScanner {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            include_default_domain: true,
        }
    }

    /// Whether messages with no explicit domain are collected too.
    pub fn include_default_domain(mut self, include: bool) -> Self {
        self.include_default_domain = include;
        self
    }

    fn accepts(&self, domain: Option<&str>) -> bool {
        match domain {
            Some(d) if d == self.domain => true,
            None | Some(DEFAULT_DOMAIN) => self.include_default_domain,
            Some(_) => false,
        }
    }
}

impl SourceScanner for TemplateScanner {
    fn kind(&self) -> SourceKind {
        SourceKind::Template
    }

    fn default_filter(&self) -> FileFilter {
        FileFilter::builtin(&["*.pt"], &[])
    }

    fn extract(&self, file: &SourceFile) -> Result<Vec<ExtractionRecord>> {
        TemplateWalker::new(self, file).run()
    }

    fn scan<'a>(&'a self, root: &std::path::Path, filter: &FileFilter) -> error::Result<Scan<'a>> {
        Scan::new(self, root, filter)
    }
}

/// How element and attribute names are matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Markup {
    Html,
    Xml,
}

impl Markup {
    fn detect(content: &str) -> Self {
        if content.starts_with("<?xml") {
            Markup::Xml
        } else {
            Markup::Html
        }
    }

    fn same_name(self, a: &str, b: &str) -> bool {
        match self {
            Markup::Html => a.eq_ignore_ascii_case(b),
            Markup::Xml => a == b,
        }
    }

    fn is_void(self, name: &str) -> bool {
        self == Markup::Html && VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str())
    }
}

/// A message being collected from element content.
#[derive(Debug)]
struct PendingMessage {
    explicit_id: Option<String>,
    content: String,
    has_names: bool,
    domain: Option<String>,
    line: usize,
}

#[derive(Debug)]
struct Frame {
    name: String,
    domain: Option<String>,
    /// Content of an `i18n:name` element is substituted, not collected by ancestors.
    is_name: bool,
    message: Option<PendingMessage>,
}

struct TemplateWalker<'s> {
    scanner: &'s TemplateScanner,
    file: &'s SourceFile,
    markup: Markup,
    line_index: Vec<usize>,
    frames: Vec<Frame>,
    records: Vec<ExtractionRecord>,
}

impl<'s> TemplateWalker<'s> {
    fn new(scanner: &'s TemplateScanner, file: &'s SourceFile) -> Self {
        Self {
            scanner,
            file,
            markup: Markup::detect(&file.content),
            line_index: build_line_index(&file.content),
            frames: Vec::new(),
            records: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<ExtractionRecord>> {
        let file = self.file;
        let mut reader = Reader::from_str(&file.content);
        reader.config_mut().check_end_names = false;

        loop {
            let offset = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
            let line = offset_to_line(&self.line_index, offset);
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let name = element_name(&e);
                    let is_void = self.markup.is_void(&name);
                    self.open(&e, line);
                    if is_void {
                        self.close(&name);
                    }
                }
                Ok(Event::Empty(e)) => {
                    let name = element_name(&e);
                    self.open(&e, line);
                    self.close(&name);
                }
                Ok(Event::End(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    self.close(&name);
                }
                Ok(Event::Text(t)) => {
                    let text = t
                        .unescape()
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned().into());
                    self.text(&text);
                }
                Ok(Event::CData(c)) => {
                    let text = String::from_utf8_lossy(&c).into_owned();
                    self.text(&text);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => bail!("{} (line {})", e, line),
            }
        }

        // Unclosed elements are finished at end of input.
        while let Some(frame) = self.frames.pop() {
            self.finish(frame);
        }
        Ok(self.records)
    }

    fn current_domain(&self) -> Option<String> {
        self.frames.last().and_then(|f| f.domain.clone())
    }

    /// The message collecting text at the current position, if any.
    fn collecting(&mut self) -> Option<&mut PendingMessage> {
        for frame in self.frames.iter_mut().rev() {
            if frame.message.is_some() {
                return frame.message.as_mut();
            }
            if frame.is_name {
                return None;
            }
        }
        None
    }

    fn open(&mut self, e: &BytesStart<'_>, line: usize) {
        let attributes = attributes(e);
        let markup = self.markup;
        let get = |key: &str| attribute(&attributes, key, markup);

        let domain = get("i18n:domain")
            .map(|d| d.trim().to_string())
            .or_else(|| self.current_domain());

        let i18n_name = get("i18n:name").map(|n| n.trim().to_string());
        if let Some(name) = &i18n_name
            && let Some(message) = self.collecting()
        {
            message.content.push_str(&format!("${{{}}}", name));
            message.has_names = true;
        }

        if let Some(attrs) = get("i18n:attributes") {
            for (attr, explicit_id) in parse_translated_attributes(attrs) {
                let Some(value) = get(attr.as_str()) else {
                    continue;
                };
                let record = match explicit_id {
                    Some(id) => {
                        let default = normalize_whitespace(value);
                        let record = ExtractionRecord::new(id, self.file.label.clone(), line);
                        if default.is_empty() {
                            record
                        } else {
                            record.with_default(default)
                        }
                    }
                    None => ExtractionRecord::new(
                        normalize_whitespace(value),
                        self.file.label.clone(),
                        line,
                    ),
                };
                if self.scanner.accepts(domain.as_deref()) {
                    self.records.push(record);
                }
            }
        }

        let message = get("i18n:translate").map(|id| {
            let id = id.trim();
            PendingMessage {
                explicit_id: (!id.is_empty()).then(|| id.to_string()),
                content: String::new(),
                has_names: false,
                domain: domain.clone(),
                line,
            }
        });

        self.frames.push(Frame {
            name: element_name(e),
            domain,
            is_name: i18n_name.is_some(),
            message,
        });
    }

    fn close(&mut self, name: &str) {
        let markup = self.markup;
        let Some(index) = self.frames.iter().rposition(|f| markup.same_name(&f.name, name)) else {
            return;
        };
        while self.frames.len() > index {
            if let Some(frame) = self.frames.pop() {
                self.finish(frame);
            }
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(message) = self.collecting() {
            message.content.push_str(text);
        }
    }

    fn finish(&mut self, frame: Frame) {
        let Some(message) = frame.message else {
            return;
        };
        if !self.scanner.accepts(message.domain.as_deref()) {
            return;
        }

        let content = normalize_whitespace(&message.content);
        let record = match message.explicit_id {
            Some(id) if content.is_empty() => {
                ExtractionRecord::new(id, self.file.label.clone(), message.line)
            }
            Some(id) => ExtractionRecord::new(id, self.file.label.clone(), message.line)
                .with_default(content),
            None if content.is_empty() => return,
            None => ExtractionRecord::new(content, self.file.label.clone(), message.line),
        };

        self.records.push(if message.has_names {
            record.with_mapping()
        } else {
            record
        });
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn attributes(e: &BytesStart<'_>) -> Vec<(String, String)> {
    e.html_attributes()
        .with_checks(false)
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(&attr.value).into_owned()))
                .into_owned();
            (key, value)
        })
        .collect()
}

fn attribute<'v>(attributes: &'v [(String, String)], key: &str, markup: Markup) -> Option<&'v str> {
    attributes
        .iter()
        .find(|(k, _)| markup.same_name(k, key))
        .map(|(_, v)| v.as_str())
}

/// Parse `i18n:attributes`: `"title; alt alt-id"` → `[("title", None), ("alt", Some("alt-id"))]`.
fn parse_translated_attributes(attrs: &str) -> Vec<(String, Option<String>)> {
    attrs.split(';')
        .filter_map(|part| {
            let mut words = part.split_whitespace();
            let attr = words.next()?.to_string();
            let id = words.next().map(str::to_string);
            Some((attr, id))
        })
        .collect()
}
