//! Raw extraction records produced by source scanners.
//!
//! A record is the handoff point between scanning and catalog building. Scanners
//! emit message text in whatever form the source naturally has: text literals
//! arrive as `RawText::Text`, byte literals as `RawText::Bytes`. Decoding into
//! text happens once, in the catalog builder, via [`RawText::into_text`].

/// Message text as found in source, either native text or undecoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawText {
    Text(String),
    Bytes(Vec<u8>),
}

impl RawText {
    /// Decode into text.
    ///
    /// Bytes are decoded as UTF-8 when valid. Anything else is decoded as
    /// Latin-1 so that every byte maps to exactly one character and nothing
    /// is lost or replaced.
    pub fn into_text(self) -> String {
        match self {
            RawText::Text(text) => text,
            RawText::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RawText::Text(text) => text.is_empty(),
            RawText::Bytes(bytes) => bytes.is_empty(),
        }
    }

    /// Append another piece, as implicit literal concatenation does.
    ///
    /// Mixing text and bytes degrades to bytes, with the text side encoded as UTF-8.
    pub fn push(&mut self, other: RawText) {
        match self {
            RawText::Text(text) => match other {
                RawText::Text(more) => text.push_str(&more),
                RawText::Bytes(more) => {
                    let mut bytes = std::mem::take(text).into_bytes();
                    bytes.extend(more);
                    *self = RawText::Bytes(bytes);
                }
            },
            RawText::Bytes(bytes) => match other {
                RawText::Text(more) => bytes.extend(more.into_bytes()),
                RawText::Bytes(more) => bytes.extend(more),
            },
        }
    }
}

impl From<&str> for RawText {
    fn from(text: &str) -> Self {
        RawText::Text(text.to_string())
    }
}

impl From<String> for RawText {
    fn from(text: String) -> Self {
        RawText::Text(text)
    }
}

impl From<Vec<u8>> for RawText {
    fn from(bytes: Vec<u8>) -> Self {
        RawText::Bytes(bytes)
    }
}

/// A single message occurrence found by a scanner.
///
/// # Lifecycle
///
/// 1. Created by a `SourceScanner` while walking a source tree
/// 2. Consumed exactly once by `CatalogBuilder::add`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRecord {
    /// The translation lookup key.
    pub message_id: RawText,

    /// Default text supplied explicitly at the call site, if any.
    pub default_text: Option<RawText>,

    /// Whether a mapping / placeholder argument was supplied.
    ///
    /// A mapping without an explicit default never yields a default annotation.
    pub has_mapping: bool,

    /// Path of the source file, already labelled relative to the base directory.
    pub source_path: String,

    /// Line number (1-indexed).
    pub line: usize,
}

impl ExtractionRecord {
    pub fn new(message_id: impl Into<RawText>, source_path: impl Into<String>, line: usize) -> Self {
        Self {
            message_id: message_id.into(),
            default_text: None,
            has_mapping: false,
            source_path: source_path.into(),
            line,
        }
    }

    pub fn with_default(mut self, default_text: impl Into<RawText>) -> Self {
        self.default_text = Some(default_text.into());
        self
    }

    pub fn with_mapping(mut self) -> Self {
        self.has_mapping = true;
        self
    }
}
