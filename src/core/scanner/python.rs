//! Plain code scanner for Python sources.
//!
//! Finds calls to the message factory (`_` by default) with a small
//! tokenizer that understands just enough of Python to skip comments and
//! decode string literals. Only literals at the top nesting level of the
//! call are collected:
//!
//! ```text
//! _('id')                          -> id
//! _('id', 'Default')               -> id, default "Default"
//! _('id', default='Default')       -> id, default "Default"
//! _('hi ${name}', mapping={...})   -> id, has_mapping
//! _('id', 'Default', {'name': n})  -> id, default "Default", has_mapping
//! _('a' 'b')                       -> id "ab" (implicit concatenation)
//! ```

use anyhow::{Result, bail};

use super::{FileFilter, Scan, SourceFile, SourceKind, SourceScanner};
use crate::core::error;
use crate::core::record::{ExtractionRecord, RawText};

/// Files that belong to extraction tooling itself and are never scanned.
pub const TOOL_FILES: &[&str] = &["extract.py", "pygettext.py"];

#[derive(Debug, Clone)]
pub struct PythonScanner {
    keywords: Vec<String>,
}

impl Default for PythonScanner {
    fn default() -> Self {
        Self {
            keywords: vec!["_".to_string()],
        }
    }
}

impl PythonScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Function names treated as message factories.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }
}

impl SourceScanner for PythonScanner {
    fn kind(&self) -> SourceKind {
        SourceKind::Python
    }

    fn default_filter(&self) -> FileFilter {
        FileFilter::builtin(&["*.py"], TOOL_FILES)
    }

    fn extract(&self, file: &SourceFile) -> Result<Vec<ExtractionRecord>> {
        let mut lexer = Lexer::new(&file.content);
        let mut eater = CallEater::new(&self.keywords);
        while let Some(token) = lexer.next_token()? {
            eater.feed(token);
        }
        eater.finish(&file.label)
    }

    fn scan<'a>(&'a self, root: &std::path::Path, filter: &FileFilter) -> error::Result<Scan<'a>> {
        Scan::new(self, root, filter)
    }
}

// ============================================================
// Tokenizer
// ============================================================

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Name(String),
    Str(RawText),
    Op(char),
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    line: usize,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        while let Some(c) = self.peek(0) {
            let line = self.line;
            match c {
                '#' => {
                    while let Some(c) = self.peek(0) {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                c if c.is_whitespace() || c == '\\' => {
                    self.bump();
                }
                '\'' | '"' => {
                    let text = self.string_literal("")?;
                    return Ok(Some(Token {
                        kind: TokenKind::Str(text),
                        line,
                    }));
                }
                c if c.is_alphabetic() || c == '_' => {
                    let mut name = String::new();
                    while let Some(c) = self.peek(0) {
                        if c.is_alphanumeric() || c == '_' {
                            name.push(c);
                            self.bump();
                        } else {
                            break;
                        }
                    }
                    if is_string_prefix(&name) && matches!(self.peek(0), Some('\'' | '"')) {
                        let text = self.string_literal(&name)?;
                        return Ok(Some(Token {
                            kind: TokenKind::Str(text),
                            line,
                        }));
                    }
                    return Ok(Some(Token {
                        kind: TokenKind::Name(name),
                        line,
                    }));
                }
                c if c.is_ascii_digit() => {
                    while let Some(c) = self.peek(0) {
                        if c.is_alphanumeric() || c == '_' || c == '.' {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                }
                _ => {
                    self.bump();
                    return Ok(Some(Token {
                        kind: TokenKind::Op(c),
                        line,
                    }));
                }
            }
        }
        Ok(None)
    }

    /// Read a string literal starting at the opening quote.
    fn string_literal(&mut self, prefix: &str) -> Result<RawText> {
        let start_line = self.line;
        let prefix = prefix.to_ascii_lowercase();
        let raw = prefix.contains('r');
        let mut buf = if prefix.contains('b') {
            RawText::Bytes(Vec::new())
        } else {
            RawText::Text(String::new())
        };

        let quote = match self.bump() {
            Some(q) => q,
            None => bail!("unterminated string literal at line {}", start_line),
        };
        let triple = self.peek(0) == Some(quote) && self.peek(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        loop {
            let Some(c) = self.bump() else {
                bail!("unterminated string literal at line {}", start_line);
            };
            match c {
                c if c == quote => {
                    if !triple {
                        return Ok(buf);
                    }
                    if self.peek(0) == Some(quote) && self.peek(1) == Some(quote) {
                        self.bump();
                        self.bump();
                        return Ok(buf);
                    }
                    push_char(&mut buf, c);
                }
                '\n' if !triple => {
                    bail!("unterminated string literal at line {}", start_line);
                }
                '\\' => {
                    let Some(next) = self.bump() else {
                        bail!("unterminated string literal at line {}", start_line);
                    };
                    if raw {
                        push_char(&mut buf, '\\');
                        push_char(&mut buf, next);
                    } else {
                        self.escape(next, &mut buf);
                    }
                }
                c => push_char(&mut buf, c),
            }
        }
    }

    /// Decode the escape sequence whose first character (after `\`) is `c`.
    fn escape(&mut self, c: char, buf: &mut RawText) {
        let is_bytes = matches!(buf, RawText::Bytes(_));
        match c {
            '\n' => {}
            '\\' | '\'' | '"' => push_char(buf, c),
            'a' => push_char(buf, '\x07'),
            'b' => push_char(buf, '\x08'),
            'f' => push_char(buf, '\x0c'),
            'n' => push_char(buf, '\n'),
            'r' => push_char(buf, '\r'),
            't' => push_char(buf, '\t'),
            'v' => push_char(buf, '\x0b'),
            '0'..='7' => {
                let mut code = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.peek(0).and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            self.bump();
                        }
                        None => break,
                    }
                }
                push_code(buf, code);
            }
            'x' => self.hex_escape(c, 2, buf),
            'u' if !is_bytes => self.hex_escape(c, 4, buf),
            'U' if !is_bytes => self.hex_escape(c, 8, buf),
            _ => {
                // Unknown escapes (including \N{...}) are kept verbatim.
                push_char(buf, '\\');
                push_char(buf, c);
            }
        }
    }

    fn hex_escape(&mut self, c: char, digits: usize, buf: &mut RawText) {
        let hex: String = (0..digits).filter_map(|i| self.peek(i)).collect();
        match (hex.len() == digits)
            .then(|| u32::from_str_radix(&hex, 16).ok())
            .flatten()
        {
            Some(code) => {
                for _ in 0..digits {
                    self.bump();
                }
                push_code(buf, code);
            }
            None => {
                push_char(buf, '\\');
                push_char(buf, c);
            }
        }
    }
}

fn is_string_prefix(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "f" | "br" | "rb" | "fr" | "rf" | "ur"
    )
}

fn push_char(buf: &mut RawText, c: char) {
    match buf {
        RawText::Text(text) => text.push(c),
        RawText::Bytes(bytes) => {
            let mut tmp = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
        }
    }
}

/// Push a numeric escape: a code point for text, a single byte for bytes.
fn push_code(buf: &mut RawText, code: u32) {
    match buf {
        RawText::Text(text) => text.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)),
        RawText::Bytes(bytes) => bytes.push((code & 0xff) as u8),
    }
}

// ============================================================
// Call recognition
// ============================================================

#[derive(Debug, Default)]
struct Arg {
    text: Option<RawText>,
    keyword: Option<String>,
    pending_name: Option<String>,
    is_mapping: bool,
    has_tokens: bool,
}

impl Arg {
    fn push_text(&mut self, text: RawText) {
        match &mut self.text {
            Some(current) => current.push(text),
            None => self.text = Some(text),
        }
    }
}

struct OpenCall {
    line: usize,
    depth: usize,
    args: Vec<Arg>,
    current: Arg,
}

enum State {
    Waiting,
    KeywordSeen,
    InCall(OpenCall),
}

struct CallEater<'k> {
    keywords: &'k [String],
    state: State,
    previous: Option<TokenKind>,
    calls: Vec<(usize, Vec<Arg>)>,
}

impl<'k> CallEater<'k> {
    fn new(keywords: &'k [String]) -> Self {
        Self {
            keywords,
            state: State::Waiting,
            previous: None,
            calls: Vec::new(),
        }
    }

    fn feed(&mut self, token: Token) {
        let state = std::mem::replace(&mut self.state, State::Waiting);
        self.state = match state {
            State::Waiting => self.waiting(&token),
            State::KeywordSeen => match token.kind {
                TokenKind::Op('(') => State::InCall(OpenCall {
                    line: token.line,
                    depth: 0,
                    args: Vec::new(),
                    current: Arg::default(),
                }),
                _ => self.waiting(&token),
            },
            State::InCall(call) => self.in_call(call, &token),
        };
        self.previous = Some(token.kind);
    }

    fn waiting(&self, token: &Token) -> State {
        let TokenKind::Name(name) = &token.kind else {
            return State::Waiting;
        };
        // `def _(...)` defines the factory, it does not call it.
        let after_def = matches!(&self.previous, Some(TokenKind::Name(prev)) if prev == "def");
        if !after_def && self.keywords.iter().any(|k| k == name) {
            State::KeywordSeen
        } else {
            State::Waiting
        }
    }

    fn in_call(&mut self, mut call: OpenCall, token: &Token) -> State {
        let top = call.depth == 0;
        match &token.kind {
            TokenKind::Op(c @ ('(' | '[' | '{')) => {
                if top && *c == '{' && !call.current.has_tokens {
                    call.current.is_mapping = true;
                }
                call.current.has_tokens = true;
                call.depth += 1;
            }
            TokenKind::Op(')') if top => {
                let current = std::mem::take(&mut call.current);
                if current.has_tokens {
                    call.args.push(current);
                }
                self.calls.push((call.line, call.args));
                return State::Waiting;
            }
            TokenKind::Op(')' | ']' | '}') => {
                call.depth = call.depth.saturating_sub(1);
            }
            TokenKind::Op(',') if top => {
                let current = std::mem::take(&mut call.current);
                call.args.push(current);
            }
            TokenKind::Op('=') if top => {
                if call.current.keyword.is_none() && call.current.text.is_none() {
                    call.current.keyword = call.current.pending_name.take();
                }
            }
            TokenKind::Name(name) if top => {
                if !call.current.has_tokens {
                    call.current.pending_name = Some(name.clone());
                }
                call.current.has_tokens = true;
            }
            TokenKind::Str(text) if top => {
                call.current.push_text(text.clone());
                call.current.has_tokens = true;
            }
            _ => {
                if top {
                    call.current.has_tokens = true;
                }
            }
        }
        State::InCall(call)
    }

    fn finish(self, path: &str) -> Result<Vec<ExtractionRecord>> {
        if let State::InCall(call) = &self.state {
            bail!("unclosed message call opened at line {}", call.line);
        }

        let mut records = Vec::new();
        for (line, args) in self.calls {
            if let Some(record) = record_from_args(args, path, line) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

fn record_from_args(args: Vec<Arg>, path: &str, line: usize) -> Option<ExtractionRecord> {
    let mut message_id = None;
    let mut default_text = None;
    let mut has_mapping = false;
    let mut positional = 0;

    for arg in args {
        match arg.keyword.as_deref() {
            Some("mapping") => has_mapping = true,
            Some("default") => default_text = arg.text.or(default_text),
            Some("msgid") => message_id = arg.text.or(message_id),
            Some(_) => {}
            None => {
                positional += 1;
                if arg.is_mapping {
                    has_mapping = true;
                    continue;
                }
                match positional {
                    1 => message_id = arg.text,
                    2 => default_text = default_text.or(arg.text),
                    _ => {}
                }
            }
        }
    }

    let message_id = message_id?;
    let mut record = ExtractionRecord::new(message_id, path, line);
    record.default_text = default_text;
    record.has_mapping = has_mapping;
    Some(record)
}
