//! Gettext template (POT) output.
//!
//! The document is a rendered header followed by one block per catalog entry:
//!
//! ```text
//! #: pkg/a.py:3
//! #: pkg/b.pt:10
//! #. Default: "Hello there"
//! msgid "hello-there"
//! msgstr ""
//!
//! ```

use std::{
    env, fs,
    io::{self, Write},
    path::Path,
};

use tempfile::NamedTempFile;
use time::{OffsetDateTime, macros::format_description};

use crate::core::catalog::{Catalog, MessageEntry};
use crate::core::error::{ExtractError, Result};

pub const CHARSET: &str = "UTF-8";
pub const ENCODING: &str = "8bit";

/// Version reported when the source tree has no `version.txt`.
pub const UNKNOWN_VERSION: &str = "Unknown";

/// Header written when no custom template is configured.
///
/// Field order is what gettext tools expect; keep it stable.
pub const DEFAULT_HEADER: &str = r#"# SOME DESCRIPTIVE TITLE.
# Copyright (C) %(year)s THE PACKAGE'S COPYRIGHT HOLDER
# This file is distributed under the same license as the %(project)s package.
#
msgid ""
msgstr ""
"Project-Id-Version: %(project)s %(version)s\n"
"POT-Creation-Date: %(time)s\n"
"PO-Revision-Date: YEAR-MO-DA HO:MI+ZONE\n"
"Last-Translator: FULL NAME <EMAIL@ADDRESS>\n"
"Language-Team: LANGUAGE <LL@li.org>\n"
"MIME-Version: 1.0\n"
"Content-Type: text/plain; charset=%(charset)s\n"
"Content-Transfer-Encoding: %(encoding)s\n"
"Generated-By: i18nextract\n"

"#;

/// Values substituted into the header template.
#[derive(Debug, Clone)]
pub struct HeaderFields {
    pub project: String,
    pub version: String,
    pub created: OffsetDateTime,
}

impl HeaderFields {
    pub fn new(project: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            version: version.into(),
            created: creation_time(),
        }
    }

    pub fn created_at(mut self, created: OffsetDateTime) -> Self {
        self.created = created;
        self
    }

    fn lookup(&self, name: &str) -> Result<String> {
        Ok(match name {
            "project" => self.project.clone(),
            "version" => self.version.clone(),
            "time" => self
                .created
                .format(format_description!("[year]-[month]-[day] [hour]:[minute]+0000"))
                .map_err(|e| ExtractError::HeaderTemplate(e.to_string()))?,
            "year" => self.created.year().to_string(),
            "charset" => CHARSET.to_string(),
            "encoding" => ENCODING.to_string(),
            other => {
                return Err(ExtractError::HeaderTemplate(format!(
                    "unknown placeholder `%({})s`",
                    other
                )));
            }
        })
    }
}

/// POT creation time: `SOURCE_DATE_EPOCH` when set, otherwise now.
pub fn creation_time() -> OffsetDateTime {
    env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc)
}

/// Read the project version from `version.txt` under `root`.
pub fn read_version(root: &Path) -> String {
    fs::read_to_string(root.join("version.txt"))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
}

/// Substitute `%(name)s` placeholders and `%%` in a header template.
pub fn render_header(template: &str, fields: &HeaderFields) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if let Some(tail) = after.strip_prefix('%') {
            out.push('%');
            rest = tail;
            continue;
        }
        let name_and_tail = after
            .strip_prefix('(')
            .and_then(|s| s.split_once(")s"))
            .filter(|(name, _)| !name.contains(['(', ')', '%', '\n']));
        let Some((name, tail)) = name_and_tail else {
            let offset = template.len() - rest.len() + pos;
            return Err(ExtractError::HeaderTemplate(format!(
                "malformed placeholder at byte {}",
                offset
            )));
        };
        out.push_str(&fields.lookup(name)?);
        rest = tail;
    }
    out.push_str(rest);
    Ok(out)
}

/// Quote a single line the gettext way.
fn escape(text: &str, escape_non_ascii: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            c if c.is_ascii_control() => out.push_str(&format!("\\{:03o}", c as u32)),
            c if !c.is_ascii() && escape_non_ascii => {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("\\{:03o}", b));
                }
            }
            c => out.push(c),
        }
    }
}

/// Render a message as one or more quoted lines.
///
/// Single-line text becomes `"text"`. Multi-line text starts with `""` and
/// puts each source line on its own quoted line, keeping the `\n`.
pub fn normalize(text: &str, escape_non_ascii: bool) -> String {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    if lines.len() == 1 {
        let mut out = String::from("\"");
        escape(text, escape_non_ascii, &mut out);
        out.push('"');
        return out;
    }

    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let last = lines.len() - 1;
    let mut out = String::from("\"\"");
    for (i, line) in lines.iter().enumerate() {
        out.push_str("\n\"");
        escape(line, escape_non_ascii, &mut out);
        if i < last || text.ends_with('\n') {
            out.push_str("\\n");
        }
        out.push('"');
    }
    out
}

#[derive(Debug, Clone)]
pub struct PotWriter {
    header_template: String,
    fields: HeaderFields,
    escape_non_ascii: bool,
}

impl PotWriter {
    pub fn new(fields: HeaderFields) -> Self {
        Self {
            header_template: DEFAULT_HEADER.to_string(),
            fields,
            escape_non_ascii: false,
        }
    }

    pub fn with_header_template(mut self, template: impl Into<String>) -> Self {
        self.header_template = template.into();
        self
    }

    /// Write non-ASCII characters as octal escapes of their UTF-8 bytes.
    pub fn escape_non_ascii(mut self, escape: bool) -> Self {
        self.escape_non_ascii = escape;
        self
    }

    /// Render a single entry block, including its trailing blank line.
    pub fn render_entry(&self, entry: &MessageEntry) -> String {
        let mut out = String::new();
        for location in &entry.locations {
            out.push_str(&format!("#: {}:{}\n", location.source_path, location.line));
        }
        if let Some(default) = &entry.default_text {
            let quoted = normalize(default.trim(), self.escape_non_ascii);
            for (i, line) in quoted.split('\n').enumerate() {
                if i == 0 {
                    out.push_str(&format!("#. Default: {}\n", line));
                } else {
                    out.push_str(&format!("#.  {}\n", line));
                }
            }
        }
        out.push_str(&format!(
            "msgid {}\n",
            normalize(&entry.message_id, self.escape_non_ascii)
        ));
        out.push_str("msgstr \"\"\n\n");
        out
    }

    /// Render the whole document.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::HeaderTemplate` if the header template is invalid.
    pub fn render(&self, catalog: &Catalog) -> Result<String> {
        let mut out = render_header(&self.header_template, &self.fields)?;
        for entry in catalog.entries() {
            out.push_str(&self.render_entry(entry));
        }
        Ok(out)
    }

    /// Write the document to an arbitrary sink.
    pub fn write_to<W: Write>(&self, catalog: &Catalog, mut sink: W) -> Result<()> {
        let document = self.render(catalog)?;
        sink.write_all(document.as_bytes())
            .and_then(|()| sink.flush())
            .map_err(|e| ExtractError::io("<output>", e))
    }

    /// Write the document to `path`, or to stdout when `path` is `-`.
    ///
    /// Files are written to a temporary file next to the target and renamed
    /// into place, so a failed write never leaves a truncated POT file behind.
    pub fn write_file(&self, catalog: &Catalog, path: &Path) -> Result<()> {
        if path.as_os_str() == "-" {
            return self.write_to(catalog, io::stdout().lock());
        }

        let document = self.render(catalog)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ExtractError::io(dir, e))?;
        tmp.write_all(document.as_bytes())
            .and_then(|()| tmp.flush())
            .map_err(|e| ExtractError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| ExtractError::io(path, e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::core::catalog::build;
    use crate::core::record::ExtractionRecord;

    fn fields() -> HeaderFields {
        // 2024-03-05 14:07 UTC
        let created = OffsetDateTime::from_unix_timestamp(1_709_647_620).unwrap();
        HeaderFields::new("demo", "1.2").created_at(created)
    }

    fn sample_catalog() -> Catalog {
        build([
            ExtractionRecord::new("hello", "b.py", 3),
            ExtractionRecord::new("hello", "a.pt", 10).with_default("Hello!"),
            ExtractionRecord::new("bye", "a.py", 1),
        ])
    }

    #[test]
    fn test_render_header_placeholders() {
        let rendered = render_header(
            "%(project)s %(version)s %(time)s %(year)s %(charset)s %(encoding)s 100%%",
            &fields(),
        )
        .unwrap();
        assert_eq!(rendered, "demo 1.2 2024-03-05 14:07+0000 2024 UTF-8 8bit 100%");
    }

    #[test]
    fn test_render_header_unknown_placeholder() {
        let err = render_header("%(author)s", &fields()).unwrap_err();
        assert!(matches!(err, ExtractError::HeaderTemplate(_)));
        assert!(err.to_string().contains("author"));
    }

    #[test]
    fn test_render_header_malformed() {
        assert!(render_header("50% done", &fields()).is_err());
        assert!(render_header("%(project", &fields()).is_err());
    }

    #[test]
    fn test_default_header_fields() {
        let header = render_header(DEFAULT_HEADER, &fields()).unwrap();
        assert!(header.contains("\"Project-Id-Version: demo 1.2\\n\""));
        assert!(header.contains("\"POT-Creation-Date: 2024-03-05 14:07+0000\\n\""));
        assert!(header.contains("charset=UTF-8"));
        assert!(header.contains("\"Content-Transfer-Encoding: 8bit\\n\""));
        assert!(header.ends_with("\\n\"\n\n"));
    }

    #[test]
    fn test_escape_quotes_and_controls() {
        assert_eq!(normalize(r#"say "hi" \ now"#, false), r#""say \"hi\" \\ now""#);
        assert_eq!(normalize("a\tb", false), r#""a\tb""#);
        assert_eq!(normalize("bell\u{7}", false), r#""bell\007""#);
    }

    #[test]
    fn test_normalize_multiline() {
        assert_eq!(normalize("one\ntwo", false), "\"\"\n\"one\\n\"\n\"two\"");
        assert_eq!(normalize("one\ntwo\n", false), "\"\"\n\"one\\n\"\n\"two\\n\"");
    }

    #[test]
    fn test_non_ascii_escaping() {
        assert_eq!(normalize("café", false), "\"café\"");
        assert_eq!(normalize("café", true), r#""caf\303\251""#);
    }

    #[test]
    fn test_render_entry_with_default() {
        let catalog = sample_catalog();
        let writer = PotWriter::new(fields());
        let entry = catalog.get("hello").unwrap();
        insta::assert_snapshot!(writer.render_entry(entry).trim_end(), @r#"
        #: a.pt:10
        #: b.py:3
        #. Default: "Hello!"
        msgid "hello"
        msgstr ""
        "#);
    }

    #[test]
    fn test_render_entry_without_default() {
        let catalog = sample_catalog();
        let writer = PotWriter::new(fields());
        let entry = catalog.get("bye").unwrap();
        assert_eq!(
            writer.render_entry(entry),
            "#: a.py:1\nmsgid \"bye\"\nmsgstr \"\"\n\n"
        );
    }

    #[test]
    fn test_render_entry_multiline_default_is_trimmed() {
        let catalog = build([
            ExtractionRecord::new("intro", "a.pt", 4).with_default("\n  First line\nSecond line\n  ")
        ]);
        let writer = PotWriter::new(fields());
        let rendered = writer.render_entry(catalog.get("intro").unwrap());
        assert_eq!(
            rendered,
            "#: a.pt:4\n#. Default: \"\"\n#.  \"First line\\n\"\n#.  \"Second line\"\nmsgid \"intro\"\nmsgstr \"\"\n\n"
        );
    }

    #[test]
    fn test_render_document_order() {
        let document = PotWriter::new(fields()).render(&sample_catalog()).unwrap();
        let bye = document.find("msgid \"bye\"").unwrap();
        let hello = document.find("msgid \"hello\"").unwrap();
        assert!(document.starts_with("# SOME DESCRIPTIVE TITLE."));
        assert!(bye < hello);
        assert!(document.ends_with("msgstr \"\"\n\n"));
    }

    #[test]
    fn test_custom_header_template() {
        let writer = PotWriter::new(fields()).with_header_template("# %(project)s\n\n");
        let document = writer.render(&Catalog::default()).unwrap();
        assert_eq!(document, "# demo\n\n");
    }

    #[test]
    fn test_write_file_replaces_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages.pot");
        fs::write(&path, "stale").unwrap();

        PotWriter::new(fields())
            .write_file(&sample_catalog(), &path)
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("msgid \"hello\""));
        assert!(!written.contains("stale"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_file_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("messages.pot");
        let err = PotWriter::new(fields())
            .write_file(&sample_catalog(), &path)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_header_leaves_target_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("messages.pot");
        fs::write(&path, "previous").unwrap();

        let err = PotWriter::new(fields())
            .with_header_template("%(nope)s")
            .write_file(&sample_catalog(), &path)
            .unwrap_err();
        assert!(matches!(err, ExtractError::HeaderTemplate(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
    }

    #[test]
    fn test_read_version() {
        let dir = tempdir().unwrap();
        assert_eq!(read_version(dir.path()), UNKNOWN_VERSION);
        fs::write(dir.path().join("version.txt"), "3.4.1\n").unwrap();
        assert_eq!(read_version(dir.path()), "3.4.1");
    }
}
