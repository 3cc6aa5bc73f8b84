use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

const VIEWS_PY: &str = r#"from myapp.i18n import _

title = _('Welcome')
msg = _('greeting', default='Hello ${name}', mapping={'name': user})
"#;

const INDEX_PT: &str = r#"<html i18n:domain="messages">
<body>
<h1 i18n:translate="">Welcome</h1>
<p i18n:translate="greeting">Hello <span i18n:name="name">you</span></p>
</body>
</html>
"#;

const CONFIGURE_ZCML: &str = r#"<configure i18n_domain="messages">
  <permission id="app.Manage" title="Manage" />
</configure>
"#;

const EXPECTED_HEADER: &str = r#"# SOME DESCRIPTIVE TITLE.
# Copyright (C) 2024 THE PACKAGE'S COPYRIGHT HOLDER
# This file is distributed under the same license as the PACKAGE package.
#
msgid ""
msgstr ""
"Project-Id-Version: PACKAGE Unknown\n"
"POT-Creation-Date: 2024-03-05 14:07+0000\n"
"PO-Revision-Date: YEAR-MO-DA HO:MI+ZONE\n"
"Last-Translator: FULL NAME <EMAIL@ADDRESS>\n"
"Language-Team: LANGUAGE <LL@li.org>\n"
"MIME-Version: 1.0\n"
"Content-Type: text/plain; charset=UTF-8\n"
"Content-Transfer-Encoding: 8bit\n"
"Generated-By: i18nextract\n"

"#;

const EXPECTED_ENTRIES: &str = r#"#: pkg/configure.zcml:2
msgid "Manage"
msgstr ""

#: pkg/index.pt:3
#: pkg/views.py:3
msgid "Welcome"
msgstr ""

#: pkg/index.pt:4
#: pkg/views.py:4
#. Default: "Hello ${name}"
msgid "greeting"
msgstr ""

"#;

fn project() -> Result<CliTest> {
    let test = CliTest::new()?;
    test.write_file("pkg/views.py", VIEWS_PY)?;
    test.write_file("pkg/index.pt", INDEX_PT)?;
    test.write_file("pkg/configure.zcml", CONFIGURE_ZCML)?;
    Ok(test)
}

#[test]
fn test_extract_writes_pot() -> Result<()> {
    let test = project()?;

    let output = test.extract_command().output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "✓ Extracted 3 messages (5 locations) from 3 files into messages.pot\n"
    );

    let pot = test.read_file("messages.pot")?;
    assert_eq!(pot, format!("{}{}", EXPECTED_HEADER, EXPECTED_ENTRIES));

    Ok(())
}

#[test]
fn test_extract_is_deterministic() -> Result<()> {
    let test = project()?;

    test.extract_command().args(["-o", "first.pot"]).output()?;
    test.extract_command().args(["-o", "second.pot"]).output()?;

    assert_eq!(test.read_file("first.pot")?, test.read_file("second.pot")?);
    Ok(())
}

#[test]
fn test_extract_to_stdout() -> Result<()> {
    let test = project()?;

    let output = test.extract_command().args(["-o", "-"]).output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("# SOME DESCRIPTIVE TITLE."));
    assert!(stdout.ends_with(EXPECTED_ENTRIES));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Extracted 3 messages"));
    assert!(!test.root().join("messages.pot").exists());
    Ok(())
}

#[test]
fn test_python_only() -> Result<()> {
    let test = project()?;

    let output = test.extract_command().arg("--python-only").output()?;
    assert!(output.status.success());

    let pot = test.read_file("messages.pot")?;
    assert!(pot.contains("#: pkg/views.py:3\nmsgid \"Welcome\""));
    assert!(!pot.contains("pkg/index.pt"));
    assert!(!pot.contains("\"Manage\""));
    Ok(())
}

#[test]
fn test_domain_and_default_domain() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "pkg/page.pt",
        r#"<div>
<p i18n:translate="">No domain</p>
<p i18n:domain="shop" i18n:translate="">Shop message</p>
<p i18n:domain="other" i18n:translate="">Other message</p>
</div>
"#,
    )?;

    let output = test.extract_command().args(["-d", "shop"]).output()?;
    assert!(output.status.success());
    let pot = test.read_file("shop.pot")?;
    assert!(pot.contains("msgid \"No domain\""));
    assert!(pot.contains("msgid \"Shop message\""));
    assert!(!pot.contains("Other message"));

    let output = test
        .extract_command()
        .args(["-d", "shop", "-e", "-o", "strict.pot"])
        .output()?;
    assert!(output.status.success());
    let pot = test.read_file("strict.pot")?;
    assert!(!pot.contains("No domain"));
    assert!(pot.contains("msgid \"Shop message\""));
    Ok(())
}

#[test]
fn test_excludes() -> Result<()> {
    let test = project()?;
    test.write_file("pkg/tests/test_views.py", "_('Only in tests')\n")?;
    test.write_file("tools/extract.py", "_('Tool message')\n")?;

    let output = test.extract_command().args(["-x", "tests"]).output()?;
    assert!(output.status.success());

    let pot = test.read_file("messages.pot")?;
    assert!(!pot.contains("Only in tests"));
    assert!(!pot.contains("Tool message"));
    assert!(pot.contains("msgid \"Welcome\""));
    Ok(())
}

#[test]
fn test_unparseable_file_is_a_warning() -> Result<()> {
    let test = project()?;
    test.write_file("pkg/broken.py", "x = _('unterminated\n")?;

    let output = test.extract_command().output()?;
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "warning: 1 file(s) could not be parsed (use -v for details)\n"
    );
    assert!(test.read_file("messages.pot")?.ends_with(EXPECTED_ENTRIES));

    let output = test.extract_command().arg("-v").output()?;
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("warning: pkg/broken.py: unterminated string literal"));
    assert!(stderr.contains("note: no config file found, using defaults"));
    Ok(())
}

#[test]
fn test_text_and_byte_literals_merge() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "pkg/menu.py",
        "a = _(u'caf\u{e9}')\nb = _(b'caf\\xc3\\xa9')\n",
    )?;

    let output = test.extract_command().output()?;
    assert!(output.status.success());

    let pot = test.read_file("messages.pot")?;
    assert_eq!(pot.matches("msgid \"café\"").count(), 1);
    assert!(pot.contains("#: pkg/menu.py:1\n#: pkg/menu.py:2\nmsgid \"café\"\nmsgstr \"\"\n"));
    Ok(())
}

#[test]
fn test_python_keywords_from_config() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("pkg/views.py", "N_('Deferred')\n_('Direct')\n")?;
    test.write_file(".i18nextract.json", r#"{ "pythonKeywords": ["N_"] }"#)?;

    let output = test.extract_command().output()?;
    assert!(output.status.success());

    let pot = test.read_file("messages.pot")?;
    assert!(pot.contains("msgid \"Deferred\""));
    assert!(!pot.contains("Direct"));
    Ok(())
}

#[test]
fn test_missing_source_root_is_an_error() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.extract_command().args(["--path", "missing"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("error: source root does not exist or is not a directory: missing")
    );
    assert!(!test.root().join("messages.pot").exists());
    Ok(())
}

#[test]
fn test_path_labels_relative_to_source_root() -> Result<()> {
    let test = project()?;

    let output = test
        .extract_command()
        .args(["--path", "pkg", "-o", "out.pot"])
        .output()?;
    assert!(output.status.success());

    let pot = test.read_file("out.pot")?;
    assert!(pot.contains("#: views.py:3\n"));

    let output = test
        .extract_command()
        .args(["--path", "pkg", "--base-dir", ".", "-o", "based.pot"])
        .output()?;
    assert!(output.status.success());
    let pot = test.read_file("based.pot")?;
    assert!(pot.contains("#: pkg/views.py:3\n"));
    Ok(())
}

#[test]
fn test_config_file_and_custom_header() -> Result<()> {
    let test = project()?;
    test.write_file("version.txt", "2.1.0\n")?;
    test.write_file(
        "header.txt",
        "# %(project)s %(version)s, created %(time)s\nmsgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=%(charset)s\\n\"\n\n",
    )?;
    test.write_file(
        ".i18nextract.json",
        r#"{
  "domain": "messages",
  "output": "locales/app.pot",
  "projectName": "myapp",
  "headerTemplate": "header.txt",
  "zcmlAttributes": ["id"]
}"#,
    )?;
    test.write_file("locales/.keep", "")?;

    let output = test.extract_command().output()?;
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let pot = test.read_file("locales/app.pot")?;
    assert!(pot.starts_with(
        "# myapp 2.1.0, created 2024-03-05 14:07+0000\nmsgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n\n"
    ));
    assert!(pot.contains("msgid \"app.Manage\""));
    assert!(!pot.contains("msgid \"Manage\""));
    Ok(())
}

#[test]
fn test_bad_header_template_is_an_error() -> Result<()> {
    let test = project()?;
    test.write_file("header.txt", "# %(author)s\n")?;

    let output = test
        .extract_command()
        .args(["--header", "header.txt"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid header template"));
    assert!(!test.root().join("messages.pot").exists());
    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = project()?;
    test.write_file(".i18nextract.json", r#"{ "excludes": ["*[bad"] }"#)?;

    let output = test.extract_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("excludes"));
    Ok(())
}
