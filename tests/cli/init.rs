use anyhow::{Context, Result};
use serde_json::Value;

use crate::CliTest;

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["domain"], "messages");
    assert_eq!(parsed["sourceRoot"], "./");
    assert_eq!(parsed["templatePatterns"], serde_json::json!(["*.pt"]));
    assert_eq!(parsed["includeDefaultDomain"], true);
    assert!(
        parsed.get("output").is_none(),
        "Unset optional fields should be omitted"
    );

    assert!(
        content.contains("\n  \"domain\""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Created .i18nextract.json"));

    let content = test.read_file(".i18nextract.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".i18nextract.json", "{}")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("error: .i18nextract.json already exists")
    );
    assert_eq!(test.read_file(".i18nextract.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file("pkg/views.py", "title = _('Hello')\n")?;

    let output = test.extract_command().output()?;
    assert!(
        output.status.success(),
        "extract should work with initialized config. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(test.root().join("messages.pot").exists());

    Ok(())
}
