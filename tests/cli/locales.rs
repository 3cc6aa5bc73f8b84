use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::CliTest;

fn project() -> Result<CliTest> {
    let test = CliTest::new()?;
    test.write_file("locales/de/LC_MESSAGES/shop.po", "")?;
    test.write_file("locales/fr/LC_MESSAGES/shop.po", "")?;
    test.write_file("locales/fr/LC_MESSAGES/other.po", "")?;
    Ok(test)
}

#[test]
fn test_lists_catalogs() -> Result<()> {
    let test = project()?;

    let output = test.locales_command().args(["-d", "shop"]).output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("de") && lines[0].contains("locales/de/LC_MESSAGES/shop.po"));
    assert!(lines[1].contains("fr") && lines[1].contains("mo missing"));
    assert_eq!(lines[2], "✓ 2 catalogs found");
    Ok(())
}

#[test]
fn test_compile_mo_reports_pending_catalogs() -> Result<()> {
    let test = project()?;

    let output = test
        .locales_command()
        .args(["-d", "shop", "--compile-mo"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("needs compile (mo missing)"));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "warning: 2 catalogs need compiling\n"
    );
    Ok(())
}

#[test]
fn test_settings_from_environment() -> Result<()> {
    let test = project()?;

    let output = test
        .locales_command()
        .args(["-d", "shop"])
        .env("I18N_COMPILE_MO_FILES", "yes")
        .env("I18N_ALLOWED_LANGUAGES", "fr, es")
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("locales/fr/LC_MESSAGES/shop.po"));
    assert!(!stdout.contains("locales/de/"));
    assert_eq!(
        String::from_utf8_lossy(&output.stderr),
        "warning: 1 catalog needs compiling\n"
    );
    Ok(())
}

#[test]
fn test_compile_mo_disabled_by_environment() -> Result<()> {
    let test = project()?;

    let output = test
        .locales_command()
        .args(["-d", "shop"])
        .env("I18N_COMPILE_MO_FILES", "off")
        .output()?;
    assert!(output.status.success());
    Ok(())
}

#[test]
fn test_domain_from_config() -> Result<()> {
    let test = project()?;
    test.write_file(".i18nextract.json", r#"{ "domain": "other" }"#)?;

    let output = test.locales_command().output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("locales/fr/LC_MESSAGES/other.po"));
    assert!(stdout.contains("1 catalog found"));
    Ok(())
}

#[test]
fn test_no_catalogs() -> Result<()> {
    let test = project()?;

    let output = test.locales_command().args(["-d", "missing"]).output()?;
    assert!(output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("warning: no catalogs for domain \"missing\" in locales")
    );
    Ok(())
}

#[test]
fn test_missing_directory_is_an_error() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.locales_command().arg("nowhere").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read locales directory"));
    Ok(())
}
