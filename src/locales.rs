//! Runtime locale settings and compiled catalog discovery.
//!
//! Translations live under `<dir>/<lang>/LC_MESSAGES/<domain>.po`. A locale
//! is only considered when it is in the allowed language list (if one is
//! set). When mo compilation is enabled, a `.po` whose `.mo` is missing or
//! older needs compiling; the compilation itself is left to `msgfmt`.

use std::{
    collections::BTreeSet,
    fmt, fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::{Context, Result, bail};
use regex::Regex;

pub const COMPILE_MO_ENV: &str = "I18N_COMPILE_MO_FILES";
pub const ALLOWED_LANGUAGES_ENV: &str = "I18N_ALLOWED_LANGUAGES";

static LANGUAGE_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,3}(?:[_-][A-Za-z0-9]{2,8})*(?:@[A-Za-z0-9]+)?$").unwrap());

/// Locale options read at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleSettings {
    pub compile_mo: bool,
    /// `None` allows every language.
    pub allowed_languages: Option<BTreeSet<String>>,
}

impl LocaleSettings {
    pub fn new(compile_mo: bool, allowed_languages: Option<&str>) -> Self {
        let allowed_languages = allowed_languages
            .map(parse_language_list)
            .filter(|langs| !langs.is_empty());
        Self {
            compile_mo,
            allowed_languages,
        }
    }

    pub fn allows(&self, language: &str) -> bool {
        self.allowed_languages
            .as_ref()
            .is_none_or(|allowed| allowed.contains(language))
    }
}

/// Parse a boolean switch: `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => bail!("invalid boolean value \"{}\"", other),
    }
}

/// Split a comma and/or whitespace separated language list.
pub fn parse_language_list(value: &str) -> BTreeSet<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_language_code(name: &str) -> bool {
    LANGUAGE_CODE_REGEX.is_match(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoStatus {
    UpToDate,
    Missing,
    Stale,
}

impl MoStatus {
    pub fn needs_compile(self) -> bool {
        !matches!(self, MoStatus::UpToDate)
    }
}

impl fmt::Display for MoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoStatus::UpToDate => write!(f, "up to date"),
            MoStatus::Missing => write!(f, "mo missing"),
            MoStatus::Stale => write!(f, "mo older than po"),
        }
    }
}

/// One `<lang>/LC_MESSAGES/<domain>.po` catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleCatalog {
    pub language: String,
    pub po_path: PathBuf,
    pub mo_path: PathBuf,
    pub mo_status: MoStatus,
}

fn mo_status(po_path: &Path, mo_path: &Path) -> Result<MoStatus> {
    let Ok(mo_meta) = fs::metadata(mo_path) else {
        return Ok(MoStatus::Missing);
    };
    let po_modified = fs::metadata(po_path)
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to read {:?}", po_path))?;
    let mo_modified = mo_meta
        .modified()
        .with_context(|| format!("Failed to read {:?}", mo_path))?;
    Ok(if mo_modified < po_modified {
        MoStatus::Stale
    } else {
        MoStatus::UpToDate
    })
}

/// List the catalogs of `domain` under `dir`, sorted by language.
pub fn discover(dir: &Path, domain: &str, settings: &LocaleSettings) -> Result<Vec<LocaleCatalog>> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read locales directory {:?}", dir))?;

    let mut catalogs = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read locales directory {:?}", dir))?;
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let language = entry.file_name().to_string_lossy().into_owned();
        if !is_language_code(&language) || !settings.allows(&language) {
            continue;
        }

        let messages_dir = entry.path().join("LC_MESSAGES");
        let po_path = messages_dir.join(format!("{}.po", domain));
        if !po_path.is_file() {
            continue;
        }
        let mo_path = messages_dir.join(format!("{}.mo", domain));
        let mo_status = mo_status(&po_path, &mo_path)?;
        catalogs.push(LocaleCatalog {
            language,
            po_path,
            mo_path,
            mo_status,
        });
    }

    catalogs.sort_by(|a, b| a.language.cmp(&b.language));
    Ok(catalogs)
}
