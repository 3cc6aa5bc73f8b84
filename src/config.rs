use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::scanner::zcml::DEFAULT_ATTRIBUTES;

pub const CONFIG_FILE_NAME: &str = ".i18nextract.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    /// Location paths are written relative to this directory (defaults to the source root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
    /// Output file (defaults to `<domain>.pot`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default = "default_python_pattern")]
    pub python_pattern: String,
    /// Function names whose calls are collected from Python code.
    #[serde(default = "default_python_keywords")]
    pub python_keywords: Vec<String>,
    #[serde(default = "default_template_patterns")]
    pub template_patterns: Vec<String>,
    #[serde(default = "default_zcml_pattern")]
    pub zcml_pattern: String,
    #[serde(default = "default_zcml_attributes")]
    pub zcml_attributes: Vec<String>,
    #[serde(default = "default_include_default_domain")]
    pub include_default_domain: bool,
    #[serde(default)]
    pub python_only: bool,
    /// File containing a custom POT header template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_template: Option<String>,
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default)]
    pub escape_non_ascii: bool,
}

fn default_domain() -> String {
    "messages".to_string()
}

fn default_source_root() -> String {
    "./".to_string()
}

fn default_python_pattern() -> String {
    "*.py".to_string()
}

fn default_python_keywords() -> Vec<String> {
    vec!["_".to_string()]
}

fn default_template_patterns() -> Vec<String> {
    vec!["*.pt".to_string()]
}

fn default_zcml_pattern() -> String {
    "*.zcml".to_string()
}

fn default_zcml_attributes() -> Vec<String> {
    DEFAULT_ATTRIBUTES.iter().map(|a| a.to_string()).collect()
}

fn default_include_default_domain() -> bool {
    true
}

fn default_project_name() -> String {
    "PACKAGE".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            source_root: default_source_root(),
            base_dir: None,
            output: None,
            excludes: Vec::new(),
            python_pattern: default_python_pattern(),
            python_keywords: default_python_keywords(),
            template_patterns: default_template_patterns(),
            zcml_pattern: default_zcml_pattern(),
            zcml_attributes: default_zcml_attributes(),
            include_default_domain: default_include_default_domain(),
            python_only: false,
            header_template: None,
            project_name: default_project_name(),
            escape_non_ascii: false,
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for an empty domain or any invalid glob pattern.
    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            bail!("'domain' must not be empty");
        }

        // Excludes without wildcards are literal names or paths.
        for pattern in &self.excludes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern)
                    .with_context(|| format!("Invalid glob pattern in 'excludes': \"{}\"", pattern))?;
            }
        }

        if self.python_keywords.is_empty() {
            bail!("'pythonKeywords' must name at least one function");
        }
        if let Some(keyword) = self
            .python_keywords
            .iter()
            .find(|k| !k.chars().all(|c| c == '_' || c.is_alphanumeric()) || k.is_empty())
        {
            bail!("Invalid function name in 'pythonKeywords': \"{}\"", keyword);
        }

        Pattern::new(&self.python_pattern).with_context(|| {
            format!("Invalid glob pattern in 'pythonPattern': \"{}\"", self.python_pattern)
        })?;
        for pattern in &self.template_patterns {
            Pattern::new(pattern).with_context(|| {
                format!("Invalid glob pattern in 'templatePatterns': \"{}\"", pattern)
            })?;
        }
        Pattern::new(&self.zcml_pattern).with_context(|| {
            format!("Invalid glob pattern in 'zcmlPattern': \"{}\"", self.zcml_pattern)
        })?;

        Ok(())
    }

    /// Where the POT file goes: the configured output or `<domain>.pot`.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("{}.pot", self.domain)))
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// Path of the file the config was read from, `None` when using defaults.
    pub path: Option<PathBuf>,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}
