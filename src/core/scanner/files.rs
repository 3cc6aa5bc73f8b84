use std::path::{Component, Path};

use glob::{Pattern, PatternError};

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal names or paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

#[derive(Debug, Clone)]
enum Exclude {
    /// A file/directory name, or a relative path prefix.
    Literal(String),
    Glob(Pattern),
}

/// Decides which files a scanner looks at.
///
/// `patterns` are matched against file names only (`*.py`, `*.pt`).
/// Excludes are matched against every path component name and against the
/// path relative to the scan root, so `tests`, `pkg/tests` and `**/tests`
/// all exclude the same directory.
#[derive(Debug, Clone)]
pub struct FileFilter {
    patterns: Vec<Pattern>,
    excludes: Vec<Exclude>,
}

impl FileFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
            excludes: Vec::new(),
        })
    }

    /// Filter from patterns known to be valid at compile time.
    pub(crate) fn builtin(patterns: &[&str], excludes: &[&str]) -> Self {
        let patterns = patterns.iter().filter_map(|p| Pattern::new(p).ok()).collect();
        let excludes = excludes
            .iter()
            .map(|e| Exclude::Literal((*e).to_string()))
            .collect();
        Self { patterns, excludes }
    }

    /// Add exclude entries.
    pub fn exclude<I, S>(mut self, excludes: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for exclude in excludes {
            let exclude = exclude.as_ref().trim_end_matches('/');
            if exclude.is_empty() {
                continue;
            }
            if is_glob_pattern(exclude) {
                self.excludes.push(Exclude::Glob(Pattern::new(exclude)?));
            } else {
                self.excludes.push(Exclude::Literal(exclude.to_string()));
            }
        }
        Ok(self)
    }

    /// Whether a file name matches one of the patterns.
    pub fn matches_file(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(file_name))
    }

    /// Whether a path (relative to the scan root) is excluded.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let name = relative
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        self.excludes.iter().any(|exclude| match exclude {
            Exclude::Literal(literal) => {
                name == literal.as_str()
                    || relative.starts_with(literal)
                    || relative
                        .components()
                        .any(|c| matches!(c, Component::Normal(n) if n == literal.as_str()))
            }
            Exclude::Glob(pattern) => pattern.matches(&name) || pattern.matches_path(relative),
        })
    }
}
