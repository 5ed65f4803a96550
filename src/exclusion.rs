//! @ai:module:intent Decide whether a diagnostic's source path is excluded from reporting
//! @ai:module:layer domain
//! @ai:module:public_api ExclusionMatcher, ExcludedPath
//! @ai:module:depends_on paths, severity
//! @ai:module:stateless true

use crate::paths::{has_trailing_separator, resolve};
use crate::severity::Severity;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// @ai:intent One configured exclusion, tagged at configuration time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExcludedPath {
    /// Normalized path that always ends with the host separator
    Directory(String),
    File(String),
}

/// @ai:intent Path-prefix / exact-path filter over normalized paths
/// @ai:invariant comparisons are exact string comparisons, no case folding or symlink resolution
#[derive(Debug, Clone, Default)]
pub struct ExclusionMatcher {
    entries: Vec<ExcludedPath>,
    base: PathBuf,
}

impl ExcludedPath {
    /// @ai:intent Tag and normalize a raw configured path
    /// @ai:pre base is the directory the compiler runs in
    /// @ai:example ExcludedPath::parse("vendor/", "/work") -> Directory("/work/vendor/")
    /// @ai:effects pure
    pub fn parse(raw: &str, base: &Path) -> Self {
        let normalized = resolve(raw, base);
        if has_trailing_separator(raw) {
            if has_trailing_separator(&normalized) {
                ExcludedPath::Directory(normalized)
            } else {
                ExcludedPath::Directory(format!("{normalized}{MAIN_SEPARATOR}"))
            }
        } else {
            ExcludedPath::File(normalized)
        }
    }

    /// @ai:effects pure
    fn matches(&self, path: &str) -> bool {
        match self {
            ExcludedPath::Directory(prefix) => path.starts_with(prefix.as_str()),
            ExcludedPath::File(file) => path == file,
        }
    }
}

impl ExclusionMatcher {
    /// @ai:intent Build a matcher from raw configured paths
    /// @ai:effects pure
    pub fn new<S: AsRef<str>>(paths: &[S], base: &Path) -> Self {
        Self {
            entries: paths
                .iter()
                .map(|p| ExcludedPath::parse(p.as_ref(), base))
                .collect(),
            base: base.to_path_buf(),
        }
    }

    pub fn entries(&self) -> &[ExcludedPath] {
        &self.entries
    }

    /// @ai:intent Check whether a diagnostic path falls under any configured entry
    /// @ai:pre path is already normalized; relative paths are resolved against the matcher base
    /// @ai:effects pure
    pub fn is_excluded(&self, path: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let resolved = resolve(path, &self.base);
        self.entries.iter().any(|entry| entry.matches(&resolved))
    }

    /// @ai:intent Apply the suppression policy: exclusion never hides errors or fatals
    /// @ai:effects pure
    pub fn suppresses(&self, path: &str, severity: Severity) -> bool {
        !severity.is_error() && self.is_excluded(path)
    }
}
