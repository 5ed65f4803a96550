//! @ai:module:intent Configuration for a compile-and-annotate run
//! @ai:module:layer infrastructure
//! @ai:module:public_api Config
//! @ai:module:depends_on severity, exclusion, paths, error

use crate::error::{Error, Result};
use crate::exclusion::ExclusionMatcher;
use crate::paths::normalize_path;
use crate::severity::SeverityMask;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// @ai:intent Settings loaded from `fpc-annotate.toml` and overridden from the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_fpc")]
    pub fpc: String,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
    #[serde(default = "default_verbosity")]
    pub verbosity: String,
    #[serde(default = "default_fail_on")]
    pub fail_on: String,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub annotate: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fpc: default_fpc(),
            flags: Vec::new(),
            workdir: default_workdir(),
            verbosity: default_verbosity(),
            fail_on: default_fail_on(),
            exclude: Vec::new(),
            annotate: None,
        }
    }
}

fn default_fpc() -> String {
    "fpc".to_string()
}

fn default_workdir() -> PathBuf {
    PathBuf::from(".")
}

fn default_verbosity() -> String {
    "ewnh".to_string()
}

fn default_fail_on() -> String {
    "e".to_string()
}

impl Config {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::Toml {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// @ai:intent Reject settings that cannot be turned into a run
    /// @ai:effects pure
    pub fn validate(&self) -> Result<()> {
        if self.fpc.trim().is_empty() {
            return Err(Error::Config("compiler program must not be empty".to_string()));
        }
        self.fail_on_mask()?;
        self.verbosity_mask()?;
        Ok(())
    }

    /// @ai:intent Buckets that fail the run when non-empty
    pub fn fail_on_mask(&self) -> Result<SeverityMask> {
        self.fail_on.parse()
    }

    /// @ai:intent Buckets the compiler is asked to print
    pub fn verbosity_mask(&self) -> Result<SeverityMask> {
        self.verbosity.parse()
    }

    /// @ai:intent Compiler flag selecting printed message kinds, if any
    /// @ai:example verbosity "ewnh" -> Some("-vewnh")
    pub fn verbosity_flag(&self) -> Result<Option<String>> {
        let mask = self.verbosity_mask()?;
        Ok((!mask.is_empty()).then(|| format!("-v{}", mask.chars())))
    }

    /// @ai:intent Absolute, normalized working directory
    /// @ai:effects env:read
    pub fn resolved_workdir(&self) -> Result<PathBuf> {
        let workdir = if self.workdir.is_absolute() {
            self.workdir.clone()
        } else {
            std::env::current_dir()?.join(&self.workdir)
        };
        Ok(PathBuf::from(normalize_path(&workdir.to_string_lossy())))
    }

    /// @ai:intent Build the exclusion matcher, resolving entries against the working directory
    pub fn exclusion_matcher(&self, workdir: &Path) -> ExclusionMatcher {
        ExclusionMatcher::new(&self.exclude, workdir)
    }

    /// @ai:intent Whether workflow annotations should be emitted
    /// @ai:effects env:read
    pub fn annotate_enabled(&self) -> bool {
        self.annotate
            .unwrap_or_else(|| std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true"))
    }
}
