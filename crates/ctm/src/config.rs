//! Configuration schema for ctm
//!
//! The config is a JSON file listing the source trees to scan:
//!
//! ```json
//! {
//!   "github_base_url": "https://github.com",
//!   "sources": [
//!     {
//!       "local": "abap-checkout",
//!       "language": "abap",
//!       "git": { "organization": "org", "repository": "repo", "branch": "main" },
//!       "include": ["src/**"],
//!       "exclude": ["target/**"]
//!     }
//!   ]
//! }
//! ```

use ctm_core::{GitHubLocation, Language, LocalLocation, LocationResolver};
use eyre::{Result, WrapErr};
use facet::Facet;
use std::path::{Path, PathBuf};

/// Root configuration for ctm
#[derive(Debug, Clone, Facet)]
pub struct Config {
    /// Base URL of the GitHub instance hosting the sources
    /// (defaults to `https://github.com`)
    #[facet(default)]
    pub github_base_url: Option<String>,

    /// Source trees to scan
    pub sources: Vec<SourceConfig>,
}

/// One source tree
#[derive(Debug, Clone, Facet)]
pub struct SourceConfig {
    /// Local checkout, relative to the config file
    pub local: String,

    /// Only scan files of this language (`abap`, `java`)
    #[facet(default)]
    pub language: Option<String>,

    /// Where the checkout is hosted; local paths are reported otherwise
    #[facet(default)]
    pub git: Option<GitConfig>,

    /// Glob patterns (relative to `local`) to scan
    #[facet(default)]
    pub include: Vec<String>,

    /// Glob patterns (relative to `local`) to skip
    #[facet(default)]
    pub exclude: Vec<String>,
}

/// Hosted repository of a source tree
#[derive(Debug, Clone, Facet)]
pub struct GitConfig {
    pub organization: String,
    pub repository: String,

    /// Defaults to `master`
    #[facet(default)]
    pub branch: Option<String>,
}

impl Config {
    /// Parse a config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        facet_json::from_str(json).wrap_err("Failed to parse config JSON")
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            eyre::bail!(
                "Config file not found at {}\n\n\
                 Create a config file listing the sources to scan:\n\n\
                 {{\n    \
                     \"sources\": [{{ \"local\": \".\", \"language\": \"abap\" }}]\n\
                 }}",
                path.display()
            );
        }

        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_json(&content)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))
    }
}

impl SourceConfig {
    /// Directory (or file) to scan, resolved against the config directory
    pub fn root(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.local)
    }

    /// The configured language restriction, if any
    pub fn language(&self) -> Result<Option<Language>> {
        match &self.language {
            None => Ok(None),
            Some(name) => Language::parse(name)
                .map(Some)
                .ok_or_else(|| eyre::eyre!("Unknown language '{}' for source {}", name, self.local)),
        }
    }

    /// How files of this source are linked in the output
    pub fn resolver(&self, root: &Path, github_base_url: Option<&str>) -> Box<dyn LocationResolver> {
        match &self.git {
            Some(git) => {
                let mut location =
                    GitHubLocation::new(&git.organization, &git.repository, root);
                if let Some(base_url) = github_base_url {
                    location = location.base_url(base_url);
                }
                if let Some(branch) = &git.branch {
                    location = location.branch(branch);
                }
                Box::new(location)
            }
            None => Box::new(LocalLocation::relative_to(root)),
        }
    }
}
