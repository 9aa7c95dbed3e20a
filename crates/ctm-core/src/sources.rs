//! Source providers for test-to-backlog mapping

use crate::dialect::Language;
use crate::location::LocationResolver;
use crate::model::TestBacklog;
use crate::scanner::AnnotationScanner;
use eyre::{Result, WrapErr};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of scanning a set of sources
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Traced test methods, in file order and then discovery order
    pub records: Vec<TestBacklog>,
    /// Files that were skipped, and why
    pub warnings: Vec<String>,
}

impl ScanResult {
    /// Number of records found
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Merge another result into this one
    pub fn extend(&mut self, other: ScanResult) {
        self.records.extend(other.records);
        self.warnings.extend(other.warnings);
    }
}

/// Trait for providing source files to scan
pub trait Sources {
    /// Scan all sources, linking each file through `resolver`
    fn scan(self, resolver: &dyn LocationResolver) -> Result<ScanResult>;
}

/// Scan the content of one file with the dialect for `language`
pub fn scan_content(
    path: &Path,
    content: &str,
    language: Language,
    resolver: &dyn LocationResolver,
) -> Vec<TestBacklog> {
    let file_url = resolver.resolve(path);
    let records = AnnotationScanner::for_language(language).scan_str(content, &file_url);

    debug!(
        file = %path.display(),
        language = %language,
        records = records.len(),
        "scanned file"
    );

    records
}

/// Pick the language of `path`, honoring an optional restriction
fn language_for(path: &Path, only: Option<Language>) -> Option<Language> {
    let language = Language::from_extension(path.extension()?)?;
    match only {
        Some(only) if only != language => None,
        _ => Some(language),
    }
}

/// Read a source file; bytes that are not valid UTF-8 are replaced
fn read_source(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// Run `f` over every item, in parallel when enabled, keeping input order
fn map_files<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items.par_iter().map(f).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items.iter().map(f).collect()
    }
}

/// Sources from an explicit list of file paths
pub struct PathSources {
    paths: Vec<PathBuf>,
    language: Option<Language>,
}

impl PathSources {
    /// Create from an iterator of paths
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            language: None,
        }
    }

    /// Only scan files of one language
    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}

impl Sources for PathSources {
    fn scan(self, resolver: &dyn LocationResolver) -> Result<ScanResult> {
        let start = Instant::now();
        let mut result = ScanResult::default();

        let mut files = Vec::new();
        for path in self.paths {
            match language_for(&path, self.language) {
                Some(language) => files.push((path, language)),
                None => result
                    .warnings
                    .push(format!("Skipped {}: unsupported file type", path.display())),
            }
        }

        let scanned = map_files(&files, |(path, language)| -> Result<Vec<TestBacklog>> {
            let content = read_source(path)
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
            Ok(scan_content(path, &content, *language, resolver))
        });

        for records in scanned {
            result.records.extend(records?);
        }

        info!(
            files = files.len(),
            records = result.records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scanned path sources"
        );

        Ok(result)
    }
}

/// In-memory sources (useful for testing)
pub struct MemorySources(Vec<(PathBuf, String)>);

impl MemorySources {
    /// Create empty memory sources
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Add a file with content
    pub fn add(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.0.push((path.into(), content.into()));
        self
    }
}

impl Default for MemorySources {
    fn default() -> Self {
        Self::new()
    }
}

impl Sources for MemorySources {
    fn scan(self, resolver: &dyn LocationResolver) -> Result<ScanResult> {
        let mut result = ScanResult::default();
        for (path, content) in self.0 {
            match language_for(&path, None) {
                Some(language) => result
                    .records
                    .extend(scan_content(&path, &content, language, resolver)),
                None => result
                    .warnings
                    .push(format!("Skipped {}: unsupported file type", path.display())),
            }
        }
        Ok(result)
    }
}

/// Gitignore-aware directory walker
#[cfg(feature = "walk")]
pub struct WalkSources {
    root: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
    language: Option<Language>,
}

#[cfg(feature = "walk")]
impl WalkSources {
    /// Create a walker for the given root directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            language: None,
        }
    }

    /// Add include patterns (e.g., `["src/**"]`), relative to the root
    pub fn include(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add exclude patterns (e.g., `["target/**"]`), relative to the root
    pub fn exclude(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Only scan files of one language
    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Collect matching files, sorted by path
    fn collect_files(&self) -> Result<Vec<(PathBuf, Language)>> {
        use ignore::WalkBuilder;

        let include = build_globset(&self.include)?;
        let exclude = build_globset(&self.exclude)?;

        let walker = WalkBuilder::new(&self.root)
            .follow_links(true)
            .hidden(false) // Don't skip hidden files (but .git is in .gitignore)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(language) = language_for(path, self.language) else {
                continue;
            };

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if !self.include.is_empty() && !include.is_match(relative) {
                continue;
            }
            if exclude.is_match(relative) {
                continue;
            }

            files.push((path.to_path_buf(), language));
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

#[cfg(feature = "walk")]
fn build_globset(patterns: &[String]) -> Result<globset::GlobSet> {
    let mut builder = globset::GlobSetBuilder::new();
    for pattern in patterns {
        let glob = globset::Glob::new(&pattern.replace('\\', "/"))
            .wrap_err_with(|| format!("Invalid glob pattern '{}'", pattern))?;
        builder.add(glob);
    }
    builder.build().wrap_err("Failed to build glob set")
}

#[cfg(feature = "walk")]
impl Sources for WalkSources {
    fn scan(self, resolver: &dyn LocationResolver) -> Result<ScanResult> {
        let start = Instant::now();
        let files = self.collect_files()?;

        let scanned = map_files(&files, |(path, language)| {
            read_source(path)
                .map(|content| scan_content(path, &content, *language, resolver))
                .map_err(|e| format!("Skipped {}: {}", path.display(), e))
        });

        let mut result = ScanResult::default();
        for outcome in scanned {
            match outcome {
                Ok(records) => result.records.extend(records),
                Err(warning) => {
                    warn!("{}", warning);
                    result.warnings.push(warning);
                }
            }
        }

        info!(
            root = %self.root.display(),
            files = files.len(),
            records = result.records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scanned directory"
        );

        Ok(result)
    }
}
