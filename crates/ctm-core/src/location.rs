//! Linking scanned files back to where they live

use std::path::{Component, Path, PathBuf};

/// Turns a scanned file path into the opaque link stored in each [`Test`]
///
/// [`Test`]: crate::Test
pub trait LocationResolver: Sync {
    fn resolve(&self, path: &Path) -> String;
}

impl<F> LocationResolver for F
where
    F: Fn(&Path) -> String + Sync,
{
    fn resolve(&self, path: &Path) -> String {
        self(path)
    }
}

/// Local file paths, optionally relative to a root directory
#[derive(Debug, Clone, Default)]
pub struct LocalLocation {
    root: Option<PathBuf>,
}

impl LocalLocation {
    /// Use paths as they are given
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip `root` from every path below it
    pub fn relative_to(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl LocationResolver for LocalLocation {
    fn resolve(&self, path: &Path) -> String {
        let path = match &self.root {
            Some(root) => path.strip_prefix(root).unwrap_or(path),
            None => path,
        };
        path.display().to_string()
    }
}

/// Links into a repository hosted on GitHub (or GitHub Enterprise)
///
/// Produces `<base_url>/<organization>/<repository>/blob/<branch>/<path>`,
/// where `<path>` is relative to the local checkout at `root`.
#[derive(Debug, Clone)]
pub struct GitHubLocation {
    pub base_url: String,
    pub organization: String,
    pub repository: String,
    pub branch: String,
    pub root: PathBuf,
}

impl GitHubLocation {
    pub const DEFAULT_BASE_URL: &'static str = "https://github.com";
    pub const DEFAULT_BRANCH: &'static str = "master";

    pub fn new(
        organization: impl Into<String>,
        repository: impl Into<String>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            organization: organization.into(),
            repository: repository.into(),
            branch: Self::DEFAULT_BRANCH.to_string(),
            root: root.into(),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }
}

impl LocationResolver for GitHubLocation {
    fn resolve(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);

        // Always `/`-separated, whatever the host platform uses
        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        format!(
            "{}/{}/{}/blob/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.organization.trim_matches('/'),
            self.repository.trim_matches('/'),
            self.branch.trim_matches('/'),
            segments.join("/")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_location() {
        let resolver = LocalLocation::new();
        assert_eq!(resolver.resolve(Path::new("src/zcl_test.abap")), "src/zcl_test.abap");
    }

    #[test]
    fn test_local_location_relative() {
        let resolver = LocalLocation::relative_to("/work/repo");
        assert_eq!(
            resolver.resolve(Path::new("/work/repo/src/zcl_test.abap")),
            "src/zcl_test.abap"
        );
        // paths outside the root are left alone
        assert_eq!(resolver.resolve(Path::new("/other/a.abap")), "/other/a.abap");
    }

    #[test]
    fn test_github_location() {
        let resolver = GitHubLocation::new("testOrg", "testRepo", "/work/repo");
        assert_eq!(
            resolver.resolve(Path::new("/work/repo/src/ltcl_test.abap")),
            "https://github.com/testOrg/testRepo/blob/master/src/ltcl_test.abap"
        );
    }

    #[test]
    fn test_github_location_enterprise_and_branch() {
        let resolver = GitHubLocation::new("team", "app", "./")
            .base_url("https://github.example.com/")
            .branch("main");
        assert_eq!(
            resolver.resolve(Path::new("./src/test/LoginTest.java")),
            "https://github.example.com/team/app/blob/main/src/test/LoginTest.java"
        );
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |path: &Path| format!("file://{}", path.display());
        assert_eq!(resolver.resolve(Path::new("a.abap")), "file://a.abap");
    }
}
