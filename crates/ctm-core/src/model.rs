//! Records produced by a scan

use facet::Facet;

/// The system a backlog item lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum BacklogSource {
    /// A Jira issue, e.g. `MYJIRAPROJECT-72`
    Jira,
    /// A GitHub issue, e.g. `SAP/ctm#12`
    GitHub,
}

impl BacklogSource {
    /// Parse a source tag as written in a trace marker (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("jira") {
            Some(BacklogSource::Jira)
        } else if s.eq_ignore_ascii_case("github") {
            Some(BacklogSource::GitHub)
        } else {
            None
        }
    }

    /// Get the canonical tag for this source
    pub fn as_str(&self) -> &'static str {
        match self {
            BacklogSource::Jira => "Jira",
            BacklogSource::GitHub => "GitHub",
        }
    }
}

impl std::fmt::Display for BacklogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference to a ticket in an external backlog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Facet)]
pub struct BacklogItem {
    /// Ticket identifier (`MYJIRAPROJECT-72`, `org/repo#12`)
    pub id: String,
    /// Where the ticket lives
    pub source: BacklogSource,
}

impl BacklogItem {
    pub fn new(id: impl Into<String>, source: BacklogSource) -> Self {
        Self {
            id: id.into(),
            source,
        }
    }

    pub fn jira(id: impl Into<String>) -> Self {
        Self::new(id, BacklogSource::Jira)
    }

    pub fn github(id: impl Into<String>) -> Self {
        Self::new(id, BacklogSource::GitHub)
    }
}

impl std::fmt::Display for BacklogItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.source, self.id)
    }
}

/// Identity of one discovered test method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Facet)]
pub struct Test {
    /// Link back to the source file (URL or path, never interpreted)
    pub file_url: String,
    /// Enclosing class
    pub class_name: String,
    /// Method name
    pub method: String,
}

/// A test method together with the backlog items it traces to
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct TestBacklog {
    pub test: Test,
    pub backlog_items: Vec<BacklogItem>,
}

impl TestBacklog {
    pub fn new(test: Test, backlog_items: Vec<BacklogItem>) -> Self {
        Self {
            test,
            backlog_items,
        }
    }
}
