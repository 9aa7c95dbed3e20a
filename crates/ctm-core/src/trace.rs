//! Extracting backlog references from trace markers in comments
//!
//! A trace marker lists one or more backlog items inside `Trace(...)`:
//!
//! ```text
//! * Trace(Jira:MYJIRAPROJECT-72)
//! // Trace(GitHub:SAP/quality-continuous-traceability-monitor#12, Jira:CTM-3)
//! ```

use crate::model::{BacklogItem, BacklogSource};

const MARKER: &str = "Trace(";

/// Finds backlog references on a single line of source.
///
/// Implementations must be pure: the same line always yields the same
/// references, in the same order.
pub trait ReferenceExtractor {
    fn extract(&self, line: &str) -> Vec<BacklogItem>;
}

impl<F> ReferenceExtractor for F
where
    F: Fn(&str) -> Vec<BacklogItem>,
{
    fn extract(&self, line: &str) -> Vec<BacklogItem> {
        self(line)
    }
}

/// The default extractor, recognizing `Trace(Source:id, ...)` markers
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceMarkers;

impl ReferenceExtractor for TraceMarkers {
    fn extract(&self, line: &str) -> Vec<BacklogItem> {
        extract_trace_markers(line)
    }
}

/// Extract every backlog item from every trace marker on the line
pub fn extract_trace_markers(line: &str) -> Vec<BacklogItem> {
    let mut items = Vec::new();
    let mut rest = line;
    let mut consumed = 0;

    while let Some(pos) = rest.find(MARKER) {
        let start = consumed + pos;
        let after = &rest[pos + MARKER.len()..];

        // `StackTrace(` and friends are not markers
        let glued = line[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');

        let Some(close) = after.find(')') else {
            // Unterminated marker, nothing more to find on this line
            break;
        };

        if !glued {
            for entry in after[..close].split(',') {
                if let Some(item) = parse_entry(entry) {
                    items.push(item);
                }
            }
        }

        let advance = pos + MARKER.len() + close + 1;
        consumed += advance;
        rest = &rest[advance..];
    }

    items
}

/// Parse one `Source:id` entry, skipping anything malformed
fn parse_entry(entry: &str) -> Option<BacklogItem> {
    let (tag, id) = entry.split_once(':')?;
    let source = BacklogSource::parse(tag.trim())?;
    let id = id.trim();

    let valid = match source {
        BacklogSource::Jira => is_jira_key(id),
        BacklogSource::GitHub => is_github_issue(id),
    };

    valid.then(|| BacklogItem::new(id, source))
}

/// `PROJECT-123`
fn is_jira_key(id: &str) -> bool {
    let Some((project, number)) = id.rsplit_once('-') else {
        return false;
    };

    let mut chars = project.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());

    starts_with_letter
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && is_number(number)
}

/// `organization/repository#123`
fn is_github_issue(id: &str) -> bool {
    let Some((repo_path, number)) = id.split_once('#') else {
        return false;
    };
    let Some((organization, repository)) = repo_path.split_once('/') else {
        return false;
    };

    let is_name = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    };

    is_name(organization) && is_name(repository) && is_number(number)
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}
