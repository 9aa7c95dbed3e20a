//! Single-pass annotation scanner
//!
//! Walks the lines of one source file and pairs trace markers with the test
//! methods they annotate. There is no grammar: class bodies, test markers and
//! method signatures are recognized line by line through a [`Dialect`], and the
//! scanner keeps just enough state to attribute references.
//!
//! Attribution rules:
//!
//! - A trace marker outside any class is a *class-level* reference. Once a
//!   class opens it applies to every qualifying method that follows, in that
//!   class and in any later class of the same file. It is never cleared.
//! - A trace marker inside a class is a *method-level* reference. It applies
//!   to the next method signature only and is dropped afterwards, or when a
//!   new class definition starts.
//! - A method qualifies when a test marker preceded it or its name starts
//!   with `test`.
//! - A qualifying method with both kinds of references yields two records,
//!   class-level first. The sets are not merged.

use crate::dialect::{Dialect, Language};
use crate::model::{BacklogItem, Test, TestBacklog};
use crate::trace::{ReferenceExtractor, TraceMarkers};
use eyre::{Result, WrapErr};
use std::io::BufRead;

/// Methods whose name starts with this are tests even without a marker
const TEST_NAME_PREFIX: &str = "test";

/// Where the scanner is, structurally, and which references are waiting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// No class seen yet, nothing pending
    #[default]
    Outside,
    /// No class seen yet, references waiting for the first class
    PendingClassRef { class_refs: Vec<BacklogItem> },
    /// Inside a class; `class_refs` may be empty
    InClass {
        class_name: String,
        class_refs: Vec<BacklogItem>,
    },
    /// Inside a class with references waiting for the next method
    PendingMethodRef {
        class_name: String,
        class_refs: Vec<BacklogItem>,
        method_refs: Vec<BacklogItem>,
    },
}

impl Phase {
    /// Name of the class the scanner is in, if any
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Phase::InClass { class_name, .. } | Phase::PendingMethodRef { class_name, .. } => {
                Some(class_name)
            }
            Phase::Outside | Phase::PendingClassRef { .. } => None,
        }
    }

    /// References waiting at class scope
    pub fn class_refs(&self) -> &[BacklogItem] {
        match self {
            Phase::Outside => &[],
            Phase::PendingClassRef { class_refs }
            | Phase::InClass { class_refs, .. }
            | Phase::PendingMethodRef { class_refs, .. } => class_refs,
        }
    }

    /// References waiting for the next method signature
    pub fn method_refs(&self) -> &[BacklogItem] {
        match self {
            Phase::PendingMethodRef { method_refs, .. } => method_refs,
            _ => &[],
        }
    }

    fn enter_class(self, class_name: String) -> Phase {
        match self {
            Phase::Outside => Phase::InClass {
                class_name,
                class_refs: Vec::new(),
            },
            Phase::PendingClassRef { class_refs }
            | Phase::InClass { class_refs, .. }
            | Phase::PendingMethodRef { class_refs, .. } => Phase::InClass {
                class_name,
                class_refs,
            },
        }
    }

    fn add_refs(self, refs: Vec<BacklogItem>) -> Phase {
        match self {
            Phase::Outside => Phase::PendingClassRef { class_refs: refs },
            Phase::PendingClassRef { mut class_refs } => {
                class_refs.extend(refs);
                Phase::PendingClassRef { class_refs }
            }
            Phase::InClass {
                class_name,
                class_refs,
            } => Phase::PendingMethodRef {
                class_name,
                class_refs,
                method_refs: refs,
            },
            Phase::PendingMethodRef {
                class_name,
                class_refs,
                mut method_refs,
            } => {
                method_refs.extend(refs);
                Phase::PendingMethodRef {
                    class_name,
                    class_refs,
                    method_refs,
                }
            }
        }
    }

    /// Whether a method signature on the current line could produce a record
    fn awaits_method(&self) -> bool {
        match self {
            Phase::InClass { class_refs, .. } => !class_refs.is_empty(),
            Phase::PendingMethodRef { .. } => true,
            Phase::Outside | Phase::PendingClassRef { .. } => false,
        }
    }
}

/// Mutable state of one in-progress scan of one file
#[derive(Debug, Clone)]
pub struct ScanState {
    file_url: String,
    phase: Phase,
    test_marker_pending: bool,
    records: Vec<TestBacklog>,
}

impl ScanState {
    /// Fresh state for a file identified by `file_url`
    pub fn new(file_url: impl Into<String>) -> Self {
        Self {
            file_url: file_url.into(),
            phase: Phase::Outside,
            test_marker_pending: false,
            records: Vec::new(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Whether the next method is known to be a test
    pub fn test_marker_pending(&self) -> bool {
        self.test_marker_pending
    }

    /// Records emitted so far
    pub fn records(&self) -> &[TestBacklog] {
        &self.records
    }

    /// Finish the scan. Anything still pending is dropped.
    pub fn into_records(self) -> Vec<TestBacklog> {
        self.records
    }

    /// Process one line of source
    pub fn feed(
        &mut self,
        dialect: &dyn Dialect,
        extractor: &dyn ReferenceExtractor,
        line: &str,
    ) {
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            return;
        }

        // The class line may carry a test marker too, so keep going
        let class_start = dialect.class_start(line);
        if let Some(class_name) = class_start {
            let phase = std::mem::take(&mut self.phase);
            self.phase = phase.enter_class(class_name.to_string());
        }

        if dialect.test_marker(line) {
            // A marked class definition is a test fixture; that alone
            // emits nothing
            if class_start.is_none() && self.phase.class_name().is_some() {
                self.test_marker_pending = true;
            }
            return;
        }

        let refs = extractor.extract(line);
        if !refs.is_empty() {
            let phase = std::mem::take(&mut self.phase);
            self.phase = phase.add_refs(refs);
            return;
        }

        if self.phase.awaits_method() {
            if let Some(method) = dialect.method_signature(line) {
                self.on_method(method);
            }
        }
    }

    fn on_method(&mut self, method: &str) {
        let is_test = self.test_marker_pending || method.starts_with(TEST_NAME_PREFIX);

        let phase = std::mem::take(&mut self.phase);
        let (class_name, class_refs, method_refs) = match phase {
            Phase::InClass {
                class_name,
                class_refs,
            } => (class_name, class_refs, Vec::new()),
            Phase::PendingMethodRef {
                class_name,
                class_refs,
                method_refs,
            } => (class_name, class_refs, method_refs),
            other => {
                self.phase = other;
                return;
            }
        };

        if is_test {
            let test = Test {
                file_url: self.file_url.clone(),
                class_name: class_name.clone(),
                method: method.to_string(),
            };

            tracing::trace!(
                class = %test.class_name,
                method = %test.method,
                class_refs = class_refs.len(),
                method_refs = method_refs.len(),
                "traced test method"
            );

            if !class_refs.is_empty() {
                self.records
                    .push(TestBacklog::new(test.clone(), class_refs.clone()));
            }
            if !method_refs.is_empty() {
                self.records.push(TestBacklog::new(test, method_refs));
            }
        }

        // Method-level references and the marker belong to this signature
        // only; class-level references stay
        self.test_marker_pending = false;
        self.phase = Phase::InClass {
            class_name,
            class_refs,
        };
    }
}

/// Scans source files of one dialect for traced test methods
#[derive(Debug, Clone)]
pub struct AnnotationScanner<D, E = TraceMarkers> {
    dialect: D,
    extractor: E,
}

impl AnnotationScanner<&'static dyn Dialect, TraceMarkers> {
    /// Scanner for a built-in language using `Trace(...)` markers
    pub fn for_language(language: Language) -> Self {
        Self::new(language.dialect(), TraceMarkers)
    }
}

impl<D: Dialect, E: ReferenceExtractor> AnnotationScanner<D, E> {
    pub fn new(dialect: D, extractor: E) -> Self {
        Self { dialect, extractor }
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Scan a sequence of lines. Each call starts from a fresh state.
    pub fn scan<I>(&self, lines: I, file_url: &str) -> Vec<TestBacklog>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut state = ScanState::new(file_url);
        for line in lines {
            state.feed(&self.dialect, &self.extractor, line.as_ref());
        }
        state.into_records()
    }

    /// Scan in-memory file content
    pub fn scan_str(&self, content: &str, file_url: &str) -> Vec<TestBacklog> {
        self.scan(content.lines(), file_url)
    }

    /// Scan everything a reader yields, line by line.
    ///
    /// Bytes that are not valid UTF-8 are replaced, so only I/O errors fail.
    pub fn scan_reader(
        &self,
        mut reader: impl BufRead,
        file_url: &str,
    ) -> Result<Vec<TestBacklog>> {
        let mut state = ScanState::new(file_url);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .wrap_err_with(|| format!("Failed to read a line of {}", file_url))?;
            if read == 0 {
                break;
            }
            state.feed(&self.dialect, &self.extractor, &String::from_utf8_lossy(&buf));
        }
        Ok(state.into_records())
    }
}

impl<T: Dialect + ?Sized> Dialect for &T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn extensions(&self) -> &'static [&'static str] {
        (**self).extensions()
    }

    fn class_start<'a>(&self, line: &'a str) -> Option<&'a str> {
        (**self).class_start(line)
    }

    fn test_marker(&self, line: &str) -> bool {
        (**self).test_marker(line)
    }

    fn method_signature<'a>(&self, line: &'a str) -> Option<&'a str> {
        (**self).method_signature(line)
    }
}
