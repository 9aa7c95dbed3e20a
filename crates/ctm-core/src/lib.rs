//! ctm-core - Core library for mapping tests to backlog items
//!
//! This crate provides the building blocks for:
//! - Finding trace markers (`Trace(Jira:KEY-1)`) in source comments
//! - Attributing them to the enclosing class and test method
//! - Linking every discovered test back to its source file
//!
//! # Features
//!
//! - `walk` - Enable [`WalkSources`] for gitignore-aware directory walking (brings in `ignore`)
//! - `parallel` - Scan files in parallel (brings in `rayon`)
//!
//! # Trace markers
//!
//! A trace marker sits in a comment, either before the class (applies to
//! every test method of the class) or right before a test method:
//!
//! ```text
//! * Trace(Jira:MYJIRAPROJECT-72)
//!     METHODS: test FOR TESTING.
//! ```
//!
//! Scan a single file with [`AnnotationScanner`]:
//!
//! ```
//! use ctm_core::{AnnotationScanner, BacklogItem, Language};
//!
//! let abap = "\
//! CLASS ltcl_test DEFINITION FOR TESTING.
//!   PRIVATE SECTION.
//! * Trace(Jira:MYJIRAPROJECT-72)
//!     METHODS: test FOR TESTING.
//! ENDCLASS.
//! CLASS ltcl_test IMPLEMENTATION.
//!   METHOD test.
//!   ENDMETHOD.
//! ENDCLASS.
//! ";
//!
//! let scanner = AnnotationScanner::for_language(Language::Abap);
//! let records = scanner.scan_str(abap, "ltcl_test.abap");
//!
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].test.class_name, "ltcl_test");
//! assert_eq!(records[0].test.method, "test");
//! assert_eq!(records[0].backlog_items, vec![BacklogItem::jira("MYJIRAPROJECT-72")]);
//! ```
//!
//! # Scanning many files
//!
//! ```
//! use ctm_core::{LocalLocation, MemorySources, Sources};
//!
//! let result = MemorySources::new()
//!     .add("LoginTest.java", "// Trace(Jira:CTM-1)\nclass LoginTest {\nvoid testLogin() {\n}\n}\n")
//!     .add("Other.java", "class Other {\n}\n")
//!     .scan(&LocalLocation::new())
//!     .unwrap();
//!
//! assert_eq!(result.len(), 1);
//! ```

mod dialect;
mod location;
mod model;
mod scanner;
mod sources;
mod trace;

pub use dialect::{Abap, Dialect, Java, Language, brace_signature};
pub use location::{GitHubLocation, LocalLocation, LocationResolver};
pub use model::{BacklogItem, BacklogSource, Test, TestBacklog};
pub use scanner::{AnnotationScanner, Phase, ScanState};
pub use sources::{MemorySources, PathSources, ScanResult, Sources, scan_content};
pub use trace::{ReferenceExtractor, TraceMarkers, extract_trace_markers};

#[cfg(feature = "walk")]
pub use sources::WalkSources;
