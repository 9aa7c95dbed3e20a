//! Language front ends for the annotation scanner
//!
//! A dialect only answers three questions about a single line: does it open a
//! class, does it mark the next method as a test, and is it a method
//! signature. The scanner owns all state; dialects are stateless.

use facet::Facet;
use std::ffi::OsStr;

/// Line recognizers for one source language
pub trait Dialect: Send + Sync {
    /// Human readable name of the language
    fn name(&self) -> &'static str;

    /// File extensions (without the dot) handled by this dialect
    fn extensions(&self) -> &'static [&'static str];

    /// If the line opens a class definition, return the class name
    fn class_start<'a>(&self, line: &'a str) -> Option<&'a str>;

    /// Whether the line carries a "this is a test" marker
    fn test_marker(&self, line: &str) -> bool;

    /// If the line is a method signature, return the method name
    fn method_signature<'a>(&self, line: &'a str) -> Option<&'a str> {
        brace_signature(line)
    }
}

/// Recognize `... name(params) ... {` style signatures.
///
/// The last `{` on the line marks a body start and the first `(` before it
/// opens the parameter list. Lines with a brace but no parameter list (enums,
/// field initializers, static blocks) are not signatures.
pub fn brace_signature(line: &str) -> Option<&str> {
    let body = line.rfind('{')?;
    let params = line[..body].find('(')?;

    let head = line[..params].trim();
    let name_start = head
        .rfind(char::is_whitespace)
        .map(|i| i + 1)
        .unwrap_or(0);
    let name = &head[name_start..];

    is_identifier(name).then_some(name)
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_identifier_char)
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// ABAP unit tests (`CLASS ... DEFINITION FOR TESTING`, `METHOD name.`)
#[derive(Debug, Clone, Copy, Default)]
pub struct Abap;

impl Dialect for Abap {
    fn name(&self) -> &'static str {
        "ABAP"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["abap"]
    }

    fn class_start<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line.trim_start().strip_prefix("CLASS ")?;
        let mut tokens = rest.split_whitespace();
        let name = tokens.next()?;

        let is_definition = tokens.any(|t| t.trim_end_matches('.') == "DEFINITION");
        (is_definition && name != "DEFINITION").then_some(name)
    }

    fn test_marker(&self, line: &str) -> bool {
        line.contains(" FOR TESTING")
    }

    fn method_signature<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line.trim_start().strip_prefix("METHOD ")?;
        let name = rest.split_whitespace().next()?.trim_end_matches('.');
        (!name.is_empty()).then_some(name)
    }
}

/// JUnit style tests (`class Foo {`, `@Test`, `void name() {`)
#[derive(Debug, Clone, Copy, Default)]
pub struct Java;

impl Dialect for Java {
    fn name(&self) -> &'static str {
        "Java"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn class_start<'a>(&self, line: &'a str) -> Option<&'a str> {
        let trimmed = line.trim_start();
        if trimmed.starts_with("//") || trimmed.starts_with('*') || trimmed.starts_with("/*") {
            return None;
        }

        let mut tokens = trimmed.split_whitespace();
        tokens.find(|t| *t == "class")?;
        let token = tokens.next()?;

        let end = token
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(token.len());
        let name = &token[..end];

        (!name.is_empty()).then_some(name)
    }

    fn test_marker(&self, line: &str) -> bool {
        // `@TestInstance`, `@Testcontainers` and friends are not test markers
        match line.trim_start().strip_prefix("@Test") {
            Some(rest) => !rest.starts_with(|c: char| is_identifier_char(c) || c == '.'),
            None => false,
        }
    }
}

/// Languages the scanner ships front ends for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum Language {
    Abap,
    Java,
}

impl Language {
    /// Every supported language
    pub const ALL: [Language; 2] = [Language::Abap, Language::Java];

    /// Pick the language for a file extension
    pub fn from_extension(ext: &OsStr) -> Option<Self> {
        let ext = ext.to_str()?;
        Self::ALL
            .into_iter()
            .find(|lang| lang.dialect().extensions().contains(&ext))
    }

    /// Parse a language name as used in configuration (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.dialect().name().eq_ignore_ascii_case(s))
    }

    /// The line recognizers for this language
    pub fn dialect(&self) -> &'static dyn Dialect {
        match self {
            Language::Abap => &Abap,
            Language::Java => &Java,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dialect().name())
    }
}
