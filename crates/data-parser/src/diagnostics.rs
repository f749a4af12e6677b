//! Per-field diagnostics and the parent-path breadcrumb.
//!
//! Warnings never fail a call. Errors are fatal to the field (or subtree)
//! they describe but the top-level call keeps going, so a REST client sees
//! every offending field of a bad request in one response.

use crate::error::ParseError;
use serde::Serialize;
use std::fmt;

/// One component of the source path under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathToken {
    Key(String),
    Index(usize),
}

/// Breadcrumb of the current descent, e.g. `associations[3]/max/tres`.
///
/// Every recursion pushes exactly one token and pops it on exit; the
/// materialized form is only built when a diagnostic is recorded.
#[derive(Debug, Clone, Default)]
pub struct PathTracker {
    tokens: Vec<PathToken>,
}

impl PathTracker {
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.tokens.push(PathToken::Key(key.into()));
    }

    /// jq-style 0-based list index, rendered attached to its list name.
    pub fn push_index(&mut self, index: usize) {
        self.tokens.push(PathToken::Index(index));
    }

    pub fn pop(&mut self) {
        self.tokens.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Slash-delimited rendering; indices merge into the preceding key.
    pub fn materialize(&self) -> String {
        let mut segments: Vec<String> = Vec::new();
        for token in &self.tokens {
            match token {
                PathToken::Key(k) => segments.push(k.clone()),
                PathToken::Index(i) => match segments.last_mut() {
                    Some(last) => last.push_str(&format!("[{i}]")),
                    None => segments.push(format!("[{i}]")),
                },
            }
        }
        segments.join("/")
    }
}

impl fmt::Display for PathTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.materialize())
    }
}

/// Non-fatal diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseWarning {
    pub source_path: String,
    pub description: String,
}

/// Fatal-to-the-field diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct ParseDiag {
    pub source_path: String,
    pub description: String,
    pub error: ParseError,
    /// Wire-visible error kind, duplicated out of `error` for clients
    /// that only look at the code.
    pub error_code: &'static str,
    pub caller: String,
}

impl ParseDiag {
    pub fn new(path: &PathTracker, error: ParseError, caller: String) -> Self {
        Self {
            source_path: path.materialize(),
            description: error.to_string(),
            error_code: error.wire_name(),
            error,
            caller,
        }
    }
}
