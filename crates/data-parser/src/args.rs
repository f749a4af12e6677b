//! Call-scoped ambient arguments.
//!
//! One `ParserArgs` value accompanies every top-level parse or dump: it
//! carries the direction, behavior flags, resolver handles, and the two
//! diagnostic accumulators. Concurrency safety falls out of ownership:
//! each call owns its args and its destination, so no locking is needed
//! anywhere in the engine.

use crate::diagnostics::{ParseDiag, ParseWarning, PathTracker};
use crate::error::ParseError;
use crate::resolvers::Resolvers;
use crate::version::ProtocolVersion;
use bitflags::bitflags;

bitflags! {
    /// Behavior switches for one call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Behavior: u32 {
        /// Generate schema only; skip value work.
        const SPEC_ONLY = 0x01;
        /// Skip expensive prettification.
        const FAST = 0x02;
        /// Allow lossy-to-JSON shortcuts: bare "Infinity" strings, null
        /// instead of structured tri-state objects, null for unknowns.
        const COMPLEX_VALUES = 0x04;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Parsing,
    Dumping,
}

pub struct ParserArgs<'a> {
    pub direction: Direction,
    pub behavior: Behavior,
    /// Protocol dialect the caller declared; drives removed-field
    /// handling.
    pub version: ProtocolVersion,
    pub resolvers: Resolvers<'a>,
    pub path: PathTracker,
    warnings: Vec<ParseWarning>,
    errors: Vec<ParseDiag>,
}

impl<'a> ParserArgs<'a> {
    pub fn new(direction: Direction, resolvers: Resolvers<'a>) -> Self {
        Self {
            direction,
            behavior: Behavior::empty(),
            version: ProtocolVersion::CURRENT,
            resolvers,
            path: PathTracker::default(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn parsing(resolvers: Resolvers<'a>) -> Self {
        Self::new(Direction::Parsing, resolvers)
    }

    pub fn dumping(resolvers: Resolvers<'a>) -> Self {
        Self::new(Direction::Dumping, resolvers)
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    pub fn is_complex(&self) -> bool {
        self.behavior.contains(Behavior::COMPLEX_VALUES)
    }

    /// Record a non-fatal diagnostic at the current path.
    pub fn warn(&mut self, description: impl Into<String>) {
        let warning = ParseWarning {
            source_path: self.path.materialize(),
            description: description.into(),
        };
        tracing::debug!(path = %warning.source_path, "{}", warning.description);
        self.warnings.push(warning);
    }

    /// Record a fatal-to-the-field diagnostic at the current path.
    #[track_caller]
    pub fn record(&mut self, error: ParseError) {
        let caller = std::panic::Location::caller().to_string();
        let diag = ParseDiag::new(&self.path, error, caller);
        tracing::debug!(
            path = %diag.source_path,
            code = diag.error_code,
            "{}",
            diag.description
        );
        self.errors.push(diag);
    }

    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn errors(&self) -> &[ParseDiag] {
        &self.errors
    }

    /// First recorded error; the top-level return value.
    pub fn first_error(&self) -> Option<&ParseDiag> {
        self.errors.first()
    }

    pub fn take_diagnostics(self) -> (Vec<ParseWarning>, Vec<ParseDiag>) {
        (self.warnings, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_carry_path() {
        let mut args = ParserArgs::parsing(Resolvers::default());
        args.path.push_key("jobs");
        args.path.push_index(2);
        args.path.push_key("nice");
        args.record(ParseError::InvalidNice(99));
        args.warn("suspicious");
        args.path.pop();
        args.path.pop();
        args.path.pop();

        assert_eq!(args.errors().len(), 1);
        assert_eq!(args.errors()[0].source_path, "jobs[2]/nice");
        assert_eq!(args.warnings()[0].source_path, "jobs[2]/nice");
        assert_eq!(
            args.first_error().map(|d| d.error_code),
            Some("INVALID_NICE")
        );
    }

    #[test]
    fn test_behavior_flags() {
        let args = ParserArgs::dumping(Resolvers::default())
            .with_behavior(Behavior::COMPLEX_VALUES | Behavior::FAST);
        assert!(args.is_complex());
        assert!(args.behavior.contains(Behavior::FAST));
        assert!(!args.behavior.contains(Behavior::SPEC_ONLY));
    }
}
