//! Rich diagnostic error types for the rekh reasoner.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes and help text so users know exactly what
//! went wrong and how to fix it. Support-graph invariant violations are
//! deliberately *not* represented here: they are internal-consistency
//! faults and panic instead (see [`crate::kb`]).

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the rekh reasoner.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum RekhError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Kb(#[from] KbError),
}

// ---------------------------------------------------------------------------
// Parser errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("I/O error reading knowledge file: {source}")]
    #[diagnostic(
        code(rekh::parse::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: unknown directive '{directive}'")]
    #[diagnostic(
        code(rekh::parse::unknown_directive),
        help("Each non-empty line must start with 'fact:' or 'rule:'.")
    )]
    UnknownDirective { line: usize, directive: String },

    #[error("line {line}: malformed statement: {message}")]
    #[diagnostic(
        code(rekh::parse::statement),
        help(
            "Statements are written '(predicate term term ...)' with at least \
             a predicate inside balanced parentheses. Variables start with '?'."
        )
    )]
    Statement { line: usize, message: String },

    #[error("line {line}: malformed rule: {message}")]
    #[diagnostic(
        code(rekh::parse::rule),
        help(
            "Rules are written 'rule: ((premise) (premise) ...) -> (conclusion)' \
             with at least one premise on the left of '->'."
        )
    )]
    Rule { line: usize, message: String },
}

// ---------------------------------------------------------------------------
// Knowledge-base errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum KbError {
    #[error("invalid ask: {query}")]
    #[diagnostic(
        code(rekh::kb::invalid_ask),
        help(
            "Only fact-shaped queries can be asked. Rules are not queryable; \
             wrap the statement you want matched as a fact."
        )
    )]
    InvalidAsk { query: String },
}

/// Convenience alias for functions returning rekh results.
pub type RekhResult<T> = std::result::Result<T, RekhError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_converts_to_rekh_error() {
        let err = ParseError::UnknownDirective {
            line: 3,
            directive: "facts".into(),
        };
        let rekh: RekhError = err.into();
        assert!(matches!(
            rekh,
            RekhError::Parse(ParseError::UnknownDirective { .. })
        ));
    }

    #[test]
    fn kb_error_converts_to_rekh_error() {
        let err = KbError::InvalidAsk {
            query: "rule: ((a ?x)) -> (b ?x)".into(),
        };
        let rekh: RekhError = err.into();
        assert!(matches!(rekh, RekhError::Kb(KbError::InvalidAsk { .. })));
    }

    #[test]
    fn error_display_messages_are_descriptive() {
        let err = ParseError::Statement {
            line: 7,
            message: "empty statement".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("line 7"));
        assert!(msg.contains("empty statement"));
    }
}
