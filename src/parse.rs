//! Surface parser for knowledge files.
//!
//! The line-oriented text format:
//!
//! ```text
//! # comment
//! fact: (team ada)
//! rule: ((hero ?x) (visited ?x ?y)) -> (loves ?x ?y)
//! ```
//!
//! Statements are s-expression-ish: a predicate followed by terms inside
//! parentheses, variables prefixed with `?`. Parsing produces [`Item`]s
//! ready to be asserted into a [`crate::kb::KnowledgeBase`]; it never
//! touches the store itself.

use std::path::Path;

use crate::error::ParseError;
use crate::item::{Fact, Item, Rule};
use crate::term::{Statement, Term};

/// Parse a single statement like `(parent ?x bing)`.
///
/// For standalone input (e.g. a CLI query argument) the reported line
/// number is 1; the file loader reports real positions.
pub fn parse_statement(src: &str) -> Result<Statement, ParseError> {
    statement(src, 1)
}

/// Parse one `fact:` or `rule:` line into an [`Item`].
pub fn parse_item(src: &str) -> Result<Item, ParseError> {
    item(src, 1)
}

/// Parse a whole knowledge file body. Blank lines and `#` comments are
/// skipped; every other line must be a directive.
pub fn load_str(src: &str) -> Result<Vec<Item>, ParseError> {
    let mut items = Vec::new();
    for (idx, raw) in src.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        items.push(item(line, idx + 1)?);
    }
    Ok(items)
}

/// Read and parse a knowledge file from disk.
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Item>, ParseError> {
    let content =
        std::fs::read_to_string(path.as_ref()).map_err(|source| ParseError::Io { source })?;
    load_str(&content)
}

fn item(src: &str, line: usize) -> Result<Item, ParseError> {
    let src = src.trim();
    if let Some(body) = src.strip_prefix("fact:") {
        return Ok(Item::Fact(Fact::new(statement(body, line)?)));
    }
    if let Some(body) = src.strip_prefix("rule:") {
        return Ok(Item::Rule(rule(body, line)?));
    }
    let directive = src.split(':').next().unwrap_or(src).trim();
    Err(ParseError::UnknownDirective {
        line,
        directive: directive.to_string(),
    })
}

fn statement(src: &str, line: usize) -> Result<Statement, ParseError> {
    let src = src.trim();
    let inner = src
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| ParseError::Statement {
            line,
            message: format!("expected '(predicate terms...)', got '{src}'"),
        })?;
    // No nesting inside a statement, so a stray paren means a group was
    // passed where a single statement belongs.
    if inner.contains('(') || inner.contains(')') {
        return Err(ParseError::Statement {
            line,
            message: format!("nested parentheses in '{src}'"),
        });
    }
    let mut tokens = inner.split_whitespace();
    let predicate = tokens.next().ok_or_else(|| ParseError::Statement {
        line,
        message: "empty statement".to_string(),
    })?;
    if predicate.starts_with('?') {
        return Err(ParseError::Statement {
            line,
            message: format!("predicate '{predicate}' cannot be a variable"),
        });
    }
    Ok(Statement::new(predicate, tokens.map(Term::parse).collect()))
}

fn rule(src: &str, line: usize) -> Result<Rule, ParseError> {
    let (lhs_src, rhs_src) = src.split_once("->").ok_or_else(|| ParseError::Rule {
        line,
        message: "missing '->' between premises and conclusion".to_string(),
    })?;
    let premises = statement_group(lhs_src, line)?;
    if premises.is_empty() {
        return Err(ParseError::Rule {
            line,
            message: "a rule needs at least one premise".to_string(),
        });
    }
    Ok(Rule::new(premises, statement(rhs_src, line)?))
}

/// Split `((a ?x) (b ?x ?y))` into its top-level statements.
fn statement_group(src: &str, line: usize) -> Result<Vec<Statement>, ParseError> {
    let src = src.trim();
    let inner = src
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| ParseError::Rule {
            line,
            message: format!("premises must be wrapped in parentheses, got '{src}'"),
        })?;

    let mut statements = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    for (pos, ch) in inner.char_indices() {
        match ch {
            '(' => {
                if depth == 0 {
                    start = Some(pos);
                }
                depth += 1;
            }
            ')' => {
                if depth == 0 {
                    return Err(ParseError::Rule {
                        line,
                        message: format!("unbalanced parentheses in '{src}'"),
                    });
                }
                depth -= 1;
                if depth == 0 {
                    let group = &inner[start.take().unwrap_or(pos)..=pos];
                    statements.push(statement(group, line)?);
                }
            }
            c if !c.is_whitespace() && depth == 0 => {
                return Err(ParseError::Rule {
                    line,
                    message: format!("unexpected token outside premise: '{c}'"),
                });
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ParseError::Rule {
            line,
            message: format!("unbalanced parentheses in '{src}'"),
        });
    }
    Ok(statements)
}
