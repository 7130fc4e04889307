//! Core statement types for the rekh reasoner.
//!
//! A [`Statement`] is an atomic predicate application such as
//! `parent(ada, bing)` or `parent(?x, bing)`. Each argument is a [`Term`]:
//! either a constant or a variable. Statements are opaque to the knowledge
//! base beyond structural equality and the two unification-service
//! operations in [`crate::unify`].

use serde::{Deserialize, Serialize};

/// One argument position of a statement: a ground constant or a variable.
///
/// Variables are written `?name` at the surface and stored without the `?`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A ground constant, e.g. `ada`.
    Constant(String),
    /// A variable to be bound by unification, e.g. `?x`.
    Variable(String),
}

impl Term {
    /// Returns `true` if this term is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Parse a term from a surface token. Tokens starting with `?` are
    /// variables, everything else is a constant.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        match token.strip_prefix('?') {
            Some(var) => Self::Variable(var.to_string()),
            None => Self::Constant(token.to_string()),
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Constant(c) => write!(f, "{c}"),
            Term::Variable(v) => write!(f, "?{v}"),
        }
    }
}

/// An atomic predicate application: `predicate(term, term, ...)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    /// Predicate name.
    pub predicate: String,
    /// Ordered argument terms.
    pub terms: Vec<Term>,
}

impl Statement {
    /// Create a statement from a predicate name and its terms.
    pub fn new(predicate: impl Into<String>, terms: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            terms,
        }
    }

    /// Returns `true` if every term is a constant.
    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(|t| !t.is_variable())
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.predicate)?;
        for term in &self.terms {
            write!(f, " {term}")?;
        }
        write!(f, ")")
    }
}
