//! Input-level facts, rules, and the [`Item`] tagged union.
//!
//! These are the shapes callers hand to the knowledge base. Inside the
//! store they become arena nodes with support bookkeeping attached
//! (see [`crate::kb`]); out here they are plain data.

use serde::{Deserialize, Serialize};

use crate::term::Statement;

/// An atomic fact: one statement held to be true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub statement: Statement,
}

impl Fact {
    pub fn new(statement: Statement) -> Self {
        Self { statement }
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fact: {}", self.statement)
    }
}

/// A conditional derivation statement: if every `lhs` premise holds, `rhs`
/// holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Ordered premises. Forward chaining always matches against the first
    /// premise; multi-premise rules are satisfied incrementally.
    pub lhs: Vec<Statement>,
    /// Conclusion instantiated when the premises are satisfied.
    pub rhs: Statement,
}

impl Rule {
    pub fn new(lhs: Vec<Statement>, rhs: Statement) -> Self {
        Self { lhs, rhs }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule: (")?;
        for (i, premise) in self.lhs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{premise}")?;
        }
        write!(f, ") -> {}", self.rhs)
    }
}

/// Either a fact or a rule.
///
/// Dispatch between the two kinds happens by pattern matching on this enum,
/// never by runtime type inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Fact(Fact),
    Rule(Rule),
}

impl From<Fact> for Item {
    fn from(fact: Fact) -> Self {
        Item::Fact(fact)
    }
}

impl From<Rule> for Item {
    fn from(rule: Rule) -> Self {
        Item::Rule(rule)
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Item::Fact(fact) => write!(f, "{fact}"),
            Item::Rule(rule) => write!(f, "{rule}"),
        }
    }
}
