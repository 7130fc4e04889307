//! Unification Service: structural matching and substitution.
//!
//! The knowledge base consumes exactly two operations from this module:
//!
//! - [`match_statements`]: produce a substitution making two statements
//!   syntactically identical, or report no match.
//! - [`instantiate`]: apply a substitution to a statement template; unbound
//!   variables remain variables.
//!
//! Both are deterministic and side-effect-free. Bindings preserve insertion
//! order so that query output is stable across runs.

use serde::{Deserialize, Serialize};

use crate::term::{Statement, Term};

/// An ordered variable-to-term substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    pairs: Vec<(String, Term)>,
}

impl Bindings {
    /// Create an empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the term a variable is bound to, if any.
    pub fn bound_to(&self, variable: &str) -> Option<&Term> {
        self.pairs
            .iter()
            .find(|(var, _)| var == variable)
            .map(|(_, term)| term)
    }

    /// Iterate over `(variable, term)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.pairs.iter().map(|(var, term)| (var.as_str(), term))
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Bind `variable` to `value` unless it is already bound to a
    /// conflicting term. Returns `false` on conflict.
    fn test_and_bind(&mut self, variable: &str, value: &Term) -> bool {
        match self.bound_to(variable) {
            Some(existing) => existing == value,
            None => {
                self.pairs.push((variable.to_string(), value.clone()));
                true
            }
        }
    }
}

impl std::fmt::Display for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (var, term) in self.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "?{var} : {term}")?;
            first = false;
        }
        Ok(())
    }
}

/// Attempt structural unification of two statements.
///
/// Succeeds when the predicates and arities agree and every argument pair
/// can be reconciled: variables on either side bind to the opposing term
/// (consistently with earlier bindings), constants must be equal.
pub fn match_statements(a: &Statement, b: &Statement) -> Option<Bindings> {
    if a.predicate != b.predicate || a.terms.len() != b.terms.len() {
        return None;
    }
    let mut bindings = Bindings::new();
    for (ta, tb) in a.terms.iter().zip(&b.terms) {
        match (ta, tb) {
            (Term::Variable(var), value) => {
                if !bindings.test_and_bind(var, value) {
                    return None;
                }
            }
            (value, Term::Variable(var)) => {
                if !bindings.test_and_bind(var, value) {
                    return None;
                }
            }
            (Term::Constant(ca), Term::Constant(cb)) => {
                if ca != cb {
                    return None;
                }
            }
        }
    }
    Some(bindings)
}

/// Apply a substitution to a statement template.
///
/// Bound variables are replaced by their terms; unbound variables are kept
/// as variables, so the result may be partially ground.
pub fn instantiate(template: &Statement, bindings: &Bindings) -> Statement {
    let terms = template
        .terms
        .iter()
        .map(|term| match term {
            Term::Variable(var) => bindings.bound_to(var).cloned().unwrap_or_else(|| term.clone()),
            Term::Constant(_) => term.clone(),
        })
        .collect();
    Statement::new(template.predicate.clone(), terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(predicate: &str, terms: &[&str]) -> Statement {
        Statement::new(predicate, terms.iter().map(|t| Term::parse(t)).collect())
    }

    #[test]
    fn ground_statements_match_when_identical() {
        let bindings = match_statements(
            &stmt("parent", &["ada", "bing"]),
            &stmt("parent", &["ada", "bing"]),
        );
        assert_eq!(bindings, Some(Bindings::new()));
    }

    #[test]
    fn predicate_or_arity_mismatch_fails() {
        assert!(match_statements(&stmt("parent", &["ada"]), &stmt("child", &["ada"])).is_none());
        assert!(
            match_statements(&stmt("parent", &["ada"]), &stmt("parent", &["ada", "bing"]))
                .is_none()
        );
    }

    #[test]
    fn variable_binds_to_constant_on_either_side() {
        let b = match_statements(&stmt("isa", &["?x", "block"]), &stmt("isa", &["cube", "block"]))
            .unwrap();
        assert_eq!(b.bound_to("x"), Some(&Term::Constant("cube".into())));

        let b = match_statements(&stmt("isa", &["cube", "block"]), &stmt("isa", &["?y", "block"]))
            .unwrap();
        assert_eq!(b.bound_to("y"), Some(&Term::Constant("cube".into())));
    }

    #[test]
    fn repeated_variable_must_bind_consistently() {
        assert!(match_statements(&stmt("eq", &["?x", "?x"]), &stmt("eq", &["a", "a"])).is_some());
        assert!(match_statements(&stmt("eq", &["?x", "?x"]), &stmt("eq", &["a", "b"])).is_none());
    }

    #[test]
    fn conflicting_constants_fail() {
        assert!(match_statements(&stmt("isa", &["cube"]), &stmt("isa", &["sphere"])).is_none());
    }

    #[test]
    fn instantiate_substitutes_bound_variables() {
        let b = match_statements(&stmt("team", &["?x"]), &stmt("team", &["ada"])).unwrap();
        let out = instantiate(&stmt("plays", &["?x", "?unbound"]), &b);
        assert_eq!(out, stmt("plays", &["ada", "?unbound"]));
    }

    #[test]
    fn match_is_deterministic_in_binding_order() {
        let b = match_statements(&stmt("p", &["?a", "?b"]), &stmt("p", &["one", "two"])).unwrap();
        let order: Vec<&str> = b.iter().map(|(var, _)| var).collect();
        assert_eq!(order, vec!["a", "b"]);
    }
}
