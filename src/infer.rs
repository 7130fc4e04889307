//! Inference engine: the single forward-chaining derivation step.
//!
//! One step takes one fact and one rule and attempts unification between
//! the fact's statement and the rule's *first* premise only. Multi-premise
//! rules are satisfied incrementally: each match reduces the rule by one
//! premise, producing a partial rule that waits for the next matching fact.
//! The knowledge base drives this step for every (new fact, existing rule)
//! and (new rule, existing fact) pair; the engine never iterates the store
//! itself.

use tracing::{debug, trace};

use crate::kb::{FactId, KnowledgeBase, RuleId, Support};
use crate::term::Statement;
use crate::unify;

/// Stateless forward-chaining step executor.
pub struct InferenceEngine;

impl InferenceEngine {
    /// Attempt one derivation from `fact` and `rule` inside `kb`.
    ///
    /// On a first-premise match, either fires the rule (single premise:
    /// a new fact from the instantiated conclusion) or reduces it (multiple
    /// premises: a new rule from the instantiated remainder). The derived
    /// item is recorded with `(fact, rule)` as its justification and added
    /// to the knowledge base, which recurses as needed. No match is a
    /// silent no-op.
    pub(crate) fn fc_infer(kb: &mut KnowledgeBase, fact: FactId, rule: RuleId) {
        let Some(fact_node) = kb.fact(fact) else {
            return;
        };
        let Some(rule_node) = kb.rule(rule) else {
            return;
        };
        let fact_statement = fact_node.statement().clone();
        let lhs = rule_node.lhs().to_vec();
        let rhs = rule_node.rhs().clone();
        let Some(first_premise) = lhs.first() else {
            return;
        };

        let Some(bindings) = unify::match_statements(&fact_statement, first_premise) else {
            trace!(fact = %fact_statement, premise = %first_premise, "no match");
            return;
        };
        let support = Support { fact, rule };

        if lhs.len() == 1 {
            let conclusion = unify::instantiate(&rhs, &bindings);
            debug!(fact = %fact_statement, %conclusion, "rule fired");
            kb.derive_fact(conclusion, support);
        } else {
            let remaining: Vec<Statement> = lhs[1..]
                .iter()
                .map(|premise| unify::instantiate(premise, &bindings))
                .collect();
            let conclusion = unify::instantiate(&rhs, &bindings);
            debug!(
                fact = %fact_statement,
                remaining = remaining.len(),
                "rule partially satisfied"
            );
            kb.derive_rule(remaining, conclusion, support);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::item::Rule;
    use crate::kb::KnowledgeBase;
    use crate::parse::{parse_item, parse_statement};

    // The step itself is private to the crate; these tests exercise it
    // through the knowledge base, one (fact, rule) pairing at a time.

    #[test]
    fn no_match_derives_nothing() {
        let mut kb = KnowledgeBase::new();
        kb.assert_item(parse_item("rule: ((team ?x)) -> (plays ?x)").unwrap());
        kb.assert_item(parse_item("fact: (coach cleo)").unwrap());
        assert_eq!(kb.fact_count(), 1);
    }

    #[test]
    fn single_premise_match_fires_the_rule() {
        let mut kb = KnowledgeBase::new();
        kb.assert_item(parse_item("rule: ((team ?x)) -> (plays ?x)").unwrap());
        kb.assert_item(parse_item("fact: (team ada)").unwrap());
        assert!(kb.contains_fact(&parse_statement("(plays ada)").unwrap()));
    }

    #[test]
    fn multi_premise_match_reduces_the_rule() {
        let mut kb = KnowledgeBase::new();
        kb.assert_item(
            parse_item("rule: ((hero ?x) (visited ?x ?y) (likes ?y ?x)) -> (loves ?x ?y)")
                .unwrap(),
        );
        kb.assert_item(parse_item("fact: (hero ada)").unwrap());

        // Only the first premise is consumed; the rest are instantiated.
        let reduced = Rule::new(
            vec![
                parse_statement("(visited ada ?y)").unwrap(),
                parse_statement("(likes ?y ada)").unwrap(),
            ],
            parse_statement("(loves ada ?y)").unwrap(),
        );
        assert!(kb.contains_rule(&reduced));
        assert_eq!(kb.fact_count(), 1);
    }

    #[test]
    fn only_the_first_premise_is_matched() {
        let mut kb = KnowledgeBase::new();
        kb.assert_item(parse_item("rule: ((hero ?x) (visited ?x ?y)) -> (loves ?x ?y)").unwrap());
        // Matches the second premise, not the first: nothing may happen.
        kb.assert_item(parse_item("fact: (visited ada paris)").unwrap());
        assert_eq!(kb.rule_count(), 1);
        assert_eq!(kb.fact_count(), 1);
    }
}
