//! # rekh
//!
//! A minimal forward-chaining deductive reasoner with truth maintenance.
//! Facts and rules are asserted into a [`kb::KnowledgeBase`]; every
//! assertion is immediately chained against the store, deriving new facts
//! and rules to a fixpoint, and every derivation records the `(fact, rule)`
//! justification that produced it. Retracting a premise withdraws
//! everything that loses its last justification.
//!
//! ## Architecture
//!
//! - **Terms** (`term`): statements as predicate applications over
//!   constants and variables
//! - **Unification** (`unify`): structural matching and substitution,
//!   consumed as a black-box service by the core
//! - **Store + support graph** (`kb`): arena-backed fact/rule stores with
//!   bidirectional justification edges and the assert/ask/retract engine
//! - **Inference** (`infer`): the single forward-chaining derivation step
//! - **Parsing** (`parse`): the `fact:` / `rule:` surface format
//!
//! ## Library usage
//!
//! ```
//! use rekh::kb::KnowledgeBase;
//! use rekh::parse::{parse_item, parse_statement};
//!
//! let mut kb = KnowledgeBase::new();
//! kb.assert_item(parse_item("fact: (team ada)").unwrap());
//! kb.assert_item(parse_item("rule: ((team ?x)) -> (plays ?x)").unwrap());
//! assert!(kb.contains_fact(&parse_statement("(plays ada)").unwrap()));
//!
//! kb.retract(&parse_item("fact: (team ada)").unwrap());
//! assert!(!kb.contains_fact(&parse_statement("(plays ada)").unwrap()));
//! ```

pub mod error;
pub mod infer;
pub mod item;
pub mod kb;
pub mod parse;
pub mod term;
pub mod unify;
