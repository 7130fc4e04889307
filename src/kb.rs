//! Knowledge base: statement store, support graph, and truth-maintained
//! mutation.
//!
//! Facts and rules live in two append-only arenas addressed by [`FactId`]
//! and [`RuleId`] handles. Justification links are handle cross-references,
//! never owning pointers: each derived node records the `(fact, rule)` pairs
//! that produced it (`supported_by`), and each supporter records the nodes
//! it helped derive (`supports_facts` / `supports_rules`). Removal is a
//! graph edit over those edges; a slot whose node is removed is tombstoned
//! so handles stay stable.
//!
//! Every public mutation runs to completion before returning, including all
//! cascading derivation and removal recursion. The store invariant: a node
//! that is not asserted and has no justification pair must not remain live.
//! Violations of the edge bookkeeping itself (a reverse edge whose pair is
//! missing, removing a dead node) panic — they are internal-consistency
//! faults, not recoverable errors.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::KbError;
use crate::infer::InferenceEngine;
use crate::item::{Fact, Item, Rule};
use crate::term::Statement;
use crate::unify::{self, Bindings};

// ---------------------------------------------------------------------------
// Handles and support edges
// ---------------------------------------------------------------------------

/// Stable handle to a fact slot in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FactId(usize);

/// Stable handle to a rule slot in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RuleId(usize);

/// Handle to either kind of node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemId {
    Fact(FactId),
    Rule(RuleId),
}

/// One justification: the derivation `(fact, rule)` that produced a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Support {
    pub fact: FactId,
    pub rule: RuleId,
}

impl Support {
    fn references(&self, id: ItemId) -> bool {
        match id {
            ItemId::Fact(f) => self.fact == f,
            ItemId::Rule(r) => self.rule == r,
        }
    }

    /// The pair member that is not `id`.
    fn partner(&self, id: ItemId) -> ItemId {
        match id {
            ItemId::Fact(_) => ItemId::Rule(self.rule),
            ItemId::Rule(_) => ItemId::Fact(self.fact),
        }
    }
}

// ---------------------------------------------------------------------------
// Store nodes
// ---------------------------------------------------------------------------

/// A fact held in the store, with its support bookkeeping.
#[derive(Debug)]
pub struct FactNode {
    statement: Statement,
    asserted: bool,
    supported_by: Vec<Support>,
    supports_facts: Vec<FactId>,
    supports_rules: Vec<RuleId>,
    live: bool,
}

impl FactNode {
    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// True if this fact was given directly by a caller (independently true
    /// regardless of derivations).
    pub fn asserted(&self) -> bool {
        self.asserted
    }

    /// The justification pairs recorded for this fact, in derivation order.
    pub fn supported_by(&self) -> &[Support] {
        &self.supported_by
    }
}

/// A rule held in the store, with its support bookkeeping.
#[derive(Debug)]
pub struct RuleNode {
    lhs: Vec<Statement>,
    rhs: Statement,
    asserted: bool,
    supported_by: Vec<Support>,
    supports_facts: Vec<FactId>,
    supports_rules: Vec<RuleId>,
    live: bool,
}

impl RuleNode {
    pub fn lhs(&self) -> &[Statement] {
        &self.lhs
    }

    pub fn rhs(&self) -> &Statement {
        &self.rhs
    }

    pub fn asserted(&self) -> bool {
        self.asserted
    }

    pub fn supported_by(&self) -> &[Support] {
        &self.supported_by
    }
}

// ---------------------------------------------------------------------------
// Query results
// ---------------------------------------------------------------------------

/// One successful unification from an ask: the substitution plus a snapshot
/// of the fact that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct BindingEntry {
    pub bindings: Bindings,
    pub fact: Fact,
}

/// All matches found for one ask, at the time of the call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BindingSet {
    pub entries: Vec<BindingEntry>,
}

impl BindingSet {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Display for BindingSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if entry.bindings.is_empty() {
                write!(f, "true  <- {}", entry.fact.statement)?;
            } else {
                write!(f, "{}  <- {}", entry.bindings, entry.fact.statement)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Retraction policy
// ---------------------------------------------------------------------------

/// How the removal cascade treats dependents after unlinking one of their
/// justifications. See DESIGN.md for the full rationale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetractionPolicy {
    /// Recurse into a dependent only when it is left unjustified: no
    /// remaining support pairs and not asserted. Intended truth-maintenance
    /// semantics; the default.
    #[default]
    Checked,
    /// Recurse into every dependent unconditionally, guarded only by the
    /// supported test at removal entry. Reproduces the historical cascade,
    /// which removes a dependent that lost its last pair even when the
    /// dependent is still asserted.
    Legacy,
}

// ---------------------------------------------------------------------------
// Knowledge base
// ---------------------------------------------------------------------------

/// The knowledge base: fact and rule stores plus the mutation engine.
///
/// Mutated only through [`assert_item`](Self::assert_item),
/// [`retract`](Self::retract), and internally through derivation.
#[derive(Debug, Default)]
pub struct KnowledgeBase {
    facts: Vec<FactNode>,
    rules: Vec<RuleNode>,
    policy: RetractionPolicy,
}

impl KnowledgeBase {
    /// Create an empty knowledge base with the default (checked) policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty knowledge base with an explicit retraction policy.
    pub fn with_policy(policy: RetractionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Create a knowledge base pre-seeded with the given items.
    pub fn seeded(items: impl IntoIterator<Item = Item>) -> Self {
        let mut kb = Self::new();
        for item in items {
            kb.assert_item(item);
        }
        kb
    }

    // -- read-only views ---------------------------------------------------

    /// Live facts in insertion order.
    pub fn facts(&self) -> impl Iterator<Item = &FactNode> {
        self.facts.iter().filter(|n| n.live)
    }

    /// Live rules in insertion order.
    pub fn rules(&self) -> impl Iterator<Item = &RuleNode> {
        self.rules.iter().filter(|n| n.live)
    }

    pub fn fact_count(&self) -> usize {
        self.facts().count()
    }

    pub fn rule_count(&self) -> usize {
        self.rules().count()
    }

    /// Resolve a fact handle. `None` if the slot was removed.
    pub fn fact(&self, id: FactId) -> Option<&FactNode> {
        self.facts.get(id.0).filter(|n| n.live)
    }

    /// Resolve a rule handle. `None` if the slot was removed.
    pub fn rule(&self, id: RuleId) -> Option<&RuleNode> {
        self.rules.get(id.0).filter(|n| n.live)
    }

    /// Find the stored fact structurally equal to `statement`.
    pub fn lookup_fact(&self, statement: &Statement) -> Option<FactId> {
        self.facts
            .iter()
            .position(|n| n.live && n.statement == *statement)
            .map(FactId)
    }

    /// Find the stored rule structurally equal to `rule`.
    pub fn lookup_rule(&self, rule: &Rule) -> Option<RuleId> {
        self.rules
            .iter()
            .position(|n| n.live && n.lhs == rule.lhs && n.rhs == rule.rhs)
            .map(RuleId)
    }

    pub fn contains_fact(&self, statement: &Statement) -> bool {
        self.lookup_fact(statement).is_some()
    }

    pub fn contains_rule(&self, rule: &Rule) -> bool {
        self.lookup_rule(rule).is_some()
    }

    /// True iff the stored item matching `item` carries at least one
    /// complete justification pair.
    ///
    /// The historical store kept supporters in one flat list, two entries
    /// per derivation, and tested `len > 1`; over `(fact, rule)` pairs that
    /// is exactly "has a justification". An item with no pairs is eligible
    /// for removal unless it is asserted.
    pub fn is_supported(&self, item: &Item) -> bool {
        match item {
            Item::Fact(fact) => self
                .lookup_fact(&fact.statement)
                .is_some_and(|id| !self.facts[id.0].supported_by.is_empty()),
            Item::Rule(rule) => self
                .lookup_rule(rule)
                .is_some_and(|id| !self.rules[id.0].supported_by.is_empty()),
        }
    }

    // -- public mutation ---------------------------------------------------

    /// Assert a fact or rule given directly by a caller.
    ///
    /// A fresh item is appended to its store and forward-chained against
    /// every existing item of the complementary kind, recursing through any
    /// nested derivations until no new one appears. Re-asserting an existing
    /// item only marks it asserted.
    pub fn assert_item(&mut self, item: Item) {
        info!(%item, "asserting");
        match item {
            Item::Fact(fact) => {
                let (id, fresh) = self.insert_or_merge_fact(fact.statement, None);
                if fresh {
                    self.chain_fact(id);
                }
            }
            Item::Rule(rule) => {
                let (id, fresh) = self.insert_or_merge_rule(rule.lhs, rule.rhs, None);
                if fresh {
                    self.chain_rule(id);
                }
            }
        }
    }

    /// Query the store for facts unifying with a fact-shaped query.
    ///
    /// Returns every match found at the time of the call. No matches is an
    /// empty `Ok`; a non-fact query is an invalid ask and an error.
    pub fn ask(&self, query: &Item) -> Result<BindingSet, KbError> {
        let Item::Fact(fact) = query else {
            return Err(KbError::InvalidAsk {
                query: query.to_string(),
            });
        };
        let mut set = BindingSet::default();
        for node in self.facts() {
            if let Some(bindings) = unify::match_statements(&fact.statement, &node.statement) {
                set.entries.push(BindingEntry {
                    bindings,
                    fact: Fact::new(node.statement.clone()),
                });
            }
        }
        Ok(set)
    }

    /// Retract a fact given by a caller.
    ///
    /// Only facts are retractable; rules and unknown facts are silent
    /// no-ops. A supported, asserted fact merely loses its asserted flag and
    /// survives on its derivations. A supported, non-asserted fact is left
    /// alone (removal must come from support withdrawal). An unsupported
    /// fact is removed outright, cascading per the configured policy.
    pub fn retract(&mut self, item: &Item) {
        let Item::Fact(fact) = item else {
            debug!(%item, "retract ignores rules");
            return;
        };
        info!(%fact, "retracting");
        let Some(id) = self.lookup_fact(&fact.statement) else {
            return;
        };
        let node = &mut self.facts[id.0];
        let supported = !node.supported_by.is_empty();
        if supported && node.asserted {
            node.asserted = false;
            return;
        }
        if supported {
            return;
        }
        self.remove(ItemId::Fact(id));
    }

    // -- internal add / merge ----------------------------------------------

    /// Record a derived fact: resolve it to a canonical store node (fresh or
    /// merged), mirror the justification onto its supporters' reverse edges,
    /// then chain a fresh node against every existing rule.
    pub(crate) fn derive_fact(&mut self, statement: Statement, support: Support) {
        let (id, fresh) = self.insert_or_merge_fact(statement, Some(support));
        let supporter = &mut self.facts[support.fact.0].supports_facts;
        if !supporter.contains(&id) {
            supporter.push(id);
        }
        let supporter = &mut self.rules[support.rule.0].supports_facts;
        if !supporter.contains(&id) {
            supporter.push(id);
        }
        if fresh {
            self.chain_fact(id);
        }
    }

    /// Record a derived (partial) rule; mirror image of
    /// [`derive_fact`](Self::derive_fact).
    pub(crate) fn derive_rule(&mut self, lhs: Vec<Statement>, rhs: Statement, support: Support) {
        let (id, fresh) = self.insert_or_merge_rule(lhs, rhs, Some(support));
        let supporter = &mut self.facts[support.fact.0].supports_rules;
        if !supporter.contains(&id) {
            supporter.push(id);
        }
        let supporter = &mut self.rules[support.rule.0].supports_rules;
        if !supporter.contains(&id) {
            supporter.push(id);
        }
        if fresh {
            self.chain_rule(id);
        }
    }

    fn insert_or_merge_fact(
        &mut self,
        statement: Statement,
        support: Option<Support>,
    ) -> (FactId, bool) {
        if let Some(id) = self.lookup_fact(&statement) {
            debug!(%statement, "merging into existing fact");
            match support {
                Some(s) => self.facts[id.0].supported_by.push(s),
                None => self.facts[id.0].asserted = true,
            }
            return (id, false);
        }
        debug!(%statement, derived = support.is_some(), "adding fact");
        let id = FactId(self.facts.len());
        self.facts.push(FactNode {
            statement,
            asserted: support.is_none(),
            supported_by: support.into_iter().collect(),
            supports_facts: Vec::new(),
            supports_rules: Vec::new(),
            live: true,
        });
        (id, true)
    }

    fn insert_or_merge_rule(
        &mut self,
        lhs: Vec<Statement>,
        rhs: Statement,
        support: Option<Support>,
    ) -> (RuleId, bool) {
        let probe = Rule::new(lhs, rhs);
        if let Some(id) = self.lookup_rule(&probe) {
            debug!(rule = %probe, "merging into existing rule");
            match support {
                Some(s) => self.rules[id.0].supported_by.push(s),
                None => self.rules[id.0].asserted = true,
            }
            return (id, false);
        }
        debug!(rule = %probe, derived = support.is_some(), "adding rule");
        let id = RuleId(self.rules.len());
        self.rules.push(RuleNode {
            lhs: probe.lhs,
            rhs: probe.rhs,
            asserted: support.is_none(),
            supported_by: support.into_iter().collect(),
            supports_facts: Vec::new(),
            supports_rules: Vec::new(),
            live: true,
        });
        (id, true)
    }

    /// Attempt a derivation step for the new fact against a snapshot of the
    /// live rules. Nested adds re-enter through `derive_*`, so the snapshot
    /// still reaches a global fixpoint.
    fn chain_fact(&mut self, id: FactId) {
        let rule_ids: Vec<RuleId> = (0..self.rules.len())
            .filter(|&i| self.rules[i].live)
            .map(RuleId)
            .collect();
        for rule_id in rule_ids {
            InferenceEngine::fc_infer(self, id, rule_id);
        }
    }

    /// Attempt a derivation step for the new rule against a snapshot of the
    /// live facts.
    fn chain_rule(&mut self, id: RuleId) {
        let fact_ids: Vec<FactId> = (0..self.facts.len())
            .filter(|&i| self.facts[i].live)
            .map(FactId)
            .collect();
        for fact_id in fact_ids {
            InferenceEngine::fc_infer(self, fact_id, id);
        }
    }

    // -- cascading removal -------------------------------------------------

    /// Remove a node and cascade through its dependents.
    ///
    /// Every support pair referencing the node is unlinked from each
    /// dependent (scrubbing the partner's reverse edge as well, so the graph
    /// stays closed), then dependents are recursed into per the policy, and
    /// finally the node's slot is tombstoned.
    ///
    /// Dependents are drained one at a time rather than snapshotted: a
    /// nested cascade may itself unlink edges of this node, and the live
    /// lists must reflect that before the next dependent is taken.
    fn remove(&mut self, id: ItemId) {
        if self.policy == RetractionPolicy::Legacy && self.pair_count(id) > 0 {
            return;
        }
        debug!(item = %self.describe(id), "removing");

        // Dependent rules first, then facts, matching historical order.
        while let Some(dep) = self.pop_dependent_rule(id) {
            self.unlink(ItemId::Rule(dep), id);
            if self.should_cascade(ItemId::Rule(dep)) {
                self.remove(ItemId::Rule(dep));
            }
        }
        while let Some(dep) = self.pop_dependent_fact(id) {
            self.unlink(ItemId::Fact(dep), id);
            if self.should_cascade(ItemId::Fact(dep)) {
                self.remove(ItemId::Fact(dep));
            }
        }

        self.tombstone(id);
    }

    fn pop_dependent_rule(&mut self, id: ItemId) -> Option<RuleId> {
        let list = match id {
            ItemId::Fact(f) => &mut self.facts[f.0].supports_rules,
            ItemId::Rule(r) => &mut self.rules[r.0].supports_rules,
        };
        if list.is_empty() { None } else { Some(list.remove(0)) }
    }

    fn pop_dependent_fact(&mut self, id: ItemId) -> Option<FactId> {
        let list = match id {
            ItemId::Fact(f) => &mut self.facts[f.0].supports_facts,
            ItemId::Rule(r) => &mut self.rules[r.0].supports_facts,
        };
        if list.is_empty() { None } else { Some(list.remove(0)) }
    }

    fn should_cascade(&self, dep: ItemId) -> bool {
        match self.policy {
            // Recursion itself is unconditional; the supported guard at
            // removal entry decides.
            RetractionPolicy::Legacy => true,
            RetractionPolicy::Checked => match dep {
                ItemId::Fact(f) => {
                    let node = &self.facts[f.0];
                    !node.asserted && node.supported_by.is_empty()
                }
                ItemId::Rule(r) => {
                    let node = &self.rules[r.0];
                    !node.asserted && node.supported_by.is_empty()
                }
            },
        }
    }

    /// Drop every justification pair of `dep` that references `removed`,
    /// and scrub `dep` from each dropped pair's partner reverse edges.
    ///
    /// A dropped pair's partner keeps its reverse edge while any kept pair
    /// still references it, so a later removal of the partner still finds
    /// and unlinks `dep`.
    ///
    /// Panics if no pair references `removed`: a reverse edge promised one,
    /// so its absence means the support graph is corrupt.
    fn unlink(&mut self, dep: ItemId, removed: ItemId) {
        let supported_by = match dep {
            ItemId::Fact(f) => std::mem::take(&mut self.facts[f.0].supported_by),
            ItemId::Rule(r) => std::mem::take(&mut self.rules[r.0].supported_by),
        };
        let (dropped, kept): (Vec<Support>, Vec<Support>) =
            supported_by.into_iter().partition(|s| s.references(removed));
        assert!(
            !dropped.is_empty(),
            "support graph corrupt: reverse edge to {} has no matching pair",
            self.describe(dep),
        );
        for pair in &dropped {
            let partner = pair.partner(removed);
            if !kept.iter().any(|s| s.references(partner)) {
                self.scrub_reverse_edge(partner, dep);
            }
        }
        match dep {
            ItemId::Fact(f) => self.facts[f.0].supported_by = kept,
            ItemId::Rule(r) => self.rules[r.0].supported_by = kept,
        }
    }

    /// Remove `dep` from `supporter`'s reverse edge lists.
    fn scrub_reverse_edge(&mut self, supporter: ItemId, dep: ItemId) {
        let (supports_facts, supports_rules) = match supporter {
            ItemId::Fact(f) => {
                let node = &mut self.facts[f.0];
                (&mut node.supports_facts, &mut node.supports_rules)
            }
            ItemId::Rule(r) => {
                let node = &mut self.rules[r.0];
                (&mut node.supports_facts, &mut node.supports_rules)
            }
        };
        match dep {
            ItemId::Fact(f) => supports_facts.retain(|&d| d != f),
            ItemId::Rule(r) => supports_rules.retain(|&d| d != r),
        }
    }

    fn tombstone(&mut self, id: ItemId) {
        // A node only reaches this point with no remaining justification:
        // the retract gates and cascade guards filter everything else.
        assert!(
            self.pair_count(id) == 0,
            "support graph corrupt: node removed while still justified",
        );
        let live = match id {
            ItemId::Fact(f) => std::mem::replace(&mut self.facts[f.0].live, false),
            ItemId::Rule(r) => std::mem::replace(&mut self.rules[r.0].live, false),
        };
        assert!(live, "support graph corrupt: node removed twice");
    }

    fn pair_count(&self, id: ItemId) -> usize {
        match id {
            ItemId::Fact(f) => self.facts[f.0].supported_by.len(),
            ItemId::Rule(r) => self.rules[r.0].supported_by.len(),
        }
    }

    fn describe(&self, id: ItemId) -> String {
        match id {
            ItemId::Fact(f) => self.facts[f.0].statement.to_string(),
            ItemId::Rule(r) => {
                Rule::new(self.rules[r.0].lhs.clone(), self.rules[r.0].rhs.clone()).to_string()
            }
        }
    }
}

impl std::fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Knowledge base:")?;
        for node in self.facts() {
            let marker = if node.asserted { "" } else { "  [derived]" };
            writeln!(f, "fact: {}{marker}", node.statement)?;
        }
        for node in self.rules() {
            let marker = if node.asserted { "" } else { "  [derived]" };
            let rule = Rule::new(node.lhs.clone(), node.rhs.clone());
            writeln!(f, "{rule}{marker}")?;
        }
        Ok(())
    }
}
