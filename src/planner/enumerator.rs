//! Enumeration driver
//!
//! Owns the canonical tree, its memo and the selection state, and hands out
//! tagged clones of the tree one at a time.
//!
//! # State machine
//!
//! ```text
//! Uninitialized --initialize()--> Staged --produce_next()--> Exhausted
//! ```
//!
//! `initialize()` builds the memo once and, when the root is indexable,
//! tags the canonical tree with the first selection. `produce_next()` clones
//! that tagged tree for the caller and strips the tags off the canonical
//! copy. Only one plan is produced today; [`PlanEnumerator::advance_selection`]
//! is where further selections would be staged.

use super::catalog::IndexCatalog;
use super::compound::CompoundExtender;
use super::config::EnumeratorConfig;
use super::errors::consistency_violation;
use super::explain::ExplainPlan;
use super::expr::MatchExpr;
use super::memo::{Memo, MemoBuilder, NodeId};
use super::normalize::{IndexednessSort, OutputNormalizer};
use super::select::{select, SelectionState};
use crate::observability::{log_event, log_event_with_fields, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumeratorState {
    Uninitialized,
    /// Memo built; a candidate may be waiting
    Staged,
    /// Nothing more will be produced
    Exhausted,
}

impl EnumeratorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnumeratorState::Uninitialized => "UNINITIALIZED",
            EnumeratorState::Staged => "STAGED",
            EnumeratorState::Exhausted => "EXHAUSTED",
        }
    }
}

/// Outcome of [`PlanEnumerator::initialize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// The root is indexable and a tagged candidate is staged
    CandidateStaged,
    /// No index assignment exists for this tree
    NoCandidate,
}

impl InitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitStatus::CandidateStaged => "CANDIDATE_STAGED",
            InitStatus::NoCandidate => "NO_CANDIDATE",
        }
    }

    pub fn has_candidate(&self) -> bool {
        matches!(self, InitStatus::CandidateStaged)
    }
}

/// Produces index-tagged copies of a predicate tree
pub struct PlanEnumerator<'a> {
    root: MatchExpr,
    catalog: &'a IndexCatalog,
    config: EnumeratorConfig,
    normalizer: Box<dyn OutputNormalizer>,
    memo: Memo,
    root_id: Option<NodeId>,
    selection: SelectionState,
    state: EnumeratorState,
    status: Option<InitStatus>,
    candidate_ready: bool,
}

impl<'a> PlanEnumerator<'a> {
    /// Takes ownership of a relevance-annotated tree
    pub fn new(root: MatchExpr, catalog: &'a IndexCatalog) -> Self {
        Self::with_config(root, catalog, EnumeratorConfig::default())
    }

    pub fn with_config(root: MatchExpr, catalog: &'a IndexCatalog, config: EnumeratorConfig) -> Self {
        Self {
            root,
            catalog,
            config,
            normalizer: Box::new(IndexednessSort),
            memo: Memo::default(),
            root_id: None,
            selection: SelectionState::new(),
            state: EnumeratorState::Uninitialized,
            status: None,
            candidate_ready: false,
        }
    }

    /// Replaces the output normalization pass
    pub fn with_normalizer(mut self, normalizer: Box<dyn OutputNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Builds the memo and stages the first candidate.
    ///
    /// Idempotent: later calls return the first call's status without
    /// rebuilding, since relevance tags are consumed by the first build.
    pub fn initialize(&mut self) -> InitStatus {
        if let Some(status) = self.status {
            return status;
        }

        let (memo, root_id, indexable) = MemoBuilder::build(&mut self.root);
        self.root.clear_tags();
        self.memo = memo;
        self.root_id = root_id;

        let nodes = self.memo.len().to_string();
        log_event_with_fields(
            Event::MemoBuilt,
            &[
                ("indexable", if indexable { "true" } else { "false" }),
                ("nodes", nodes.as_str()),
            ],
        );

        let status = if indexable {
            self.stage();
            log_event(Event::CandidateStaged);
            InitStatus::CandidateStaged
        } else {
            log_event(Event::NoCandidate);
            InitStatus::NoCandidate
        };

        self.state = EnumeratorState::Staged;
        self.status = Some(status);
        status
    }

    /// Returns the next tagged plan, or `None` once exhausted.
    ///
    /// Initializes on first use. The returned tree is owned by the caller and
    /// independent of the enumerator.
    pub fn produce_next(&mut self) -> Option<MatchExpr> {
        if self.state == EnumeratorState::Uninitialized {
            self.initialize();
        }
        if self.state != EnumeratorState::Staged {
            return None;
        }
        if !self.candidate_ready {
            self.exhaust();
            return None;
        }

        let mut plan = self.root.clone();
        if self.config.normalize_output {
            self.normalizer.normalize(&mut plan);
        }
        self.root.clear_tags();
        self.candidate_ready = false;

        let tags = plan.count_tags().to_string();
        log_event_with_fields(Event::PlanProduced, &[("tags", tags.as_str())]);

        if self.advance_selection() {
            self.stage();
        } else {
            self.exhaust();
        }
        Some(plan)
    }

    /// Moves the selection to the next untried combination of conjunction
    /// alternatives and reports whether one exists.
    ///
    /// Only the first combination is ever produced, so this always reports
    /// exhaustion. A full implementation walks the conjunction nodes like an
    /// odometer over their alternative counts.
    pub fn advance_selection(&mut self) -> bool {
        false
    }

    /// Tags the canonical tree with the current selection
    fn stage(&mut self) {
        let Some(root_id) = self.root_id else {
            consistency_violation("indexable root has no memo entry");
        };
        select(&self.memo, &self.selection, root_id, &mut self.root);
        if self.config.extend_compound {
            CompoundExtender::new(&self.memo, self.catalog).extend(&mut self.root);
        }
        self.candidate_ready = true;
    }

    fn exhaust(&mut self) {
        self.state = EnumeratorState::Exhausted;
        log_event(Event::Exhausted);
    }

    pub fn state(&self) -> EnumeratorState {
        self.state
    }

    /// Status of the first `initialize()`, if it has run
    pub fn status(&self) -> Option<InitStatus> {
        self.status
    }

    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// The canonical tree
    pub fn root(&self) -> &MatchExpr {
        &self.root
    }

    pub fn catalog(&self) -> &IndexCatalog {
        self.catalog
    }

    /// Explain output for the current memo and an optional produced plan
    pub fn explain(&self, plan: Option<&MatchExpr>) -> ExplainPlan {
        ExplainPlan::from_enumerator(self, plan)
    }
}

impl Iterator for PlanEnumerator<'_> {
    type Item = MatchExpr;

    fn next(&mut self) -> Option<MatchExpr> {
        self.produce_next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::catalog::IndexEntry;
    use crate::planner::normalize::NoNormalization;
    use crate::planner::rate::rate_indices;
    use crate::planner::tag::IndexTag;
    use serde_json::json;

    fn catalog() -> IndexCatalog {
        IndexCatalog::new(vec![IndexEntry::new(["a", "b"]), IndexEntry::new(["c"])]).unwrap()
    }

    fn rated(mut tree: MatchExpr, catalog: &IndexCatalog) -> MatchExpr {
        rate_indices(&mut tree, catalog);
        tree
    }

    #[test]
    fn test_state_transitions() {
        let catalog = catalog();
        let tree = rated(
            MatchExpr::and(vec![MatchExpr::eq("a", json!(1)), MatchExpr::eq("b", json!(2))]),
            &catalog,
        );
        let mut enumerator = PlanEnumerator::new(tree, &catalog);
        assert_eq!(enumerator.state(), EnumeratorState::Uninitialized);

        assert_eq!(enumerator.initialize(), InitStatus::CandidateStaged);
        assert_eq!(enumerator.state(), EnumeratorState::Staged);

        let plan = enumerator.produce_next().unwrap();
        assert_eq!(enumerator.state(), EnumeratorState::Exhausted);
        assert_eq!(plan.children[0].tag.assigned(), Some(&IndexTag::leading(0)));
        assert_eq!(plan.children[1].tag.assigned(), Some(&IndexTag::compound(0, 1)));

        assert!(enumerator.produce_next().is_none());
    }

    #[test]
    fn test_no_candidate() {
        let catalog = catalog();
        let tree = rated(MatchExpr::eq("zzz", json!(1)), &catalog);
        let mut enumerator = PlanEnumerator::new(tree, &catalog);

        assert_eq!(enumerator.initialize(), InitStatus::NoCandidate);
        assert!(enumerator.produce_next().is_none());
        assert_eq!(enumerator.state(), EnumeratorState::Exhausted);
        assert!(enumerator.produce_next().is_none());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let catalog = catalog();
        let tree = rated(MatchExpr::eq("c", json!(1)), &catalog);
        let mut enumerator = PlanEnumerator::new(tree, &catalog);

        assert_eq!(enumerator.initialize(), InitStatus::CandidateStaged);
        assert_eq!(enumerator.initialize(), InitStatus::CandidateStaged);
        assert_eq!(enumerator.memo().len(), 1);
        assert!(enumerator.produce_next().is_some());
        assert_eq!(enumerator.initialize(), InitStatus::CandidateStaged);
        assert!(enumerator.produce_next().is_none());
    }

    #[test]
    fn test_lazy_initialization() {
        let catalog = catalog();
        let tree = rated(MatchExpr::eq("c", json!(1)), &catalog);
        let mut enumerator = PlanEnumerator::new(tree, &catalog);

        assert!(enumerator.produce_next().is_some());
        assert_eq!(enumerator.status(), Some(InitStatus::CandidateStaged));
    }

    #[test]
    fn test_canonical_tree_left_untagged() {
        let catalog = catalog();
        let tree = rated(
            MatchExpr::and(vec![MatchExpr::eq("a", json!(1)), MatchExpr::eq("c", json!(2))]),
            &catalog,
        );
        let mut enumerator = PlanEnumerator::new(tree, &catalog);
        enumerator.initialize();
        // staged candidate lives on the canonical tree until produced
        assert_eq!(enumerator.root().count_tags(), 1);

        let plan = enumerator.produce_next().unwrap();
        assert_eq!(plan.count_tags(), 1);
        assert_eq!(enumerator.root().count_tags(), 0);
    }

    #[test]
    fn test_compound_extension_disabled() {
        let catalog = catalog();
        let tree = rated(
            MatchExpr::and(vec![MatchExpr::eq("a", json!(1)), MatchExpr::eq("b", json!(2))]),
            &catalog,
        );
        let config = EnumeratorConfig {
            extend_compound: false,
            ..EnumeratorConfig::default()
        };
        let plan = PlanEnumerator::with_config(tree, &catalog, config)
            .produce_next()
            .unwrap();
        assert_eq!(plan.count_tags(), 1);
    }

    #[test]
    fn test_custom_normalizer() {
        let catalog = catalog();
        let tree = rated(
            MatchExpr::and(vec![MatchExpr::eq("x", json!(1)), MatchExpr::eq("c", json!(2))]),
            &catalog,
        );

        let plan = PlanEnumerator::new(tree.clone(), &catalog)
            .produce_next()
            .unwrap();
        assert_eq!(plan.children[0].path, "c");

        let plan = PlanEnumerator::new(tree, &catalog)
            .with_normalizer(Box::new(NoNormalization))
            .produce_next()
            .unwrap();
        assert_eq!(plan.children[0].path, "x");
    }

    #[test]
    fn test_iterator_yields_once() {
        let catalog = catalog();
        let tree = rated(MatchExpr::eq("c", json!(1)), &catalog);
        let plans: Vec<MatchExpr> = PlanEnumerator::new(tree, &catalog).collect();
        assert_eq!(plans.len(), 1);
    }
}
