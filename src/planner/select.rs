//! Writes one index assignment per chosen leaf
//!
//! Given a memo and a [`SelectionState`], walks the solution graph from a
//! node id and tags the leaves of the tree with [`IndexTag`]s: every branch
//! of a disjunction, only the chosen alternative of a conjunction.

use std::collections::HashMap;

use super::errors::consistency_violation;
use super::expr::MatchExpr;
use super::memo::{Memo, NodeId, NodeSolution};
use super::tag::{IndexTag, Tag};

/// Chosen alternative per node; nodes without an entry use alternative 0
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    choices: HashMap<NodeId, usize>,
}

impl SelectionState {
    /// Selection with the first alternative everywhere
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choice(&self, id: NodeId) -> usize {
        self.choices.get(&id).copied().unwrap_or(0)
    }

    pub fn set_choice(&mut self, id: NodeId, choice: usize) {
        self.choices.insert(id, choice);
    }

    /// Back to the first alternative everywhere
    pub fn reset(&mut self) {
        self.choices.clear();
    }
}

/// Tags `tree` according to the solution rooted at `id`.
///
/// Existing assignments on visited leaves are overwritten, so repeating a
/// selection with an unchanged state yields the same tags.
pub fn select(memo: &Memo, selection: &SelectionState, id: NodeId, tree: &mut MatchExpr) {
    let Some(solution) = memo.solution(id) else {
        consistency_violation(&format!("no memo entry for node {}", id));
    };

    match solution {
        NodeSolution::Predicate(pred) => {
            // There may be no index usable on its own; the leaf stays untagged.
            if pred.first.is_empty() {
                return;
            }
            let choice = selection.choice(id);
            let Some(&index) = pred.first.get(choice) else {
                consistency_violation(&format!(
                    "node {} selects index choice {} of {}",
                    id,
                    choice,
                    pred.first.len()
                ));
            };
            let Some(leaf) = tree.node_at_mut(&pred.leaf) else {
                consistency_violation(&format!("node {} points at missing leaf {}", id, pred.leaf));
            };
            leaf.tag = Tag::Assigned(IndexTag::leading(index));
        }
        NodeSolution::Disjunction(or) => {
            for &branch in &or.branches {
                select(memo, selection, branch, tree);
            }
        }
        NodeSolution::Conjunction(and) => {
            let choice = selection.choice(id);
            let Some(option) = and.alternatives.get(choice) else {
                consistency_violation(&format!(
                    "node {} selects alternative {} of {}",
                    id,
                    choice,
                    and.alternatives.len()
                ));
            };
            for &child in option {
                select(memo, selection, child, tree);
            }
        }
    }
}
