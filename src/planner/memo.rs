//! Memo of per-node index solutions
//!
//! Built bottom-up from the canonical tree. Every leaf predicate,
//! array-context group, disjunction and conjunction gets a dense [`NodeId`]
//! in post-order and exactly one [`NodeSolution`]; whether the subtree can be
//! served by indexes is recorded alongside as the entry's verdict.
//!
//! Only indexable children contribute upward: a conjunction lists one
//! single-child alternative per indexable child, and a disjunction is
//! indexable only when every branch is.

use std::collections::HashMap;

use super::expr::{MatchExpr, TreePath};
use super::tag::IndexId;

/// Dense identifier of a memoized node, assigned in post-order
pub type NodeId = usize;

/// Indexes available to a single leaf predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateSolution {
    /// The leaf this solution describes
    pub leaf: TreePath,
    /// Usable as the index's leading field
    pub first: Vec<IndexId>,
    /// Usable only as a trailing field of a compound index
    pub not_first: Vec<IndexId>,
}

/// A choice of children to index under an AND or array-context node.
///
/// Each alternative is a set of child ids. Today every alternative holds a
/// single child: only one index is used per conjunction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConjunctionSolution {
    pub alternatives: Vec<Vec<NodeId>>,
}

/// Every branch of an OR must be indexed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisjunctionSolution {
    pub branches: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSolution {
    Predicate(PredicateSolution),
    Conjunction(ConjunctionSolution),
    Disjunction(DisjunctionSolution),
}

impl NodeSolution {
    /// Returns the predicate solution, if this is one
    pub fn as_predicate(&self) -> Option<&PredicateSolution> {
        match self {
            NodeSolution::Predicate(p) => Some(p),
            _ => None,
        }
    }

    /// Human-readable summary of this entry.
    ///
    /// `tree` is used to render the predicate a leaf solution points at.
    pub fn describe(&self, tree: &MatchExpr) -> String {
        match self {
            NodeSolution::Predicate(pred) => {
                let rendered = tree
                    .node_at(&pred.leaf)
                    .map(|node| node.to_string())
                    .unwrap_or_else(|| format!("<missing {}>", pred.leaf));
                format!(
                    "predicate, first indices: [{}], notFirst indices: [{}], pred: {}",
                    join_ids(&pred.first),
                    join_ids(&pred.not_first),
                    rendered
                )
            }
            NodeSolution::Conjunction(and) => {
                let options: Vec<String> = and
                    .alternatives
                    .iter()
                    .map(|option| format!("[{}]", join_ids(option)))
                    .collect();
                format!("ONE OF: [{}]", options.join(", "))
            }
            NodeSolution::Disjunction(or) => {
                format!("ALL OF: [{}]", join_ids(&or.branches))
            }
        }
    }
}

fn join_ids(ids: &[usize]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One memo slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoEntry {
    pub solution: NodeSolution,
    /// Whether this subtree can be answered using indexes
    pub indexable: bool,
}

/// Id-indexed table of node solutions
#[derive(Debug, Clone, Default)]
pub struct Memo {
    entries: Vec<MemoEntry>,
    ids: HashMap<TreePath, NodeId>,
}

impl Memo {
    pub fn get(&self, id: NodeId) -> Option<&MemoEntry> {
        self.entries.get(id)
    }

    pub fn solution(&self, id: NodeId) -> Option<&NodeSolution> {
        self.get(id).map(|e| &e.solution)
    }

    /// Id of the node at `path`, if it was memoized
    pub fn id_of(&self, path: &TreePath) -> Option<NodeId> {
        self.ids.get(path).copied()
    }

    pub fn is_indexable(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|e| e.indexable)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MemoEntry)> {
        self.entries.iter().enumerate()
    }

    /// One line per entry, in id order
    pub fn describe(&self, tree: &MatchExpr) -> Vec<String> {
        self.iter()
            .map(|(id, entry)| {
                format!(
                    "Node #{}{}: {}",
                    id,
                    if entry.indexable { "" } else { " (not indexable)" },
                    entry.solution.describe(tree)
                )
            })
            .collect()
    }

    /// Appends an entry for the node at `path` and returns its id
    pub(crate) fn insert(&mut self, path: TreePath, solution: NodeSolution, indexable: bool) -> NodeId {
        let id = self.entries.len();
        self.entries.push(MemoEntry {
            solution,
            indexable,
        });
        self.ids.insert(path, id);
        id
    }

    /// Overwrites the entry at `id`; used to stage malformed state in tests
    #[cfg(test)]
    pub(crate) fn replace(&mut self, id: NodeId, solution: NodeSolution) {
        self.entries[id].solution = solution;
    }
}

/// Builds a [`Memo`] from a relevance-annotated tree
pub struct MemoBuilder {
    memo: Memo,
}

impl MemoBuilder {
    /// Builds the memo for `root`, consuming its leaves' relevance tags.
    ///
    /// Returns the memo, the root's id (absent when the root is of a category
    /// that is never memoized) and whether the root is indexable.
    pub fn build(root: &mut MatchExpr) -> (Memo, Option<NodeId>, bool) {
        let mut builder = Self {
            memo: Memo::default(),
        };
        let result = builder.visit(root, TreePath::root());
        let (root_id, indexable) = match result {
            Some((id, indexable)) => (Some(id), indexable),
            None => (None, false),
        };
        (builder.memo, root_id, indexable)
    }

    /// Returns the node's id and verdict, or `None` if it is not memoized
    fn visit(&mut self, node: &mut MatchExpr, at: TreePath) -> Option<(NodeId, bool)> {
        if node.array_uses_index_on_children() {
            let mut and = ConjunctionSolution::default();
            for (i, child) in node.children.iter_mut().enumerate() {
                if let Some((child_id, true)) = self.visit(child, at.child(i)) {
                    and.alternatives.push(vec![child_id]);
                }
            }
            let indexable = !and.alternatives.is_empty();
            let id = self
                .memo
                .insert(at, NodeSolution::Conjunction(and), indexable);
            Some((id, indexable))
        } else if node.can_use_index_on_own_field() {
            let relevant = node.tag.take_relevant().unwrap_or_default();
            // A trailing-field-only predicate cannot stand alone.
            let indexable = !relevant.first.is_empty();
            let solution = NodeSolution::Predicate(PredicateSolution {
                leaf: at.clone(),
                first: relevant.first,
                not_first: relevant.not_first,
            });
            let id = self.memo.insert(at, solution, indexable);
            Some((id, indexable))
        } else if node.is_disjunction() {
            // `branches` lists memoized children only. A $not or $nor branch
            // has no entry, which makes this disjunction non-indexable and
            // therefore never selected.
            let mut indexable = true;
            let mut or = DisjunctionSolution::default();
            for (i, child) in node.children.iter_mut().enumerate() {
                match self.visit(child, at.child(i)) {
                    Some((child_id, child_indexable)) => {
                        or.branches.push(child_id);
                        indexable &= child_indexable;
                    }
                    None => indexable = false,
                }
            }
            let id = self
                .memo
                .insert(at, NodeSolution::Disjunction(or), indexable);
            Some((id, indexable))
        } else if node.is_conjunction() {
            let mut and = ConjunctionSolution::default();
            let mut proximity = None;
            for (i, child) in node.children.iter_mut().enumerate() {
                if let Some((child_id, true)) = self.visit(child, at.child(i)) {
                    if child.is_proximity() {
                        proximity = Some(and.alternatives.len());
                    }
                    and.alternatives.push(vec![child_id]);
                }
            }
            // Only alternative 0 is ever selected; a proximity predicate
            // decides result order and must not be skipped.
            if let Some(pos) = proximity {
                and.alternatives[..=pos].rotate_right(1);
            }
            let indexable = !and.alternatives.is_empty();
            let id = self
                .memo
                .insert(at, NodeSolution::Conjunction(and), indexable);
            Some((id, indexable))
        } else {
            None
        }
    }
}
