//! Output normalization applied to produced plans
//!
//! The enumerator calls an [`OutputNormalizer`] on every clone it hands out.
//! The default, [`IndexednessSort`], groups indexed predicates together so
//! downstream access-path building sees predicates on the same index side by
//! side.

use super::expr::MatchExpr;
use super::tag::IndexId;

/// Post-step run on each produced plan
pub trait OutputNormalizer {
    fn normalize(&self, tree: &mut MatchExpr);
}

/// Sorts children so indexed subtrees come first.
///
/// A subtree's key is the smallest `(index, position)` among its tagged
/// leaves. Keyed subtrees are ordered by key; untagged subtrees follow in
/// their original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexednessSort;

impl OutputNormalizer for IndexednessSort {
    fn normalize(&self, tree: &mut MatchExpr) {
        sort_by_indexedness(tree);
    }
}

/// Leaves the plan untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNormalization;

impl OutputNormalizer for NoNormalization {
    fn normalize(&self, _tree: &mut MatchExpr) {}
}

fn sort_key(node: &MatchExpr) -> Option<(IndexId, usize)> {
    let own = node.tag.assigned().map(|t| t.sort_key());
    node.children
        .iter()
        .filter_map(sort_key)
        .chain(own)
        .min()
}

fn sort_by_indexedness(node: &mut MatchExpr) {
    for child in &mut node.children {
        sort_by_indexedness(child);
    }
    node.children.sort_by_key(|child| match sort_key(child) {
        Some(key) => (false, key),
        None => (true, (0, 0)),
    });
}
