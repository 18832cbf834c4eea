//! Compound index extension
//!
//! Runs after selection. Under every AND, a leaf already assigned the leading
//! field of a compound index recruits untagged sibling leaves for the index's
//! remaining fields, in declared order. Extension stops at the first field
//! with no eligible sibling: compound fields are filled front to back with no
//! gaps.
//!
//! Multikey compound indexes are never extended. The access-path builder
//! cannot yet prove such assignments safe.
//!
//! Cost per AND is children x compound fields x unassigned siblings, which is
//! fine for realistic predicate counts.

use super::catalog::IndexCatalog;
use super::errors::consistency_violation;
use super::expr::{MatchExpr, TreePath};
use super::memo::Memo;
use super::tag::{IndexId, IndexTag, Tag};
use crate::observability::{log_event_with_fields, Event};

/// Extends leading-field assignments into compound assignments
pub struct CompoundExtender<'a> {
    memo: &'a Memo,
    catalog: &'a IndexCatalog,
}

impl<'a> CompoundExtender<'a> {
    pub fn new(memo: &'a Memo, catalog: &'a IndexCatalog) -> Self {
        Self { memo, catalog }
    }

    /// Extends assignments across the whole tree
    pub fn extend(&self, root: &mut MatchExpr) {
        self.extend_at(root, &TreePath::root(), "");
    }

    fn extend_at(&self, node: &mut MatchExpr, at: &TreePath, prefix: &str) {
        // Nothing below a $not or $nor is memoized, so nothing there is tagged.
        if !node.kind.is_leaf() && self.memo.id_of(at).is_none() {
            return;
        }
        if node.is_conjunction() {
            self.extend_conjunction(node, at, prefix);
        }

        let mut prefix = prefix.to_string();
        if node.array_uses_index_on_children() && !node.path.is_empty() {
            prefix.push_str(&node.path);
            prefix.push('.');
        }

        for (i, child) in node.children.iter_mut().enumerate() {
            self.extend_at(child, &at.child(i), &prefix);
        }
    }

    fn extend_conjunction(&self, node: &mut MatchExpr, at: &TreePath, prefix: &str) {
        let mut assigned_compound: Vec<IndexId> = Vec::new();
        let mut unassigned: Vec<usize> = Vec::new();

        for (i, child) in node.children.iter().enumerate() {
            if !child.can_use_index_on_own_field() {
                continue;
            }
            // Every such leaf must have been memoized as a predicate.
            self.not_first_of(&at.child(i));
            match &child.tag {
                Tag::Empty => unassigned.push(i),
                Tag::Assigned(tag) if self.catalog.is_compound(tag.index) => {
                    assigned_compound.push(tag.index)
                }
                _ => {}
            }
        }

        for index in assigned_compound {
            let Some(entry) = self.catalog.get(index) else {
                consistency_violation(&format!("assigned index {} is not in the catalog", index));
            };
            let name = entry.display_name();
            if entry.multikey {
                log_event_with_fields(Event::CompoundMultikeySkip, &[("index", name.as_str())]);
                continue;
            }

            for (position, field) in entry.fields.iter().enumerate().skip(1) {
                let found = unassigned.iter().copied().find(|&j| {
                    let sibling = &node.children[j];
                    sibling.tag.is_empty()
                        && prefixed(prefix, &sibling.path) == *field
                        && self.not_first_of(&at.child(j)).contains(&index)
                });

                let Some(j) = found else {
                    log_event_with_fields(
                        Event::CompoundGap,
                        &[("field", field.as_str()), ("index", name.as_str())],
                    );
                    break;
                };

                node.children[j].tag = Tag::Assigned(IndexTag::compound(index, position));
                let position = position.to_string();
                log_event_with_fields(
                    Event::CompoundExtended,
                    &[
                        ("field", field.as_str()),
                        ("index", name.as_str()),
                        ("position", position.as_str()),
                    ],
                );
            }
        }
    }

    /// Trailing-field indexes recorded for the leaf at `leaf`
    fn not_first_of(&self, leaf: &TreePath) -> &'a [IndexId] {
        let memo = self.memo;
        let Some(id) = memo.id_of(leaf) else {
            consistency_violation(&format!("leaf {} was never memoized", leaf));
        };
        match memo.solution(id).and_then(|s| s.as_predicate()) {
            Some(pred) => &pred.not_first,
            None => consistency_violation(&format!(
                "leaf {} (node {}) has no predicate solution",
                leaf, id
            )),
        }
    }
}

fn prefixed(prefix: &str, path: &str) -> String {
    format!("{}{}", prefix, path)
}
