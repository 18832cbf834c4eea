//! Relevance rating by field name
//!
//! Attaches a [`RelevantTag`] to every leaf that can use an index on its own
//! field: indexes whose leading field is the leaf's full path go into
//! `first`, indexes that list the path at a later position go into
//! `not_first`. Paths under an `$elemMatch` are prefixed with the array's
//! path. Leaves with no candidates are left untagged.

use super::catalog::IndexCatalog;
use super::expr::MatchExpr;
use super::tag::{RelevantTag, Tag};

/// Rates every eligible leaf of `root` against `catalog`
pub fn rate_indices(root: &mut MatchExpr, catalog: &IndexCatalog) {
    rate(root, "", catalog);
}

fn rate(node: &mut MatchExpr, prefix: &str, catalog: &IndexCatalog) {
    if node.can_use_index_on_own_field() {
        let full_path = format!("{}{}", prefix, node.path);
        let mut relevant = RelevantTag::default();
        for (id, entry) in catalog.iter() {
            match entry.fields.iter().position(|f| *f == full_path) {
                Some(0) => relevant.first.push(id),
                Some(_) => relevant.not_first.push(id),
                None => {}
            }
        }
        if !relevant.is_empty() {
            node.tag = Tag::Relevant(relevant);
        }
        return;
    }

    let mut prefix = prefix.to_string();
    if node.array_uses_index_on_children() {
        prefix.push_str(&node.path);
        prefix.push('.');
    }
    for child in &mut node.children {
        rate(child, &prefix, catalog);
    }
}
