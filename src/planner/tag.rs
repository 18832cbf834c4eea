//! Per-node tag slot
//!
//! A predicate node carries at most one tag. Before enumeration the relevance
//! analyzer attaches `Relevant` tags to eligible leaves; the enumerator
//! consumes them and, on the plans it hands out, attaches `Assigned` tags.

use serde::{Deserialize, Serialize};

/// Position of an index in the catalog
pub type IndexId = usize;

/// Indexes a leaf may use, as computed by the relevance analyzer.
///
/// `first` and `not_first` are disjoint: an index serves a leaf either as
/// its leading field or as a trailing field, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevantTag {
    /// Indexes whose leading field is this leaf's path
    #[serde(default)]
    pub first: Vec<IndexId>,
    /// Indexes that cover this leaf's path at a later position
    #[serde(default)]
    pub not_first: Vec<IndexId>,
}

impl RelevantTag {
    pub fn new(first: Vec<IndexId>, not_first: Vec<IndexId>) -> Self {
        Self { first, not_first }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.not_first.is_empty()
    }
}

/// Index assignment written onto a leaf of a produced plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexTag {
    /// Assigned index
    pub index: IndexId,
    /// Field position within a compound index; absent for the leading field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl IndexTag {
    /// Assignment as the index's leading field
    pub fn leading(index: IndexId) -> Self {
        Self {
            index,
            position: None,
        }
    }

    /// Assignment as the trailing field at `position` (1-based) of a compound index
    pub fn compound(index: IndexId, position: usize) -> Self {
        Self {
            index,
            position: Some(position),
        }
    }

    /// Sort key used when grouping indexed predicates
    pub fn sort_key(&self) -> (IndexId, usize) {
        (self.index, self.position.unwrap_or(0))
    }
}

/// The single tag slot of a predicate node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tag {
    #[default]
    Empty,
    Relevant(RelevantTag),
    Assigned(IndexTag),
}

impl Tag {
    pub fn is_empty(&self) -> bool {
        matches!(self, Tag::Empty)
    }

    /// Returns the index assignment, if any
    pub fn assigned(&self) -> Option<&IndexTag> {
        match self {
            Tag::Assigned(tag) => Some(tag),
            _ => None,
        }
    }

    /// Moves a relevance annotation out of the slot, leaving it empty.
    ///
    /// Any other tag is left in place.
    pub fn take_relevant(&mut self) -> Option<RelevantTag> {
        match std::mem::take(self) {
            Tag::Relevant(rt) => Some(rt),
            other => {
                *self = other;
                None
            }
        }
    }
}
