//! Predicate expression tree
//!
//! The tree the enumerator works on. Each node exposes its category
//! (leaf predicate, array-context group, disjunction, conjunction), its field
//! path and children, and one [`Tag`] slot.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{EnumeratorError, EnumeratorResult};
use super::tag::Tag;

/// Node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Regex,
    /// Geospatial containment/intersection
    Geo,
    /// Nearest-neighbour proximity
    GeoNear,
    Exists,
    Mod,
    Size,
    /// Children are matched against elements of the array at `path`
    ElemMatchObject,
    And,
    Or,
    Nor,
    Not,
}

impl MatchKind {
    /// Operator name used in the compact rendering
    pub fn op_name(&self) -> &'static str {
        match self {
            MatchKind::Eq => "$eq",
            MatchKind::Lt => "$lt",
            MatchKind::Lte => "$lte",
            MatchKind::Gt => "$gt",
            MatchKind::Gte => "$gte",
            MatchKind::In => "$in",
            MatchKind::Regex => "$regex",
            MatchKind::Geo => "$geoWithin",
            MatchKind::GeoNear => "$near",
            MatchKind::Exists => "$exists",
            MatchKind::Mod => "$mod",
            MatchKind::Size => "$size",
            MatchKind::ElemMatchObject => "$elemMatch",
            MatchKind::And => "$and",
            MatchKind::Or => "$or",
            MatchKind::Nor => "$nor",
            MatchKind::Not => "$not",
        }
    }

    /// Leaf kinds that can be answered by an index on their own field
    pub fn can_use_index_on_own_field(&self) -> bool {
        matches!(
            self,
            MatchKind::Eq
                | MatchKind::Lt
                | MatchKind::Lte
                | MatchKind::Gt
                | MatchKind::Gte
                | MatchKind::In
                | MatchKind::Regex
                | MatchKind::Geo
                | MatchKind::GeoNear
        )
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(
            self,
            MatchKind::ElemMatchObject | MatchKind::And | MatchKind::Or | MatchKind::Nor | MatchKind::Not
        )
    }
}

/// Position of a node relative to the root, as child indexes.
///
/// Memo records refer back to tree leaves through a `TreePath`; it stays
/// valid only as long as the tree's shape is unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TreePath(Vec<usize>);

impl TreePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of this node's `i`th child
    pub fn child(&self, i: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(i);
        Self(steps)
    }

    pub fn steps(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;
        let parts: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("/"))
    }
}

/// A node of the predicate tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchExpr {
    pub kind: MatchKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MatchExpr>,
    #[serde(default, skip_serializing_if = "Tag::is_empty")]
    pub tag: Tag,
}

impl MatchExpr {
    /// Create a leaf predicate
    pub fn leaf(kind: MatchKind, path: impl Into<String>, value: Value) -> Self {
        Self {
            kind,
            path: path.into(),
            value,
            children: Vec::new(),
            tag: Tag::Empty,
        }
    }

    pub fn eq(path: impl Into<String>, value: Value) -> Self {
        Self::leaf(MatchKind::Eq, path, value)
    }

    pub fn lt(path: impl Into<String>, value: Value) -> Self {
        Self::leaf(MatchKind::Lt, path, value)
    }

    pub fn gt(path: impl Into<String>, value: Value) -> Self {
        Self::leaf(MatchKind::Gt, path, value)
    }

    pub fn gte(path: impl Into<String>, value: Value) -> Self {
        Self::leaf(MatchKind::Gte, path, value)
    }

    pub fn lte(path: impl Into<String>, value: Value) -> Self {
        Self::leaf(MatchKind::Lte, path, value)
    }

    pub fn geo_near(path: impl Into<String>, value: Value) -> Self {
        Self::leaf(MatchKind::GeoNear, path, value)
    }

    pub fn exists(path: impl Into<String>) -> Self {
        Self::leaf(MatchKind::Exists, path, Value::Bool(true))
    }

    fn logical(kind: MatchKind, children: Vec<MatchExpr>) -> Self {
        Self {
            kind,
            path: String::new(),
            value: Value::Null,
            children,
            tag: Tag::Empty,
        }
    }

    pub fn and(children: Vec<MatchExpr>) -> Self {
        Self::logical(MatchKind::And, children)
    }

    pub fn or(children: Vec<MatchExpr>) -> Self {
        Self::logical(MatchKind::Or, children)
    }

    pub fn nor(children: Vec<MatchExpr>) -> Self {
        Self::logical(MatchKind::Nor, children)
    }

    pub fn not(child: MatchExpr) -> Self {
        Self::logical(MatchKind::Not, vec![child])
    }

    /// Array-context group over the elements of `path`
    pub fn elem_match_object(path: impl Into<String>, children: Vec<MatchExpr>) -> Self {
        Self {
            kind: MatchKind::ElemMatchObject,
            path: path.into(),
            value: Value::Null,
            children,
            tag: Tag::Empty,
        }
    }

    /// Replaces this node's tag
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = tag;
        self
    }

    pub fn can_use_index_on_own_field(&self) -> bool {
        self.kind.can_use_index_on_own_field()
    }

    pub fn array_uses_index_on_children(&self) -> bool {
        self.kind == MatchKind::ElemMatchObject
    }

    pub fn is_disjunction(&self) -> bool {
        self.kind == MatchKind::Or
    }

    pub fn is_conjunction(&self) -> bool {
        self.kind == MatchKind::And
    }

    pub fn is_proximity(&self) -> bool {
        self.kind == MatchKind::GeoNear
    }

    pub fn node_at(&self, path: &TreePath) -> Option<&MatchExpr> {
        path.steps()
            .iter()
            .try_fold(self, |node, &i| node.children.get(i))
    }

    pub fn node_at_mut(&mut self, path: &TreePath) -> Option<&mut MatchExpr> {
        path.steps()
            .iter()
            .try_fold(self, |node, &i| node.children.get_mut(i))
    }

    /// Removes every tag in this subtree
    pub fn clear_tags(&mut self) {
        self.tag = Tag::Empty;
        for child in &mut self.children {
            child.clear_tags();
        }
    }

    /// Counts the tagged nodes in this subtree
    pub fn count_tags(&self) -> usize {
        let own = usize::from(!self.tag.is_empty());
        own + self.children.iter().map(MatchExpr::count_tags).sum::<usize>()
    }

    /// Visits every node in pre-order together with its path
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&TreePath, &'a MatchExpr)) {
        self.walk_from(&TreePath::root(), visit);
    }

    fn walk_from<'a>(&'a self, at: &TreePath, visit: &mut impl FnMut(&TreePath, &'a MatchExpr)) {
        visit(at, self);
        for (i, child) in self.children.iter().enumerate() {
            child.walk_from(&at.child(i), visit);
        }
    }

    /// Checks the structural rules a tree must obey before enumeration
    pub fn validate(&self) -> EnumeratorResult<()> {
        self.validate_at(&TreePath::root())
    }

    fn validate_at(&self, at: &TreePath) -> EnumeratorResult<()> {
        if self.kind.is_leaf() {
            if !self.children.is_empty() {
                return Err(EnumeratorError::invalid_tree(format!(
                    "leaf {} at {} must not have children",
                    self.kind.op_name(),
                    at
                )));
            }
            if self.path.is_empty() {
                return Err(EnumeratorError::invalid_tree(format!(
                    "leaf {} at {} has an empty field path",
                    self.kind.op_name(),
                    at
                )));
            }
            return Ok(());
        }

        if self.children.is_empty() {
            return Err(EnumeratorError::invalid_tree(format!(
                "{} at {} has no children",
                self.kind.op_name(),
                at
            )));
        }
        if self.kind == MatchKind::Not && self.children.len() != 1 {
            return Err(EnumeratorError::invalid_tree(format!(
                "$not at {} must have exactly one child",
                at
            )));
        }
        if self.array_uses_index_on_children() && self.path.is_empty() {
            return Err(EnumeratorError::invalid_tree(format!(
                "$elemMatch at {} has an empty field path",
                at
            )));
        }

        for (i, child) in self.children.iter().enumerate() {
            child.validate_at(&at.child(i))?;
        }
        Ok(())
    }
}

impl fmt::Display for MatchExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_leaf() {
            write!(f, "{} {} {}", self.path, self.kind.op_name(), self.value)?;
        } else {
            if !self.path.is_empty() {
                write!(f, "{} ", self.path)?;
            }
            write!(f, "{}(", self.kind.op_name())?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", child)?;
            }
            write!(f, ")")?;
        }
        if let Some(tag) = self.tag.assigned() {
            match tag.position {
                Some(pos) => write!(f, " || index {} pos {}", tag.index, pos)?,
                None => write!(f, " || index {}", tag.index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::tag::{IndexTag, RelevantTag};
    use serde_json::json;

    fn sample() -> MatchExpr {
        MatchExpr::and(vec![
            MatchExpr::eq("a", json!(1)),
            MatchExpr::or(vec![MatchExpr::gt("b", json!(2)), MatchExpr::lt("c", json!(3))]),
        ])
    }

    #[test]
    fn test_capabilities() {
        assert!(MatchExpr::eq("a", json!(1)).can_use_index_on_own_field());
        assert!(!MatchExpr::exists("a").can_use_index_on_own_field());
        assert!(MatchExpr::elem_match_object("arr", vec![]).array_uses_index_on_children());
        assert!(MatchExpr::or(vec![]).is_disjunction());
        assert!(MatchExpr::and(vec![]).is_conjunction());
        assert!(MatchExpr::geo_near("loc", json!([0, 0])).is_proximity());
    }

    #[test]
    fn test_node_at() {
        let tree = sample();
        let c = tree.node_at(&TreePath::root().child(1).child(1)).unwrap();
        assert_eq!(c.path, "c");
        assert!(tree.node_at(&TreePath::root().child(5)).is_none());
        assert_eq!(tree.node_at(&TreePath::root()).unwrap().kind, MatchKind::And);
    }

    #[test]
    fn test_clear_tags_recursive() {
        let mut tree = sample();
        tree.children[0].tag = Tag::Assigned(IndexTag::leading(0));
        tree.children[1].children[0].tag = Tag::Relevant(RelevantTag::new(vec![1], vec![]));
        assert_eq!(tree.count_tags(), 2);

        tree.clear_tags();
        assert_eq!(tree.count_tags(), 0);
    }

    #[test]
    fn test_clone_carries_tags() {
        let mut tree = sample();
        tree.children[0].tag = Tag::Assigned(IndexTag::leading(4));
        let copy = tree.clone();
        tree.clear_tags();
        assert_eq!(copy.children[0].tag.assigned(), Some(&IndexTag::leading(4)));
    }

    #[test]
    fn test_walk_preorder_paths() {
        let tree = sample();
        let mut seen = Vec::new();
        tree.walk(&mut |at, _| seen.push(at.to_string()));
        assert_eq!(seen, vec!["/", "/0", "/1", "/1/0", "/1/1"]);
    }

    #[test]
    fn test_validate_rejects_leaf_with_children() {
        let mut bad = MatchExpr::eq("a", json!(1));
        bad.children.push(MatchExpr::eq("b", json!(2)));
        let err = MatchExpr::and(vec![bad]).validate().unwrap_err();
        assert_eq!(err.code().code(), "AERO_ENUM_INVALID_TREE");
        assert!(err.message().contains("/0"));
    }

    #[test]
    fn test_validate_rejects_empty_logical() {
        assert!(MatchExpr::or(vec![]).validate().is_err());
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip_shape() {
        let tree: MatchExpr = serde_json::from_value(json!({
            "kind": "and",
            "children": [
                {"kind": "eq", "path": "a", "value": 1},
                {"kind": "elem_match_object", "path": "arr", "children": [
                    {"kind": "gte", "path": "x", "value": 5}
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(tree.children.len(), 2);
        assert!(tree.children[1].array_uses_index_on_children());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_display() {
        let mut tree = sample();
        tree.children[0].tag = Tag::Assigned(IndexTag::compound(2, 1));
        assert_eq!(
            tree.to_string(),
            "$and(a $eq 1 || index 2 pos 1, $or(b $gt 2, c $lt 3))"
        );
    }
}
