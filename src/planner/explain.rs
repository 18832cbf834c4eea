//! Explain output for an enumeration
//!
//! Produces deterministic, human-readable output: the memo dump, the
//! enumerator's status and the index assignments of a produced plan.

use std::fmt;

use serde::Serialize;

use super::catalog::IndexCatalog;
use super::enumerator::PlanEnumerator;
use super::expr::{MatchExpr, TreePath};

/// One index assignment in a produced plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Position of the leaf in the plan tree
    pub node: String,
    /// Field path of the leaf
    pub field: String,
    /// Index name
    pub index: String,
    /// Compound field position, absent for the leading field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

/// Explain output
#[derive(Debug, Clone, Serialize)]
pub struct ExplainPlan {
    /// Enumerator state
    pub state: String,
    /// Outcome of initialization, if it ran
    pub status: Option<String>,
    /// One line per memo entry, in id order
    pub memo: Vec<String>,
    /// Assignments of the produced plan (empty when none was produced)
    pub assignments: Vec<Assignment>,
}

impl ExplainPlan {
    /// Creates explain output from an enumerator and the plan it produced
    pub fn from_enumerator(enumerator: &PlanEnumerator<'_>, plan: Option<&MatchExpr>) -> Self {
        let mut assignments = Vec::new();
        if let Some(plan) = plan {
            collect_assignments(plan, &TreePath::root(), "", enumerator.catalog(), &mut assignments);
        }

        Self {
            state: enumerator.state().as_str().to_string(),
            status: enumerator.status().map(|s| s.as_str().to_string()),
            memo: enumerator.memo().describe(enumerator.root()),
            assignments,
        }
    }
}

/// Pre-order; fields under `$elemMatch` carry the array prefix
fn collect_assignments(
    node: &MatchExpr,
    at: &TreePath,
    prefix: &str,
    catalog: &IndexCatalog,
    out: &mut Vec<Assignment>,
) {
    if let Some(tag) = node.tag.assigned() {
        out.push(Assignment {
            node: at.to_string(),
            field: format!("{}{}", prefix, node.path),
            index: catalog
                .get(tag.index)
                .map(|entry| entry.display_name())
                .unwrap_or_else(|| format!("#{}", tag.index)),
            position: tag.position,
        });
    }

    let mut prefix = prefix.to_string();
    if node.array_uses_index_on_children() && !node.path.is_empty() {
        prefix.push_str(&node.path);
        prefix.push('.');
    }
    for (i, child) in node.children.iter().enumerate() {
        collect_assignments(child, &at.child(i), &prefix, catalog, out);
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== ENUMERATION EXPLAIN ===")?;
        writeln!(f, "State: {}", self.state)?;
        if let Some(status) = &self.status {
            writeln!(f, "Status: {}", status)?;
        }

        if !self.memo.is_empty() {
            writeln!(f, "Memo:")?;
            for line in &self.memo {
                writeln!(f, "  {}", line)?;
            }
        }

        if self.assignments.is_empty() {
            writeln!(f, "Assignments: none")?;
        } else {
            writeln!(f, "Assignments:")?;
            for a in &self.assignments {
                match a.position {
                    Some(pos) => writeln!(f, "  - {} {} -> {} pos {}", a.node, a.field, a.index, pos)?,
                    None => writeln!(f, "  - {} {} -> {}", a.node, a.field, a.index)?,
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::catalog::{IndexCatalog, IndexEntry};
    use crate::planner::rate::rate_indices;
    use serde_json::json;

    fn catalog() -> IndexCatalog {
        IndexCatalog::new(vec![IndexEntry::new(["a", "b"]).named("ab")]).unwrap()
    }

    #[test]
    fn test_explain_produced_plan() {
        let catalog = catalog();
        let mut tree = MatchExpr::and(vec![MatchExpr::eq("a", json!(1)), MatchExpr::eq("b", json!(2))]);
        rate_indices(&mut tree, &catalog);

        let mut enumerator = PlanEnumerator::new(tree, &catalog);
        let plan = enumerator.produce_next();
        let explain = enumerator.explain(plan.as_ref());

        assert_eq!(explain.state, "EXHAUSTED");
        assert_eq!(explain.status.as_deref(), Some("CANDIDATE_STAGED"));
        assert_eq!(explain.memo.len(), 3);
        assert_eq!(
            explain.assignments,
            vec![
                Assignment {
                    node: "/0".into(),
                    field: "a".into(),
                    index: "ab".into(),
                    position: None,
                },
                Assignment {
                    node: "/1".into(),
                    field: "b".into(),
                    index: "ab".into(),
                    position: Some(1),
                },
            ]
        );

        let output = format!("{}", explain);
        assert!(output.contains("=== ENUMERATION EXPLAIN ==="));
        assert!(output.contains("/1 b -> ab pos 1"));
        assert!(output.contains("Node #2: ONE OF: [[0]]"));
    }

    #[test]
    fn test_explain_without_plan() {
        let catalog = catalog();
        let enumerator = PlanEnumerator::new(MatchExpr::eq("z", json!(1)), &catalog);
        let explain = enumerator.explain(None);

        assert_eq!(explain.state, "UNINITIALIZED");
        assert!(explain.status.is_none());
        assert!(format!("{}", explain).contains("Assignments: none"));
    }

    #[test]
    fn test_elem_match_fields_prefixed() {
        let catalog = IndexCatalog::new(vec![IndexEntry::new(["arr.x", "arr.y"]).named("arr_xy")]).unwrap();
        let mut tree = MatchExpr::elem_match_object(
            "arr",
            vec![MatchExpr::and(vec![MatchExpr::eq("x", json!(1)), MatchExpr::eq("y", json!(2))])],
        );
        rate_indices(&mut tree, &catalog);

        let mut enumerator = PlanEnumerator::new(tree, &catalog);
        let plan = enumerator.produce_next();
        let explain = enumerator.explain(plan.as_ref());

        let fields: Vec<&str> = explain.assignments.iter().map(|a| a.field.as_str()).collect();
        assert_eq!(fields, vec!["arr.x", "arr.y"]);
        assert_eq!(explain.assignments[1].node, "/0/1");
        assert!(format!("{}", explain).contains("/0/1 arr.y -> arr_xy pos 1"));
    }

    #[test]
    fn test_explain_deterministic() {
        let catalog = catalog();
        let render = || {
            let mut tree = MatchExpr::and(vec![MatchExpr::eq("b", json!(2)), MatchExpr::eq("a", json!(1))]);
            rate_indices(&mut tree, &catalog);
            let mut enumerator = PlanEnumerator::new(tree, &catalog);
            let plan = enumerator.produce_next();
            format!("{}", enumerator.explain(plan.as_ref()))
        };
        assert_eq!(render(), render());
    }
}
