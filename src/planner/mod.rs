//! Index assignment enumeration
//!
//! Given a predicate tree whose leaves carry relevance annotations and a
//! catalog of indexes, decides which indexes may be attached to which leaves
//! and produces a tagged copy of the tree describing one access plan.
//!
//! # Pipeline
//!
//! 1. [`MemoBuilder`]: bottom-up, one solution per node, with an
//!    indexability verdict
//! 2. [`select`]: writes leading-field assignments for one selection
//! 3. [`CompoundExtender`]: recruits sibling predicates for the remaining
//!    fields of compound indexes
//! 4. [`PlanEnumerator`]: drives the above and hands out tagged clones
//!
//! # Design Principles
//!
//! - Deterministic: same tree and catalog produce the same plan
//! - The canonical tree never leaves the enumerator tagged
//! - Broken memo invariants abort rather than produce a wrong plan

mod catalog;
mod compound;
mod config;
mod enumerator;
mod errors;
mod explain;
mod expr;
mod memo;
mod normalize;
mod rate;
mod select;
mod tag;

pub use catalog::{CatalogError, CatalogResult, IndexCatalog, IndexEntry};
pub use compound::CompoundExtender;
pub use config::EnumeratorConfig;
pub use enumerator::{EnumeratorState, InitStatus, PlanEnumerator};
pub use errors::{consistency_violation, EnumeratorError, EnumeratorErrorCode, EnumeratorResult};
pub use explain::{Assignment, ExplainPlan};
pub use expr::{MatchExpr, MatchKind, TreePath};
pub use memo::{
    ConjunctionSolution, DisjunctionSolution, Memo, MemoBuilder, MemoEntry, NodeId, NodeSolution,
    PredicateSolution,
};
pub use normalize::{IndexednessSort, NoNormalization, OutputNormalizer};
pub use rate::rate_indices;
pub use select::{select, SelectionState};
pub use tag::{IndexId, IndexTag, RelevantTag, Tag};
