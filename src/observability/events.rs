//! Observable enumerator events
//!
//! Events are explicit and typed; each carries a default severity.

use std::fmt;

use super::logger::Severity;

/// Observable events in the enumeration lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Memo built from the canonical tree
    MemoBuilt,
    /// First candidate tagged onto the canonical tree
    CandidateStaged,
    /// Root is not indexable; nothing to produce
    NoCandidate,
    /// A trailing compound field was assigned
    CompoundExtended,
    /// Compound extension stopped at a field with no eligible predicate
    CompoundGap,
    /// Compound extension skipped because the index is multikey
    CompoundMultikeySkip,
    /// Tagged clone handed to the caller
    PlanProduced,
    /// No further candidates
    Exhausted,
    /// Broken memo invariant (FATAL)
    ConsistencyViolation,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::MemoBuilt => "ENUM_MEMO_BUILT",
            Event::CandidateStaged => "ENUM_CANDIDATE_STAGED",
            Event::NoCandidate => "ENUM_NO_CANDIDATE",
            Event::CompoundExtended => "ENUM_COMPOUND_EXTENDED",
            Event::CompoundGap => "ENUM_COMPOUND_GAP",
            Event::CompoundMultikeySkip => "ENUM_COMPOUND_MULTIKEY_SKIP",
            Event::PlanProduced => "ENUM_PLAN_PRODUCED",
            Event::Exhausted => "ENUM_EXHAUSTED",
            Event::ConsistencyViolation => "ENUM_CONSISTENCY_VIOLATION",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::MemoBuilt | Event::CandidateStaged | Event::NoCandidate => Severity::Info,
            Event::PlanProduced | Event::Exhausted => Severity::Info,
            Event::CompoundExtended | Event::CompoundGap | Event::CompoundMultikeySkip => {
                Severity::Trace
            }
            Event::ConsistencyViolation => Severity::Fatal,
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ConsistencyViolation)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
