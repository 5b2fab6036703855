//! Timing side-channel analysis for FSM control logic.
//!
//! Combines classical dominator analysis with a secret-dependency check
//! along control-flow paths. Given a controller's state graph annotated
//! with the variables that influence each state's outgoing transitions,
//! the engine decides whether an observer who can count executed states
//! could infer anything about secret-derived variables.
//!
//! The pipeline:
//! 1. [`dominator::dominators`] computes the mandatory checkpoints between
//!    the start and end states, ordered by BFS discovery.
//! 2. [`path::path_stats`] enumerates the simple paths inside each
//!    consecutive checkpoint pair, collecting path lengths and whether any
//!    traversed state depends on a secret variable.
//! 3. [`checker::LeakChecker`] reduces the per-segment results to a
//!    verdict: the design is leak-free unless some segment combines
//!    unequal path lengths with a secret dependency.
//!
//! The engine is a pure function over its inputs: no I/O, no shared state,
//! no caching between calls.

pub mod checker;
pub mod dominator;
mod error;
pub mod path;

pub use crate::checker::{Analysis, LeakChecker, SegmentReport, check_timing_safety};
pub use crate::dominator::{dominator_set, dominators, dominators_with};
pub use crate::error::{AnalysisError, Result};
pub use crate::path::{PathStats, path_stats};

#[cfg(test)]
mod tests;
