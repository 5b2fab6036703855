//! Simple-path enumeration between two states of a segment.
//!
//! For each pair of consecutive dominators the checker needs two facts:
//! do all control paths between them take the same number of transitions,
//! and does any state visited along the way depend on a secret variable.
//! Both come out of a single breadth-first enumeration of the simple
//! (non-repeating-state) paths from the segment start.
//!
//! Restricting the search to simple paths is what bounds it on cyclic
//! graphs. It also means the reported length set under-approximates the
//! true path-length diversity in the presence of cycles; that is a known
//! approximation inherited from the extraction methodology, not something
//! this module tries to correct.
//!
//! Enumeration is exponential in the branching factor in the worst case.
//! That is acceptable for hand-extracted controllers of tens of states;
//! for anything denser, set [`smtt_common::Config::path_budget`] and treat
//! [`AnalysisError::BudgetExceeded`] as an inconclusive result.

use std::collections::{BTreeSet, VecDeque};

use smtt_common::{FsmGraph, StateId};
use tracing::trace;

use crate::error::{AnalysisError, Result};

/// Path statistics for one dominator segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathStats {
    lengths: BTreeSet<usize>,
    secret_dependency: bool,
}

impl PathStats {
    /// True iff exactly one distinct path length was observed.
    ///
    /// An empty length set (no simple path reached the segment end) fails
    /// this check by definition.
    pub fn all_lengths_equal(&self) -> bool {
        self.lengths.len() == 1
    }

    /// Whether any state visited while extending the search carries a
    /// secret dependency. Monotone: once observed, never reset.
    pub fn secret_dependency(&self) -> bool {
        self.secret_dependency
    }

    /// The distinct simple-path lengths that reached the segment end.
    pub fn lengths(&self) -> &BTreeSet<usize> {
        &self.lengths
    }
}

/// Enumerate all simple paths from `seg_start`, recording the length of
/// every path that reaches `seg_end` and whether any expanded state
/// depends on a variable in `secret_vars`.
///
/// A dequeued state equal to `seg_end` terminates its branch: its length
/// is recorded and neither its successors nor its own dependency labels
/// are examined. Every other dequeued state is expanded (successors not
/// already on its path) and has its labels checked.
///
/// `path_budget` bounds the number of dequeued steps; exceeding it raises
/// [`AnalysisError::BudgetExceeded`].
pub fn path_stats(
    graph: &FsmGraph,
    seg_start: &StateId,
    seg_end: &StateId,
    secret_vars: &BTreeSet<String>,
    path_budget: Option<usize>,
) -> Result<PathStats> {
    let seg_start = graph
        .state_ref(seg_start)
        .ok_or_else(|| AnalysisError::invalid_node(seg_start, "segment start"))?;
    if !graph.contains(seg_end) {
        return Err(AnalysisError::invalid_node(seg_end, "segment end"));
    }

    let mut stats = PathStats::default();
    let mut queue: VecDeque<(&StateId, usize, Vec<&StateId>)> =
        VecDeque::from([(seg_start, 0, vec![seg_start])]);
    let mut steps = 0usize;

    while let Some((node, length, path)) = queue.pop_front() {
        if let Some(budget) = path_budget {
            steps += 1;
            if steps > budget {
                return Err(AnalysisError::budget_exceeded("path enumeration", budget));
            }
        }

        if node == seg_end {
            stats.lengths.insert(length);
            continue;
        }

        for succ in graph.successors(node)? {
            if !path.contains(&succ) {
                let mut next_path = path.clone();
                next_path.push(succ);
                queue.push_back((succ, length + 1, next_path));
            }
        }

        if !stats.secret_dependency {
            let deps = graph.dependencies(node)?;
            if deps.iter().any(|dep| secret_vars.contains(dep)) {
                trace!(state = %node, "secret dependency observed");
                stats.secret_dependency = true;
            }
        }
    }

    trace!(
        seg_start = %seg_start,
        seg_end = %seg_end,
        lengths = ?stats.lengths,
        secret = stats.secret_dependency,
        "segment explored"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(spec: &[(&str, &[&str], &[&str])]) -> FsmGraph {
        FsmGraph::from_states(spec.iter().map(|(id, succs, deps)| {
            (
                StateId::from(*id),
                succs.iter().map(|s| StateId::from(*s)).collect(),
                deps.iter().map(|d| (*d).to_string()).collect(),
            )
        }))
        .expect("test graph is well-formed")
    }

    fn secrets(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn start_equals_end_records_zero_length() {
        let g = graph(&[("0", &["1"], &["s"]), ("1", &[], &[])]);
        let stats = path_stats(
            &g,
            &StateId::from("0"),
            &StateId::from("0"),
            &secrets(&["s"]),
            None,
        )
        .unwrap();
        assert_eq!(stats.lengths(), &BTreeSet::from([0]));
        assert!(stats.all_lengths_equal());
        // The branch stops at the end state before its labels are checked.
        assert!(!stats.secret_dependency());
    }

    #[test]
    fn no_path_means_lengths_not_equal() {
        let g = graph(&[("0", &[], &[]), ("1", &[], &[])]);
        let stats = path_stats(
            &g,
            &StateId::from("0"),
            &StateId::from("1"),
            &BTreeSet::new(),
            None,
        )
        .unwrap();
        assert!(stats.lengths().is_empty());
        assert!(!stats.all_lengths_equal());
    }

    #[test]
    fn dead_end_branches_still_flag_secrets() {
        // "1" never reaches the end but its labels are inspected while the
        // search is still extending.
        let g = graph(&[
            ("0", &["1", "2"], &[]),
            ("1", &[], &["ctrl.mr0"]),
            ("2", &["3"], &[]),
            ("3", &[], &[]),
        ]);
        let stats = path_stats(
            &g,
            &StateId::from("0"),
            &StateId::from("3"),
            &secrets(&["ctrl.mr0"]),
            None,
        )
        .unwrap();
        assert_eq!(stats.lengths(), &BTreeSet::from([2]));
        assert!(stats.secret_dependency());
    }

    #[test]
    fn end_state_labels_are_not_inspected() {
        let g = graph(&[("0", &["1"], &[]), ("1", &[], &["ctrl.mr0"])]);
        let stats = path_stats(
            &g,
            &StateId::from("0"),
            &StateId::from("1"),
            &secrets(&["ctrl.mr0"]),
            None,
        )
        .unwrap();
        assert!(!stats.secret_dependency());
    }

    #[test]
    fn cycles_terminate_via_simple_path_restriction() {
        let g = graph(&[
            ("0", &["1"], &[]),
            ("1", &["2"], &[]),
            ("2", &["1", "3"], &[]),
            ("3", &[], &[]),
        ]);
        let stats = path_stats(
            &g,
            &StateId::from("0"),
            &StateId::from("3"),
            &BTreeSet::new(),
            None,
        )
        .unwrap();
        assert_eq!(stats.lengths(), &BTreeSet::from([3]));
    }

    #[test]
    fn budget_exhaustion_is_an_error() {
        let g = graph(&[
            ("0", &["1", "2"], &[]),
            ("1", &["3"], &[]),
            ("2", &["3"], &[]),
            ("3", &[], &[]),
        ]);
        let err = path_stats(
            &g,
            &StateId::from("0"),
            &StateId::from("3"),
            &BTreeSet::new(),
            Some(2),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::BudgetExceeded { what: "path enumeration", .. }
        ));
    }
}
