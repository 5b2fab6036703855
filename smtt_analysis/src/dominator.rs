//! Dominator analysis over controller state graphs.
//!
//! A state `d` dominates a state `n` (relative to a chosen start state)
//! if every path from the start to `n` passes through `d`. The dominators
//! of the end state are the mandatory checkpoints of the controller: an
//! execution cannot reach the end without visiting each of them.
//!
//! The solver is the classic iterative dataflow formulation: initialize
//! every set to the universe, then repeatedly intersect over predecessors
//! until nothing changes. Each set only ever shrinks, over a finite
//! universe, so the pass count is bounded by the number of states.
//!
//! Unreachable states keep their universal initialization at the fixed
//! point (no predecessor ever constrains them). Asking for the dominators
//! of an unreachable end state therefore yields a degenerate result rather
//! than an error; the orchestration layer flags it (see
//! [`crate::checker::Analysis::end_reachable`]).

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use smtt_common::{Config, FsmGraph, StateId};
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// Dominators of `end` relative to `start`, ordered by the sequence in
/// which a breadth-first traversal from `start` first discovers them.
///
/// The ordering is discovery order, not the order the dominators appear on
/// any single path; for graphs that branch and re-merge the two can differ.
pub fn dominators(graph: &FsmGraph, start: &StateId, end: &StateId) -> Result<Vec<StateId>> {
    dominators_with(graph, start, end, &Config::default())
}

/// [`dominators`] with an explicit configuration (pass budget).
pub fn dominators_with(
    graph: &FsmGraph,
    start: &StateId,
    end: &StateId,
    config: &Config,
) -> Result<Vec<StateId>> {
    let start = resolve(graph, start, "start")?;
    let end = resolve(graph, end, "end")?;

    let dom = solve(graph, start, config.dom_pass_budget)?;
    let dom_end = dom.get(end).expect("solver covers every state");

    // Forward BFS from the start; a dominator enters the output the first
    // time it is dequeued.
    let mut ordered = Vec::new();
    let mut visited: HashSet<&StateId> = HashSet::from([start]);
    let mut queue: VecDeque<&StateId> = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        if dom_end.contains(current) {
            ordered.push(current.clone());
        }
        for succ in graph.successors(current)? {
            if visited.insert(succ) {
                queue.push_back(succ);
            }
        }
    }

    debug!(
        start = %start,
        end = %end,
        dominators = ordered.len(),
        "ordered dominator chain"
    );
    Ok(ordered)
}

/// The raw (unordered) dominator set of `end` relative to `start`.
pub fn dominator_set(
    graph: &FsmGraph,
    start: &StateId,
    end: &StateId,
) -> Result<BTreeSet<StateId>> {
    let start = resolve(graph, start, "start")?;
    let end = resolve(graph, end, "end")?;
    let dom = solve(graph, start, None)?;
    Ok(dom
        .get(end)
        .expect("solver covers every state")
        .iter()
        .map(|s| (*s).clone())
        .collect())
}

fn resolve<'g>(graph: &'g FsmGraph, id: &StateId, role: &'static str) -> Result<&'g StateId> {
    graph
        .state_ref(id)
        .ok_or_else(|| AnalysisError::invalid_node(id, role))
}

/// Iterate the dominator sets of every state to their fixed point.
///
/// `dom[start]` is pinned to `{start}`; every other state starts at the
/// full universe, so states with no (constraining) predecessors keep it.
fn solve<'g>(
    graph: &'g FsmGraph,
    start: &'g StateId,
    pass_budget: Option<usize>,
) -> Result<HashMap<&'g StateId, HashSet<&'g StateId>>> {
    let universe: HashSet<&StateId> = graph.states().collect();

    let mut predecessors: HashMap<&StateId, Vec<&StateId>> =
        graph.states().map(|id| (id, Vec::new())).collect();
    for id in graph.states() {
        for succ in graph.successors(id)? {
            predecessors
                .get_mut(succ)
                .expect("closed graph: successor is a state")
                .push(id);
        }
    }

    let mut dom: HashMap<&StateId, HashSet<&StateId>> = graph
        .states()
        .map(|id| (id, universe.clone()))
        .collect();
    dom.insert(start, HashSet::from([start]));

    let mut passes = 0usize;
    loop {
        let mut changed = false;
        for node in graph.states().filter(|id| *id != start) {
            let mut next = universe.clone();
            for pred in &predecessors[node] {
                let pred_dom = &dom[pred];
                next.retain(|candidate| pred_dom.contains(candidate));
            }
            next.insert(node);
            if next != dom[node] {
                dom.insert(node, next);
                changed = true;
            }
        }
        passes += 1;
        if !changed {
            break;
        }
        if let Some(budget) = pass_budget {
            if passes >= budget {
                return Err(AnalysisError::budget_exceeded("dominator iteration", budget));
            }
        }
    }
    debug!(passes, states = graph.len(), "dominator fixed point reached");

    Ok(dom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet as Set;

    fn graph(spec: &[(&str, &[&str])]) -> FsmGraph {
        FsmGraph::from_states(spec.iter().map(|(id, succs)| {
            (
                StateId::from(*id),
                succs.iter().map(|s| StateId::from(*s)).collect(),
                Set::new(),
            )
        }))
        .expect("test graph is well-formed")
    }

    #[test]
    fn start_equals_end_is_just_start() {
        let g = graph(&[("0", &["1"]), ("1", &[])]);
        let doms = dominators(&g, &StateId::from("0"), &StateId::from("0")).unwrap();
        assert_eq!(doms, vec![StateId::from("0")]);
    }

    #[test]
    fn invalid_nodes_are_rejected() {
        let g = graph(&[("0", &[])]);
        let missing = StateId::from("nope");
        let err = dominators(&g, &missing, &StateId::from("0")).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidNode { role: "start", .. }));
        let err = dominators(&g, &StateId::from("0"), &missing).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidNode { role: "end", .. }));
    }

    #[test]
    fn branch_states_are_not_dominators() {
        let g = graph(&[("0", &["1", "2"]), ("1", &["3"]), ("2", &["3"]), ("3", &[])]);
        let doms = dominator_set(&g, &StateId::from("0"), &StateId::from("3")).unwrap();
        let expected: Set<StateId> = [StateId::from("0"), StateId::from("3")].into();
        assert_eq!(doms, expected);
    }

    #[test]
    fn pass_budget_surfaces_as_error() {
        // A four-state chain needs more than one pass to converge.
        let g = graph(&[("0", &["1"]), ("1", &["2"]), ("2", &["3"]), ("3", &[])]);
        let config = Config::default().with_dom_pass_budget(1);
        let err = dominators_with(&g, &StateId::from("0"), &StateId::from("3"), &config)
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::BudgetExceeded { what: "dominator iteration", .. }
        ));
    }
}
