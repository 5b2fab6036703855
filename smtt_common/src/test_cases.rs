//! Common test cases and definitions for SMTT.
//!
//! This module defines small controller graphs with known dominator chains
//! and known verdicts, and provides a collection of pre-defined test cases
//! shared by the unit and integration tests of the analysis crates.

use std::collections::BTreeSet;

use crate::config::Config;
use crate::graph::{FsmGraph, StateId};

/// A complete test case definition.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// The name of the test case.
    pub name: &'static str,
    /// The controller graph under analysis.
    pub graph: &'static FsmGraph,
    /// Entry state of the analysis.
    pub start: &'static str,
    /// Target state whose dominator chain is analyzed.
    pub end: &'static str,
    /// Variable names treated as secret-derived.
    pub secret_vars: &'static [&'static str],
    /// Expected dominators of `end`, in BFS discovery order from `start`.
    pub expected_dominators: &'static [&'static str],
    /// Whether `end` is reachable from `start` at all.
    pub expected_end_reachable: bool,
    /// The expected verdict: true means free of timing leaks.
    pub expected_safe: bool,
}

impl TestCase {
    /// Entry state as an owned id.
    pub fn start_id(&self) -> StateId {
        StateId::from(self.start)
    }

    /// Target state as an owned id.
    pub fn end_id(&self) -> StateId {
        StateId::from(self.end)
    }

    /// The secret-variable set for this case.
    pub fn secrets(&self) -> BTreeSet<String> {
        self.secret_vars.iter().map(|s| (*s).to_string()).collect()
    }

    /// An analysis configuration matching this case.
    pub fn config(&self) -> Config {
        Config::new(self.secret_vars.iter().copied())
    }
}

fn state(id: &str, succs: &[&str], deps: &[&str]) -> (StateId, Vec<StateId>, BTreeSet<String>) {
    (
        StateId::from(id),
        succs.iter().map(|s| StateId::from(*s)).collect(),
        deps.iter().map(|d| (*d).to_string()).collect(),
    )
}

// #####################
// CONTROLLER GRAPHS
// #####################
lazy_static::lazy_static! {
    /// 0 -> 1 -> 2 -> 3, no branching at all.
    static ref STRAIGHT_LINE: FsmGraph = FsmGraph::from_states([
        state("0", &["1"], &[]),
        state("1", &["2"], &["ctrl.mr0"]),
        state("2", &["3"], &[]),
        state("3", &[], &[]),
    ]).expect("straight line graph is well-formed");

    /// Two branches of equal length; one branch secret-dependent.
    static ref DIAMOND_EQUAL: FsmGraph = FsmGraph::from_states([
        state("0", &["1", "2"], &[]),
        state("1", &["3"], &["secretA"]),
        state("2", &["3"], &[]),
        state("3", &[], &[]),
    ]).expect("diamond graph is well-formed");

    /// Branches of length 2 and 3; the short branch secret-dependent.
    static ref UNEQUAL_SECRET: FsmGraph = FsmGraph::from_states([
        state("0", &["1", "2"], &[]),
        state("1", &["3"], &["ctrl.mr0"]),
        state("2", &["4"], &[]),
        state("4", &["3"], &[]),
        state("3", &[], &[]),
    ]).expect("unequal branch graph is well-formed");

    /// Same shape as UNEQUAL_SECRET but with no dependencies anywhere.
    static ref UNEQUAL_CLEAN: FsmGraph = FsmGraph::from_states([
        state("0", &["1", "2"], &[]),
        state("1", &["3"], &[]),
        state("2", &["4"], &[]),
        state("4", &["3"], &[]),
        state("3", &[], &[]),
    ]).expect("clean unequal branch graph is well-formed");

    /// Contains the cycle 1 -> 2 -> 1; analysis must still terminate.
    static ref LOOP_CONTROLLER: FsmGraph = FsmGraph::from_states([
        state("0", &["1"], &[]),
        state("1", &["2"], &[]),
        state("2", &["1", "3"], &["ctrl.mr1"]),
        state("3", &[], &[]),
    ]).expect("loop controller graph is well-formed");

    /// `9` sits on its own island; dominator analysis of it degenerates.
    static ref UNREACHABLE_END: FsmGraph = FsmGraph::from_states([
        state("0", &["1"], &[]),
        state("1", &[], &[]),
        state("9", &["9"], &["ctrl.mr3"]),
    ]).expect("island graph is well-formed");

    /// Two dominator segments: an equal diamond followed by a leaky fork.
    static ref TWO_SEGMENT_LEAK: FsmGraph = FsmGraph::from_states([
        state("0", &["1", "2"], &[]),
        state("1", &["3"], &[]),
        state("2", &["3"], &[]),
        state("3", &["4", "5"], &[]),
        state("4", &["6"], &[]),
        state("5", &["7"], &["ctrl.mr2"]),
        state("7", &["6"], &[]),
        state("6", &[], &[]),
    ]).expect("two segment graph is well-formed");
}

// #####################
// TEST CASES
// #####################
lazy_static::lazy_static! {
    /// Pre-defined controller test cases shared across the workspace.
    pub static ref BASIC_TEST_CASES: Vec<TestCase> = vec![
        TestCase {
            name: "straight_line",
            graph: &STRAIGHT_LINE,
            start: "0",
            end: "3",
            secret_vars: &["ctrl.mr0"],
            expected_dominators: &["0", "1", "2", "3"],
            expected_end_reachable: true,
            expected_safe: true,
        },
        TestCase {
            name: "diamond_equal_lengths_with_secret",
            graph: &DIAMOND_EQUAL,
            start: "0",
            end: "3",
            secret_vars: &["secretA"],
            expected_dominators: &["0", "3"],
            expected_end_reachable: true,
            expected_safe: true,
        },
        TestCase {
            name: "unequal_lengths_with_secret",
            graph: &UNEQUAL_SECRET,
            start: "0",
            end: "3",
            secret_vars: &["ctrl.mr0"],
            expected_dominators: &["0", "3"],
            expected_end_reachable: true,
            expected_safe: false,
        },
        TestCase {
            name: "unequal_lengths_no_secret",
            graph: &UNEQUAL_CLEAN,
            start: "0",
            end: "3",
            secret_vars: &["ctrl.mr0"],
            expected_dominators: &["0", "3"],
            expected_end_reachable: true,
            expected_safe: true,
        },
        TestCase {
            name: "loop_controller_terminates",
            graph: &LOOP_CONTROLLER,
            start: "0",
            end: "3",
            secret_vars: &["ctrl.mr1"],
            expected_dominators: &["0", "1", "2", "3"],
            expected_end_reachable: true,
            expected_safe: true,
        },
        TestCase {
            name: "unreachable_end_degenerates",
            graph: &UNREACHABLE_END,
            start: "0",
            end: "9",
            secret_vars: &["ctrl.mr3"],
            // dom(9) stays the universal set, so the BFS from "0" emits
            // every reachable state as a dominator.
            expected_dominators: &["0", "1"],
            expected_end_reachable: false,
            expected_safe: true,
        },
        TestCase {
            name: "second_segment_leaks",
            graph: &TWO_SEGMENT_LEAK,
            start: "0",
            end: "6",
            secret_vars: &["ctrl.mr2"],
            expected_dominators: &["0", "3", "6"],
            expected_end_reachable: true,
            expected_safe: false,
        },
    ];
}
