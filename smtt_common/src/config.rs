//! Configuration for a timing-leak analysis run.
//!
//! This module exposes a minimal, stable surface for consumers (for example,
//! the `smtt_analysis` crate and the CLI) to parameterize an analysis.
//!
//! The two main concepts are:
//! - secret_vars: which transition-dependency variable names count as
//!   secret-derived. Always supplied by the caller; the engine hard-codes
//!   nothing about any particular controller.
//! - budgets: optional hard bounds on path enumeration and on the dominator
//!   fixed-point iteration. When a budget runs out the analysis surfaces an
//!   explicit inconclusive error instead of blocking or silently truncating.

use std::collections::BTreeSet;

/// Global analysis configuration.
///
/// - secret_vars: dependency labels treated as secret-derived.
/// - path_budget: maximum number of dequeued exploration steps per dominator
///   segment. `None` reproduces the reference behavior (unbounded; simple-path
///   enumeration is exponential in branching factor, acceptable for
///   hand-extracted FSMs of tens of states).
/// - dom_pass_budget: maximum number of full fixed-point passes in the
///   dominator solver. Convergence is guaranteed regardless, so this bound
///   only matters as hardening against hostile inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Dependency variable names treated as secret-derived.
    pub secret_vars: BTreeSet<String>,
    /// Bound on dequeued path-extension steps per segment, if any.
    pub path_budget: Option<usize>,
    /// Bound on dominator fixed-point passes, if any.
    pub dom_pass_budget: Option<usize>,
}

impl Config {
    /// Create a configuration with the given secret variables and no budgets.
    pub fn new<I, S>(secret_vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            secret_vars: secret_vars.into_iter().map(Into::into).collect(),
            path_budget: None,
            dom_pass_budget: None,
        }
    }

    /// Set the per-segment path enumeration budget.
    pub fn with_path_budget(mut self, budget: usize) -> Self {
        self.path_budget = Some(budget);
        self
    }

    /// Set the dominator fixed-point pass budget.
    pub fn with_dom_pass_budget(mut self, budget: usize) -> Self {
        self.dom_pass_budget = Some(budget);
        self
    }

    /// Add one secret variable name.
    pub fn secret(mut self, name: impl Into<String>) -> Self {
        self.secret_vars.insert(name.into());
        self
    }
}
