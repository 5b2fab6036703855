//! Error types for analysis operations.
//!
//! The engine raises synchronously on malformed input and never substitutes
//! a default verdict for an error. `BudgetExceeded` in particular means
//! "inconclusive" and must not be read as "safe".

use smtt_common::{GraphError, StateId};
use thiserror::Error;

/// Convenience result alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur while analyzing a controller graph.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A start or end state handed to an operation is not part of the graph.
    #[error("{role} state '{node}' is not part of the graph")]
    InvalidNode {
        /// The offending state id.
        node: StateId,
        /// Which argument it was ("start", "end", "segment start", ...).
        role: &'static str,
    },

    /// A configured exploration budget ran out before the analysis finished.
    ///
    /// The graph is too large or too cyclic-dense for exhaustive simple-path
    /// analysis under the given bound; the result is inconclusive.
    #[error("{what} exceeded the configured budget of {budget} steps; result is inconclusive")]
    BudgetExceeded {
        /// Which phase ran out ("path enumeration", "dominator iteration").
        what: &'static str,
        /// The configured bound.
        budget: usize,
    },

    /// The underlying graph rejected an operation.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl AnalysisError {
    /// Create an invalid-node error for the given argument role.
    pub fn invalid_node(node: &StateId, role: &'static str) -> Self {
        Self::InvalidNode {
            node: node.clone(),
            role,
        }
    }

    /// Create a budget-exceeded error.
    pub fn budget_exceeded(what: &'static str, budget: usize) -> Self {
        Self::BudgetExceeded { what, budget }
    }
}
