//! FSM state-graph model.
//!
//! A controller is represented as a directed graph over symbolic state ids.
//! Each state carries an ordered list of successor states and the set of
//! variable names that influence its outgoing transitions. The graph is
//! validated once at construction and read-only afterwards; the whole
//! analysis pipeline operates on `&FsmGraph`.
//!
//! The on-disk representation is the JSON produced by the upstream
//! truth-table extraction tooling:
//!
//! ```json
//! { "0000": [["0001", "0100"], ["ctrl.start", "ctrl.mr0"]], ... }
//! ```
//!
//! Every id referenced as a successor must itself appear as a top-level key
//! (closed graph); anything else is rejected as [`GraphError::MalformedGraph`].

use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Symbolic identifier of a controller state.
///
/// Ids are opaque strings ("0", "0110", "IDLE"); the analysis never
/// interprets them beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    /// Wrap a raw id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StateId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Errors raised by graph construction and accessors.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A successor id does not appear among the graph's declared states.
    #[error("state '{state}' lists successor '{successor}' which is not a state of the graph")]
    MalformedGraph {
        /// State whose successor list is broken.
        state: StateId,
        /// The dangling successor id.
        successor: StateId,
    },

    /// An accessor was queried with an id that is not part of the graph.
    #[error("state '{0}' is not part of the graph")]
    UnknownState(StateId),

    /// The wire-format JSON could not be parsed.
    #[error("failed to parse graph JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The graph file could not be read.
    #[error("failed to read graph file: {0}")]
    Io(#[from] std::io::Error),
}

/// One state's record: ordered successors plus transition dependencies.
///
/// Serialized as a two-element array, matching the extraction tooling's
/// output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateEntry(Vec<StateId>, BTreeSet<String>);

/// Directed state graph of one controller, immutable once constructed.
///
/// Backed by an [`IndexMap`] so state iteration follows the insertion order
/// of the input file, which keeps dominator ordering and reports
/// deterministic across runs.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct FsmGraph {
    states: IndexMap<StateId, StateEntry>,
}

impl FsmGraph {
    /// Build a graph from `(state, successors, dependencies)` triples.
    ///
    /// Fails with [`GraphError::MalformedGraph`] if any successor id is not
    /// itself a declared state.
    pub fn from_states<I>(states: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (StateId, Vec<StateId>, BTreeSet<String>)>,
    {
        let states: IndexMap<StateId, StateEntry> = states
            .into_iter()
            .map(|(id, succs, deps)| (id, StateEntry(succs, deps)))
            .collect();
        Self::validated(states)
    }

    /// Parse a graph from its JSON wire format.
    pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
        let states: IndexMap<StateId, StateEntry> = serde_json::from_str(json)?;
        Self::validated(states)
    }

    /// Read and parse a graph file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let graph = Self::from_json_str(&json)?;
        debug!(path = %path.display(), states = graph.len(), "loaded graph");
        Ok(graph)
    }

    /// Serialize back to the JSON wire format.
    pub fn to_json_string(&self) -> Result<String, GraphError> {
        Ok(serde_json::to_string_pretty(&self.states)?)
    }

    fn validated(states: IndexMap<StateId, StateEntry>) -> Result<Self, GraphError> {
        for (id, StateEntry(succs, _)) in &states {
            for succ in succs {
                if !states.contains_key(succ) {
                    return Err(GraphError::MalformedGraph {
                        state: id.clone(),
                        successor: succ.clone(),
                    });
                }
            }
        }
        Ok(Self { states })
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the graph has no states at all.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Whether `id` is a state of this graph.
    pub fn contains(&self, id: &StateId) -> bool {
        self.states.contains_key(id)
    }

    /// All state ids, in input order.
    pub fn states(&self) -> impl Iterator<Item = &StateId> {
        self.states.keys()
    }

    /// The graph-owned reference for `id`, if it is a state of this graph.
    ///
    /// Lets callers key their own tables by references tied to the graph's
    /// lifetime instead of cloning ids.
    pub fn state_ref(&self, id: &StateId) -> Option<&StateId> {
        self.states.get_key_value(id).map(|(key, _)| key)
    }

    /// Ordered successors of `id`.
    pub fn successors(&self, id: &StateId) -> Result<&[StateId], GraphError> {
        self.states
            .get(id)
            .map(|StateEntry(succs, _)| succs.as_slice())
            .ok_or_else(|| GraphError::UnknownState(id.clone()))
    }

    /// Variables influencing the transitions out of `id`.
    pub fn dependencies(&self, id: &StateId) -> Result<&BTreeSet<String>, GraphError> {
        self.states
            .get(id)
            .map(|StateEntry(_, deps)| deps)
            .ok_or_else(|| GraphError::UnknownState(id.clone()))
    }

    /// The set of states reachable from `start` by forward edges,
    /// including `start` itself.
    pub fn reachable_from(&self, start: &StateId) -> Result<BTreeSet<StateId>, GraphError> {
        if !self.contains(start) {
            return Err(GraphError::UnknownState(start.clone()));
        }
        let mut reachable = BTreeSet::new();
        let mut to_visit = vec![start];
        reachable.insert(start.clone());
        while let Some(current) = to_visit.pop() {
            for succ in self.successors(current)? {
                if reachable.insert(succ.clone()) {
                    to_visit.push(succ);
                }
            }
        }
        Ok(reachable)
    }

    /// A copy of this graph with every state unreachable from `start`
    /// dropped.
    ///
    /// Successors of a reachable state are reachable by definition, so the
    /// closed-graph invariant survives the filtering.
    pub fn retain_reachable(&self, start: &StateId) -> Result<Self, GraphError> {
        let reachable = self.reachable_from(start)?;
        let states: IndexMap<StateId, StateEntry> = self
            .states
            .iter()
            .filter(|(id, _)| reachable.contains(*id))
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect();
        debug!(
            kept = states.len(),
            dropped = self.states.len() - states.len(),
            "pruned unreachable states"
        );
        Ok(Self { states })
    }
}
