//! Common types shared across the SMTT workspace.
//!
//! This crate provides the FSM graph model consumed by the analysis engine,
//! analysis configuration, and a collection of pre-defined controller test
//! cases used across the SMTT project.

mod config;
pub mod graph;
pub mod test_cases;

pub use crate::config::*;
pub use crate::graph::{FsmGraph, GraphError, StateId};
pub use crate::test_cases::*;
