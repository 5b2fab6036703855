//! Command-line arguments for the SMTT checker.

use std::path::PathBuf;

use clap::Parser;
use smtt_common::{Config, StateId};

/// SMTT Timing-Leak Checker - Detect timing side channels in FSM control logic
#[derive(Parser, Debug)]
#[command(name = "smtt")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Controller graph JSON files produced by the truth-table extraction flow
    #[arg(required = true)]
    pub graphs: Vec<PathBuf>,

    /// Entry (reset) state of the controller
    #[arg(short = 's', long, default_value = "0")]
    pub start: String,

    /// Final state whose dominator chain is analyzed
    #[arg(short = 'e', long)]
    pub end: String,

    /// Dependency variable treated as secret-derived (repeatable)
    #[arg(long = "secret", value_name = "VAR")]
    pub secrets: Vec<String>,

    /// Drop states unreachable from the start state before analysis
    #[arg(long, default_value_t = false)]
    pub prune_unreachable: bool,

    /// Bound on path-enumeration steps per dominator segment
    #[arg(long, value_name = "STEPS")]
    pub path_budget: Option<usize>,

    /// Emit the full analysis as JSON instead of a text report
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Analyze multiple graph files in parallel
    #[arg(short = 'p', long, default_value_t = true)]
    pub parallel: bool,
}

impl Args {
    /// Convert command-line arguments into the analysis configuration.
    pub fn to_config(&self) -> Config {
        let mut config = Config::new(self.secrets.iter().cloned());
        if let Some(budget) = self.path_budget {
            config = config.with_path_budget(budget);
        }
        config
    }

    /// The entry state as a graph id.
    pub fn start_id(&self) -> StateId {
        StateId::from(self.start.as_str())
    }

    /// The target state as a graph id.
    pub fn end_id(&self) -> StateId {
        StateId::from(self.end.as_str())
    }
}
