//! SMTT Timing-Leak Checker CLI
//!
//! Entry point for the SMTT command-line tool. Loads controller state
//! graphs and checks each one for timing side channels between the entry
//! and final states.

#[global_allocator]
/// Global allocator using jemalloc for better performance in parallel workloads.
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod args;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use rayon::prelude::*;
use smtt_analysis::{Analysis, AnalysisError, LeakChecker};
use smtt_common::{Config, FsmGraph};
use tracing::info;

use args::Args;

/// Result of one graph file: the analysis, or whatever went wrong with it.
type FileOutcome = (PathBuf, Result<Analysis, AnalysisError>);

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let outcomes = run(&args);

    if args.json {
        render_json(&outcomes);
    } else {
        for outcome in &outcomes {
            render_text(outcome);
        }
    }

    ExitCode::from(exit_status(&outcomes))
}

/// Analyze every graph file named on the command line.
fn run(args: &Args) -> Vec<FileOutcome> {
    let config = args.to_config();
    info!(
        files = args.graphs.len(),
        secrets = config.secret_vars.len(),
        "starting analysis"
    );

    if args.parallel {
        args.graphs
            .par_iter()
            .map(|path| (path.clone(), analyze_file(path, args, &config)))
            .collect()
    } else {
        args.graphs
            .iter()
            .map(|path| (path.clone(), analyze_file(path, args, &config)))
            .collect()
    }
}

fn analyze_file(path: &Path, args: &Args, config: &Config) -> Result<Analysis, AnalysisError> {
    let graph = FsmGraph::from_json_file(path)?;
    let start = args.start_id();
    let end = args.end_id();
    let graph = if args.prune_unreachable {
        graph.retain_reachable(&start)?
    } else {
        graph
    };
    LeakChecker::new(&graph, config).analyze(&start, &end)
}

fn render_text(outcome: &FileOutcome) {
    let (path, result) = outcome;
    println!("\n=== {} ===", path.display());
    match result {
        Ok(analysis) => {
            let chain = analysis
                .dominators
                .iter()
                .map(|s| s.as_str().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            println!("dominator chain: {chain}");
            for segment in &analysis.segments {
                let lengths = segment
                    .lengths
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                println!(
                    "segment {} -> {}: lengths [{}], secret dependency: {}{}",
                    segment.from,
                    segment.to,
                    lengths,
                    if segment.secret_dependency { "yes" } else { "no" },
                    if segment.leaky { "  << LEAK" } else { "" },
                );
            }
            if !analysis.end_reachable {
                println!(
                    "WARNING: end state '{}' is unreachable from '{}'; verdict is vacuous",
                    analysis.end, analysis.start
                );
            }
            println!(
                "verdict: {}",
                if analysis.safe {
                    "no timing side channel found"
                } else {
                    "TIMING SIDE CHANNEL"
                }
            );
        }
        Err(e) => println!("error: {e}"),
    }
}

fn render_json(outcomes: &[FileOutcome]) {
    let entries: Vec<serde_json::Value> = outcomes
        .iter()
        .map(|(path, result)| match result {
            Ok(analysis) => serde_json::json!({"file": path, "analysis": analysis}),
            Err(e) => serde_json::json!({"file": path, "error": e.to_string()}),
        })
        .collect();
    match serde_json::to_string_pretty(&entries) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize report: {e}"),
    }
}

/// 0 when every graph is leak-free, 1 when any graph is vulnerable,
/// 2 when any file failed to analyze at all.
fn exit_status(outcomes: &[FileOutcome]) -> u8 {
    if outcomes.iter().any(|(_, r)| r.is_err()) {
        2
    } else if outcomes.iter().any(|(_, r)| r.as_ref().is_ok_and(|a| !a.safe)) {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_graph(dir: &tempfile::TempDir, name: &str, json: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create graph file");
        file.write_all(json.as_bytes()).expect("write graph file");
        path
    }

    fn args_for(paths: Vec<PathBuf>, end: &str, secrets: &[&str]) -> Args {
        Args {
            graphs: paths,
            start: "0".to_string(),
            end: end.to_string(),
            secrets: secrets.iter().map(|s| (*s).to_string()).collect(),
            prune_unreachable: false,
            path_budget: None,
            json: false,
            parallel: false,
        }
    }

    const LEAKY: &str = r#"{
        "0": [["1", "2"], []],
        "1": [["3"], ["mr0"]],
        "2": [["4"], []],
        "4": [["3"], []],
        "3": [[], []]
    }"#;

    const SAFE: &str = r#"{
        "0": [["1", "2"], []],
        "1": [["3"], ["mr0"]],
        "2": [["3"], []],
        "3": [[], []]
    }"#;

    #[test]
    fn safe_graph_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_graph(&dir, "safe.json", SAFE);
        let outcomes = run(&args_for(vec![path], "3", &["mr0"]));
        assert_eq!(exit_status(&outcomes), 0);
        assert!(outcomes[0].1.as_ref().unwrap().safe);
    }

    #[test]
    fn leaky_graph_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_graph(&dir, "leaky.json", LEAKY);
        let outcomes = run(&args_for(vec![path], "3", &["mr0"]));
        assert_eq!(exit_status(&outcomes), 1);
        assert!(!outcomes[0].1.as_ref().unwrap().safe);
    }

    #[test]
    fn mixed_batch_reports_the_leak() {
        let dir = tempfile::tempdir().unwrap();
        let safe = write_graph(&dir, "safe.json", SAFE);
        let leaky = write_graph(&dir, "leaky.json", LEAKY);
        let mut args = args_for(vec![safe, leaky], "3", &["mr0"]);
        args.parallel = true;
        let outcomes = run(&args);
        assert_eq!(exit_status(&outcomes), 1);
    }

    #[test]
    fn malformed_graph_exits_two() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_graph(&dir, "broken.json", r#"{"0": [["missing"], []]}"#);
        let outcomes = run(&args_for(vec![path], "0", &[]));
        assert_eq!(exit_status(&outcomes), 2);
    }

    #[test]
    fn pruning_drops_the_island() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{
            "0": [["1"], []],
            "1": [[], []],
            "9": [["9"], ["mr0"]]
        }"#;
        let path = write_graph(&dir, "island.json", json);
        let mut args = args_for(vec![path], "1", &["mr0"]);
        args.prune_unreachable = true;
        let outcomes = run(&args);
        let analysis = outcomes[0].1.as_ref().unwrap();
        assert!(analysis.safe);
        assert!(analysis.end_reachable);
    }
}
