//! In-crate tests driven by the shared controller test-case table.

use smtt_common::BASIC_TEST_CASES;

use crate::{LeakChecker, check_timing_safety, dominators};

#[test]
fn test_dominator_chains() {
    for case in BASIC_TEST_CASES.iter() {
        let chain = dominators(case.graph, &case.start_id(), &case.end_id())
            .unwrap_or_else(|e| panic!("dominators failed for '{}': {e}", case.name));
        let chain: Vec<&str> = chain.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            chain, case.expected_dominators,
            "Test '{}' failed: expected dominator chain {:?}, got {:?}",
            case.name, case.expected_dominators, chain
        );
    }
}

#[test]
fn test_verdicts() {
    for case in BASIC_TEST_CASES.iter() {
        let safe = check_timing_safety(case.graph, &case.start_id(), &case.end_id(), &case.secrets())
            .unwrap_or_else(|e| panic!("check failed for '{}': {e}", case.name));
        assert_eq!(
            safe, case.expected_safe,
            "Test '{}' failed: expected safe={}, got {}",
            case.name, case.expected_safe, safe
        );
    }
}

#[test]
fn test_full_reports() {
    for case in BASIC_TEST_CASES.iter() {
        let config = case.config();
        let checker = LeakChecker::new(case.graph, &config);
        let analysis = checker
            .analyze(&case.start_id(), &case.end_id())
            .unwrap_or_else(|e| panic!("analyze failed for '{}': {e}", case.name));

        assert_eq!(
            analysis.safe, case.expected_safe,
            "Test '{}' failed: report verdict mismatch",
            case.name
        );
        assert_eq!(
            analysis.end_reachable, case.expected_end_reachable,
            "Test '{}' failed: end reachability mismatch",
            case.name
        );
        assert_eq!(
            analysis.segments.len(),
            analysis.dominators.len().saturating_sub(1),
            "Test '{}' failed: one segment per consecutive dominator pair",
            case.name
        );
        // The report verdict must agree with the segment details.
        assert_eq!(
            analysis.safe,
            analysis.segments.iter().all(|s| !s.leaky),
            "Test '{}' failed: verdict inconsistent with segments",
            case.name
        );
    }
}
