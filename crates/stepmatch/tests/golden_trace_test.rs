// Hand-verified Aho-Corasick traces

use stepmatch::{find_all, Driver, MatchRecord, NodeId, Phase};

const REFERENCE_PATTERNS: [&str; 7] = ["a", "ab", "bab", "bc", "bca", "c", "caa"];

fn records(pairs: &[(usize, u32)]) -> Vec<MatchRecord> {
    pairs
        .iter()
        .map(|&(index, pattern)| MatchRecord::new(index, pattern))
        .collect()
}

fn reference_driver() -> Driver {
    let mut driver = Driver::new();
    for pattern in REFERENCE_PATTERNS {
        driver.add_pattern(pattern).unwrap();
    }
    driver.set_text("abccab");
    driver
}

/// Every state visited and every raw record emitted while scanning "abccab"
#[test]
fn test_reference_scenario_step_trace() {
    let mut driver = reference_driver();
    // Nodes are allocated in insertion order:
    // a=1 ab=2 b=3 ba=4 bab=5 bc=6 bca=7 c=8 ca=9 caa=10
    assert_eq!(driver.automaton().node_count(), 11);

    let expected_states = [1, 2, 6, 8, 9, 2];
    let expected_raw: [&[(usize, u32)]; 6] = [
        &[(0, 0)],
        &[(1, 1)],
        &[(2, 3), (2, 5)],
        &[(3, 5)],
        &[(4, 0)],
        &[(5, 1)],
    ];

    for (i, (&state, &raw)) in expected_states.iter().zip(expected_raw.iter()).enumerate() {
        let before = driver.raw_results().len();
        assert!(driver.step(), "step {} should consume a symbol", i);
        assert_eq!(
            driver.automaton().current_state(),
            NodeId(state),
            "state after step {}",
            i
        );
        assert_eq!(
            &driver.raw_results()[before..],
            records(raw).as_slice(),
            "records at step {}",
            i
        );
    }

    assert!(!driver.step());
    assert_eq!(driver.phase(), Phase::Done);
}

#[test]
fn test_reference_scenario_results() {
    let expected = records(&[(0, 0), (0, 1), (1, 3), (2, 5), (3, 5), (4, 0), (4, 1)]);

    let mut driver = reference_driver();
    driver.run_to_completion();
    assert_eq!(driver.results(), expected);
    assert_eq!(driver.results_to_string(), "[0:0] [0:1] [1:3] [2:5] [3:5] [4:0] [4:1] ");

    assert_eq!(find_all("abccab", REFERENCE_PATTERNS).unwrap(), expected);
}

/// "he" is found inside both "she" and "hers"
#[test]
fn test_ushers() {
    let patterns = ["he", "she", "hers", "his"];
    let expected = records(&[(1, 1), (2, 0), (2, 2)]);

    assert_eq!(find_all("ushers", patterns).unwrap(), expected);

    let mut driver = Driver::new();
    for pattern in patterns {
        driver.add_pattern(pattern).unwrap();
    }
    driver.set_text("ushers");
    while driver.step() {}
    assert_eq!(driver.results(), expected);
    assert_eq!(driver.raw_results(), records(&[(3, 1), (3, 0), (5, 2)]).as_slice());
}

#[test]
fn test_ushers_with_his_present() {
    let matches = find_all("ushishers", ["he", "she", "hers", "his"]).unwrap();
    assert_eq!(matches, records(&[(2, 3), (4, 1), (5, 0), (5, 2)]));
}

#[test]
fn test_pattern_that_is_suffix_of_many() {
    // "a" is a suffix of every other pattern
    let matches = find_all("xaaa", ["aaa", "aa", "a"]).unwrap();
    assert_eq!(
        matches,
        records(&[(1, 0), (1, 1), (1, 2), (2, 1), (2, 2), (3, 2)])
    );
}
