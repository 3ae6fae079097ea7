//! Structural validation for the automaton arena
//!
//! Checks the invariants the matcher relies on: every child and suffix link
//! index is in bounds, every node is reachable from the root exactly once
//! (no cycles, no shared children, no orphans), depths grow by one along
//! trie edges, suffix links point strictly upward, and leaf flags agree with
//! the stored pattern ids.

use crate::{Automaton, ROOT};
use std::collections::{HashSet, VecDeque};

/// Validation result for an automaton
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Critical errors that make the structure unusable
    pub errors: Vec<String>,
    /// Warnings about potential issues (non-fatal)
    pub warnings: Vec<String>,
    /// Statistics gathered during validation
    pub stats: TrieStats,
}

/// Statistics gathered during validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrieStats {
    /// Number of allocated nodes
    pub node_count: u32,
    /// Number of nodes where at least one pattern terminates
    pub leaf_count: u32,
    /// Depth of the deepest node (length of the longest pattern)
    pub max_depth: u32,
    /// Number of nodes unreachable from the root
    pub orphaned_count: u32,
}

impl ValidationResult {
    fn new(node_count: usize) -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: TrieStats {
                node_count: node_count as u32,
                ..TrieStats::default()
            },
        }
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.stats.leaf_count += other.stats.leaf_count;
        self.stats.max_depth = self.stats.max_depth.max(other.stats.max_depth);
        self.stats.orphaned_count += other.stats.orphaned_count;
    }
}

/// Run every structural check
///
/// O(size of trie). An uninitialized automaton is trivially valid.
pub fn validate_structure(automaton: &Automaton) -> ValidationResult {
    let mut result = validate_reachability(automaton);
    result.merge(validate_suffix_links(automaton));
    result.merge(validate_pattern_references(automaton));
    result
}

/// Validate trie edges: BFS from the root, every node reached exactly once
pub fn validate_reachability(automaton: &Automaton) -> ValidationResult {
    let node_count = automaton.node_count();
    let mut result = ValidationResult::new(node_count);

    if node_count == 0 {
        return result;
    }

    let mut reached = vec![false; node_count];
    let mut queue = VecDeque::new();
    reached[ROOT.index()] = true;
    queue.push_back(ROOT);

    while let Some(id) = queue.pop_front() {
        let Some(node) = automaton.node(id) else {
            continue;
        };
        result.stats.max_depth = result.stats.max_depth.max(node.depth());

        for (symbol, child_id) in node.children() {
            let Some(child) = automaton.node(child_id) else {
                result.errors.push(format!(
                    "Node {} has dangling child {} on {:?}",
                    id, child_id, symbol
                ));
                continue;
            };
            if child_id == ROOT || reached[child_id.index()] {
                result.errors.push(format!(
                    "Node {} is reachable more than once (edge {:?} from {})",
                    child_id, symbol, id
                ));
                continue;
            }
            if child.depth() != node.depth() + 1 {
                result.errors.push(format!(
                    "Node {} has depth {} but its parent {} has depth {}",
                    child_id,
                    child.depth(),
                    id,
                    node.depth()
                ));
            }
            reached[child_id.index()] = true;
            queue.push_back(child_id);
        }
    }

    let orphaned = reached.iter().filter(|&&r| !r).count();
    if orphaned > 0 {
        result.stats.orphaned_count = orphaned as u32;
        result
            .errors
            .push(format!("{} node(s) unreachable from the root", orphaned));
    }

    result
}

/// Validate suffix links: root links to itself, every other link points to a
/// strictly shallower node
///
/// Stale links still satisfy these checks because node depths never change.
pub fn validate_suffix_links(automaton: &Automaton) -> ValidationResult {
    let mut result = ValidationResult::new(automaton.node_count());

    for (id, node) in automaton.nodes() {
        let link = node.suffix_link();
        let Some(target) = automaton.node(link) else {
            result
                .errors
                .push(format!("Node {} has dangling suffix link {}", id, link));
            continue;
        };

        if id == ROOT {
            if node.depth() != 0 {
                result
                    .errors
                    .push(format!("Root has depth {} (expected 0)", node.depth()));
            }
            if link != ROOT {
                result
                    .errors
                    .push(format!("Root suffix link points to {} (expected itself)", link));
            }
            continue;
        }

        if target.depth() >= node.depth() {
            result.errors.push(format!(
                "Node {} (depth {}) links to {} of depth {}",
                id,
                node.depth(),
                link,
                target.depth()
            ));
        }
    }

    result
}

/// Validate leaf flags and pattern id references
pub fn validate_pattern_references(automaton: &Automaton) -> ValidationResult {
    let mut result = ValidationResult::new(automaton.node_count());
    let pattern_count = automaton.pattern_count();
    let mut seen: HashSet<u32> = HashSet::new();

    for (id, node) in automaton.nodes() {
        let ids = node.pattern_ids();
        if node.is_leaf() {
            result.stats.leaf_count += 1;
        }

        match (node.is_leaf(), ids.is_empty()) {
            (true, true) => result
                .errors
                .push(format!("Node {} is a leaf without pattern ids", id)),
            (false, false) => result
                .errors
                .push(format!("Node {} stores pattern ids but is not a leaf", id)),
            _ => {}
        }

        if id == ROOT && !ids.is_empty() {
            result
                .errors
                .push("Root stores pattern ids (empty pattern)".to_string());
        }

        if ids.len() > 1 {
            result.warnings.push(format!(
                "Node {} terminates {} identical patterns: {:?}",
                id,
                ids.len(),
                ids
            ));
        }

        for &pattern_id in ids {
            if pattern_id >= pattern_count {
                result.errors.push(format!(
                    "Node {} references pattern {} out of range (count={})",
                    id, pattern_id, pattern_count
                ));
            }
            if !seen.insert(pattern_id) {
                result.errors.push(format!(
                    "Pattern {} terminates at more than one node",
                    pattern_id
                ));
            }
        }

        if node.children().next().is_none() && !node.is_leaf() && id != ROOT {
            result
                .warnings
                .push(format!("Node {} is a dead end (no children, not a leaf)", id));
        }
    }

    if (seen.len() as u64) < u64::from(pattern_count) {
        result.warnings.push(format!(
            "{} pattern id(s) have no terminal node",
            u64::from(pattern_count) - seen.len() as u64
        ));
    }

    result
}
