//! Stepmatch - Stepwise Aho-Corasick Multi-Pattern Matching
//!
//! Stepmatch finds every occurrence of every pattern from a fixed set in a
//! text, scanning the text once. Besides the usual one-shot search it exposes
//! the scan itself: symbols can be fed one at a time, each step can be undone,
//! and the whole matcher state can be dumped to text and loaded back.
//!
//! # Quick Start - Batch Matching
//!
//! ```rust
//! use stepmatch::{find_all, MatchRecord};
//!
//! let matches = find_all("ushers", ["he", "she", "hers", "his"])?;
//!
//! // (start index, pattern id), sorted
//! assert_eq!(
//!     matches,
//!     vec![
//!         MatchRecord::new(1, 1),
//!         MatchRecord::new(2, 0),
//!         MatchRecord::new(2, 2),
//!     ]
//! );
//! # Ok::<(), stepmatch::MatchError>(())
//! ```
//!
//! # Stepping and Undo
//!
//! ```rust
//! use stepmatch::{Driver, Phase};
//!
//! let mut driver = Driver::builder().history_capacity(16).build();
//! driver.add_pattern("ab")?;
//! driver.add_pattern("b")?;
//! driver.set_text("abab");
//!
//! driver.step();
//! driver.step();
//! assert_eq!(driver.phase(), Phase::Running);
//! assert_eq!(driver.raw_results().len(), 2); // "ab" and "b" end at index 1
//!
//! driver.undo();
//! assert_eq!(driver.cursor(), 1);
//! # Ok::<(), stepmatch::MatchError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! add_pattern ──► Automaton (trie + suffix links, stepmatch-automaton)
//!                      │
//! set_text ──► step ───┤ transition, walk suffix chain
//!                      ▼
//!              raw records (end-anchored) ──► results() (start-anchored, sorted)
//!
//! every mutation ──► History (bounded snapshots) ──► undo
//! Driver ◄──► codec (textual dump, per-field fallback)
//! ```
//!
//! Symbols are Unicode scalar values (`char`); every index counts symbols,
//! not bytes.

pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod history;
pub mod results;

pub use codec::{decode, encode, read_dump, write_dump, Decoded, DumpField};
pub use config::{DriverBuilder, DriverConfig, DEFAULT_HISTORY_CAPACITY};
pub use driver::{Driver, DriverStatus, Phase, Snapshot};
pub use error::{MatchError, Result};
pub use history::History;
pub use results::MatchRecord;

// Re-export the automaton surface for read-only inspection
pub use stepmatch_automaton::{
    validate_structure, Automaton, AutomatonError, AutomatonStatus, Node, NodeId, PatternId,
    TrieStats, ValidationResult, ROOT,
};

/// Match every pattern against `text` in one pass
///
/// Builds a fresh automaton with history disabled, scans the whole text and
/// returns start-anchored records sorted by (index, pattern id). Pattern ids
/// follow the iteration order of `patterns`. Nothing is retained afterwards.
///
/// Fails only if a pattern is empty.
pub fn find_all<I, S>(text: &str, patterns: I) -> Result<Vec<MatchRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut driver = Driver::builder().no_history().build();
    for pattern in patterns {
        driver.add_pattern(pattern.as_ref())?;
    }
    driver.set_text(text);
    driver.run_to_completion();
    Ok(driver.results())
}
