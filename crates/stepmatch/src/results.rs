//! Match records and post-processing
//!
//! The driver records matches anchored at the *last* symbol of the match
//! (that is where the automaton notices them). Callers usually want the
//! *first* symbol, so [`process`] shifts each record back by the pattern
//! length and sorts the result.

use std::fmt::Write;
use stepmatch_automaton::PatternId;

/// One match: a symbol index and the id of the matched pattern
///
/// Ordering is by index, then by pattern id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchRecord {
    /// Symbol index (end-anchored in raw records, start-anchored once processed)
    pub index: usize,
    /// Insertion index of the pattern
    pub pattern: PatternId,
}

impl MatchRecord {
    pub fn new(index: usize, pattern: PatternId) -> Self {
        Self { index, pattern }
    }
}

/// Convert raw end-anchored records into sorted start-anchored ones
///
/// `pattern_len` returns the length of a pattern in symbols. Records that
/// refer to an unknown pattern, or that would start before index 0, are
/// dropped.
pub fn process<F>(raw: &[MatchRecord], pattern_len: F) -> Vec<MatchRecord>
where
    F: Fn(PatternId) -> Option<usize>,
{
    let mut processed: Vec<MatchRecord> = raw
        .iter()
        .filter_map(|record| {
            let len = pattern_len(record.pattern)?;
            let start = (record.index + 1).checked_sub(len)?;
            Some(MatchRecord::new(start, record.pattern))
        })
        .collect();
    processed.sort();
    processed
}

/// Render records as `[index:pattern] ` tokens (each followed by a space)
pub fn format_records(records: &[MatchRecord]) -> String {
    let mut out = String::with_capacity(records.len() * 8);
    for record in records {
        // Writing to a String cannot fail
        let _ = write!(out, "[{}:{}] ", record.index, record.pattern);
    }
    out
}

/// Parse a line produced by [`format_records`]
///
/// Returns `None` if any token is malformed.
pub fn parse_records(line: &str) -> Option<Vec<MatchRecord>> {
    line.split_whitespace()
        .map(|token| {
            let inner = token.strip_prefix('[')?.strip_suffix(']')?;
            let (index, pattern) = inner.split_once(':')?;
            Some(MatchRecord::new(index.parse().ok()?, pattern.parse().ok()?))
        })
        .collect()
}
