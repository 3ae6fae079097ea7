//! Step-by-step matching driver
//!
//! The [`Driver`] owns an automaton, the pattern list, the text and a cursor.
//! Each [`Driver::step`] consumes one symbol, advances the automaton and
//! records every pattern that ends at that position. Mutating calls push a
//! snapshot of the previous state onto a bounded [`History`], which
//! [`Driver::undo`] pops.
//!
//! Snapshots are cheap: the trie, the pattern list and the text are shared
//! through `Arc` and only copied when a later call actually changes them.

use crate::config::{DriverBuilder, DriverConfig};
use crate::error::Result;
use crate::history::History;
use crate::results::{self, MatchRecord};
use std::fmt;
use std::sync::Arc;
use stepmatch_automaton::{Automaton, AutomatonStatus, PatternId};
use tracing::{debug, trace};

/// Coarse lifecycle phase, derived from the driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No patterns and no text
    Empty,
    /// Patterns present, no text yet
    Building,
    /// Text set, nothing consumed
    Ready,
    /// Part of the text consumed
    Running,
    /// Whole text consumed
    Done,
}

/// Immutable copy of everything a mutation can change
#[derive(Debug, Clone)]
pub struct Snapshot {
    automaton: Automaton,
    patterns: Arc<Vec<String>>,
    pattern_lens: Arc<Vec<usize>>,
    text: Arc<str>,
    symbols: Arc<[char]>,
    cursor: usize,
    raw: Vec<MatchRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            automaton: Automaton::new(),
            patterns: Arc::default(),
            pattern_lens: Arc::default(),
            text: Arc::from(""),
            symbols: Arc::from(Vec::new()),
            cursor: 0,
            raw: Vec::new(),
        }
    }
}

impl Snapshot {
    /// Automaton as it was when the snapshot was taken
    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// Pattern list, indexed by pattern id
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Text being scanned
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of symbols consumed
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// End-anchored records in discovery order
    pub fn raw_results(&self) -> &[MatchRecord] {
        &self.raw
    }

    /// Rebuild stale links and re-derive the current state from the consumed
    /// prefix, so patterns added mid-scan are tracked from the next symbol on.
    /// No records are emitted for the replayed prefix.
    fn resync(&mut self) {
        if self.automaton.links_stale() {
            self.automaton.rebuild_links();
        }
        self.automaton.clear_transitions();
        for &symbol in self.symbols.iter().take(self.cursor) {
            self.automaton.transition(symbol);
        }
        trace!(cursor = self.cursor, "resynced current state");
    }
}

/// Aggregated health of a driver
///
/// Computing it runs the automaton's full structural validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverStatus {
    /// Automaton health
    pub automaton: AutomatonStatus,
    /// Cursor is within the text
    pub cursor_ok: bool,
    /// Every raw record names a known pattern and a consumed position
    pub results_ok: bool,
    /// Pattern list agrees with the automaton's pattern count
    pub patterns_ok: bool,
}

impl DriverStatus {
    /// True if every part is healthy
    ///
    /// An uninitialized automaton (no patterns yet) counts as healthy.
    pub fn is_ok(&self) -> bool {
        matches!(
            self.automaton,
            AutomatonStatus::Ok | AutomatonStatus::Uninitialized
        ) && self.cursor_ok
            && self.results_ok
            && self.patterns_ok
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("OK");
        }
        let mut parts = Vec::new();
        if !self.cursor_ok {
            parts.push("TextPositionNotOK".to_string());
        }
        if !self.results_ok {
            parts.push("ResultsNotOK".to_string());
        }
        if !self.patterns_ok {
            parts.push("PatternsNotOK".to_string());
        }
        if !matches!(
            self.automaton,
            AutomatonStatus::Ok | AutomatonStatus::Uninitialized
        ) {
            parts.push(format!("Automaton_{}", self.automaton));
        }
        f.write_str(&parts.join(" "))
    }
}

/// Stepwise Aho-Corasick matcher with undo history
///
/// Single-owner: no internal locking. Stepping while another party grows the
/// trie is not supported.
///
/// # Examples
///
/// ```
/// use stepmatch::{Driver, MatchRecord};
///
/// let mut driver = Driver::new();
/// for pattern in ["he", "she", "hers"] {
///     driver.add_pattern(pattern)?;
/// }
/// driver.set_text("ushers");
///
/// while driver.step() {}
///
/// assert_eq!(
///     driver.results(),
///     vec![
///         MatchRecord::new(1, 1), // "she"
///         MatchRecord::new(2, 0), // "he"
///         MatchRecord::new(2, 2), // "hers"
///     ]
/// );
///
/// // Roll back the last step
/// assert!(driver.undo());
/// assert_eq!(driver.cursor(), 5);
/// # Ok::<(), stepmatch::MatchError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Driver {
    config: DriverConfig,
    state: Snapshot,
    history: History<Snapshot>,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    /// Create a driver with the default configuration
    pub fn new() -> Self {
        Self::with_config(DriverConfig::default())
    }

    /// Create a driver with an explicit configuration
    pub fn with_config(config: DriverConfig) -> Self {
        Self {
            config,
            state: Snapshot::default(),
            history: History::with_capacity(config.history_capacity),
        }
    }

    /// Fluent configuration, see [`DriverBuilder`]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Configuration the driver was built with
    pub fn config(&self) -> DriverConfig {
        self.config
    }

    /// Append a pattern and return its id
    ///
    /// May be called at any time. When scanning has already started, the
    /// suffix links are rebuilt lazily right before the next step consumes a
    /// symbol. Duplicate patterns get their own id and are reported
    /// separately.
    pub fn add_pattern(&mut self, pattern: &str) -> Result<PatternId> {
        let before = self.history.is_enabled().then(|| self.state.clone());
        let id = self.state.automaton.add_pattern(pattern)?;
        Arc::make_mut(&mut self.state.patterns).push(pattern.to_string());
        Arc::make_mut(&mut self.state.pattern_lens).push(pattern.chars().count());
        if let Some(snapshot) = before {
            self.history.save(snapshot);
        }
        Ok(id)
    }

    /// Replace the text; the cursor, current state and raw results reset
    pub fn set_text(&mut self, text: &str) {
        self.save();
        self.state.text = Arc::from(text);
        self.state.symbols = text.chars().collect();
        self.state.cursor = 0;
        self.state.raw.clear();
        self.state.automaton.clear_transitions();
        debug!(symbols = self.state.symbols.len(), "text set");
    }

    /// Consume one symbol
    ///
    /// Returns false, without touching anything, once the whole text has
    /// been consumed.
    pub fn step(&mut self) -> bool {
        self.advance(true)
    }

    /// Consume the rest of the text
    ///
    /// Pushes a single history entry for the whole run (so one
    /// [`undo`](Self::undo) reverts it) and returns the number of symbols
    /// consumed. Callers that need an early exit should loop on
    /// [`step`](Self::step) instead.
    pub fn run_to_completion(&mut self) -> usize {
        if self.state.cursor >= self.state.symbols.len() {
            return 0;
        }
        self.save();
        let mut steps = 0;
        while self.advance(false) {
            steps += 1;
        }
        debug!(steps, matches = self.state.raw.len(), "run finished");
        steps
    }

    /// Rewind to the start of the text, keeping the trie and patterns
    pub fn restart(&mut self) {
        self.save();
        self.state.cursor = 0;
        self.state.automaton.clear_transitions();
        self.state.raw.clear();
    }

    /// Discard everything: trie, patterns, text, cursor, results and history
    pub fn reset(&mut self) {
        self.state = Snapshot::default();
        self.history.clear();
        debug!("driver reset");
    }

    /// Restore the state saved before the most recent mutation
    ///
    /// Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.state = snapshot;
                trace!(cursor = self.state.cursor, "undo");
                true
            }
            None => false,
        }
    }

    /// Processed results: start-anchored, sorted by (index, pattern id)
    pub fn results(&self) -> Vec<MatchRecord> {
        let lens = &self.state.pattern_lens;
        results::process(&self.state.raw, |id| lens.get(id as usize).copied())
    }

    /// Processed results as `[index:pattern] ` tokens
    pub fn results_to_string(&self) -> String {
        results::format_records(&self.results())
    }

    /// Raw results: end-anchored, in discovery order
    pub fn raw_results(&self) -> &[MatchRecord] {
        &self.state.raw
    }

    /// Pattern list, indexed by pattern id
    pub fn patterns(&self) -> &[String] {
        &self.state.patterns
    }

    /// Text being scanned
    pub fn text(&self) -> &str {
        &self.state.text
    }

    /// Number of symbols consumed so far
    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    /// Length of the text in symbols
    pub fn text_len(&self) -> usize {
        self.state.symbols.len()
    }

    /// Read-only view of the automaton (nodes, links, status)
    pub fn automaton(&self) -> &Automaton {
        &self.state.automaton
    }

    /// Undo history, oldest entry first
    pub fn history(&self) -> &History<Snapshot> {
        &self.history
    }

    /// Drop all history entries, leaving the current state untouched
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Lifecycle phase derived from the text, cursor and patterns
    pub fn phase(&self) -> Phase {
        let len = self.state.symbols.len();
        match (len, self.state.cursor) {
            (0, _) if self.state.patterns.is_empty() => Phase::Empty,
            (0, _) => Phase::Building,
            (_, 0) => Phase::Ready,
            (len, cursor) if cursor < len => Phase::Running,
            _ => Phase::Done,
        }
    }

    /// Aggregated health; O(size of trie + raw results)
    pub fn status(&self) -> DriverStatus {
        let state = &self.state;
        DriverStatus {
            automaton: state.automaton.status(),
            cursor_ok: state.cursor <= state.symbols.len(),
            results_ok: state.raw.iter().all(|record| {
                record.index < state.cursor
                    && state
                        .pattern_lens
                        .get(record.pattern as usize)
                        .is_some_and(|&len| len <= record.index + 1)
            }),
            patterns_ok: state.patterns.len() as u64
                == u64::from(state.automaton.pattern_count()),
        }
    }

    /// Assemble a driver from decoded parts (used by the codec)
    ///
    /// The automaton's current state is re-derived by replaying the consumed
    /// prefix of the text.
    pub(crate) fn from_parts(
        automaton: Automaton,
        patterns: Vec<String>,
        text: String,
        cursor: usize,
        raw: Vec<MatchRecord>,
    ) -> Self {
        let mut driver = Self::new();
        let pattern_lens = patterns.iter().map(|p| p.chars().count()).collect();
        driver.state = Snapshot {
            automaton,
            patterns: Arc::new(patterns),
            pattern_lens: Arc::new(pattern_lens),
            symbols: text.chars().collect(),
            text: Arc::from(text),
            cursor,
            raw,
        };

        driver.state.resync();
        driver
    }

    fn save(&mut self) {
        if self.history.is_enabled() {
            self.history.save(self.state.clone());
        }
    }

    fn advance(&mut self, save: bool) -> bool {
        let Some(&symbol) = self.state.symbols.get(self.state.cursor) else {
            return false;
        };
        if save {
            self.save();
        }
        if self.state.automaton.links_stale() {
            self.state.resync();
        }

        let Snapshot {
            automaton,
            cursor,
            raw,
            ..
        } = &mut self.state;

        let node = automaton.transition(symbol);
        let end = *cursor;
        *cursor += 1;

        let before = raw.len();
        for (_, ids) in automaton.outputs(node) {
            raw.extend(ids.iter().map(|&id| MatchRecord::new(end, id)));
        }
        trace!(
            index = end,
            ?symbol,
            state = node.0,
            found = raw.len() - before,
            "step"
        );
        true
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::codec::encode(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver_with(patterns: &[&str], text: &str) -> Driver {
        let mut driver = Driver::new();
        for p in patterns {
            driver.add_pattern(p).unwrap();
        }
        driver.set_text(text);
        driver
    }

    #[test]
    fn test_phases() {
        let mut driver = Driver::new();
        assert_eq!(driver.phase(), Phase::Empty);
        driver.add_pattern("ab").unwrap();
        assert_eq!(driver.phase(), Phase::Building);
        driver.set_text("xab");
        assert_eq!(driver.phase(), Phase::Ready);
        driver.step();
        assert_eq!(driver.phase(), Phase::Running);
        driver.run_to_completion();
        assert_eq!(driver.phase(), Phase::Done);
    }

    #[test]
    fn test_step_emits_end_anchored_records() {
        let mut driver = driver_with(&["he", "she", "hers", "his"], "ushers");
        while driver.step() {}
        assert_eq!(
            driver.raw_results(),
            &[
                MatchRecord::new(3, 1),
                MatchRecord::new(3, 0),
                MatchRecord::new(5, 2),
            ]
        );
    }

    #[test]
    fn test_step_after_end_is_idempotent() {
        let mut driver = driver_with(&["a"], "aa");
        assert_eq!(driver.run_to_completion(), 2);
        let history_len = driver.history().len();
        for _ in 0..3 {
            assert!(!driver.step());
        }
        assert_eq!(driver.cursor(), 2);
        assert_eq!(driver.raw_results().len(), 2);
        assert_eq!(driver.history().len(), history_len);
        assert_eq!(driver.run_to_completion(), 0);
    }

    #[test]
    fn test_empty_pattern_rejected_without_history() {
        let mut driver = Driver::new();
        assert!(driver.add_pattern("").is_err());
        assert!(driver.history().is_empty());
        assert!(driver.patterns().is_empty());
    }

    #[test]
    fn test_duplicate_pattern_reported_twice() {
        let mut driver = driver_with(&["ab", "ab"], "ab");
        driver.run_to_completion();
        assert_eq!(
            driver.results(),
            vec![MatchRecord::new(0, 0), MatchRecord::new(0, 1)]
        );
    }

    #[test]
    fn test_add_pattern_mid_scan_rebuilds_lazily() {
        let mut driver = driver_with(&["b"], "abab");
        driver.step();
        driver.step();
        driver.add_pattern("ab").unwrap();
        assert!(driver.automaton().links_stale());
        driver.run_to_completion();
        assert!(!driver.automaton().links_stale());
        // the "ab" ending at index 1 ended before it was added
        assert_eq!(
            driver.results(),
            vec![
                MatchRecord::new(1, 0),
                MatchRecord::new(2, 1),
                MatchRecord::new(3, 0),
            ]
        );
    }

    #[test]
    fn test_pattern_straddling_add_point_is_found() {
        let mut driver = driver_with(&["b"], "ab");
        driver.step();
        driver.add_pattern("ab").unwrap();
        driver.run_to_completion();
        assert_eq!(
            driver.results(),
            vec![MatchRecord::new(0, 1), MatchRecord::new(1, 0)]
        );
    }

    #[test]
    fn test_add_pattern_mid_scan_tracks_consumed_prefix() {
        let mut driver = driver_with(&["x"], "abcab");
        driver.step();
        driver.step();
        driver.step();
        driver.add_pattern("bca").unwrap();
        driver.add_pattern("cab").unwrap();
        driver.step();
        // "bca" ends at index 3 and started before either pattern existed
        assert_eq!(driver.raw_results(), &[MatchRecord::new(3, 1)]);
        driver.step();
        assert_eq!(
            driver.results(),
            vec![MatchRecord::new(1, 1), MatchRecord::new(2, 2)]
        );
    }

    #[test]
    fn test_undo_walks_back_steps() {
        let mut driver = driver_with(&["ab"], "abab");
        driver.step();
        driver.step();
        assert_eq!(driver.raw_results().len(), 1);
        assert!(driver.undo());
        assert_eq!(driver.cursor(), 1);
        assert!(driver.raw_results().is_empty());
        driver.step();
        assert_eq!(driver.raw_results(), &[MatchRecord::new(1, 0)]);
    }

    #[test]
    fn test_undo_pattern_addition() {
        let mut driver = Driver::new();
        driver.add_pattern("ab").unwrap();
        driver.add_pattern("abc").unwrap();
        assert_eq!(driver.automaton().node_count(), 4);
        assert!(driver.undo());
        assert_eq!(driver.patterns(), &["ab".to_string()]);
        assert_eq!(driver.automaton().node_count(), 3);
        assert_eq!(driver.automaton().pattern_count(), 1);
    }

    #[test]
    fn test_step_snapshots_share_trie() {
        let mut driver = driver_with(&["ab", "b"], "abab");
        driver.step();
        driver.step();
        let latest = driver.history().latest().unwrap();
        assert!(latest.automaton().shares_trie_with(driver.automaton()));
    }

    #[test]
    fn test_no_history() {
        let mut driver = Driver::builder().no_history().build();
        driver.add_pattern("a").unwrap();
        driver.set_text("aaa");
        driver.run_to_completion();
        driver.restart();
        assert!(driver.history().is_empty());
        assert!(!driver.undo());
    }

    #[test]
    fn test_restart_keeps_trie() {
        let mut driver = driver_with(&["ab", "b"], "abab");
        driver.run_to_completion();
        let first = driver.results();
        let nodes = driver.automaton().node_count();
        driver.restart();
        assert_eq!(driver.cursor(), 0);
        assert!(driver.raw_results().is_empty());
        assert_eq!(driver.automaton().node_count(), nodes);
        driver.run_to_completion();
        assert_eq!(driver.results(), first);
    }

    #[test]
    fn test_reset() {
        let mut driver = driver_with(&["ab"], "abab");
        driver.run_to_completion();
        driver.reset();
        assert_eq!(driver.phase(), Phase::Empty);
        assert_eq!(driver.automaton().status(), AutomatonStatus::Uninitialized);
        assert!(driver.history().is_empty());
        assert!(driver.raw_results().is_empty());
        assert_eq!(driver.text(), "");
        assert_eq!(driver.cursor(), 0);
    }

    #[test]
    fn test_status() {
        let mut driver = Driver::new();
        assert!(driver.status().is_ok());
        driver.add_pattern("ab").unwrap();
        let status = driver.status();
        assert_eq!(status.automaton, AutomatonStatus::UnresolvedDependencies);
        assert_eq!(status.to_string(), "Automaton_UNRESOLVED_DEPENDENCIES");
        driver.set_text("ab");
        driver.step();
        assert_eq!(driver.status().to_string(), "OK");
    }

    #[test]
    fn test_unicode_symbols() {
        let mut driver = driver_with(&["ßx", "x"], "aßxß");
        driver.run_to_completion();
        assert_eq!(driver.text_len(), 4);
        assert_eq!(
            driver.results(),
            vec![MatchRecord::new(1, 0), MatchRecord::new(2, 1)]
        );
    }
}
