//! Textual dump of a driver
//!
//! The dump is line oriented:
//!
//! ```text
//! automaton
//! patterns = 2
//! pattern = he
//! pattern = she
//! nodes = 6
//! textPosition = 4
//! text = ushers
//! [3:1] [3:0]
//! END
//! ```
//!
//! The first block describes the automaton; the trie is rebuilt from the
//! pattern list on load and checked against the recorded node count. The
//! last four lines are the cursor, the text, the raw (end-anchored) match
//! records and the `END` sentinel, located from the end of the input.
//!
//! Patterns and text escape `\`, newline and carriage return as `\\`, `\n`
//! and `\r` so each stays on one line.
//!
//! Decoding never fails. Each field that cannot be parsed falls back to its
//! default (empty pattern list, cursor 0, empty text, no results)
//! independently of the others, and is reported in [`Decoded::fallbacks`].

use crate::driver::Driver;
use crate::error::Result;
use crate::results::{self, MatchRecord};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;
use stepmatch_automaton::Automaton;
use tracing::{debug, warn};

const AUTOMATON_HEADER: &str = "automaton";
const PATTERNS_PREFIX: &str = "patterns = ";
const PATTERN_PREFIX: &str = "pattern = ";
const NODES_PREFIX: &str = "nodes = ";
const CURSOR_PREFIX: &str = "textPosition = ";
const TEXT_PREFIX: &str = "text = ";
const SENTINEL: &str = "END";

/// A dump field that can fall back to its default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DumpField {
    /// Automaton block (pattern list and trie)
    Automaton,
    /// `textPosition` line
    Cursor,
    /// `text` line
    Text,
    /// Raw match records line
    Results,
    /// Missing `END` line (informational, nothing is reset)
    Sentinel,
}

impl fmt::Display for DumpField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DumpField::Automaton => "automaton",
            DumpField::Cursor => "textPosition",
            DumpField::Text => "text",
            DumpField::Results => "results",
            DumpField::Sentinel => "END",
        };
        f.write_str(name)
    }
}

/// Outcome of [`decode`]
#[derive(Debug, Clone)]
pub struct Decoded {
    /// The reconstructed driver (default configuration, empty history)
    pub driver: Driver,
    /// Fields that were malformed and fell back to their defaults
    pub fallbacks: Vec<DumpField>,
}

impl Decoded {
    /// True if every field parsed
    pub fn is_clean(&self) -> bool {
        self.fallbacks.is_empty()
    }
}

/// Render a driver as a textual dump
pub fn encode(driver: &Driver) -> String {
    let mut out = String::new();
    let patterns = driver.patterns();

    // Writing to a String cannot fail
    let _ = writeln!(out, "{}", AUTOMATON_HEADER);
    let _ = writeln!(out, "{}{}", PATTERNS_PREFIX, patterns.len());
    for pattern in patterns {
        let _ = writeln!(out, "{}{}", PATTERN_PREFIX, escape(pattern));
    }
    let _ = writeln!(out, "{}{}", NODES_PREFIX, driver.automaton().node_count());
    let _ = writeln!(out, "{}{}", CURSOR_PREFIX, driver.cursor());
    let _ = writeln!(out, "{}{}", TEXT_PREFIX, escape(driver.text()));
    let _ = writeln!(out, "{}", results::format_records(driver.raw_results()));
    out.push_str(SENTINEL);
    out
}

/// Parse a textual dump, falling back per field on malformed input
pub fn decode(input: &str) -> Decoded {
    let lines: Vec<&str> = input.lines().collect();
    let mut fallbacks = Vec::new();

    let end = match lines.iter().rposition(|line| line.trim_end() == SENTINEL) {
        Some(end) => end,
        None => {
            fallbacks.push(DumpField::Sentinel);
            lines.len()
        }
    };
    let field = |offset: usize| end.checked_sub(offset).map(|i| lines[i]);
    let block_end = end.saturating_sub(3);

    let (automaton, patterns) = match parse_automaton(&lines[..block_end]) {
        Some(parsed) => parsed,
        None => {
            fallbacks.push(DumpField::Automaton);
            (Automaton::new(), Vec::new())
        }
    };

    let text = match field(2).and_then(|line| unescape(line.strip_prefix(TEXT_PREFIX)?)) {
        Some(text) => text,
        None => {
            fallbacks.push(DumpField::Text);
            String::new()
        }
    };

    let text_len = text.chars().count();
    let cursor = match field(3)
        .and_then(|line| line.strip_prefix(CURSOR_PREFIX)?.trim().parse::<usize>().ok())
        .filter(|&cursor| cursor <= text_len)
    {
        Some(cursor) => cursor,
        None => {
            fallbacks.push(DumpField::Cursor);
            0
        }
    };

    let raw = match field(1)
        .and_then(results::parse_records)
        .filter(|records| records_fit(records, &patterns, cursor))
    {
        Some(raw) => raw,
        None => {
            fallbacks.push(DumpField::Results);
            Vec::new()
        }
    };

    for skipped in &fallbacks {
        warn!(field = %skipped, "dump field malformed, using default");
    }
    debug!(
        patterns = patterns.len(),
        cursor,
        records = raw.len(),
        "decoded dump"
    );

    Decoded {
        driver: Driver::from_parts(automaton, patterns, text, cursor, raw),
        fallbacks,
    }
}

/// Write a dump to `path`
pub fn write_dump(driver: &Driver, path: impl AsRef<Path>) -> Result<()> {
    let mut contents = encode(driver);
    contents.push('\n');
    fs::write(path, contents)?;
    Ok(())
}

/// Read a dump from `path`
///
/// Only I/O failures are errors; malformed content is handled as in
/// [`decode`].
pub fn read_dump(path: impl AsRef<Path>) -> Result<Decoded> {
    let contents = fs::read_to_string(path)?;
    Ok(decode(&contents))
}

fn parse_automaton(block: &[&str]) -> Option<(Automaton, Vec<String>)> {
    let (header, rest) = block.split_first()?;
    if header.trim_end() != AUTOMATON_HEADER {
        return None;
    }
    let (count_line, rest) = rest.split_first()?;
    let count: usize = count_line.strip_prefix(PATTERNS_PREFIX)?.trim().parse().ok()?;
    if rest.len().checked_sub(1) != Some(count) {
        return None;
    }

    let mut automaton = Automaton::new();
    let mut patterns = Vec::with_capacity(rest.len());
    for line in &rest[..count] {
        let pattern = unescape(line.strip_prefix(PATTERN_PREFIX)?)?;
        automaton.add_pattern(&pattern).ok()?;
        patterns.push(pattern);
    }

    let nodes: usize = rest[count].strip_prefix(NODES_PREFIX)?.trim().parse().ok()?;
    if nodes != automaton.node_count() {
        return None;
    }
    automaton.rebuild_links();
    Some((automaton, patterns))
}

/// Raw records must name a known pattern and end within the consumed prefix
fn records_fit(records: &[MatchRecord], patterns: &[String], cursor: usize) -> bool {
    records.iter().all(|record| {
        record.index < cursor
            && patterns
                .get(record.pattern as usize)
                .is_some_and(|p| p.chars().count() <= record.index + 1)
    })
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            _ => return None,
        }
    }
    Some(out)
}
