//! Arena-backed Aho-Corasick Automaton
//!
//! This crate implements the pattern trie and suffix ("failure") links used by
//! the stepmatch driver. Unlike a one-shot matcher, the automaton here is built
//! incrementally: patterns can be appended at any time, and the suffix links
//! are recomputed on demand.
//!
//! # Design
//!
//! All nodes live in a single `Vec<Node>` and refer to each other by
//! [`NodeId`]:
//! - children are owned through a per-node symbol map
//! - suffix links are plain indices (lookup only, never ownership)
//! - pattern ids terminating at a node are stored on that node
//!
//! The node arena sits behind an [`Arc`], so cloning an [`Automaton`] is cheap
//! and shares topology until one side grows the trie (copy-on-write). The
//! current matching state is kept outside the shared part, which means
//! stepping never copies the trie.
//!
//! The automaton is single-owner: there is no internal locking, and the
//! per-step cost analysis assumes no topology change happens between two
//! calls to [`Automaton::transition`].

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub mod validation;

pub use validation::{validate_structure, TrieStats, ValidationResult};

/// Error type for automaton operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    /// Invalid pattern (currently only the empty pattern)
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    /// Resource limit exceeded (e.g., too many states)
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),
}

/// Pattern identifier, assigned in insertion order starting at 0
pub type PatternId = u32;

/// Index of a node in the automaton arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u32);

/// The root node. It is always the first node allocated.
pub const ROOT: NodeId = NodeId(0);

impl NodeId {
    /// Arena index of this node
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural health of an automaton
///
/// Computed by [`Automaton::status`], which walks the whole trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomatonStatus {
    /// No root allocated yet (nothing was ever added, or after `clear_all`)
    Uninitialized,
    /// Suffix links are stale: patterns were added since the last rebuild
    UnresolvedDependencies,
    /// A structural invariant is violated (cycle, dangling index, bad depth)
    CorruptNode,
    /// Links are current and the structure is sound
    Ok,
}

impl fmt::Display for AutomatonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AutomatonStatus::Uninitialized => "UNINITIALIZED",
            AutomatonStatus::UnresolvedDependencies => "UNRESOLVED_DEPENDENCIES",
            AutomatonStatus::CorruptNode => "CORRUPT_NODE",
            AutomatonStatus::Ok => "OK",
        };
        f.write_str(name)
    }
}

/// A trie node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    depth: u32,
    children: BTreeMap<char, NodeId>,
    suffix_link: NodeId,
    leaf: bool,
    pattern_ids: Vec<PatternId>,
}

impl Node {
    fn new(depth: u32) -> Self {
        Self {
            depth,
            children: BTreeMap::new(),
            suffix_link: ROOT,
            leaf: false,
            pattern_ids: Vec::new(),
        }
    }

    /// Distance from the root (root is 0)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Outgoing trie edges, ordered by symbol
    pub fn children(&self) -> impl Iterator<Item = (char, NodeId)> + '_ {
        self.children.iter().map(|(&symbol, &id)| (symbol, id))
    }

    /// Direct child for `symbol`, if any
    pub fn child(&self, symbol: char) -> Option<NodeId> {
        self.children.get(&symbol).copied()
    }

    /// Suffix link target. Only meaningful while links are not stale.
    pub fn suffix_link(&self) -> NodeId {
        self.suffix_link
    }

    /// True if at least one pattern terminates here
    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Ids of the patterns terminating here, in insertion order
    pub fn pattern_ids(&self) -> &[PatternId] {
        &self.pattern_ids
    }
}

/// Shared (copy-on-write) part of the automaton: the node arena
#[derive(Debug, Clone, Default)]
struct Trie {
    nodes: Vec<Node>,
    pattern_count: u32,
    links_stale: bool,
}

impl Trie {
    /// The goto function evaluated from an arbitrary node.
    ///
    /// Takes the direct child when present, otherwise falls back along suffix
    /// links; the root absorbs unknown symbols.
    #[inline]
    fn goto_from(&self, mut node: NodeId, symbol: char) -> NodeId {
        loop {
            let Some(current) = self.nodes.get(node.index()) else {
                return ROOT;
            };
            if let Some(&next) = current.children.get(&symbol) {
                return next;
            }
            if node == ROOT {
                return ROOT;
            }
            let link = current.suffix_link;
            // Links always point strictly upward; anything else would spin forever.
            match self.nodes.get(link.index()) {
                Some(target) if target.depth < current.depth => node = link,
                _ => return ROOT,
            }
        }
    }
}

/// Incrementally built Aho-Corasick automaton
///
/// # Examples
///
/// ```
/// use stepmatch_automaton::{Automaton, AutomatonStatus};
///
/// let mut ac = Automaton::new();
/// ac.add_pattern("he")?;
/// ac.add_pattern("she")?;
/// assert_eq!(ac.status(), AutomatonStatus::UnresolvedDependencies);
///
/// ac.rebuild_links();
/// assert_eq!(ac.status(), AutomatonStatus::Ok);
///
/// for symbol in "she".chars() {
///     ac.transition(symbol);
/// }
/// let found: Vec<u32> = ac
///     .outputs(ac.current_state())
///     .flat_map(|(_, ids)| ids.iter().copied())
///     .collect();
/// assert_eq!(found, vec![1, 0]);
/// # Ok::<(), stepmatch_automaton::AutomatonError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Automaton {
    trie: Arc<Trie>,
    current: NodeId,
}

impl Automaton {
    /// Create an empty, uninitialized automaton (no root yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern, returning its id
    ///
    /// Walks from the root creating missing children, marks the terminal node
    /// as a leaf and records the new id there. Adding the same pattern twice
    /// is allowed: the terminal node then carries both ids.
    ///
    /// Marks all suffix links stale; call [`rebuild_links`](Self::rebuild_links)
    /// before the next [`transition`](Self::transition).
    pub fn add_pattern(&mut self, pattern: &str) -> Result<PatternId, AutomatonError> {
        if pattern.is_empty() {
            return Err(AutomatonError::InvalidPattern("Empty pattern".to_string()));
        }

        if self.trie.pattern_count == u32::MAX {
            return Err(AutomatonError::ResourceLimitExceeded(format!(
                "Too many patterns (maximum {})",
                u32::MAX
            )));
        }
        let needed = self.trie.nodes.len() + pattern.chars().count() + 1;
        if needed > u32::MAX as usize {
            return Err(AutomatonError::ResourceLimitExceeded(format!(
                "Pattern would grow the trie past {} nodes",
                u32::MAX
            )));
        }

        let trie = Arc::make_mut(&mut self.trie);

        if trie.nodes.is_empty() {
            trie.nodes.push(Node::new(0));
        }

        let mut current = ROOT;
        for symbol in pattern.chars() {
            if let Some(&next) = trie.nodes[current.index()].children.get(&symbol) {
                current = next;
                continue;
            }
            let depth = trie.nodes[current.index()].depth + 1;
            let new_id = NodeId(trie.nodes.len() as u32);
            trie.nodes.push(Node::new(depth));
            trie.nodes[current.index()].children.insert(symbol, new_id);
            current = new_id;
        }

        let pattern_id = trie.pattern_count;
        trie.pattern_count += 1;
        let terminal = &mut trie.nodes[current.index()];
        terminal.leaf = true;
        terminal.pattern_ids.push(pattern_id);
        trie.links_stale = true;

        debug!(
            pattern_id,
            terminal = current.0,
            nodes = trie.nodes.len(),
            "added pattern"
        );
        Ok(pattern_id)
    }

    /// Recompute every suffix link
    ///
    /// Breadth-first in increasing depth: a node reached from `u` by `c` links
    /// to `goto(link(u), c)`; depth-1 nodes link to the root, and the root
    /// links to itself.
    pub fn rebuild_links(&mut self) {
        if self.trie.nodes.is_empty() {
            return;
        }
        let trie = Arc::make_mut(&mut self.trie);

        trie.nodes[ROOT.index()].suffix_link = ROOT;
        let mut queue = VecDeque::new();

        let root_children: Vec<NodeId> =
            trie.nodes[ROOT.index()].children.values().copied().collect();
        for child in root_children {
            trie.nodes[child.index()].suffix_link = ROOT;
            queue.push_back(child);
        }

        while let Some(parent) = queue.pop_front() {
            let edges: Vec<(char, NodeId)> = trie.nodes[parent.index()]
                .children
                .iter()
                .map(|(&symbol, &child)| (symbol, child))
                .collect();
            let parent_link = trie.nodes[parent.index()].suffix_link;

            for (symbol, child) in edges {
                let link = trie.goto_from(parent_link, symbol);
                trie.nodes[child.index()].suffix_link = link;
                queue.push_back(child);
            }
        }

        trie.links_stale = false;
        debug!(nodes = trie.nodes.len(), "rebuilt suffix links");
    }

    /// Advance the current state by one symbol and return the new state
    ///
    /// Precondition: links are not stale (see [`links_stale`](Self::links_stale)).
    /// Calling this with stale links does not fault, but the resulting state
    /// (and therefore any match reported from it) is unspecified.
    #[inline]
    pub fn transition(&mut self, symbol: char) -> NodeId {
        if self.trie.nodes.is_empty() {
            return ROOT;
        }
        self.current = self.trie.goto_from(self.current, symbol);
        self.current
    }

    /// Reset the current state to the root, keeping the trie
    pub fn clear_transitions(&mut self) {
        self.current = ROOT;
    }

    /// Discard the whole trie; the automaton becomes uninitialized again
    pub fn clear_all(&mut self) {
        self.trie = Arc::new(Trie::default());
        self.current = ROOT;
    }

    /// Structural health, see [`AutomatonStatus`]
    ///
    /// Runs a full validation pass, O(size of trie). Not for hot loops; use
    /// [`links_stale`](Self::links_stale) there.
    pub fn status(&self) -> AutomatonStatus {
        if self.trie.nodes.is_empty() {
            return AutomatonStatus::Uninitialized;
        }
        if !validate_structure(self).is_valid() {
            return AutomatonStatus::CorruptNode;
        }
        if self.trie.links_stale {
            return AutomatonStatus::UnresolvedDependencies;
        }
        AutomatonStatus::Ok
    }

    /// True if patterns were added since the last link rebuild. O(1).
    #[inline]
    pub fn links_stale(&self) -> bool {
        self.trie.links_stale
    }

    /// Suffix link target of `node`, or `None` for an unknown id
    pub fn suffix_link_of(&self, node: NodeId) -> Option<NodeId> {
        self.trie.nodes.get(node.index()).map(|n| n.suffix_link)
    }

    /// Current matching state
    pub fn current_state(&self) -> NodeId {
        self.current
    }

    /// Move the current state to `node`. Unknown ids reset to the root.
    pub fn set_current_state(&mut self, node: NodeId) {
        self.current = if node.index() < self.trie.nodes.len() {
            node
        } else {
            ROOT
        };
    }

    /// The root id, or `None` while uninitialized
    pub fn root(&self) -> Option<NodeId> {
        (!self.trie.nodes.is_empty()).then_some(ROOT)
    }

    /// Read-only access to one node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.trie.nodes.get(id.index())
    }

    /// All nodes in allocation order, paired with their ids
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.trie
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Number of allocated nodes (0 while uninitialized)
    pub fn node_count(&self) -> usize {
        self.trie.nodes.len()
    }

    /// Number of patterns added so far
    pub fn pattern_count(&self) -> u32 {
        self.trie.pattern_count
    }

    /// Leaves on the suffix chain starting at `node`, root excluded
    ///
    /// Yields `(leaf, pattern_ids)` for `node` itself and every node reached by
    /// following suffix links, which is exactly the set of patterns ending at
    /// the position where `node` was reached.
    pub fn outputs(&self, node: NodeId) -> Outputs<'_> {
        let next = (node != ROOT && node.index() < self.trie.nodes.len()).then_some(node);
        Outputs {
            nodes: &self.trie.nodes,
            next,
        }
    }

    /// True if both automata share the same node arena allocation
    pub fn shares_trie_with(&self, other: &Automaton) -> bool {
        Arc::ptr_eq(&self.trie, &other.trie)
    }

    #[cfg(test)]
    fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut Arc::make_mut(&mut self.trie).nodes
    }
}

/// Iterator over the leaves of a suffix chain, see [`Automaton::outputs`]
pub struct Outputs<'a> {
    nodes: &'a [Node],
    next: Option<NodeId>,
}

impl<'a> Iterator for Outputs<'a> {
    type Item = (NodeId, &'a [PatternId]);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.next {
            let node = &self.nodes[id.index()];
            let link = node.suffix_link;
            self.next = match self.nodes.get(link.index()) {
                Some(target) if link != ROOT && target.depth < node.depth => Some(link),
                _ => None,
            };
            if node.leaf {
                return Some((id, &node.pattern_ids));
            }
        }
        None
    }
}
