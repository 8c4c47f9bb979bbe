use tracing::trace;

use crate::alphabet::{Symbol, ALPHABET_SIZE};
use crate::policy::RankingPolicy;

/// Handle to a node inside one [`PriorityTrie`]'s arena.
///
/// Handles are only meaningful for the trie that produced them; a foreign
/// handle that happens to be out of range is treated as "absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    const ROOT: NodeId = NodeId(0);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    parent: Option<NodeId>,
    children: [Option<NodeId>; ALPHABET_SIZE],
    // Some iff terminal.
    word: Option<Box<str>>,
    priority: u64,
    best: Option<NodeId>,
    best_priority: u64,
}

impl Node {
    fn new(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            children: [None; ALPHABET_SIZE],
            word: None,
            priority: 0,
            best: None,
            best_priority: 0,
        }
    }

    fn is_terminal(&self) -> bool {
        self.word.is_some()
    }
}

/// Outcome of a successful [`PriorityTrie::promote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    /// The word's priority after the update.
    pub priority: u64,
    /// How many caches (the node's own included) now point at the word.
    pub repaired: usize,
}

/// One terminal as reported by [`PriorityTrie::terminals`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalEntry {
    pub word: String,
    pub priority: u64,
    pub best: Option<String>,
}

/// Prefix tree over the 27-symbol alphabet where every node caches the
/// highest-priority terminal in its subtree.
///
/// Nodes live in a flat arena and are never freed individually; parent and
/// best-completion links are arena indices. The cache is kept exact on
/// every [`insert`](Self::insert) and [`promote`](Self::promote), so a
/// lookup is a walk down the prefix followed by one field read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTrie {
    nodes: Vec<Node>,
    policy: RankingPolicy,
    clock: u64,
    words: usize,
}

impl Default for PriorityTrie {
    fn default() -> Self {
        Self::new(RankingPolicy::default())
    }
}

impl PriorityTrie {
    pub fn new(policy: RankingPolicy) -> Self {
        Self {
            nodes: vec![Node::new(None)],
            policy,
            clock: 0,
            words: 0,
        }
    }

    pub fn policy(&self) -> RankingPolicy {
        self.policy
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Total node count, root included.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct terminals.
    pub fn word_count(&self) -> usize {
        self.words
    }

    /// Adds `word`, creating one node per missing character, and returns its
    /// terminal node. Inserting a word that is already present changes
    /// nothing.
    pub fn insert(&mut self, word: &str) -> NodeId {
        let mut current = NodeId::ROOT;
        for ch in word.chars() {
            let slot = Symbol::from_char(ch).index();
            current = match self.nodes[current.0].children[slot] {
                Some(child) => child,
                None => {
                    let child = NodeId(self.nodes.len());
                    self.nodes.push(Node::new(Some(current)));
                    self.nodes[current.0].children[slot] = Some(child);
                    child
                }
            };
        }

        if self.nodes[current.0].is_terminal() {
            return current;
        }

        let node = &mut self.nodes[current.0];
        node.word = Some(word.into());
        node.priority = 0;
        self.words += 1;

        // A priority-0 terminal can only fill empty caches. Once a node with
        // a cached best is reached, every ancestor has one as well.
        let mut cursor = Some(current);
        while let Some(id) = cursor {
            let node = &mut self.nodes[id.0];
            if node.best.is_some() {
                break;
            }
            node.best = Some(current);
            node.best_priority = 0;
            cursor = node.parent;
        }

        trace!(word, node = current.0, size = self.nodes.len(), "inserted");
        current
    }

    /// Single-step traversal. Absent in, absent out.
    pub fn descend(&self, node: Option<NodeId>, ch: char) -> Option<NodeId> {
        self.descend_symbol(node, Symbol::from_char(ch))
    }

    pub fn descend_symbol(&self, node: Option<NodeId>, symbol: Symbol) -> Option<NodeId> {
        self.nodes.get(node?.0)?.children[symbol.index()]
    }

    /// Node reached by walking `prefix` from the root.
    pub fn locate(&self, prefix: &str) -> Option<NodeId> {
        prefix
            .chars()
            .try_fold(NodeId::ROOT, |node, ch| self.descend(Some(node), ch))
    }

    /// Cached best terminal beneath (or at) `node`.
    pub fn best_terminal(&self, node: Option<NodeId>) -> Option<NodeId> {
        self.nodes.get(node?.0)?.best
    }

    /// Word of the cached best terminal beneath (or at) `node`.
    pub fn best_completion(&self, node: Option<NodeId>) -> Option<&str> {
        self.word(self.best_terminal(node)?)
    }

    pub fn complete(&self, prefix: &str) -> Option<&str> {
        self.best_completion(self.locate(prefix))
    }

    /// Records one use of the terminal at `node` and repairs ancestor caches.
    ///
    /// Returns `None` (and changes nothing) when `node` is not a terminal.
    /// The upward walk stops at the first cache that already holds a priority
    /// at least as high: every cache above it is at least that high too.
    pub fn promote(&mut self, node: NodeId) -> Option<Promotion> {
        let current = self.nodes.get(node.0)?;
        if !current.is_terminal() {
            return None;
        }

        let priority = match self.policy {
            RankingPolicy::Frequency => current.priority.saturating_add(1),
            RankingPolicy::Recency => {
                self.clock += 1;
                self.clock
            }
        };
        self.nodes[node.0].priority = priority;

        let mut repaired = 0;
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            let ancestor = &mut self.nodes[id.0];
            if priority <= ancestor.best_priority {
                break;
            }
            ancestor.best = Some(node);
            ancestor.best_priority = priority;
            repaired += 1;
            cursor = ancestor.parent;
        }

        trace!(node = node.0, priority, repaired, "promoted");
        Some(Promotion { priority, repaired })
    }

    /// Promotes `word` if it is present as a terminal.
    pub fn promote_word(&mut self, word: &str) -> Option<Promotion> {
        let node = self.locate(word)?;
        self.promote(node)
    }

    pub fn word(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0)?.word.as_deref()
    }

    pub fn is_terminal(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(Node::is_terminal)
    }

    pub fn priority(&self, node: NodeId) -> Option<u64> {
        let node = self.nodes.get(node.0)?;
        node.is_terminal().then_some(node.priority)
    }

    pub fn best_priority(&self, node: NodeId) -> Option<u64> {
        self.nodes.get(node.0).map(|node| node.best_priority)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    /// Every terminal in symbol order (`a`..`z`, then the shared bucket).
    pub fn terminals(&self) -> Vec<TerminalEntry> {
        let mut out = Vec::with_capacity(self.words);
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if let Some(word) = &node.word {
                out.push(TerminalEntry {
                    word: word.to_string(),
                    priority: node.priority,
                    best: self.best_completion(Some(id)).map(str::to_string),
                });
            }
            stack.extend(node.children.iter().rev().flatten());
        }
        out
    }
}
