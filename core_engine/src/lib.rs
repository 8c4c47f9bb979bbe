//! Single-best prefix completion over a priority-caching trie.
//!
//! [`PriorityTrie`] answers "what is the highest-ranked word starting with
//! this prefix?" in time proportional to the prefix, by keeping the best
//! terminal of every subtree cached at the subtree's root. The remaining
//! modules are thin clients: [`corpus`] feeds words in from files,
//! [`replay`] measures how many keystrokes a text would have needed, and
//! [`suggest`] adapts the trie to editor context.

pub mod alphabet;
pub mod corpus;
pub mod policy;
pub mod replay;
pub mod suggest;
pub mod trie;

pub use alphabet::{Symbol, ALPHABET_SIZE};
pub use corpus::{load_into, CorpusError, LoadStats, WordSource};
pub use policy::RankingPolicy;
pub use replay::{replay_file, replay_word, replay_words, ReplayStats};
pub use suggest::{SuggestOptions, Suggestion, Suggestor};
pub use trie::{NodeId, PriorityTrie, Promotion, TerminalEntry};
