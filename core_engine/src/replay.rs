//! Corpus replay: how much of a text would a user have typed if every
//! keystroke consulted the trie and accepted a correct suggestion?

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::corpus::{CorpusError, WordSource};
use crate::trie::PriorityTrie;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    pub words: u64,
    pub total_chars: u64,
    pub typed_chars: u64,
}

impl ReplayStats {
    /// Fraction of characters the user still had to type.
    pub fn typed_ratio(&self) -> f64 {
        if self.total_chars == 0 {
            return 0.0;
        }
        self.typed_chars as f64 / self.total_chars as f64
    }

    pub fn saved_chars(&self) -> u64 {
        self.total_chars - self.typed_chars
    }
}

/// Replays one word: learn it, count keystrokes until the suggestion at the
/// typed prefix is the word itself, then record the use.
///
/// Returns the number of characters typed.
pub fn replay_word(trie: &mut PriorityTrie, word: &str) -> u64 {
    let terminal = trie.insert(word);
    let length = word.chars().count() as u64;

    let mut node = Some(trie.root());
    let mut typed = length;
    for (index, ch) in word.chars().enumerate() {
        node = trie.descend(node, ch);
        if node.is_none() {
            break;
        }
        if trie.best_completion(node) == Some(word) {
            typed = index as u64 + 1;
            break;
        }
    }

    trie.promote(terminal);
    typed
}

pub fn replay_words<I, S>(trie: &mut PriorityTrie, words: I) -> ReplayStats
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut stats = ReplayStats::default();
    for word in words {
        record(&mut stats, trie, word.as_ref());
    }
    stats
}

pub fn replay_file(
    trie: &mut PriorityTrie,
    path: impl AsRef<Path>,
) -> Result<ReplayStats, CorpusError> {
    let mut stats = ReplayStats::default();
    for word in WordSource::open(path)? {
        record(&mut stats, trie, &word?);
    }
    Ok(stats)
}

fn record(stats: &mut ReplayStats, trie: &mut PriorityTrie, word: &str) {
    stats.typed_chars += replay_word(trie, word);
    stats.total_chars += word.chars().count() as u64;
    stats.words += 1;

    if stats.words.is_power_of_two() {
        debug!(
            words = stats.words,
            typed = stats.typed_chars,
            total = stats.total_chars,
            ratio = stats.typed_ratio(),
            "replay progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RankingPolicy;
    use std::io::Write;

    #[test]
    fn lone_word_is_suggested_after_one_key() {
        let mut trie = PriorityTrie::new(RankingPolicy::Frequency);
        // Fresh terminals fill empty caches, so the first letter already hits.
        assert_eq!(replay_word(&mut trie, "hello"), 1);
        assert_eq!(trie.priority(trie.locate("hello").unwrap()), Some(1));
    }

    #[test]
    fn competing_word_needs_more_keys() {
        let mut trie = PriorityTrie::new(RankingPolicy::Frequency);
        replay_word(&mut trie, "there");
        replay_word(&mut trie, "there");
        // Strict prefixes of a stronger word are never suggested.
        assert_eq!(replay_word(&mut trie, "the"), 3);
        assert_eq!(replay_word(&mut trie, "th"), 2);
        assert_eq!(replay_word(&mut trie, "there"), 1);
    }

    #[test]
    fn recency_flips_to_last_used() {
        let mut trie = PriorityTrie::new(RankingPolicy::Recency);
        replay_word(&mut trie, "sing");
        replay_word(&mut trie, "song");
        assert_eq!(trie.complete("s"), Some("song"));
        replay_word(&mut trie, "sing");
        assert_eq!(trie.complete("s"), Some("sing"));
    }

    #[test]
    fn stats_accumulate() {
        let mut trie = PriorityTrie::new(RankingPolicy::Frequency);
        let stats = replay_words(&mut trie, ["go", "go", "gone"]);
        assert_eq!(stats.words, 3);
        assert_eq!(stats.total_chars, 8);
        // go: 1, go: 1, gone: g->go, o->go, n->gone = 3
        assert_eq!(stats.typed_chars, 5);
        assert_eq!(stats.saved_chars(), 3);
        assert!((stats.typed_ratio() - 5.0 / 8.0).abs() < 1e-9);
    }

    #[test]
    fn empty_replay_has_zero_ratio() {
        assert_eq!(ReplayStats::default().typed_ratio(), 0.0);
    }

    #[test]
    fn file_replay_matches_in_memory_replay() {
        let text = "the cat sat\n  on the\tmat  the end\n";
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{text}").unwrap();

        for policy in RankingPolicy::ALL {
            let mut from_file = PriorityTrie::new(policy);
            let mut from_words = PriorityTrie::new(policy);
            let file_stats = replay_file(&mut from_file, file.path()).unwrap();
            let word_stats = replay_words(&mut from_words, text.split_whitespace());

            assert_eq!(file_stats, word_stats);
            assert_eq!(file_stats.words, 8);
            assert_eq!(from_file, from_words);
        }
    }

    #[test]
    fn missing_corpus_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let mut trie = PriorityTrie::default();
        let error = replay_file(&mut trie, dir.path().join("absent.txt")).unwrap_err();
        assert!(error.is_unavailable());
        assert_eq!(trie.size(), 1);
    }
}
