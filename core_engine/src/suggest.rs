use serde::Serialize;

use crate::policy::RankingPolicy;
use crate::trie::PriorityTrie;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Full completed word.
    pub word: String,
    /// What is left to type after the current token.
    pub suffix: String,
    pub priority: u64,
    /// Byte range of the token in the context.
    pub replace_range: [usize; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestOptions {
    pub min_prefix_len: usize,
    pub fold_case: bool,
    pub max_len: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            min_prefix_len: 1,
            fold_case: true,
            max_len: 32,
        }
    }
}

/// Editor-facing wrapper: turns raw text before the cursor into a prefix
/// lookup, and accepted words into promotions.
#[derive(Debug, Clone, Default)]
pub struct Suggestor {
    words: PriorityTrie,
    options: SuggestOptions,
}

impl Suggestor {
    pub fn new(policy: RankingPolicy, options: SuggestOptions) -> Self {
        Self::with_trie(PriorityTrie::new(policy), options)
    }

    pub fn with_trie(words: PriorityTrie, options: SuggestOptions) -> Self {
        Self { words, options }
    }

    pub fn trie(&self) -> &PriorityTrie {
        &self.words
    }

    pub fn options(&self) -> SuggestOptions {
        self.options
    }

    pub fn suggest(&self, context: &str) -> Option<Suggestion> {
        let (start, token) = last_word_token(context);
        if token.is_empty() || token.chars().count() < self.options.min_prefix_len {
            return None;
        }
        let prefix = self.fold(token);

        let best = self.words.best_terminal(self.words.locate(&prefix))?;
        let word = self.words.word(best)?;
        // Words that only share a path through the catch-all bucket are not
        // real completions of what was typed.
        let rest = word.strip_prefix(prefix.as_str())?;
        let suffix: String = rest.chars().take(self.options.max_len).collect();
        if suffix.is_empty() {
            return None;
        }

        Some(Suggestion {
            word: word.to_string(),
            suffix,
            priority: self.words.priority(best).unwrap_or(0),
            replace_range: [start, context.len()],
        })
    }

    /// Records a use of `word`, learning it first if needed. Returns the
    /// word's new priority, or `None` for a blank word.
    pub fn commit(&mut self, word: &str) -> Option<u64> {
        let word = self.normalize(word);
        if word.is_empty() {
            return None;
        }
        let node = self.words.insert(&word);
        self.words.promote(node).map(|promotion| promotion.priority)
    }

    /// Adds `word` without ranking it. Returns whether it was new.
    pub fn learn(&mut self, word: &str) -> bool {
        let word = self.normalize(word);
        if word.is_empty() {
            return false;
        }
        let before = self.words.word_count();
        self.words.insert(&word);
        self.words.word_count() > before
    }

    /// The form a word is stored under: trimmed, and case-folded if enabled.
    pub fn normalize(&self, word: &str) -> String {
        self.fold(word.trim())
    }

    fn fold(&self, text: &str) -> String {
        if self.options.fold_case {
            text.to_ascii_lowercase()
        } else {
            text.to_string()
        }
    }
}

pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '\''
}

/// Trailing word token of `before` and its byte offset.
/// e.g. "hello wor" -> (6, "wor")
fn last_word_token(before: &str) -> (usize, &str) {
    let mut start = before.len();
    for (i, ch) in before.char_indices().rev() {
        if is_word_char(ch) {
            start = i;
        } else {
            break;
        }
    }
    (start, &before[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(policy: RankingPolicy) -> Suggestor {
        let mut suggestor = Suggestor::new(policy, SuggestOptions::default());
        for word in ["world", "would", "work", "thanks", "thank", "there", "their"] {
            suggestor.learn(word);
        }
        suggestor
    }

    #[test]
    fn extracts_trailing_token() {
        assert_eq!(last_word_token("hello wor"), (6, "wor"));
        assert_eq!(last_word_token("don't"), (0, "don't"));
        assert_eq!(last_word_token("ends with space "), (16, ""));
        assert_eq!(last_word_token("你好abc"), (6, "abc"));
    }

    #[test]
    fn suggests_remaining_suffix() {
        let mut suggestor = seeded(RankingPolicy::Frequency);
        suggestor.commit("would");
        suggestor.commit("would");
        suggestor.commit("world");

        let s = suggestor.suggest("I think it wo").unwrap();
        assert_eq!(s.word, "would");
        assert_eq!(s.suffix, "uld");
        assert_eq!(s.priority, 2);
        assert_eq!(s.replace_range, [11, 13]);
    }

    #[test]
    fn folds_case_of_typed_prefix() {
        let mut suggestor = seeded(RankingPolicy::Recency);
        suggestor.commit("Thanks");
        let s = suggestor.suggest("Tha").unwrap();
        assert_eq!(s.word, "thanks");
        assert_eq!(s.suffix, "nks");
    }

    #[test]
    fn no_suggestion_without_new_text() {
        let mut suggestor = seeded(RankingPolicy::Frequency);
        suggestor.commit("work");
        suggestor.commit("work");
        assert_eq!(suggestor.suggest("work"), None);
        assert_eq!(suggestor.suggest("zebra"), None);
        assert_eq!(suggestor.suggest("hello "), None);
        assert_eq!(suggestor.suggest(""), None);
    }

    #[test]
    fn respects_gates() {
        let options = SuggestOptions {
            min_prefix_len: 2,
            fold_case: true,
            max_len: 2,
        };
        let mut suggestor = Suggestor::new(RankingPolicy::Frequency, options);
        suggestor.commit("tomorrow");

        assert_eq!(suggestor.suggest("t"), None);
        assert_eq!(suggestor.suggest("to").unwrap().suffix, "mo");
    }

    #[test]
    fn commit_learns_and_ranks() {
        let mut suggestor = Suggestor::default();
        assert_eq!(suggestor.commit("  regards "), Some(1));
        assert_eq!(suggestor.commit("regards"), Some(2));
        assert_eq!(suggestor.commit("   "), None);
        assert!(!suggestor.learn("regards"));
        assert!(suggestor.learn("please"));
        assert_eq!(suggestor.trie().word_count(), 2);
    }
}
