use std::path::Path;

use anyhow::{Context, Result};
use core_engine::{load_into, replay_file, CorpusError, PriorityTrie, Suggestor};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{CompletionConfig, CorpusConfig, SeedMode};
use crate::protocol::{CommitResponse, CompleteResponse, LearnResponse, StatsResponse};

/// The daemon's single vocabulary.
///
/// The trie itself is not synchronized; every request holds this lock for
/// its whole operation. Lookups share it, commits and learns take it
/// exclusively.
pub struct CompletionEngine {
    suggestor: RwLock<Suggestor>,
    enabled: bool,
}

impl CompletionEngine {
    pub fn new(config: &CompletionConfig, trie: PriorityTrie) -> Self {
        Self {
            suggestor: RwLock::new(Suggestor::with_trie(trie, config.suggest_options())),
            enabled: config.enable,
        }
    }

    /// Builds the engine and seeds it from the configured dictionary.
    ///
    /// An unavailable dictionary is only fatal when `corpus.required` is set.
    pub fn load(completion: &CompletionConfig, corpus: &CorpusConfig) -> Result<Self> {
        let mut trie = PriorityTrie::new(completion.policy);
        if let Some(path) = &corpus.dictionary_path {
            match seed(&mut trie, path, corpus.seed) {
                Ok(()) => info!(
                    path = %path.display(),
                    mode = ?corpus.seed,
                    words = trie.word_count(),
                    nodes = trie.size(),
                    "vocabulary seeded"
                ),
                Err(error) if error.is_unavailable() && !corpus.required => {
                    warn!("starting with an empty vocabulary: {error}");
                }
                Err(error) => {
                    return Err(error).with_context(|| {
                        format!("failed to seed vocabulary from {}", path.display())
                    })
                }
            }
        }
        Ok(Self::new(completion, trie))
    }

    pub async fn complete(&self, context: &str) -> CompleteResponse {
        if !self.enabled {
            return CompleteResponse::empty();
        }
        let suggestor = self.suggestor.read().await;
        match suggestor.suggest(context) {
            Some(suggestion) => CompleteResponse {
                word: Some(suggestion.word),
                suffix: suggestion.suffix,
                priority: suggestion.priority,
                replace_range: Some(suggestion.replace_range),
            },
            None => CompleteResponse::empty(),
        }
    }

    /// `None` when the word is blank.
    pub async fn commit(&self, word: &str) -> Option<CommitResponse> {
        let mut suggestor = self.suggestor.write().await;
        let stored = suggestor.normalize(word);
        let priority = suggestor.commit(&stored)?;
        debug!(word = %stored, priority, "committed");
        Some(CommitResponse {
            word: stored,
            priority,
        })
    }

    /// `None` when the word is blank.
    pub async fn learn(&self, word: &str) -> Option<LearnResponse> {
        let mut suggestor = self.suggestor.write().await;
        let stored = suggestor.normalize(word);
        if stored.is_empty() {
            return None;
        }
        let new = suggestor.learn(&stored);
        Some(LearnResponse { word: stored, new })
    }

    pub async fn stats(&self) -> StatsResponse {
        let suggestor = self.suggestor.read().await;
        let trie = suggestor.trie();
        StatsResponse {
            nodes: trie.size(),
            words: trie.word_count(),
            policy: trie.policy(),
        }
    }
}

fn seed(trie: &mut PriorityTrie, path: &Path, mode: SeedMode) -> Result<(), CorpusError> {
    match mode {
        SeedMode::Replay => {
            let stats = replay_file(trie, path)?;
            debug!(
                words = stats.words,
                typed_ratio = stats.typed_ratio(),
                "dictionary replayed"
            );
        }
        SeedMode::Insert => {
            load_into(trie, path)?;
        }
    }
    Ok(())
}
