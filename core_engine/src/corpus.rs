//! Word ingestion from plain-text files.
//!
//! Files are read as whitespace-separated tokens, any number per line, so
//! both one-word-per-line dictionaries and running prose work unchanged.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, enabled, info, trace, Level};

use crate::trie::PriorityTrie;

#[derive(Debug, Error)]
pub enum CorpusError {
    /// The file could not be opened at all.
    #[error("word source {} is unavailable: {source}", path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CorpusError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CorpusError::Unavailable { .. })
    }
}

/// Streaming iterator over the words of one file.
pub struct WordSource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    pending: VecDeque<String>,
}

impl WordSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| CorpusError::Unavailable {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            pending: VecDeque::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for WordSource {
    type Item = Result<String, CorpusError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(word) = self.pending.pop_front() {
                return Some(Ok(word));
            }
            match self.lines.next()? {
                Ok(line) => self
                    .pending
                    .extend(line.split_whitespace().map(str::to_string)),
                Err(source) => {
                    return Some(Err(CorpusError::Read {
                        path: self.path.clone(),
                        source,
                    }))
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub words: usize,
    pub nodes: usize,
    pub elapsed: Duration,
}

/// Inserts every word of `path` into `trie`.
pub fn load_into(
    trie: &mut PriorityTrie,
    path: impl AsRef<Path>,
) -> Result<LoadStats, CorpusError> {
    let source = WordSource::open(path)?;
    let path = source.path().to_path_buf();
    let started = Instant::now();
    let mut words = 0usize;

    for word in source {
        let word = word?;
        trie.insert(&word);
        words += 1;

        if words.is_power_of_two() {
            debug!(words, nodes = trie.size(), "loading {}", path.display());
        }
        if enabled!(Level::TRACE) {
            for entry in trie.terminals() {
                trace!(
                    word = %entry.word,
                    priority = entry.priority,
                    best = ?entry.best,
                    "terminal after inserting {word:?}"
                );
            }
        }
    }

    let stats = LoadStats {
        words,
        nodes: trie.size(),
        elapsed: started.elapsed(),
    };
    info!(
        path = %path.display(),
        words = stats.words,
        nodes = stats.nodes,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "loaded word source"
    );
    Ok(stats)
}
