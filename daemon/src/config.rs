use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use core_engine::{RankingPolicy, SuggestOptions};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DaemonConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
}

impl DaemonConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Reads `path`; a file that does not exist means "all defaults".
    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::parse(&raw)
                .with_context(|| format!("failed to parse TOML from {}", path.display())),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => {
                Err(error).with_context(|| format!("failed to read config file {}", path.display()))
            }
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

/// `$AUTOCOMPLETE_CONFIG`, else the per-user config dir, else `/tmp`.
fn config_path() -> PathBuf {
    env::var_os("AUTOCOMPLETE_CONFIG")
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|base| base.join("autocomplete").join("config.toml")))
        .unwrap_or_else(|| PathBuf::from("/tmp/autocomplete.toml"))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub socket_path: PathBuf,
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("/tmp/autocomplete.sock"),
            request_timeout_ms: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_enable")]
    pub enable: bool,
    #[serde(default)]
    pub policy: RankingPolicy,
    #[serde(default = "default_min_prefix_len")]
    pub min_prefix_len: usize,
    #[serde(default = "default_fold_case")]
    pub fold_case: bool,
    #[serde(default = "default_max_len")]
    pub max_len: usize,
}

impl CompletionConfig {
    pub fn suggest_options(&self) -> SuggestOptions {
        SuggestOptions {
            min_prefix_len: self.min_prefix_len,
            fold_case: self.fold_case,
            max_len: self.max_len,
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enable: default_enable(),
            policy: RankingPolicy::default(),
            min_prefix_len: default_min_prefix_len(),
            fold_case: default_fold_case(),
            max_len: default_max_len(),
        }
    }
}

fn default_enable() -> bool {
    true
}

fn default_min_prefix_len() -> usize {
    1
}

fn default_fold_case() -> bool {
    true
}

fn default_max_len() -> usize {
    32
}

/// How the dictionary file becomes the initial vocabulary.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeedMode {
    /// Replay the file as typed text: every occurrence counts as a use.
    #[default]
    Replay,
    /// Learn each word once, unranked.
    Insert,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CorpusConfig {
    #[serde(default)]
    pub dictionary_path: Option<PathBuf>,
    #[serde(default)]
    pub seed: SeedMode,
    /// Refuse to start when the dictionary cannot be opened.
    #[serde(default)]
    pub required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = DaemonConfig::parse("").unwrap();
        assert_eq!(config.server.socket_path, PathBuf::from("/tmp/autocomplete.sock"));
        assert_eq!(config.server.request_timeout_ms, 120);
        assert!(config.completion.enable);
        assert_eq!(config.completion.policy, RankingPolicy::Frequency);
        assert!(config.corpus.dictionary_path.is_none());
        assert!(!config.corpus.required);
        assert_eq!(config.corpus.seed, SeedMode::Replay);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DaemonConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.server.request_timeout_ms, 120);
    }

    #[test]
    fn loads_partial_sections_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nrequest_timeout_ms = 40\n").unwrap();

        let config = DaemonConfig::load_from(&path).unwrap();
        assert_eq!(config.server.request_timeout_ms, 40);
        assert_eq!(config.server.socket_path, PathBuf::from("/tmp/autocomplete.sock"));
    }

    #[test]
    fn parses_sections() {
        let raw = r#"
            [completion]
            policy = "recency"
            min_prefix_len = 3
            fold_case = false

            [corpus]
            dictionary_path = "/usr/share/dict/words"
            seed = "insert"
            required = true
        "#;
        let config = DaemonConfig::parse(raw).unwrap();
        assert_eq!(config.completion.policy, RankingPolicy::Recency);
        let options = config.completion.suggest_options();
        assert_eq!(options.min_prefix_len, 3);
        assert!(!options.fold_case);
        assert_eq!(options.max_len, 32);
        assert_eq!(
            config.corpus.dictionary_path.as_deref(),
            Some(Path::new("/usr/share/dict/words"))
        );
        assert!(config.corpus.required);
        assert_eq!(config.corpus.seed, SeedMode::Insert);
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(DaemonConfig::parse("[completion]\npolicy = \"lru\"\n").is_err());
    }
}
