use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use core_engine::{
    load_into, replay_file, CorpusError, PriorityTrie, RankingPolicy, ReplayStats,
};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "core_engine")]
#[command(about = "Replay text corpora through the priority trie and report keystroke savings")]
#[command(version)]
struct Cli {
    /// Word list loaded into the trie before each replay
    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    /// Ranking policy to evaluate; repeat for several (default: all)
    #[arg(short, long = "policy")]
    policies: Vec<RankingPolicy>,

    /// Print one JSON object per run instead of text
    #[arg(long)]
    json: bool,

    /// Text corpora to replay
    #[arg(required = true)]
    corpora: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RunReport {
    corpus: String,
    policy: RankingPolicy,
    #[serde(flatten)]
    stats: ReplayStats,
    typed_ratio: f64,
    nodes: usize,
    elapsed_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    for report in evaluate(&cli)? {
        print_report(&report, cli.json)?;
    }
    Ok(())
}

/// Replays every corpus under every selected policy, each run starting from
/// a fresh copy of the seeded trie. Unreadable corpora are skipped.
fn evaluate(cli: &Cli) -> Result<Vec<RunReport>> {
    let policies = if cli.policies.is_empty() {
        RankingPolicy::ALL.to_vec()
    } else {
        cli.policies.clone()
    };

    let mut reports = Vec::new();
    for policy in policies {
        let seed = seed_trie(policy, cli.dictionary.as_deref())?;
        for corpus in &cli.corpora {
            let mut trie = seed.clone();
            match run(&mut trie, corpus) {
                Ok(report) => reports.push(report),
                Err(error) if error.is_unavailable() => {
                    warn!("skipping corpus: {error}");
                }
                Err(error) => {
                    return Err(error)
                        .with_context(|| format!("replay of {} failed", corpus.display()))
                }
            }
        }
    }

    anyhow::ensure!(!reports.is_empty(), "no corpus could be replayed");
    Ok(reports)
}

fn seed_trie(policy: RankingPolicy, dictionary: Option<&Path>) -> Result<PriorityTrie> {
    let mut trie = PriorityTrie::new(policy);
    if let Some(path) = dictionary {
        let stats = load_into(&mut trie, path)
            .with_context(|| format!("failed to load dictionary {}", path.display()))?;
        info!(%policy, words = stats.words, nodes = stats.nodes, "dictionary ready");
    }
    Ok(trie)
}

fn run(trie: &mut PriorityTrie, corpus: &Path) -> Result<RunReport, CorpusError> {
    let policy = trie.policy();
    info!(corpus = %corpus.display(), %policy, "replaying");

    let started = Instant::now();
    let stats = replay_file(trie, corpus)?;
    Ok(RunReport {
        corpus: corpus.display().to_string(),
        policy,
        stats,
        typed_ratio: stats.typed_ratio(),
        nodes: trie.size(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(report)?);
        return Ok(());
    }
    println!("=== {} [{}] ===", report.corpus, report.policy);
    println!("words replayed:   {}", report.stats.words);
    println!("characters total: {}", report.stats.total_chars);
    println!("characters typed: {}", report.stats.typed_chars);
    println!("typed / total:    {:.2}%", report.typed_ratio * 100.0);
    println!("trie nodes:       {}", report.nodes);
    println!("elapsed:          {} ms", report.elapsed_ms);
    println!();
    Ok(())
}
