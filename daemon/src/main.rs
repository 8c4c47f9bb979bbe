mod config;
mod engine;
mod protocol;
mod server;

use anyhow::Result;
use config::DaemonConfig;
use engine::CompletionEngine;
use server::CompletionServer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = DaemonConfig::load()?;
    info!(
        socket = %config.server.socket_path.display(),
        request_timeout_ms = config.server.request_timeout_ms,
        completion_enabled = config.completion.enable,
        policy = %config.completion.policy,
        min_prefix_len = config.completion.min_prefix_len,
        fold_case = config.completion.fold_case,
        dictionary = ?config.corpus.dictionary_path,
        seed = ?config.corpus.seed,
        "loaded autocomplete config"
    );
    let engine = CompletionEngine::load(&config.completion, &config.corpus)?;
    let server = CompletionServer::new(config.server.clone(), engine);
    server.run().await
}
