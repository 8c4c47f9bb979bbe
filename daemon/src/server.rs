use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::engine::CompletionEngine;
use crate::protocol::{
    DaemonRequest, DaemonResponse, ErrorCode, ErrorResponse, RequestBody, ResponseBody,
};

pub struct CompletionServer {
    config: ServerConfig,
    engine: Arc<CompletionEngine>,
}

impl CompletionServer {
    pub fn new(config: ServerConfig, engine: CompletionEngine) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let listener = bind_listener(&self.config.socket_path).await?;
        info!(socket = %self.config.socket_path.display(), "completion daemon listening");
        self.serve(listener).await
    }

    async fn serve(&self, listener: UnixListener) -> Result<()> {
        loop {
            let (stream, _) = listener.accept().await?;
            let engine = Arc::clone(&self.engine);
            let timeout_ms = self.config.request_timeout_ms;
            tokio::spawn(async move {
                if let Err(error) = serve_connection(stream, &engine, timeout_ms).await {
                    warn!("connection closed with error: {error:#}");
                }
            });
        }
    }
}

/// Binds `path`, creating its directory and replacing a socket left behind
/// by an earlier run.
async fn bind_listener(path: &Path) -> Result<UnixListener> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create socket directory {}", parent.display()))?;
    }
    match fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed stale socket"),
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to remove stale socket {}", path.display()))
        }
    }
    UnixListener::bind(path)
        .with_context(|| format!("failed to bind unix socket at {}", path.display()))
}

/// One JSON response line per non-blank request line, until the peer hangs up.
async fn serve_connection(
    stream: UnixStream,
    engine: &CompletionEngine,
    timeout_ms: u64,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = process_line(&line, engine, timeout_ms).await;
        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        writer.write_all(&payload).await?;
    }
    Ok(())
}

async fn process_line(line: &str, engine: &CompletionEngine, timeout_ms: u64) -> DaemonResponse {
    match serde_json::from_str::<DaemonRequest>(line) {
        Ok(request) => handle_request(request, engine, timeout_ms).await,
        Err(error) => {
            error!("invalid request JSON: {error}");
            error_response(
                String::new(),
                ErrorCode::InvalidRequest,
                format!("invalid JSON payload: {error}"),
            )
        }
    }
}

async fn handle_request(
    request: DaemonRequest,
    engine: &CompletionEngine,
    timeout_ms: u64,
) -> DaemonResponse {
    let id = request.id;
    let budget = Duration::from_millis(timeout_ms.max(1));
    let outcome = timeout(budget, dispatch(request.body, engine)).await;
    match outcome {
        Ok(Ok(body)) => DaemonResponse { id, body },
        Ok(Err(message)) => error_response(id, ErrorCode::InvalidRequest, message),
        Err(_) => error_response(
            id,
            ErrorCode::Timeout,
            format!("request exceeded {}ms", budget.as_millis()),
        ),
    }
}

async fn dispatch(body: RequestBody, engine: &CompletionEngine) -> Result<ResponseBody, String> {
    match body {
        RequestBody::Ping => Ok(ResponseBody::Pong),
        RequestBody::Stats => Ok(ResponseBody::Stats(engine.stats().await)),
        RequestBody::Complete(request) => {
            Ok(ResponseBody::Completion(engine.complete(&request.context).await))
        }
        RequestBody::Commit(request) => engine
            .commit(&request.word)
            .await
            .map(ResponseBody::Committed)
            .ok_or_else(|| "word must not be empty".to_string()),
        RequestBody::Learn(request) => engine
            .learn(&request.word)
            .await
            .map(ResponseBody::Learned)
            .ok_or_else(|| "word must not be empty".to_string()),
    }
}

fn error_response(id: String, code: ErrorCode, message: String) -> DaemonResponse {
    DaemonResponse {
        id,
        body: ResponseBody::Error(ErrorResponse { code, message }),
    }
}
