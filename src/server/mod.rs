//! HTTP API server
//! Simple HTTP server using tokio and basic HTTP handling
//!
//! Routes:
//! - `GET /` and `GET /health` - liveness
//! - `POST /upload` - multipart form with a `file` field (or a raw body named by
//!   `?filename=` / `X-Filename`), becomes the current dataset
//! - `POST /query` - `{"query": "..."}` resolved against the current dataset
//! - `GET /datasets` - stored datasets

pub mod http;

pub use http::{HttpRequest, HttpResponse};

use crate::config::AppConfig;
use crate::error::{QaError, Result};
use crate::ingestion;
use crate::observability::{QueryLog, QueryLogEntry};
use crate::resolver::{self, QueryResult};
use crate::storage::{DatasetStore, DirectoryStore};
use crate::summary::{self, LlmSummarizer, Summarizer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

const READ_TIMEOUT: Duration = Duration::from_secs(5);
/// Allowance for the request line and headers on top of the body limit
const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Shared state handed to every connection
pub struct AppState {
    pub store: Arc<dyn DatasetStore>,
    pub summarizer: Option<Arc<dyn Summarizer>>,
    pub query_log: QueryLog,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn DatasetStore>) -> Self {
        Self {
            store,
            summarizer: None,
            query_log: QueryLog::default(),
            max_body_bytes: crate::config::DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = DirectoryStore::open(&config.upload_dir)?;
        let summarizer = config
            .llm
            .as_ref()
            .map(|llm| Arc::new(LlmSummarizer::new(llm)) as Arc<dyn Summarizer>);
        Ok(Self {
            store: Arc::new(store),
            summarizer,
            query_log: QueryLog::new(config.query_log_path.clone(), 1000),
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    columns: Vec<String>,
    rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
}

/// Bind `config.bind_addr` and serve until the process exits.
pub async fn run(config: &AppConfig) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    if state.summarizer.is_some() {
        info!("LLM summaries enabled");
    } else {
        info!("no OPENAI_API_KEY set - uploads will not be summarized");
    }
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, upload_dir = %config.upload_dir.display(), "server listening");
    serve(listener, state).await
}

/// Accept loop; one task per connection.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        debug!(%addr, "new connection");
        tokio::spawn(handle_connection(stream, Arc::clone(&state)));
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<AppState>) {
    let limit = state.max_body_bytes + MAX_HEADER_BYTES;
    let response = match timeout(READ_TIMEOUT, read_request(&mut stream, limit)).await {
        Err(_) => {
            warn!("request read timeout");
            return;
        }
        Ok(Err(QaError::PayloadTooLarge)) => {
            HttpResponse::error(413, QaError::PayloadTooLarge.to_string())
        }
        Ok(Err(e)) => {
            warn!(error = %e, "failed to read request");
            return;
        }
        Ok(Ok(raw)) if raw.is_empty() => return,
        Ok(Ok(raw)) => match HttpRequest::parse(&raw) {
            Ok(request) => handle_request(&state, request).await,
            Err(e) => HttpResponse::error(400, e.to_string()),
        },
    };

    if let Err(e) = stream.write_all(&response.to_bytes()).await {
        warn!(error = %e, "failed to write response");
    }
}

/// Read one request: headers, then as much body as Content-Length announces.
async fn read_request(stream: &mut TcpStream, limit: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut temp_buf = [0u8; 8192];
    loop {
        let n = stream.read(&mut temp_buf).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&temp_buf[..n]);
        if buffer.len() > limit {
            return Err(QaError::PayloadTooLarge);
        }
        if let Some(end) = http::header_end(&buffer) {
            let head = String::from_utf8_lossy(&buffer[..end]);
            let expected = end + 4 + http::content_length(&head).unwrap_or(0);
            if expected > limit {
                return Err(QaError::PayloadTooLarge);
            }
            if buffer.len() >= expected {
                break;
            }
        }
    }
    Ok(buffer)
}

/// Route one parsed request.
pub async fn handle_request(state: &AppState, request: HttpRequest) -> HttpResponse {
    debug!(method = %request.method, path = %request.path, "request");
    match (request.method.as_str(), request.path.as_str()) {
        ("OPTIONS", _) => HttpResponse::no_content(),
        ("GET", "/") => HttpResponse::json(
            200,
            &serde_json::json!({ "message": "Backend is running!" }),
        ),
        ("GET", "/health") => HttpResponse::json(
            200,
            &serde_json::json!({ "status": "ok" }),
        ),
        ("GET", "/datasets") => match state.store.list() {
            Ok(datasets) => HttpResponse::json(200, &serde_json::json!({ "datasets": datasets })),
            Err(e) => HttpResponse::error(500, e.to_string()),
        },
        ("POST", "/upload") => handle_upload(state, &request).await,
        ("POST", "/query") => handle_query(state, &request),
        _ => HttpResponse::error(404, "Not found"),
    }
}

/// File carried by an upload request
struct Upload {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

/// Pull the uploaded file out of a request; `None` when it carries no file.
async fn extract_upload(request: &HttpRequest) -> Result<Option<Upload>> {
    let named = request
        .query
        .get("filename")
        .map(String::as_str)
        .or_else(|| request.header("x-filename"))
        .map(str::to_string);

    let content_type = request.header("content-type").unwrap_or_default();
    if !content_type.to_ascii_lowercase().starts_with("multipart/form-data") {
        if request.body.is_empty() {
            return Ok(None);
        }
        return Ok(Some(Upload {
            file_name: named,
            bytes: request.body.clone(),
        }));
    }

    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| QaError::Http(format!("invalid multipart request: {}", e)))?;
    let mut multipart = multer::Multipart::with_reader(request.body.as_slice(), boundary);
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| QaError::Http(format!("invalid multipart request: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string).or_else(|| named.clone());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| QaError::Http(format!("invalid multipart request: {}", e)))?;
        if bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(Upload {
            file_name,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

async fn handle_upload(state: &AppState, request: &HttpRequest) -> HttpResponse {
    let upload = match extract_upload(request).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return HttpResponse::error(400, "No file uploaded"),
        Err(e) => return HttpResponse::error(400, e.to_string()),
    };
    let file_name = match upload
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        Some(name) => name.to_string(),
        None => return HttpResponse::error(400, "filename is required"),
    };

    let table = match ingestion::load_bytes(&file_name, &upload.bytes) {
        Ok(table) => table,
        Err(e) => {
            error!(file = %file_name, error = %e, "upload ingestion failed");
            return HttpResponse::error(500, e.to_string());
        }
    };

    let columns: Vec<String> = table.column_names().iter().map(|s| s.to_string()).collect();
    let rows = table.row_count();
    let sample = summary::sample_text(&table, summary::SAMPLE_ROWS, summary::SAMPLE_MAX_CHARS);

    if let Err(e) = state.store.put(&file_name, &upload.bytes, table) {
        error!(file = %file_name, error = %e, "failed to store upload");
        return HttpResponse::error(500, e.to_string());
    }

    let summary = match &state.summarizer {
        Some(summarizer) if !sample.is_empty() => match summarizer.summarize(&sample).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(file = %file_name, error = %e, "summary unavailable");
                None
            }
        },
        _ => None,
    };

    info!(file = %file_name, rows, "upload accepted");
    HttpResponse::json(
        200,
        &UploadResponse {
            columns,
            rows,
            summary,
        },
    )
}

fn handle_query(state: &AppState, request: &HttpRequest) -> HttpResponse {
    let req: QueryRequest = match serde_json::from_slice(&request.body) {
        Ok(req) => req,
        Err(_) => return HttpResponse::error(400, "JSON body required"),
    };

    let table = match state.store.current() {
        Ok(Some(table)) => table,
        Ok(None) => return HttpResponse::error(400, QaError::NoDataset.to_string()),
        Err(e) => return failure(state, QueryResult::failed(req.query.to_lowercase(), e.to_string()), 0),
    };

    let started = Instant::now();
    let outcome = resolver::resolve(&req.query, &table);
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(result) => {
            log_query(state, &result, elapsed_ms);
            HttpResponse::json(200, &result)
        }
        Err(e) => {
            error!(query = %req.query, error = %e, "query resolution failed");
            failure(state, QueryResult::failed(req.query.to_lowercase(), e.to_string()), elapsed_ms)
        }
    }
}

fn failure(state: &AppState, result: QueryResult, elapsed_ms: u64) -> HttpResponse {
    log_query(state, &result, elapsed_ms);
    let mut body = serde_json::to_value(&result).unwrap_or_default();
    body["success"] = serde_json::Value::Bool(false);
    HttpResponse::json(500, &body)
}

fn log_query(state: &AppState, result: &QueryResult, elapsed_ms: u64) {
    if let Err(e) = state.query_log.record(QueryLogEntry::from_result(result, elapsed_ms)) {
        warn!(error = %e, "failed to record query log entry");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn request(raw: &str) -> HttpRequest {
        HttpRequest::parse(raw.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn test_root_and_unknown_route() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let root = handle_request(&state, request("GET / HTTP/1.1\r\n\r\n")).await;
        assert_eq!(root.status, 200);
        assert_eq!(root.body_json()["message"], "Backend is running!");

        let missing = handle_request(&state, request("GET /nope HTTP/1.1\r\n\r\n")).await;
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn test_health_and_read_timeout() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let health = handle_request(&state, request("GET /health HTTP/1.1\r\n\r\n")).await;
        assert_eq!(health.status, 200);
        assert_eq!(health.body, r#"{"status":"ok"}"#);
        assert_eq!(READ_TIMEOUT, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_preflight() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let resp = handle_request(&state, request("OPTIONS /query HTTP/1.1\r\n\r\n")).await;
        assert_eq!(resp.status, 204);
        assert!(resp.body.is_empty());
    }

    #[tokio::test]
    async fn test_query_rejects_non_json() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let resp = handle_request(&state, request("POST /query HTTP/1.1\r\n\r\nnot json")).await;
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body_json()["error"], "JSON body required");
    }

    #[tokio::test]
    async fn test_upload_requires_filename() {
        let state = AppState::new(Arc::new(MemoryStore::new()));
        let resp = handle_request(&state, request("POST /upload HTTP/1.1\r\n\r\na,b\n1,2\n")).await;
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body_json()["error"], "filename is required");
    }
}
