//! Shared test infrastructure for integration tests.
//!
//! Runs the built binary against a minimal HTTP stub that stands in for the
//! Codacy API. The stub answers from a route table and records every request.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use std::thread;

/// Request seen by the stub.
#[derive(Debug, Clone)]
pub struct StubRequest {
    pub method: String,
    /// Path without the query string.
    pub path: String,
    pub query: String,
    pub api_token: Option<String>,
    pub body: String,
}

/// Canned response: status and JSON body (may be empty).
pub type StubResponse = (u16, String);

type Router = dyn Fn(&StubRequest) -> StubResponse + Send + Sync;

pub struct StubServer {
    base_url: String,
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

impl StubServer {
    /// Bind on an ephemeral local port and serve until the test process ends.
    pub fn start<F>(router: F) -> Self
    where
        F: Fn(&StubRequest) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let router: Arc<Router> = Arc::new(router);

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else {
                    continue;
                };
                let _ = handle(stream, router.as_ref(), &recorded);
            }
        });

        Self {
            base_url: format!("http://{addr}/api/v3"),
            requests,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().expect("request log").clone()
    }
}

fn handle(stream: TcpStream, router: &Router, recorded: &Mutex<Vec<StubRequest>>) -> Option<()> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut content_length = 0usize;
    let mut api_token = None;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "api-token" => api_token = Some(value.to_string()),
                _ => {}
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), query.to_string()),
        None => (target, String::new()),
    };
    let request = StubRequest {
        method,
        path,
        query,
        api_token,
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let (status, payload) = router(&request);
    recorded.lock().expect("request log").push(request);
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        payload.len()
    );
    let mut stream = stream;
    stream.write_all(response.as_bytes()).ok()?;
    stream.flush().ok()
}

pub fn ok(body: serde_json::Value) -> StubResponse {
    (200, body.to_string())
}

pub fn empty() -> StubResponse {
    (200, String::new())
}

pub fn not_found() -> StubResponse {
    (404, r#"{"error":"not found"}"#.to_string())
}

const CLEARED_ENV: &[&str] = &[
    "CODACY_API_TOKEN",
    "CODACY_API_BASE_URL",
    "RUST_LOG",
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
];

/// Run the toggler binary without its environment overrides or proxies.
pub fn run_toggler(args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_codacy-security-toggler"));
    command.args(args);
    for name in CLEARED_ENV {
        command.env_remove(name);
    }
    command.output().expect("spawn codacy-security-toggler")
}
