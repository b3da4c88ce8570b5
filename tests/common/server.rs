//! Stub OMDb HTTP server
//!
//! Listens on a random local port and answers every request through a
//! caller-supplied handler. Each request's path and query is recorded.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// What the stub sends back for one request.
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// 200 with the given body, served as JSON.
    Json(String),
    /// The given status with an empty body.
    Status(u16),
    /// The given status with a JSON body.
    StatusJson(u16, String),
    /// Accepts the request and never answers.
    Stall,
}

type Handler = Arc<dyn Fn(&str) -> StubResponse + Send + Sync>;

pub struct StubOmdbServer {
    /// Base URL for the client under test (e.g., "http://127.0.0.1:12345/")
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl StubOmdbServer {
    /// Spawns a stub answering every request with `handler(path_and_query)`.
    pub async fn spawn<F>(handler: F) -> Self
    where
        F: Fn(&str) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Handler = Arc::new(handler);
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let recorded = requests.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { continue };
                        tokio::spawn(serve(stream, handler.clone(), recorded.clone()));
                    }
                }
            }
        });

        Self {
            base_url: format!("http://127.0.0.1:{}/", port),
            requests,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Spawns a stub that answers everything with the same JSON body.
    pub async fn json(body: &str) -> Self {
        let body = body.to_string();
        Self::spawn(move |_| StubResponse::Json(body.clone())).await
    }

    /// Path and query of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve(mut stream: TcpStream, handler: Handler, requests: Arc<Mutex<Vec<String>>>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buf);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("")
        .to_string();
    requests.lock().unwrap().push(target.clone());

    let response = match (handler.as_ref())(&target) {
        StubResponse::Json(body) => format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ),
        StubResponse::Status(code) => format!(
            "HTTP/1.1 {} Stub\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            code
        ),
        StubResponse::StatusJson(code, body) => format!(
            "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            code,
            body.len(),
            body
        ),
        StubResponse::Stall => {
            tokio::time::sleep(Duration::from_secs(60)).await;
            return;
        }
    };
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
