//! Minimal HTTP/1.1 server serving a fixed set of chunk paths for integration tests.
//!
//! HEAD answers with Content-Length and, if configured, an ETag; GET answers
//! with the body. Each route can be forced to a status code instead. GETs are
//! counted so tests can tell cache hits from network fetches.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
pub struct Route {
    pub body: Vec<u8>,
    /// Sent quoted, like real servers do.
    pub etag: Option<String>,
    /// If set, HEAD and GET both answer with this status and no body.
    pub status: Option<u16>,
}

impl Route {
    pub fn body(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            etag: None,
            status: None,
        }
    }

    pub fn with_etag(mut self, etag: &str) -> Self {
        self.etag = Some(etag.to_string());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

pub struct ChunkServer {
    base: String,
    gets: Arc<AtomicUsize>,
}

impl ChunkServer {
    /// URL of `path` on this server (`path` without leading slash).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. Unknown paths get 404. The server
/// runs until the process exits.
pub fn start(routes: Vec<(&str, Route)>) -> ChunkServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, r)| (format!("/{}", p), r))
            .collect(),
    );
    let gets = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&gets);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let counter = Arc::clone(&counter);
            thread::spawn(move || handle(stream, &routes, &counter));
        }
    });
    ChunkServer {
        base: format!("http://127.0.0.1:{}/", port),
        gets,
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &HashMap<String, Route>, gets: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("");
    let is_head = method.eq_ignore_ascii_case("HEAD");
    if !is_head && !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(
            b"HTTP/1.1 405 Method Not Allowed\r\n\
Content-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }
    if !is_head {
        gets.fetch_add(1, Ordering::SeqCst);
    }

    let route = match routes.get(path) {
        Some(r) => r,
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\n\
Content-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
    };
    if let Some(status) = route.status {
        let response = format!(
            "HTTP/1.1 {} Forced\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            status
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    let etag = route
        .etag
        .as_ref()
        .map(|e| format!("ETag: \"{}\"\r\n", e))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        route.body.len(),
        etag
    );
    let _ = stream.write_all(response.as_bytes());
    if !is_head {
        let _ = stream.write_all(&route.body);
    }
}
