//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves static bodies keyed by request path; routes can be added after the
//! server started (so bodies may embed the server's own base URL). Unknown
//! paths get 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
struct Route {
    content_type: &'static str,
    body: Vec<u8>,
}

type Routes = Arc<Mutex<HashMap<String, Route>>>;

pub struct TestServer {
    base: String,
    routes: Routes,
}

impl TestServer {
    /// Starts the server on a background thread. Runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes: Routes = Arc::new(Mutex::new(HashMap::new()));
        let shared = Arc::clone(&routes);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &routes));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            routes,
        }
    }

    /// Absolute URL for `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn route(&self, path: &str, content_type: &'static str, body: impl Into<Vec<u8>>) {
        self.routes.lock().unwrap().insert(
            path.to_string(),
            Route {
                content_type,
                body: body.into(),
            },
        );
    }

    pub fn html(&self, path: &str, body: &str) {
        self.route(path, "text/html", body.as_bytes().to_vec());
    }
}

fn handle(mut stream: std::net::TcpStream, routes: &Routes) {
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
    let (method, path) = parse_request_line(request);
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }
    let route = routes.lock().unwrap().get(path).cloned();
    match route {
        Some(route) => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                route.content_type,
                route.body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&route.body);
        }
        None => {
            let body = b"not found";
            let head = format!(
                "HTTP/1.1 404 Not Found\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
        }
    }
}

/// Returns (method, path without query) from the request line.
fn parse_request_line(request: &str) -> (&str, &str) {
    let line = request.lines().next().unwrap_or("");
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("/");
    let path = target.split('?').next().unwrap_or(target);
    (method, path)
}
