//! Loopback HTTP server that serves canned responses per request target.

use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

#[derive(Clone, Debug)]
struct CannedResponse {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    /// Request targets (path plus query), in arrival order.
    requests: Vec<String>,
    responses: HashMap<String, CannedResponse>,
}

/// Answers one request per connection, then closes it. Unknown targets get 404.
pub struct TestServer {
    inner: Arc<Mutex<Inner>>,
    addr: SocketAddr,
}

impl TestServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let inner = Arc::new(Mutex::new(Inner::default()));

        let shared = inner.clone();
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                serve(stream, &shared);
            }
        });

        Self { inner, addr }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn json(&self, target: &str, status: u16, body: &str) {
        self.respond(target, status, "application/json", body.as_bytes());
    }

    pub fn bytes(&self, target: &str, body: &[u8]) {
        self.respond(target, 200, "application/pdf", body);
    }

    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().unwrap().requests.clone()
    }

    fn respond(&self, target: &str, status: u16, content_type: &'static str, body: &[u8]) {
        self.inner.lock().unwrap().responses.insert(
            target.to_string(),
            CannedResponse {
                status,
                content_type,
                body: body.to_vec(),
            },
        );
    }
}

fn serve(stream: TcpStream, inner: &Mutex<Inner>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut reader = BufReader::new(&stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let Some(target) = request_line.split_whitespace().nth(1).map(str::to_string) else {
        return;
    };

    // Drain headers; the client only sends GETs.
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) if line.trim().is_empty() => break,
            Ok(_) => {}
        }
    }

    let canned = {
        let mut guard = inner.lock().unwrap();
        guard.requests.push(target.clone());
        guard.responses.get(&target).cloned()
    };
    let response = canned.unwrap_or(CannedResponse {
        status: 404,
        content_type: "text/plain",
        body: b"not found".to_vec(),
    });

    let head = format!(
        "HTTP/1.1 {} X\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.content_type,
        response.body.len()
    );
    let mut out = &stream;
    let _ = out.write_all(head.as_bytes());
    let _ = out.write_all(&response.body);
    let _ = out.flush();
}
