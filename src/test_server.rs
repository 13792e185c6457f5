//! Tiny HTTP/1.1 server for tests. Serves fixed bodies by path, answers
//! everything else with 404 and remembers which paths were requested.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Clone)]
struct Route {
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
}

type Routes = Arc<Mutex<HashMap<String, Route>>>;

pub struct TestServer {
    pub origin: String,
    routes: Routes,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Binds to an ephemeral port and serves until the test process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let routes: Routes = Arc::default();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let (served, log) = (Arc::clone(&routes), Arc::clone(&requests));
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let (routes, log) = (Arc::clone(&served), Arc::clone(&log));
                thread::spawn(move || handle(stream, &routes, &log));
            }
        });

        Self {
            origin: format!("http://127.0.0.1:{}", port),
            routes,
            requests,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    pub fn html(&self, path: &str, body: &str) -> &Self {
        self.route(path, "200 OK", "text/html; charset=utf-8", body.as_bytes())
    }

    pub fn jpeg(&self, path: &str, body: &[u8]) -> &Self {
        self.route(path, "200 OK", "image/jpeg", body)
    }

    pub fn error(&self, path: &str) -> &Self {
        self.route(path, "500 Internal Server Error", "text/plain", b"boom")
    }

    fn route(
        &self,
        path: &str,
        status: &'static str,
        content_type: &'static str,
        body: &[u8],
    ) -> &Self {
        self.routes.lock().expect("routes").insert(
            path.to_string(),
            Route {
                status,
                content_type,
                body: body.to_vec(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log").clone()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn hits(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|path| path.starts_with(prefix))
            .count()
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &Mutex<HashMap<String, Route>>,
    log: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&request);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    log.lock().expect("request log").push(path.clone());

    let route = routes
        .lock()
        .expect("routes")
        .get(&path)
        .cloned()
        .unwrap_or(Route {
            status: "404 Not Found",
            content_type: "text/plain",
            body: b"not found".to_vec(),
        });
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        route.content_type,
        route.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&route.body);
}
