//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

use spa_edge::assets::SpaResolver;
use spa_edge::config::{AppConfig, ConfigStore};
use spa_edge::http::{build_router, AppState, Pipeline, PipelineSettings};
use spa_edge::proxy::{OutboundClient, OutboundTimeouts};
use spa_edge::security::OriginValidator;

pub const SHELL: &str = "<!doctype html><html><body><div id=\"app\"></div></body></html>";
pub const APP_JS: &str = "const routes = ['home', 'settings', 'about'];\n";
pub const EDGE_HOST: &str = "edge.test";
pub const EDGE_ORIGIN: &str = "http://edge.test";

/// A built SPA on disk.
pub struct Site {
    pub dir: TempDir,
}

impl Site {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(root.join("index.html"), SHELL).unwrap();
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::write(root.join("assets/app-3f9c.js"), APP_JS.repeat(200)).unwrap();
        std::fs::write(root.join("logo.png"), [0x89, b'P', b'N', b'G', 0, 0, 0, 0]).unwrap();
        std::fs::create_dir_all(root.join("docs")).unwrap();
        std::fs::write(root.join("docs/index.html"), "<h1>docs</h1>").unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("config.json")
    }
}

/// State over `site` with the starter record and the given allow-list.
pub fn state(site: &Site, allowed: &[&str], upload_endpoint: &str) -> AppState {
    let config = AppConfig {
        allowed_proxy_hosts: allowed.iter().map(|h| h.to_string()).collect(),
        ..AppConfig::starter()
    };
    AppState {
        config: Arc::new(ConfigStore::new(site.config_path(), config)),
        assets: Arc::new(SpaResolver::new(site.root()).unwrap()),
        origins: OriginValidator::default(),
        outbound: Arc::new(
            OutboundClient::new(Url::parse(upload_endpoint).unwrap(), OutboundTimeouts::default()).unwrap(),
        ),
    }
}

pub fn router(state: AppState, settings: PipelineSettings) -> Router {
    build_router(&Pipeline::new(settings), state)
}

/// Router over `site` with every stage enabled.
pub fn default_router(site: &Site) -> Router {
    router(
        state(site, &["api.imgbb.com"], "https://api.imgbb.com/1/upload"),
        PipelineSettings::default(),
    )
}

pub struct Sent {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Sent {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Sent {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    Sent { status, headers, body }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, EDGE_HOST)
        .body(Body::empty())
        .unwrap()
}

/// Same-origin JSON POST.
pub fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::HOST, EDGE_HOST)
        .header(header::ORIGIN, EDGE_ORIGIN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

/// One response from a mock upstream.
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// A running mock upstream and the raw requests it has received.
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn received(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn authority(&self) -> String {
        self.addr.to_string()
    }
}

/// Start a programmable mock upstream on an ephemeral port.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> MockUpstream
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MockResponse> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let seen = seen.clone();
            tokio::spawn(async move {
                let raw = read_request(&mut socket).await;
                seen.lock().unwrap().push(raw.clone());
                let response = f(raw).await;

                let mut head = format!("HTTP/1.1 {} Mock\r\n", response.status);
                for (name, value) in &response.headers {
                    head.push_str(&format!("{name}: {value}\r\n"));
                }
                head.push_str(&format!(
                    "Content-Length: {}\r\nConnection: close\r\n\r\n",
                    response.body.len()
                ));
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(response.body.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockUpstream { addr, requests }
}

/// Read one request head and its Content-Length body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let head = text[..end].to_ascii_lowercase();
            if head.contains("transfer-encoding: chunked") {
                if text[end + 4..].contains("0\r\n\r\n") {
                    break;
                }
                continue;
            }
            let length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    (name == "content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
