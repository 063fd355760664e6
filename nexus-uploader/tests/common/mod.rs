#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::Router;

/// In-process stand-in for a Nexus hosted repository.
///
/// Paths containing `/locked/` answer 401 and paths containing `/broken/`
/// answer 500; everything else behaves like an empty repository.
#[derive(Clone, Default)]
pub struct FakeNexus {
    pub stored: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pub auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    pub requests: Arc<Mutex<Vec<(Method, String)>>>,
}

impl FakeNexus {
    pub fn stored_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.stored.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn count(&self, method: &Method) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }
}

async fn handle(
    State(state): State<FakeNexus>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let path = uri.path().to_string();
    state.auth_headers.lock().unwrap().push(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    state.requests.lock().unwrap().push((method.clone(), path.clone()));

    if path.contains("/locked/") {
        return StatusCode::UNAUTHORIZED;
    }
    if path.contains("/broken/") {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    match method {
        Method::HEAD if state.stored.lock().unwrap().contains_key(&path) => StatusCode::OK,
        Method::HEAD => StatusCode::NOT_FOUND,
        Method::PUT => {
            state.stored.lock().unwrap().insert(path, body.to_vec());
            StatusCode::CREATED
        }
        _ => StatusCode::METHOD_NOT_ALLOWED,
    }
}

/// Serves `state` on an ephemeral port and returns the base URL.
pub async fn spawn_nexus(state: FakeNexus) -> String {
    let app = Router::new().fallback(handle).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

pub fn write_version(root: &Path, group: &str, artifact: &str, version: &str, files: &[&str]) -> PathBuf {
    let dir = root
        .join(group.replace('.', "/"))
        .join(artifact)
        .join(version);
    fs::create_dir_all(&dir).expect("create version dir");
    for name in files {
        fs::write(dir.join(name), format!("content of {name}")).expect("write artifact file");
    }
    dir
}

pub fn write_widget(root: &Path) -> PathBuf {
    write_version(
        root,
        "com.acme",
        "widget",
        "1.0.0",
        &["widget-1.0.0.jar", "widget-1.0.0.pom", "widget-1.0.0-sources.jar"],
    )
}
