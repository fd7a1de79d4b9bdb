#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Form, Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, Path, State},
    http::{Request, StatusCode, header},
    routing::post,
};
use serde_json::Value;
use tokio::net::TcpListener;

use upload_relay::{AppConfig, AppState, build_app};

pub const BOUNDARY: &str = "upload-relay-test-boundary";

/// 一次上游调用的记录
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub cloud_name: String,
    pub resource_type: String,
    pub form: HashMap<String, String>,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: Value,
    calls: Arc<AtomicUsize>,
    recorded: Arc<Mutex<Vec<RecordedCall>>>,
}

/// 本地假媒体服务：固定返回 `status` + `body`，并记录收到的表单
pub struct MockMedia {
    pub addr: SocketAddr,
    calls: Arc<AtomicUsize>,
    recorded: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockMedia {
    pub fn base_url(&self) -> String {
        format!("http://{}/v1_1", self.addr)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_call(&self) -> RecordedCall {
        self.recorded
            .lock()
            .expect("lock recorded calls")
            .last()
            .cloned()
            .expect("no upstream call recorded")
    }
}

async fn mock_upload(
    State(state): State<MockState>,
    Path((cloud_name, resource_type)): Path<(String, String)>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state
        .recorded
        .lock()
        .expect("lock recorded calls")
        .push(RecordedCall {
            cloud_name,
            resource_type,
            form,
        });
    (state.status, Json(state.body.clone()))
}

pub async fn spawn_mock_media(status: StatusCode, body: Value) -> MockMedia {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock media");
    let addr = listener.local_addr().expect("mock media addr");

    let calls = Arc::new(AtomicUsize::new(0));
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status,
        body,
        calls: calls.clone(),
        recorded: recorded.clone(),
    };

    let router = Router::new()
        .route("/v1_1/:cloud_name/:resource_type/upload", post(mock_upload))
        .layer(DefaultBodyLimit::disable())
        .with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    MockMedia {
        addr,
        calls,
        recorded,
    }
}

/// 接受连接但从不响应，用于触发客户端超时
pub async fn spawn_hanging_media() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind hanging listener");
    let addr = listener.local_addr().expect("hanging addr");

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(10)).await;
                drop(socket);
            });
        }
    });

    addr
}

pub fn test_config(base_url: &str) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.media.base_url = base_url.to_string();
    cfg.media.cloud_name = "demo".to_string();
    cfg.media.api_key = "key".to_string();
    cfg.media.api_secret = "secret".to_string();
    cfg.media.timeout_secs = 30;
    cfg
}

/// 不会被调用到的上游地址（仅用于不涉及上传的测试）
pub fn offline_config() -> AppConfig {
    test_config("http://127.0.0.1:9/v1_1")
}

pub fn build_test_app(cfg: AppConfig) -> Router {
    build_app(AppState::new(cfg).expect("AppState::new"))
}

/// multipart 的一个部分；`file_name` 为 None 时是普通文本字段
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            file_name: Some("upload.bin"),
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data,
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(ct) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    let body = multipart_body(parts);
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .expect("build upload request")
}

pub fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build json request")
}

pub async fn read_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}
