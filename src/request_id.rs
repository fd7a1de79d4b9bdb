//! 请求关联 ID
//!
//! 每个请求在 task-local 中绑定一个 ID：错误体的 `requestId`、错误上报事件和
//! 处理器日志（通过 `request` span）都从这里取值，并通过 `X-Request-Id` 回写给调用方。

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// 客户端自带 ID 的最大长度，超出视为无效
const MAX_CLIENT_ID_LEN: usize = 128;

tokio::task_local! {
    static CURRENT_REQUEST_ID: String;
}

/// 当前请求的 ID；不在请求任务内（例如单元测试、后台任务）时为 None
pub fn current_request_id() -> Option<String> {
    CURRENT_REQUEST_ID.try_with(String::clone).ok()
}

/// 取出客户端传入且可安全回显的 ID（只允许 `[A-Za-z0-9._-]`）
fn client_supplied_id(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(&REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let safe = raw
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    (safe && !raw.is_empty() && raw.len() <= MAX_CLIENT_ID_LEN).then_some(raw)
}

pub async fn request_id_middleware(req: Request, next: Next) -> Response {
    let request_id = client_supplied_id(req.headers())
        .map(str::to_string)
        .unwrap_or_else(|| format!("req_{}", Uuid::new_v4().simple()));
    let span = tracing::info_span!("request", request_id = %request_id);

    let mut res = CURRENT_REQUEST_ID
        .scope(request_id.clone(), next.run(req).instrument(span))
        .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        res.headers_mut().insert(REQUEST_ID_HEADER.clone(), value);
    }
    res
}
