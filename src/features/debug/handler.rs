use axum::{Router, routing::get};

use crate::error::ErrorBody;
use crate::state::AppState;

/// 故障演练端点触发的 panic 文本
pub const DEBUG_PANIC_MESSAGE: &str = "My first Sentry error!";

#[utoipa::path(
    get,
    path = "/debug-sentry",
    summary = "错误上报演练",
    description = "总是触发一次未处理的 panic，用于验证 panic 捕获与错误上报链路。仅在 error_reporting.debug_route=true 时挂载。",
    responses((status = 500, description = "panic 已被捕获并上报", body = ErrorBody)),
    tag = "Debug"
)]
pub async fn debug_sentry() -> &'static str {
    panic!("{}", DEBUG_PANIC_MESSAGE);
}

pub fn create_debug_router() -> Router<AppState> {
    Router::<AppState>::new().route("/debug-sentry", get(debug_sentry))
}
