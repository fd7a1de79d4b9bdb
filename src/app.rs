use axum::{Router, extract::DefaultBodyLimit, middleware};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::cors::build_cors_layer;
use crate::features::{
    conversion::create_conversion_router, debug::create_debug_router,
    health::create_health_router, upload::create_upload_router,
};
use crate::openapi::ApiDoc;
use crate::reporting::{error_reporting_middleware, panic_response};
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 组装完整的 HTTP 应用。
///
/// 中间件由外到内：CORS → Trace → request_id → 错误上报 → panic 捕获 → 请求体上限 → 路由。
/// 错误上报必须在 panic 捕获之外才能看到 panic 转换出的 500；request_id 必须在两者之外，
/// 这样错误体与上报日志才能取到当前请求 ID。
pub fn build_app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut routes = Router::<AppState>::new()
        .merge(create_health_router())
        .merge(create_upload_router(&config.upload))
        .merge(create_conversion_router());
    if config.error_reporting.debug_route {
        routes = routes.merge(create_debug_router());
    }

    let mut app = routes
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state.clone())
        // 全局请求体上限（JSON 等）；/upload 在路由层单独放宽
        .layer(DefaultBodyLimit::max(config.upload.body_limit))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(
            state.reporter.clone(),
            error_reporting_middleware,
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    app
}
